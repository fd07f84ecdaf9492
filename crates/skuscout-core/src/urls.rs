use url::{Url, form_urlencoded};

use crate::error::AppError;

/// Encode text for use in a query string (`application/x-www-form-urlencoded`).
///
/// Spaces become `+`, reserved characters are percent-encoded.
pub fn encode_query(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Candidate search URLs for a product on a site, in the order they should be tried.
///
/// 1. the site itself
/// 2. `{site}?search={name}`
/// 3. `{site}?q={name}`
/// 4. `{scheme}://{host}/search?q={name}`
/// 5. `{scheme}://{host}/search/{name}`
/// 6. `{site}/{name}`
///
/// Purely string-based; no network access.
pub fn candidate_urls(site: &str, product: &str) -> Result<Vec<String>, AppError> {
    let parsed = Url::parse(site).map_err(|e| AppError::InvalidUrl(format!("{site}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::InvalidUrl(format!("{site}: URL has no host")))?;
    let origin = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };
    let name = encode_query(product);

    Ok(vec![
        site.to_string(),
        format!("{site}?search={name}"),
        format!("{site}?q={name}"),
        format!("{origin}/search?q={name}"),
        format!("{origin}/search/{name}"),
        format!("{}/{name}", site.trim_end_matches('/')),
    ])
}
