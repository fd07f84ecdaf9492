use scraper::{ElementRef, Html, Node};
use skuscout_core::error::AppError;
use skuscout_core::traits::Cleaner;

/// Elements whose content is never shown to a reader.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "head",
];

/// Elements that start a new line of rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// HTML-to-text cleaner using scraper.
///
/// Produces the visible text of a page, one block element per line, with
/// runs of whitespace collapsed. Line breaks matter: literal-rule context
/// windows never span them.
#[derive(Debug, Default, Clone)]
pub struct HtmlTextCleaner;

impl HtmlTextCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl Cleaner for HtmlTextCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        let document = Html::parse_document(html);
        let mut raw = String::with_capacity(html.len() / 2);
        collect_text(document.root_element(), &mut raw);

        let lines: Vec<String> = raw
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect();
        Ok(lines.join("\n"))
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source line breaks are not rendered; only block elements break lines.
            Node::Text(text) => out.extend(text.chars().map(|c| match c {
                '\n' | '\r' => ' ',
                other => other,
            })),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
