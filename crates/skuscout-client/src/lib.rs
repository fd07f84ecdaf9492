pub mod cleaner;
pub mod fetcher;
pub mod search;

pub use cleaner::HtmlTextCleaner;
pub use fetcher::ReqwestFetcher;
pub use search::DuckDuckGoSearch;
