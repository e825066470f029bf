pub mod http_fetcher;
pub mod page_session;

pub use http_fetcher::{HttpFetcher, ListingFetcher};
pub use page_session::{PageSession, SessionLauncher};
