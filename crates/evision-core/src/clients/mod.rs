//! Client modules for external services

pub mod geckodriver;
pub mod http;
pub mod webdriver;

pub use geckodriver::Geckodriver;
pub use http::{looks_like_pdf, Fetcher, HttpFetcher};
pub use webdriver::FirefoxBrowser;
