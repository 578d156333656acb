//! Adapters - implementations of the ports for concrete infrastructure.

pub mod ai;
pub mod scraper;
pub mod storage;

pub use scraper::HttpJobScraper;
