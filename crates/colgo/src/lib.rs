mod config;
pub mod engine;
mod omp;
pub mod parser;
pub mod registry;
pub mod scraper;
pub mod sites;
pub mod types;
pub mod utils;
mod video;

pub use config::ConfigError;
pub use engine::{CrawlSettings, Spider};
pub use scraper::{Crawler, Fetch, ScraperError, WebScraper};
