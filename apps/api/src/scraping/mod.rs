// Job scraping: parameter normalisation and record cleanup around an external scraper.

pub mod client;
pub mod handlers;
pub mod service;

pub use client::HttpJobScraper;
pub use service::{JobPosting, ScrapingService};
