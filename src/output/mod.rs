//! Output module for the harvested corpus
//!
//! This module handles:
//! - The page record shape (`{url, text}`)
//! - Accumulating records and writing the JSON corpus
//! - Recording crawl statistics

mod corpus;
pub mod stats;

pub use corpus::{load_corpus, CorpusSink, PageRecord};
pub use stats::{print_statistics, CrawlStatistics};
