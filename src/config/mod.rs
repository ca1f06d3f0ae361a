//! Configuration module for Sumi-Glean
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a file only needs the values it changes.
//!
//! # Example
//!
//! ```no_run
//! use sumi_glean::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("glean.toml")).unwrap();
//! println!("Crawling {}", config.site.root);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, RendererConfig, RendererEngine, SiteConfig,
    DEFAULT_CORPUS_PATH, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_SETTLE_TIME_MS,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_config,
};
pub use validation::validate;
