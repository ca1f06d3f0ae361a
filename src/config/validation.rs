use crate::config::types::{Config, CrawlerConfig, OutputConfig, RendererConfig, SiteConfig};
use crate::url::{PageUrl, SiteRoot};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site root and seeds
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site root is required (pass it on the command line or set [site] root)".to_string(),
        ));
    }

    SiteRoot::parse(&config.root)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site root '{}': {}", config.root, e)))?;

    for seed in &config.seeds {
        let seed_url = PageUrl::new(seed.as_str())
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        let parsed = seed_url
            .to_url()
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use HTTP or HTTPS",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages_open < 1 || config.max_concurrent_pages_open > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages_open must be between 1 and 100, got {}",
            config.max_concurrent_pages_open
        )));
    }

    if config.navigation_timeout < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout must be >= 1000ms, got {}ms",
            config.navigation_timeout
        )));
    }

    if config.settle_time > config.navigation_timeout {
        return Err(ConfigError::Validation(format!(
            "settle_time ({}ms) cannot exceed navigation_timeout ({}ms)",
            config.settle_time, config.navigation_timeout
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.chromium_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chromium_path cannot be empty when set".to_string(),
            ));
        }
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.corpus_path.is_empty() {
        return Err(ConfigError::Validation(
            "corpus_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
