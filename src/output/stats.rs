//! Crawl statistics
//!
//! Counters maintained by the crawl engine while it drains the frontier and
//! printed once the run is over.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// URLs handed to the renderer
    pub pages_attempted: u64,

    /// URLs that produced a record
    pub pages_processed: u64,

    /// URLs whose render failed
    pub fetch_failures: u64,

    /// URLs rendered but not extractable
    pub extraction_failures: u64,

    /// Queue entries dropped because the URL was already visited
    pub duplicates_skipped: u64,

    /// URLs appended to the frontier by link discovery
    pub links_enqueued: u64,

    /// Whether the run stopped before the frontier was empty
    pub interrupted: bool,
}

impl CrawlStatistics {
    /// Starts a new set of counters stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_attempted: 0,
            pages_processed: 0,
            fetch_failures: 0,
            extraction_failures: 0,
            duplicates_skipped: 0,
            links_enqueued: 0,
            interrupted: false,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn pages_failed(&self) -> u64 {
        self.fetch_failures + self.extraction_failures
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Percentage of attempted pages that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted > 0 {
            (self.pages_processed as f64 / self.pages_attempted as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::start()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {:.1}s", seconds);
    }
    if stats.interrupted {
        println!("  Stopped early: partial corpus");
    }
    println!();

    println!("Pages:");
    println!("  Attempted: {}", stats.pages_attempted);
    println!("  Processed: {}", stats.pages_processed);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Extraction failures: {}", stats.extraction_failures);
    println!("  Duplicate queue entries skipped: {}", stats.duplicates_skipped);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.pages_processed,
        stats.pages_attempted
    );
}
