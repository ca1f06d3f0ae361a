//! Crawl frontier: the pending-work queue and the visited set
//!
//! Deduplication happens at dequeue time. `enqueue_many` only filters URLs
//! that were already visited; a URL may sit in the queue several times before
//! its first visit, and the later copies are dropped when `mark_visited`
//! reports them as already seen.

use crate::url::PageUrl;
use crate::GleanError;
use std::collections::{HashSet, VecDeque};

/// Queue of URLs to visit plus the set of URLs already attempted
///
/// The frontier is owned by one crawl run; it is created when the run starts
/// and dropped when it ends.
#[derive(Debug, Default)]
pub struct Frontier {
    /// FIFO of discovered but not yet attempted URLs
    queue: VecDeque<PageUrl>,

    /// Every URL that was dequeued and attempted, successful or not
    visited: HashSet<PageUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the seed URLs in the given order
    pub fn seed<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = PageUrl>,
    {
        self.queue.extend(urls);
    }

    /// Returns whether any URL is waiting in the queue
    pub fn has_work(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pops the earliest-inserted URL
    ///
    /// # Returns
    ///
    /// * `Ok(PageUrl)` - The next URL in breadth-first order
    /// * `Err(GleanError::EmptyFrontier)` - The queue is empty
    pub fn dequeue(&mut self) -> Result<PageUrl, GleanError> {
        self.queue.pop_front().ok_or(GleanError::EmptyFrontier)
    }

    /// Drops already-visited URLs from the front of the queue
    ///
    /// Afterwards `has_work` tells whether an unvisited URL is actually
    /// waiting. Returns the number of entries dropped.
    pub fn skip_visited(&mut self) -> usize {
        let mut skipped = 0;
        while let Some(front) = self.queue.front() {
            if !self.visited.contains(front) {
                break;
            }
            self.queue.pop_front();
            skipped += 1;
        }
        skipped
    }

    /// Adds `url` to the visited set
    ///
    /// Idempotent. Returns `true` if the URL was not visited before, which
    /// makes this the test-and-set that guarantees each URL is processed at
    /// most once.
    pub fn mark_visited(&mut self, url: PageUrl) -> bool {
        self.visited.insert(url)
    }

    pub fn is_visited(&self, url: &PageUrl) -> bool {
        self.visited.contains(url)
    }

    /// Appends every not-yet-visited URL to the back of the queue
    ///
    /// URLs already waiting in the queue are appended again; the duplicate is
    /// skipped when it reaches the front. Returns the number appended.
    pub fn enqueue_many<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = PageUrl>,
    {
        let before = self.queue.len();
        for url in urls {
            if !self.visited.contains(&url) {
                self.queue.push_back(url);
            }
        }
        self.queue.len() - before
    }

    /// Number of queued entries, duplicates included
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
