//! Timing configuration for the scan scheduler.

use std::time::Duration;

/// Delays used by the scan scheduler.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Settle delay between page-ready and the initial scan.
    pub initial_scan_delay: Duration,

    /// Quiet period required after DOM mutations before a rescan;
    /// bursts of mutations inside this window coalesce into one scan.
    pub mutation_debounce: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            initial_scan_delay: Duration::from_millis(2000),
            mutation_debounce: Duration::from_millis(1000),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_scan_delay(mut self, delay: Duration) -> Self {
        self.initial_scan_delay = delay;
        self
    }

    pub fn with_mutation_debounce(mut self, debounce: Duration) -> Self {
        self.mutation_debounce = debounce;
        self
    }
}
