//! Read-only access to the page being scanned.

use std::sync::Arc;

use crate::error::Result;
use crate::extract::PageSnapshot;

/// Supplies the current state of the page to the pipeline.
///
/// The page may mutate between scans, so the pipeline captures a fresh
/// snapshot at the start of every scan. Implementations never mutate
/// the page.
pub trait PageSource: Send + Sync {
    /// Capture the page's current URL and markup.
    fn snapshot(&self) -> Result<PageSnapshot>;
}

impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    fn snapshot(&self) -> Result<PageSnapshot> {
        (**self).snapshot()
    }
}
