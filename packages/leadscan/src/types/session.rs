//! Per-page-context scan session state.

use std::collections::HashSet;

use url::Url;
use uuid::Uuid;

/// Transient, in-memory state for one page context.
///
/// Owns the per-page processed-email memory and the in-flight guard
/// that were ambient globals in earlier designs. Created when scanning
/// starts on a page and destroyed when the page unloads or scraping is
/// disabled; the processed-email memory is cleared whenever the
/// observed URL changes.
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: Uuid,
    page_url: Url,
    processed_emails: HashSet<String>,
    is_processing: bool,
}

impl ScanSession {
    /// Start a session for a page context.
    pub fn new(page_url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_url,
            processed_emails: HashSet::new(),
            is_processing: false,
        }
    }

    /// Session id, for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The URL this session last observed.
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Record the currently observed URL, clearing the per-page
    /// processed-email memory if it changed.
    pub fn observe_url(&mut self, url: &Url) {
        if self.page_url != *url {
            tracing::debug!(
                session = %self.id,
                old_url = %self.page_url,
                new_url = %url,
                "page url changed, resetting processed emails"
            );
            self.processed_emails.clear();
            self.page_url = url.clone();
        }
    }

    /// Whether this email was already forwarded and admitted from this page.
    pub fn is_processed(&self, email: &str) -> bool {
        self.processed_emails.contains(email)
    }

    /// Remember an email as successfully forwarded from this page.
    pub fn mark_processed(&mut self, email: impl Into<String>) {
        self.processed_emails.insert(email.into());
    }

    /// Number of emails forwarded from the current page.
    pub fn processed_count(&self) -> usize {
        self.processed_emails.len()
    }

    /// Claim the in-flight scan slot.
    ///
    /// Returns false if a scan is already running; at most one
    /// extraction+admission pipeline may be active per page context.
    pub fn begin_scan(&mut self) -> bool {
        if self.is_processing {
            return false;
        }
        self.is_processing = true;
        true
    }

    /// Release the in-flight scan slot.
    pub fn finish_scan(&mut self) {
        self.is_processing = false;
    }

    /// Whether a scan is currently in flight.
    pub fn is_processing(&self) -> bool {
        self.is_processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_url_change_clears_processed_memory() {
        let mut session = ScanSession::new(url("https://example.com/a"));
        session.mark_processed("a@example.com");
        assert!(session.is_processed("a@example.com"));

        // Same URL: memory kept
        session.observe_url(&url("https://example.com/a"));
        assert!(session.is_processed("a@example.com"));

        // Different URL: memory cleared
        session.observe_url(&url("https://example.com/b"));
        assert!(!session.is_processed("a@example.com"));
        assert_eq!(session.page_url().as_str(), "https://example.com/b");
    }

    #[test]
    fn test_scan_slot_is_exclusive() {
        let mut session = ScanSession::new(url("https://example.com/"));
        assert!(session.begin_scan());
        assert!(!session.begin_scan());
        session.finish_scan();
        assert!(session.begin_scan());
    }
}
