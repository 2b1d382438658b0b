//! Test doubles for the seams of the scan pipeline.
//!
//! Shared between unit tests and integration tests; also useful to
//! downstream crates wiring the pipeline into their own harnesses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::events::{Notifier, ScraperEvent};
use crate::extract::PageSnapshot;
use crate::pipeline::{ScanOutcome, ScanPipeline, ScanReport};
use crate::traits::page::PageSource;
use crate::traits::sink::LeadSink;
use crate::types::{AdmissionOutcome, Lead, PageCredit};

/// A page whose URL and markup can be swapped between scans.
#[derive(Debug, Clone)]
pub struct MockPageSource {
    inner: Arc<Mutex<(Url, String)>>,
}

impl MockPageSource {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new((url, html.into()))),
        }
    }

    /// Simulate a DOM mutation.
    pub fn set_html(&self, html: impl Into<String>) {
        self.inner.lock().unwrap().1 = html.into();
    }

    /// Simulate an in-place navigation.
    pub fn set_url(&self, url: Url) {
        self.inner.lock().unwrap().0 = url;
    }
}

impl PageSource for MockPageSource {
    fn snapshot(&self) -> Result<PageSnapshot> {
        let inner = self.inner.lock().unwrap();
        Ok(PageSnapshot::new(inner.0.clone(), inner.1.clone()))
    }
}

/// Counts scans without doing any work.
#[derive(Debug, Default)]
pub struct CountingPipeline {
    scans: AtomicUsize,
}

impl CountingPipeline {
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanPipeline for CountingPipeline {
    async fn run_scan(&self) -> Result<ScanOutcome> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(ScanOutcome::Completed(ScanReport::default()))
    }

    async fn note_url_changed(&self, _url: Url) {}
}

/// Records every event it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<ScraperEvent>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ScraperEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: ScraperEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A sink whose first N submissions fail with a transport error, then
/// admits everything. Exercises the retry-on-rescan path.
#[derive(Debug)]
pub struct FlakySink {
    failures_left: AtomicUsize,
    admitted: Mutex<Vec<String>>,
}

impl FlakySink {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            admitted: Mutex::new(Vec::new()),
        }
    }

    pub fn admitted(&self) -> Vec<String> {
        self.admitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadSink for FlakySink {
    async fn submit_lead(&self, lead: Lead) -> Result<AdmissionOutcome> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ScrapeError::Transport("simulated outage".to_string()));
        }

        let mut admitted = self.admitted.lock().unwrap();
        if admitted.contains(&lead.email) {
            return Ok(AdmissionOutcome::Duplicate);
        }
        admitted.push(lead.email);
        Ok(AdmissionOutcome::Admitted {
            total_leads: admitted.len(),
        })
    }

    async fn credit_page_scan(&self, _url: &Url) -> Result<PageCredit> {
        Ok(PageCredit::Counted { pages_scanned: 1 })
    }
}

/// A store that fails every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl crate::traits::store::KeyValueStore for FailingStore {
    async fn get(
        &self,
        _keys: &[&str],
    ) -> Result<std::collections::HashMap<String, serde_json::Value>> {
        Err(ScrapeError::storage(std::io::Error::new(
            std::io::ErrorKind::Other,
            "store unavailable",
        )))
    }

    async fn set(
        &self,
        _entries: std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        Err(ScrapeError::storage(std::io::Error::new(
            std::io::ErrorKind::Other,
            "store unavailable",
        )))
    }
}
