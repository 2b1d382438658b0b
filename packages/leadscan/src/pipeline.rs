//! The per-page scan pipeline: snapshot, extract, submit, credit.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

use crate::error::Result;
use crate::extract::{extract_candidates, PageSnapshot};
use crate::traits::page::PageSource;
use crate::traits::sink::LeadSink;
use crate::types::{AdmissionOutcome, PageCredit, ScanSession};

/// What one scheduled scan did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanReport),
    /// Another scan of the same page context was already in flight.
    AlreadyScanning,
}

/// Counters for one completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Candidates the extractor produced.
    pub candidates: usize,
    /// Candidates actually forwarded (not already processed this page).
    pub submitted: usize,
    pub admitted: usize,
    pub duplicates: usize,
    /// Whether this scan earned the URL its page-scanned credit.
    pub page_credited: bool,
}

/// The scan entry points the scheduler drives.
#[async_trait]
pub trait ScanPipeline: Send + Sync {
    /// Run one full scan of the current page.
    async fn run_scan(&self) -> Result<ScanOutcome>;

    /// The page navigated without unloading; reset per-page memory.
    async fn note_url_changed(&self, url: Url);
}

#[async_trait]
impl<T: ScanPipeline + ?Sized> ScanPipeline for Arc<T> {
    async fn run_scan(&self) -> Result<ScanOutcome> {
        (**self).run_scan().await
    }

    async fn note_url_changed(&self, url: Url) {
        (**self).note_url_changed(url).await;
    }
}

/// Extracts candidates from a page source and forwards them to a sink,
/// one page context per pipeline.
///
/// Candidates are submitted strictly sequentially in discovery order.
/// A failed submission is logged and skipped; the email stays
/// unprocessed so the next rescan retries it. The page-scanned credit
/// is requested only when the scan admitted at least one new lead.
pub struct LeadPipeline<P, K> {
    source: P,
    sink: K,
    session: Mutex<ScanSession>,
}

impl<P: PageSource, K: LeadSink> LeadPipeline<P, K> {
    pub fn new(source: P, sink: K, initial_url: Url) -> Self {
        Self {
            source,
            sink,
            session: Mutex::new(ScanSession::new(initial_url)),
        }
    }

    async fn scan_snapshot(&self, snapshot: &PageSnapshot) -> Result<ScanReport> {
        let candidates = extract_candidates(snapshot);

        let mut report = ScanReport {
            candidates: candidates.len(),
            ..ScanReport::default()
        };

        let fresh: Vec<_> = {
            let session = self.session.lock().await;
            candidates
                .into_iter()
                .filter(|lead| !session.is_processed(&lead.email))
                .collect()
        };

        for lead in fresh {
            let email = lead.email.clone();
            report.submitted += 1;

            match self.sink.submit_lead(lead).await {
                Ok(AdmissionOutcome::Admitted { total_leads }) => {
                    report.admitted += 1;
                    self.session.lock().await.mark_processed(email);
                    tracing::debug!(total_leads, "candidate admitted");
                }
                Ok(AdmissionOutcome::Duplicate) => report.duplicates += 1,
                Ok(AdmissionOutcome::Invalid) => {}
                // Leave the email unprocessed so a rescan retries it
                Err(error) => {
                    tracing::warn!(%error, "lead submission failed");
                }
            }
        }

        if report.admitted > 0 {
            match self.sink.credit_page_scan(snapshot.url()).await {
                Ok(PageCredit::Counted { pages_scanned }) => {
                    report.page_credited = true;
                    tracing::debug!(pages_scanned, "page credited");
                }
                Ok(PageCredit::AlreadyCounted) => {}
                Err(error) => {
                    tracing::warn!(%error, "page credit failed");
                }
            }
        }

        tracing::info!(
            url = %snapshot.url(),
            candidates = report.candidates,
            admitted = report.admitted,
            duplicates = report.duplicates,
            "scan complete"
        );

        Ok(report)
    }
}

#[async_trait]
impl<P: PageSource, K: LeadSink> ScanPipeline for LeadPipeline<P, K> {
    async fn run_scan(&self) -> Result<ScanOutcome> {
        let snapshot = self.source.snapshot()?;

        {
            let mut session = self.session.lock().await;
            session.observe_url(snapshot.url());
            if !session.begin_scan() {
                return Ok(ScanOutcome::AlreadyScanning);
            }
        }

        let result = self.scan_snapshot(&snapshot).await;
        self.session.lock().await.finish_scan();

        result.map(ScanOutcome::Completed)
    }

    async fn note_url_changed(&self, url: Url) {
        self.session.lock().await.observe_url(&url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::AdmissionGate;
    use crate::events::NoopNotifier;
    use crate::stores::MemoryStore;
    use crate::testing::MockPageSource;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn pipeline(
        source: MockPageSource,
    ) -> LeadPipeline<MockPageSource, AdmissionGate<MemoryStore, NoopNotifier>> {
        let initial = source.snapshot().unwrap().url().clone();
        let gate = AdmissionGate::new(MemoryStore::new(), NoopNotifier);
        LeadPipeline::new(source, gate, initial)
    }

    #[tokio::test]
    async fn test_scan_admits_and_credits() {
        let source = MockPageSource::new(
            url("https://example.com/contact"),
            "<html><body><p>a@example.com b@example.com</p></body></html>",
        );
        let pipeline = pipeline(source);

        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.candidates, 2);
        assert_eq!(report.admitted, 2);
        assert!(report.page_credited);
    }

    #[tokio::test]
    async fn test_rescan_skips_processed_emails_and_earns_no_second_credit() {
        let source = MockPageSource::new(
            url("https://example.com/"),
            "<html><body><p>a@example.com</p></body></html>",
        );
        let pipeline = pipeline(source);

        pipeline.run_scan().await.unwrap();

        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.candidates, 1);
        assert_eq!(report.submitted, 0);
        assert_eq!(report.admitted, 0);
        assert!(!report.page_credited);
    }

    #[tokio::test]
    async fn test_mutation_adding_email_admits_only_the_new_one() {
        let source = MockPageSource::new(
            url("https://example.com/"),
            "<html><body><p>a@example.com</p></body></html>",
        );
        let handle = source.clone();
        let pipeline = pipeline(source);

        pipeline.run_scan().await.unwrap();

        handle.set_html("<html><body><p>a@example.com b@example.com</p></body></html>");
        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.submitted, 1);
        assert_eq!(report.admitted, 1);
    }

    #[tokio::test]
    async fn test_navigation_resets_page_memory_but_admission_still_dedups() {
        let source = MockPageSource::new(
            url("https://example.com/a"),
            "<html><body><p>a@example.com</p></body></html>",
        );
        let handle = source.clone();
        let pipeline = pipeline(source);

        pipeline.run_scan().await.unwrap();

        // Same address on a new URL: resubmitted, but the gate dedups
        handle.set_url(url("https://example.com/b"));
        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.submitted, 1);
        assert_eq!(report.admitted, 0);
        assert_eq!(report.duplicates, 1);
        assert!(!report.page_credited);
    }

    #[tokio::test]
    async fn test_zero_admissions_earns_no_credit() {
        let source = MockPageSource::new(
            url("https://example.com/"),
            "<html><body><p>no contacts here</p></body></html>",
        );
        let pipeline = pipeline(source);

        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.candidates, 0);
        assert!(!report.page_credited);
    }

    #[tokio::test]
    async fn test_failed_submission_is_retried_on_rescan() {
        use crate::testing::FlakySink;

        let source = MockPageSource::new(
            url("https://example.com/"),
            "<html><body><p>a@example.com</p></body></html>",
        );
        let initial = source.snapshot().unwrap().url().clone();
        let sink = Arc::new(FlakySink::failing_first(1));
        let pipeline = LeadPipeline::new(source, sink.clone(), initial);

        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.admitted, 0);

        // The email was never marked processed, so the rescan retries
        let ScanOutcome::Completed(report) = pipeline.run_scan().await.unwrap() else {
            panic!("expected a completed scan");
        };
        assert_eq!(report.submitted, 1);
        assert_eq!(report.admitted, 1);
    }
}
