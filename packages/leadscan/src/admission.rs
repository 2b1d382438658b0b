//! Cross-page lead admission and counter bookkeeping.
//!
//! The gate owns every write to the persisted keys. Reads and writes
//! go through a single async mutex so concurrent submissions from one
//! process serialize into clean read-modify-write cycles; the store
//! itself offers no compare-and-swap. A second process writing the
//! same store concurrently can still lose updates, which the plain
//! get/set storage contract cannot prevent.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use url::Url;

use crate::error::Result;
use crate::events::{Notifier, ScraperEvent};
use crate::traits::sink::LeadSink;
use crate::traits::store::{keys, KeyValueStore};
use crate::types::{AdmissionOutcome, Lead, LeadBook, PageCredit, ScanStats};

/// Admits candidate leads into the persisted collection.
///
/// Deduplication is by normalized email across all pages ever scanned.
/// First admission wins; later candidates with the same email never
/// overwrite an admitted lead, whatever page they came from.
pub struct AdmissionGate<S, N> {
    store: S,
    notifier: N,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore, N: Notifier> AdmissionGate<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            write_lock: Mutex::new(()),
        }
    }

    /// Whether scraping is currently enabled. Defaults to off until a
    /// collaborator explicitly turns it on.
    pub async fn is_enabled(&self) -> Result<bool> {
        Ok(self
            .store
            .get_value(keys::SCRAPING_ENABLED)
            .await?
            .unwrap_or(false))
    }

    /// Persist the enabled flag and announce the change.
    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.store.set_value(keys::SCRAPING_ENABLED, &enabled).await?;
        tracing::info!(enabled, "scraping toggled");

        let event = if enabled {
            ScraperEvent::ScrapingEnabled
        } else {
            ScraperEvent::ScrapingDisabled
        };
        self.notifier.notify(event).await;
        Ok(())
    }

    /// Current aggregate counters.
    pub async fn stats(&self) -> Result<ScanStats> {
        let book: LeadBook = self.store.get_value(keys::LEADS).await?.unwrap_or_default();
        let pages_scanned: u64 = self
            .store
            .get_value(keys::PAGES_SCANNED)
            .await?
            .unwrap_or(0);
        Ok(ScanStats {
            leads_count: book.len(),
            pages_scanned,
        })
    }

    /// Drop every admitted lead and reset both page counters.
    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = HashMap::new();
        entries.insert(keys::LEADS.to_string(), serde_json::to_value(LeadBook::new())?);
        entries.insert(keys::PAGES_SCANNED.to_string(), serde_json::to_value(0u64)?);
        entries.insert(
            keys::SCANNED_URLS.to_string(),
            serde_json::to_value(Vec::<String>::new())?,
        );
        self.store.set(entries).await?;
        tracing::info!("lead collection cleared");

        self.notifier
            .notify(ScraperEvent::StatsUpdated {
                stats: ScanStats {
                    leads_count: 0,
                    pages_scanned: 0,
                },
            })
            .await;
        Ok(())
    }

    async fn broadcast_stats(&self, leads_count: usize, pages_scanned: u64) {
        self.notifier
            .notify(ScraperEvent::StatsUpdated {
                stats: ScanStats {
                    leads_count,
                    pages_scanned,
                },
            })
            .await;
    }
}

#[async_trait]
impl<S: KeyValueStore, N: Notifier> LeadSink for AdmissionGate<S, N> {
    async fn submit_lead(&self, lead: Lead) -> Result<AdmissionOutcome> {
        // Final guard, re-applied here because candidates may arrive
        // from collaborators other than our own extractor.
        if !lead.is_valid() {
            tracing::warn!(email = %lead.email, "rejected invalid candidate");
            return Ok(AdmissionOutcome::Invalid);
        }

        let _guard = self.write_lock.lock().await;

        let mut book: LeadBook = self.store.get_value(keys::LEADS).await?.unwrap_or_default();
        if book.contains_email(&lead.email) {
            tracing::debug!(email = %lead.email, "duplicate candidate skipped");
            return Ok(AdmissionOutcome::Duplicate);
        }

        let mut admitted = lead;
        admitted.date = Some(Utc::now());

        tracing::info!(
            email = %admitted.email,
            source = %admitted.source,
            "lead admitted"
        );

        book.insert(admitted);
        let total_leads = book.len();
        self.store.set_value(keys::LEADS, &book).await?;

        let pages_scanned: u64 = self
            .store
            .get_value(keys::PAGES_SCANNED)
            .await?
            .unwrap_or(0);
        self.broadcast_stats(total_leads, pages_scanned).await;

        Ok(AdmissionOutcome::Admitted { total_leads })
    }

    async fn credit_page_scan(&self, url: &Url) -> Result<PageCredit> {
        let _guard = self.write_lock.lock().await;

        let mut scanned: Vec<String> = self
            .store
            .get_value(keys::SCANNED_URLS)
            .await?
            .unwrap_or_default();

        let url = url.as_str().to_string();
        if scanned.contains(&url) {
            return Ok(PageCredit::AlreadyCounted);
        }

        let pages_scanned: u64 = self
            .store
            .get_value(keys::PAGES_SCANNED)
            .await?
            .unwrap_or(0)
            + 1;
        scanned.push(url);

        let mut entries = HashMap::new();
        entries.insert(
            keys::PAGES_SCANNED.to_string(),
            serde_json::to_value(pages_scanned)?,
        );
        entries.insert(keys::SCANNED_URLS.to_string(), serde_json::to_value(&scanned)?);
        self.store.set(entries).await?;

        let book: LeadBook = self.store.get_value(keys::LEADS).await?.unwrap_or_default();
        self.broadcast_stats(book.len(), pages_scanned).await;

        Ok(PageCredit::Counted { pages_scanned })
    }
}
