//! Contact lead extraction and deduplication engine.
//!
//! The engine turns pages into persisted contact leads in three
//! stages:
//!
//! 1. **Scheduling** ([`scheduler`]): page-ready and DOM-mutation
//!    events are debounced into scan invocations, at most one scan in
//!    flight per page context.
//! 2. **Extraction** ([`extract`]): five passes over a page snapshot
//!    produce deduplicated candidate leads, enriched with inferred
//!    name, phone and company.
//! 3. **Admission** ([`admission`]): candidates are validated,
//!    deduplicated by email across every page ever scanned, stamped
//!    and appended to the persisted collection, with page-scanned
//!    counters maintained alongside.
//!
//! Persistence ([`traits::store::KeyValueStore`]), page access
//! ([`traits::page::PageSource`]) and outbound notification
//! ([`events::Notifier`]) are trait seams, so the engine runs the same
//! against the in-memory store used in tests as against a real
//! embedding.
//!
//! ```no_run
//! use std::sync::Arc;
//! use url::Url;
//!
//! use leadscan::admission::AdmissionGate;
//! use leadscan::events::BroadcastNotifier;
//! use leadscan::pipeline::LeadPipeline;
//! use leadscan::scheduler::spawn_scheduler;
//! use leadscan::stores::MemoryStore;
//! use leadscan::testing::MockPageSource;
//! use leadscan::types::ScraperConfig;
//!
//! # async fn wire() {
//! let url = Url::parse("https://example.com/contact").unwrap();
//! let page = MockPageSource::new(url.clone(), "<p>sales@example.com</p>");
//!
//! let notifier = BroadcastNotifier::new(16);
//! let gate = Arc::new(AdmissionGate::new(MemoryStore::new(), notifier.clone()));
//! let pipeline = Arc::new(LeadPipeline::new(page, gate, url));
//!
//! let scheduler = spawn_scheduler(ScraperConfig::default(), pipeline);
//! scheduler.page_ready().await;
//! # }
//! ```

pub mod admission;
pub mod error;
pub mod events;
pub mod export;
pub mod extract;
pub mod pipeline;
pub mod scheduler;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use admission::AdmissionGate;
pub use error::{Result, ScrapeError};
pub use events::{BroadcastNotifier, NoopNotifier, Notifier, ScraperEvent};
pub use extract::{extract_candidates, PageSnapshot};
pub use pipeline::{LeadPipeline, ScanOutcome, ScanPipeline, ScanReport};
pub use scheduler::{PageEvent, ScanScheduler, SchedulerHandle, spawn_scheduler};
pub use stores::MemoryStore;
pub use traits::{KeyValueStore, LeadSink, PageSource};
pub use types::{AdmissionOutcome, Lead, LeadBook, PageCredit, ScanSession, ScanStats, ScraperConfig};
