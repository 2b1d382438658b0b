//! Forwarding seam between the extraction context and the admission gate.
//!
//! In a deployed scraper the two sides live in different execution
//! contexts joined by a fire-and-forget message transport; this trait
//! is the narrow request/response surface the pipeline sees.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::types::{AdmissionOutcome, Lead, PageCredit};

#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Submit one candidate lead for admission.
    async fn submit_lead(&self, lead: Lead) -> Result<AdmissionOutcome>;

    /// Request a page-scanned credit after a productive scan of `url`.
    async fn credit_page_scan(&self, url: &Url) -> Result<PageCredit>;
}

#[async_trait]
impl<T: LeadSink + ?Sized> LeadSink for Arc<T> {
    async fn submit_lead(&self, lead: Lead) -> Result<AdmissionOutcome> {
        (**self).submit_lead(lead).await
    }

    async fn credit_page_scan(&self, url: &Url) -> Result<PageCredit> {
        (**self).credit_page_scan(url).await
    }
}
