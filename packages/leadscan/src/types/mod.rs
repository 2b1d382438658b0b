//! Core data types.

pub mod config;
pub mod lead;
pub mod session;

pub use config::ScraperConfig;
pub use lead::{AdmissionOutcome, Lead, LeadBook, PageCredit, ScanStats};
pub use session::ScanSession;
