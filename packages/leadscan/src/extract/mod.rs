//! Candidate extraction: page snapshots in, candidate leads out.

pub mod email;
pub mod extractor;
pub mod page;

pub use email::{clean_and_validate_email, find_phone_number, name_from_email};
pub use extractor::{extract_candidates, visible_text};
pub use page::PageSnapshot;
