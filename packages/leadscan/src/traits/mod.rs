//! Core trait abstractions: persistence, lead forwarding, page access.

pub mod page;
pub mod sink;
pub mod store;

pub use page::PageSource;
pub use sink::LeadSink;
pub use store::{keys, KeyValueStore};
