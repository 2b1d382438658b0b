//! Lead records and the insertion-ordered lead collection.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A contact lead extracted from a page.
///
/// `email` is the canonical lowercase address and the natural key of
/// the persisted collection. `date` is assigned at admission time,
/// never at extraction time. `address`, `position` and `linkedin` are
/// carried for the persisted record and export shape but are not
/// populated by extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub email: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Hostname of the page the lead was found on
    pub website: String,

    #[serde(default)]
    pub company: Option<String>,

    /// Full URL of the page the lead was found on
    pub source: String,

    /// Admission timestamp, absent on candidates
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub linkedin: Option<String>,
}

impl Lead {
    /// Create a candidate lead with only the unconditional fields set.
    pub fn new(
        email: impl Into<String>,
        website: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: None,
            phone: None,
            website: website.into(),
            company: None,
            source: source.into(),
            date: None,
            address: None,
            position: None,
            linkedin: None,
        }
    }

    /// Set the inferred person name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the inferred company name.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Coarse validity guard applied on top of the strict pattern check:
    /// the email must contain `@` and `.` and be longer than 5 characters.
    pub fn is_valid(&self) -> bool {
        self.email.contains('@') && self.email.contains('.') && self.email.len() > 5
    }
}

/// The admitted lead collection: keyed by normalized email, insertion
/// order preserved.
///
/// Serializes to and from a plain JSON array so the persisted `leads`
/// key stays an ordered sequence readable by display and export
/// collaborators. Admission is append-only; leads are never mutated or
/// removed individually, only cleared wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Lead>", into = "Vec<Lead>")]
pub struct LeadBook {
    leads: IndexMap<String, Lead>,
}

impl LeadBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a lead with this email has already been admitted.
    pub fn contains_email(&self, email: &str) -> bool {
        self.leads.contains_key(email)
    }

    /// Append a lead, keyed by its email.
    ///
    /// Returns false (leaving the book unchanged) if the email is
    /// already present.
    pub fn insert(&mut self, lead: Lead) -> bool {
        if self.leads.contains_key(&lead.email) {
            return false;
        }
        self.leads.insert(lead.email.clone(), lead);
        true
    }

    /// Look up an admitted lead by email.
    pub fn get(&self, email: &str) -> Option<&Lead> {
        self.leads.get(email)
    }

    /// Number of admitted leads.
    pub fn len(&self) -> usize {
        self.leads.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// Iterate leads in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &Lead> {
        self.leads.values()
    }
}

impl From<Vec<Lead>> for LeadBook {
    fn from(leads: Vec<Lead>) -> Self {
        let mut book = LeadBook::new();
        for lead in leads {
            book.insert(lead);
        }
        book
    }
}

impl From<LeadBook> for Vec<Lead> {
    fn from(book: LeadBook) -> Self {
        book.leads.into_values().collect()
    }
}

/// Result of submitting one candidate to the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdmissionOutcome {
    /// Appended to the persisted collection
    Admitted { total_leads: usize },
    /// An admitted lead with the same email already exists
    Duplicate,
    /// Failed the final validity re-check
    Invalid,
}

/// Result of requesting a page-scanned credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageCredit {
    /// First productive scan of this URL ever
    Counted { pages_scanned: u64 },
    /// The URL was already credited on an earlier scan
    AlreadyCounted,
}

/// Aggregate counters broadcast to listening display surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub leads_count: usize,
    pub pages_scanned: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_preserves_insertion_order() {
        let mut book = LeadBook::new();
        book.insert(Lead::new("b@example.com", "example.com", "https://example.com/"));
        book.insert(Lead::new("a@example.com", "example.com", "https://example.com/"));
        book.insert(Lead::new("c@example.com", "example.com", "https://example.com/"));

        let emails: Vec<_> = book.iter().map(|l| l.email.as_str()).collect();
        assert_eq!(emails, ["b@example.com", "a@example.com", "c@example.com"]);
    }

    #[test]
    fn test_book_rejects_duplicate_email() {
        let mut book = LeadBook::new();
        let first = Lead::new("a@example.com", "example.com", "https://example.com/one");
        let second = Lead::new("a@example.com", "other.com", "https://other.com/two");

        assert!(book.insert(first));
        assert!(!book.insert(second));
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("a@example.com").unwrap().website, "example.com");
    }

    #[test]
    fn test_book_serializes_as_array() {
        let mut book = LeadBook::new();
        book.insert(Lead::new("a@example.com", "example.com", "https://example.com/"));
        book.insert(Lead::new("b@example.com", "example.com", "https://example.com/"));

        let json = serde_json::to_value(&book).unwrap();
        let array = json.as_array().expect("leads serialize as a JSON array");
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["email"], "a@example.com");

        let roundtrip: LeadBook = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip.len(), 2);
        assert!(roundtrip.contains_email("b@example.com"));
    }

    #[test]
    fn test_lead_validity_guard() {
        assert!(Lead::new("ab@c.de", "c.de", "https://c.de/").is_valid());
        assert!(!Lead::new("a@b.c", "b.c", "https://b.c/").is_valid()); // too short
        assert!(!Lead::new("nodomain", "b.c", "https://b.c/").is_valid());
    }
}
