//! CSV export of the admitted lead collection.

use chrono::SecondsFormat;

use crate::types::{Lead, LeadBook};

const HEADERS: [&str; 10] = [
    "Name", "Email", "Phone", "Address", "Website", "Company", "Position", "LinkedIn", "Source",
    "Date",
];

/// Render leads as CSV in admission order, one row per lead.
///
/// Every field is quoted, with embedded quotes doubled, so commas and
/// newlines inside values never break the row structure.
pub fn leads_to_csv<'a>(leads: impl IntoIterator<Item = &'a Lead>) -> String {
    let mut out = String::new();
    write_row(&mut out, HEADERS.iter().map(|h| h.to_string()));

    for lead in leads {
        write_row(
            &mut out,
            [
                lead.name.clone().unwrap_or_default(),
                lead.email.clone(),
                lead.phone.clone().unwrap_or_default(),
                lead.address.clone().unwrap_or_default(),
                lead.website.clone(),
                lead.company.clone().unwrap_or_default(),
                lead.position.clone().unwrap_or_default(),
                lead.linkedin.clone().unwrap_or_default(),
                lead.source.clone(),
                lead.date
                    .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
            ],
        );
    }

    out
}

/// Render a whole book as CSV.
pub fn book_to_csv(book: &LeadBook) -> String {
    leads_to_csv(book.iter())
}

fn write_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_header_row_always_present() {
        let csv = leads_to_csv(Vec::<&Lead>::new());
        assert_eq!(
            csv,
            "\"Name\",\"Email\",\"Phone\",\"Address\",\"Website\",\"Company\",\"Position\",\"LinkedIn\",\"Source\",\"Date\"\n"
        );
    }

    #[test]
    fn test_lead_row_quotes_and_blanks() {
        let mut lead = Lead::new("a@example.com", "example.com", "https://example.com/")
            .with_name("Jane \"JJ\" Doe")
            .with_company("Acme, Inc.");
        lead.date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

        let csv = leads_to_csv([&lead]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"Jane \"\"JJ\"\" Doe\",\"a@example.com\",\"\",\"\",\"example.com\",\"Acme, Inc.\",\"\",\"\",\"https://example.com/\",\"2024-03-01T12:00:00Z\""
        );
    }

    #[test]
    fn test_book_export_preserves_admission_order() {
        let mut book = LeadBook::new();
        book.insert(Lead::new("b@example.com", "example.com", "https://example.com/"));
        book.insert(Lead::new("a@example.com", "example.com", "https://example.com/"));

        let csv = book_to_csv(&book);
        let rows: Vec<_> = csv.lines().skip(1).collect();
        assert!(rows[0].contains("b@example.com"));
        assert!(rows[1].contains("a@example.com"));
    }
}
