//! Five-pass candidate extraction over a page snapshot.
//!
//! Every pass feeds the same insertion-ordered email set, so
//! within-page deduplication falls out of the data structure. A pass
//! finding nothing (or failing to build its selector) never affects
//! its siblings.

use indexmap::IndexSet;
use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::{Html, Node, Selector};

use crate::extract::email::{find_phone_number, name_from_email, scan_emails};
use crate::extract::page::PageSnapshot;
use crate::types::Lead;

/// Attributes inspected during the structural traversal.
const ATTRIBUTE_ALLOWLIST: [&str; 6] = ["href", "data-email", "title", "alt", "value", "placeholder"];

/// Elements whose subtrees never contribute rendered text.
const NON_RENDERED_TAGS: [&str; 5] = ["head", "script", "style", "noscript", "template"];

/// Produce the deduplicated candidate leads for one page snapshot.
///
/// Pure function of the snapshot: no side effects, no I/O. Candidate
/// order follows first discovery order, which downstream admission
/// preserves.
pub fn extract_candidates(page: &PageSnapshot) -> Vec<Lead> {
    let document = Html::parse_document(page.html());
    let mut emails: IndexSet<String> = IndexSet::new();

    let text = visible_text(&document);

    // Pass 1: rendered text
    scan_emails(&text, &mut emails);

    // Pass 2: raw markup, catching comments and obfuscated attributes
    scan_emails(page.html(), &mut emails);

    // Pass 3: structural traversal with attribute inspection
    scan_structure(&document, &mut emails);

    // Pass 4: anchors (mailto hrefs and link text)
    scan_anchors(&document, &mut emails);

    // Pass 5: form fields (values and placeholders)
    scan_inputs(&document, &mut emails);

    tracing::debug!(
        url = %page.url(),
        candidates = emails.len(),
        "candidate emails collected"
    );

    let phone = find_phone_number(&text);
    let company = find_company_name(&document, page);
    let hostname = page.hostname();

    emails
        .into_iter()
        .map(|email| {
            let mut lead = Lead::new(email, hostname.clone(), page.url().as_str());
            lead.name = name_from_email(&lead.email);
            lead.phone = phone.clone();
            lead.company = company.clone();
            lead
        })
        .filter(Lead::is_valid)
        .collect()
}

/// Rendered text of the document: concatenated text nodes, skipping
/// non-rendered tags and inline-hidden subtrees, with a space after
/// each element so block boundaries never glue words together.
pub fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    collect_text(document.tree.root(), &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            if NON_RENDERED_TAGS.contains(&element.name()) || is_hidden(element) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
            out.push(' ');
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Inline stand-in for "computed style hidden": a `hidden` attribute
/// or an inline style containing `display:none` / `visibility:hidden`.
fn is_hidden(element: &Element) -> bool {
    if element.attr("hidden").is_some() {
        return true;
    }
    match element.attr("style") {
        Some(style) => {
            let compact: String = style
                .to_lowercase()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            compact.contains("display:none") || compact.contains("visibility:hidden")
        }
        None => false,
    }
}

/// Depth-first walk inspecting text nodes and the attribute allowlist,
/// skipping hidden subtrees entirely.
fn scan_structure(document: &Html, emails: &mut IndexSet<String>) {
    walk(document.tree.root(), emails);
}

fn walk(node: NodeRef<'_, Node>, emails: &mut IndexSet<String>) {
    match node.value() {
        Node::Text(text) => scan_emails(text, emails),
        Node::Element(element) => {
            if is_hidden(element) {
                return;
            }
            for attr in ATTRIBUTE_ALLOWLIST {
                if let Some(value) = element.attr(attr) {
                    scan_emails(value, emails);
                }
            }
            for child in node.children() {
                walk(child, emails);
            }
        }
        _ => {
            for child in node.children() {
                walk(child, emails);
            }
        }
    }
}

fn scan_anchors(document: &Html, emails: &mut IndexSet<String>) {
    let Ok(selector) = Selector::parse("a") else {
        return;
    };
    for anchor in document.select(&selector) {
        if let Some(href) = anchor.value().attr("href") {
            if href.trim_start().to_ascii_lowercase().starts_with("mailto:") {
                if let Some(email) = crate::extract::email::clean_and_validate_email(href) {
                    emails.insert(email);
                }
            }
        }

        let anchor_text: String = anchor.text().collect();
        scan_emails(&anchor_text, emails);
    }
}

fn scan_inputs(document: &Html, emails: &mut IndexSet<String>) {
    let Ok(selector) = Selector::parse("input") else {
        return;
    };
    for input in document.select(&selector) {
        for attr in ["value", "placeholder"] {
            if let Some(value) = input.value().attr(attr) {
                scan_emails(value, emails);
            }
        }
    }
}

/// Best-effort company name: meta tags in priority order, then
/// organization-typed elements, then the registrable hostname label.
fn find_company_name(document: &Html, page: &PageSnapshot) -> Option<String> {
    const META_SELECTORS: [&str; 3] = [
        r#"meta[property="og:site_name"]"#,
        r#"meta[name="application-name"]"#,
        r#"meta[name="company"]"#,
    ];

    for raw in META_SELECTORS {
        if let Ok(selector) = Selector::parse(raw) {
            if let Some(meta) = document.select(&selector).next() {
                if let Some(content) = meta.value().attr("content") {
                    let content = content.trim();
                    if !content.is_empty() {
                        return Some(content.to_string());
                    }
                }
            }
        }
    }

    if let Ok(selector) =
        Selector::parse(r#".company-name, .organization, [itemprop="organization"]"#)
    {
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect();
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    let label = page.domain_label();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot::new(Url::parse(url).unwrap(), html)
    }

    fn emails_of(leads: &[Lead]) -> Vec<&str> {
        leads.iter().map(|l| l.email.as_str()).collect()
    }

    #[test]
    fn test_plain_text_extraction_with_name() {
        let leads = extract_candidates(&page(
            "https://example.com/contact",
            "<html><body><p>Contact: JOHN.SMITH@Example.COM</p></body></html>",
        ));

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].email, "john.smith@example.com");
        assert_eq!(leads[0].name.as_deref(), Some("John Smith"));
        assert_eq!(leads[0].website, "example.com");
        assert_eq!(leads[0].source, "https://example.com/contact");
    }

    #[test]
    fn test_query_string_contamination_rejected_entirely() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            "<html><body><p>support@domain.io?ref=123</p></body></html>",
        ));
        assert!(leads.is_empty());
    }

    #[test]
    fn test_mailto_anchor_without_context() {
        let leads = extract_candidates(&page(
            "https://co.com/",
            r#"<html><body><a href="mailto:info@co.com">Contact Us</a></body></html>"#,
        ));

        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].email, "info@co.com");
        assert_eq!(leads[0].name, None); // single-segment local part
    }

    #[test]
    fn test_markup_pass_reads_comments() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            "<html><body><!-- reach us: hidden.contact@example.com --><p>nothing visible</p></body></html>",
        ));
        assert_eq!(emails_of(&leads), ["hidden.contact@example.com"]);
    }

    #[test]
    fn test_structural_pass_reads_allowlisted_attributes() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            r#"<html><body><span data-email="direct@example.com" title="or tilde@example.com">text</span></body></html>"#,
        ));
        let emails = emails_of(&leads);
        assert!(emails.contains(&"direct@example.com"));
        assert!(emails.contains(&"tilde@example.com"));
    }

    #[test]
    fn test_hidden_subtrees_skipped_by_traversal_but_markup_still_sees_them() {
        // The structural pass skips display:none subtrees, but the raw
        // markup pass still finds the address, matching the union
        // semantics of the five passes.
        let leads = extract_candidates(&page(
            "https://example.com/",
            r#"<html><body><div style="display: none">ghost@example.com</div></body></html>"#,
        ));
        assert_eq!(emails_of(&leads), ["ghost@example.com"]);
    }

    #[test]
    fn test_input_value_and_placeholder() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            r#"<html><body>
                <input value="typed@example.com">
                <input placeholder="you@example.com">
            </body></html>"#,
        ));
        let emails = emails_of(&leads);
        assert!(emails.contains(&"typed@example.com"));
        assert!(emails.contains(&"you@example.com"));
    }

    #[test]
    fn test_within_page_deduplication_keeps_first_seen_order() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            r#"<html><body>
                <p>first@example.com then second@example.com</p>
                <a href="mailto:first@example.com">first again</a>
            </body></html>"#,
        ));
        assert_eq!(emails_of(&leads), ["first@example.com", "second@example.com"]);
    }

    #[test]
    fn test_phone_attached_to_every_lead() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            "<html><body><p>sales@example.com or (612) 555-0123</p></body></html>",
        ));
        assert_eq!(leads[0].phone.as_deref(), Some("6125550123"));
    }

    #[test]
    fn test_company_from_meta_beats_domain_fallback() {
        let leads = extract_candidates(&page(
            "https://www.acme.com/",
            r#"<html><head><meta property="og:site_name" content="Acme Widgets"></head>
               <body><p>sales@acme.com</p></body></html>"#,
        ));
        assert_eq!(leads[0].company.as_deref(), Some("Acme Widgets"));
    }

    #[test]
    fn test_company_falls_back_to_domain_label() {
        let leads = extract_candidates(&page(
            "https://www.acme.com/",
            "<html><body><p>sales@acme.com</p></body></html>",
        ));
        assert_eq!(leads[0].company.as_deref(), Some("acme"));
    }

    #[test]
    fn test_email_split_across_inline_markup() {
        let leads = extract_candidates(&page(
            "https://example.com/",
            "<html><body><p>join@<b>example.com</b></p></body></html>",
        ));
        // Inline children concatenate without an injected separator,
        // so the raw text pass still assembles the address. The markup
        // pass sees the tags and cannot.
        assert_eq!(emails_of(&leads), ["join@example.com"]);
    }
}
