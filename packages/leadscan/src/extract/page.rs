//! Point-in-time page captures.

use url::Url;

/// A snapshot of a page's URL and markup, taken at scan time.
///
/// Extraction is a pure function of a snapshot; the snapshot itself is
/// never mutated.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    url: Url,
    html: String,
}

impl PageSnapshot {
    /// Capture a snapshot.
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// Full page URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Page hostname, empty for URLs without one.
    pub fn hostname(&self) -> String {
        self.url.host_str().unwrap_or("").to_string()
    }

    /// First dot-separated hostname label, with any `www.` prefix dropped.
    pub fn domain_label(&self) -> String {
        let host = self.hostname();
        host.trim_start_matches("www.")
            .split('.')
            .next()
            .unwrap_or("")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(url: &str) -> PageSnapshot {
        PageSnapshot::new(Url::parse(url).unwrap(), "<html></html>")
    }

    #[test]
    fn test_hostname_and_domain_label() {
        let page = snapshot("https://www.acme-widgets.co.uk/contact?tab=1");
        assert_eq!(page.hostname(), "www.acme-widgets.co.uk");
        assert_eq!(page.domain_label(), "acme-widgets");

        let bare = snapshot("https://example.com/");
        assert_eq!(bare.domain_label(), "example");
    }
}
