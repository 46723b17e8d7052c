use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{Diagnostics, Warning};

pub const INSTITUTIONAL_HOST: &str = "eprints.soton.ac.uk";
pub const READ_MORE: &str = "Read more";

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(https?:.*?)""#).expect("valid URL regex"));
static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://doi\.org/(.*)").expect("valid DOI regex"));

/// Display link for a publication. Both fields are empty when unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub display: String,
}

impl Link {
    fn read_more(url: &str) -> Self {
        Self {
            url: url.to_string(),
            display: READ_MORE.to_string(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Picks the link for a record from its citation text and DOI.
///
/// A single institutional repository URL wins; otherwise the DOI; otherwise
/// whatever URL the citation carries first. Anomalies only add warnings.
pub fn resolve_link(citation_text: &str, doi: Option<&str>, diag: &mut Diagnostics) -> Link {
    let doi = doi.filter(|d| !d.is_empty());
    let urls = extract_urls(citation_text);

    if urls.is_empty() {
        return match doi {
            Some(doi) => link_from_doi(doi, diag),
            None => {
                diag.warn(Warning::NoUrls);
                Link::default()
            }
        };
    }

    let institutional: Vec<&str> = urls.iter().copied().filter(|u| is_institutional(u)).collect();
    match (institutional.as_slice(), doi) {
        ([only], _) => Link::read_more(only),
        ([], Some(doi)) => link_from_doi(doi, diag),
        ([], None) => {
            diag.warn(Warning::NonInstitutionalUrl {
                url: urls[0].to_string(),
            });
            Link::read_more(urls[0])
        }
        (many, _) => {
            diag.warn(Warning::MultipleInstitutionalUrls { count: many.len() });
            Link::read_more(many[0])
        }
    }
}

/// All `http:`/`https:` URLs in the text, each terminated by a double quote.
pub fn extract_urls(text: &str) -> Vec<&str> {
    URL_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn is_institutional(raw: &str) -> bool {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(INSTITUTIONAL_HOST)))
        .unwrap_or(false)
}

/// Link whose url is the DOI itself and whose label is the part after `doi.org/`.
pub fn link_from_doi(doi: &str, diag: &mut Diagnostics) -> Link {
    let suffixes: Vec<&str> = DOI_RE
        .captures_iter(doi)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    match suffixes.as_slice() {
        [] => {
            diag.warn(Warning::MalformedDoi { doi: doi.to_string() });
            Link::default()
        }
        [first, rest @ ..] => {
            if !rest.is_empty() {
                diag.warn(Warning::AmbiguousDoi {
                    doi: doi.to_string(),
                    matches: suffixes.len(),
                });
            }
            Link {
                url: doi.to_string(),
                display: first.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn href(url: &str) -> String {
        format!(r#"<a href="{}">link</a>"#, url)
    }

    fn resolve(citation: &str, doi: Option<&str>) -> (Link, Diagnostics) {
        let mut diag = Diagnostics::new("test");
        let link = resolve_link(citation, doi, &mut diag);
        (link, diag)
    }

    #[test]
    fn test_single_institutional_url() {
        let citation = format!("Smith, J. (2021) Title. {}", href("https://eprints.soton.ac.uk/12345/"));
        let (link, diag) = resolve(&citation, None);
        assert_eq!(link.url, "https://eprints.soton.ac.uk/12345/");
        assert_eq!(link.display, READ_MORE);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_institutional_url_preferred_over_doi() {
        let citation = format!(
            "{} {}",
            href("https://doi.org/10.1000/xyz"),
            href("http://eprints.soton.ac.uk/999/")
        );
        let (link, _) = resolve(&citation, Some("https://doi.org/10.1000/xyz"));
        assert_eq!(link.url, "http://eprints.soton.ac.uk/999/");
        assert_eq!(link.display, READ_MORE);
    }

    #[test]
    fn test_no_urls_with_doi() {
        let (link, diag) = resolve("Plain citation.", Some("https://doi.org/10.1002/abc.123"));
        assert_eq!(link.url, "https://doi.org/10.1002/abc.123");
        assert_eq!(link.display, "10.1002/abc.123");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_no_urls_no_doi() {
        let (link, diag) = resolve("Plain citation.", None);
        assert_eq!(link, Link::default());
        assert_eq!(diag.warnings(), &[Warning::NoUrls]);

        let (link, _) = resolve("Plain citation.", Some(""));
        assert_eq!(link, Link::default());
    }

    #[test]
    fn test_non_institutional_with_doi_uses_doi() {
        let citation = href("https://journal.example.com/paper/1");
        let (link, diag) = resolve(&citation, Some("https://doi.org/10.5555/j.1"));
        assert_eq!(link.url, "https://doi.org/10.5555/j.1");
        assert_eq!(link.display, "10.5555/j.1");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_non_institutional_without_doi_uses_first_url() {
        let citation = format!(
            "{} {}",
            href("https://journal.example.com/paper/1"),
            href("https://other.example.org/2")
        );
        let (link, diag) = resolve(&citation, None);
        assert_eq!(link.url, "https://journal.example.com/paper/1");
        assert_eq!(link.display, READ_MORE);
        assert!(diag.contains(|w| matches!(w, Warning::NonInstitutionalUrl { .. })));
    }

    #[test]
    fn test_multiple_institutional_urls() {
        let citation = format!(
            "{} {}",
            href("https://eprints.soton.ac.uk/1/"),
            href("https://eprints.soton.ac.uk/2/")
        );
        let (link, diag) = resolve(&citation, Some("https://doi.org/10.1/x"));
        assert_eq!(link.url, "https://eprints.soton.ac.uk/1/");
        assert_eq!(link.display, READ_MORE);
        assert_eq!(diag.warnings(), &[Warning::MultipleInstitutionalUrls { count: 2 }]);
    }

    #[test]
    fn test_url_anchor_text_before_later_quote_counts_twice() {
        // Anchor text that repeats the URL runs up to the next quote and is
        // extracted a second time with the same host.
        let url = "https://eprints.soton.ac.uk/1/";
        let citation = format!(
            r#"<a href="{0}">{0}</a> <a href="https://journal.example.com/x">journal</a>"#,
            url
        );
        let (link, diag) = resolve(&citation, None);
        assert_eq!(link.url, url);
        assert_eq!(link.display, READ_MORE);
        assert_eq!(diag.warnings(), &[Warning::MultipleInstitutionalUrls { count: 2 }]);
    }

    #[test]
    fn test_url_anchor_text_without_later_quote() {
        let url = "https://eprints.soton.ac.uk/1/";
        let citation = format!(r#"Smith (2020) <a href="{0}">{0}</a>"#, url);
        let (link, diag) = resolve(&citation, None);
        assert_eq!(link.url, url);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_host_must_match_exactly() {
        let citation = href("https://eprints.soton.ac.uk.evil.example/1");
        let (link, diag) = resolve(&citation, None);
        assert_eq!(link.url, "https://eprints.soton.ac.uk.evil.example/1");
        assert!(diag.contains(|w| matches!(w, Warning::NonInstitutionalUrl { .. })));
    }

    #[test]
    fn test_malformed_doi() {
        let (link, diag) = resolve("No links here", Some("10.1000/bare"));
        assert_eq!(link, Link::default());
        assert_eq!(
            diag.warnings(),
            &[Warning::MalformedDoi { doi: "10.1000/bare".to_string() }]
        );
    }

    #[test]
    fn test_ambiguous_doi_uses_first() {
        let mut diag = Diagnostics::new("test");
        let doi = "https://doi.org/10.1/a\nhttps://doi.org/10.1/b";
        let link = link_from_doi(doi, &mut diag);
        assert_eq!(link.display, "10.1/a");
        assert_eq!(link.url, doi);
        assert!(diag.contains(|w| matches!(w, Warning::AmbiguousDoi { matches: 2, .. })));
    }

    #[test]
    fn test_extract_urls_stops_at_quote() {
        let urls = extract_urls(r#"see "https://a.example/x" and 'http://b.example/y""#);
        assert_eq!(urls, vec!["https://a.example/x", "http://b.example/y"]);
    }
}
