use crate::apis::{ContributorRole, RawPerson, RawPublication};
use crate::diagnostics::{Diagnostics, Warning};
use crate::link::{resolve_link, Link};

/// A fully built publication record, ready for ordering and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub authors: String,
    /// Surname of the first listed person, whatever their role. Sort key only.
    pub first_author: String,
    pub year: i32,
    pub citation_text: String,
    pub doi: Option<String>,
    pub link: Link,
    pub description: String,
}

impl Publication {
    /// Build a record from the raw API details. Gaps in the data become
    /// warnings in the returned diagnostics, never a failure.
    pub fn build(id: &str, raw: RawPublication) -> (Self, Diagnostics) {
        let mut diag = Diagnostics::new(id);

        let title = raw.title.unwrap_or_default();
        if title.is_empty() {
            diag.warn(Warning::MissingField { field: "title" });
        }
        let year = raw.year.unwrap_or_else(|| {
            diag.warn(Warning::MissingField { field: "year" });
            0
        });
        let citation_text = raw.harvard.unwrap_or_default();
        let doi = raw.doi.filter(|d| !d.is_empty());

        let authors = format_authors(&raw.persons);
        // Not derived from `authors`: a leading non-author still sets the sort key.
        let first_author = raw
            .persons
            .first()
            .and_then(|p| p.lastname.clone())
            .unwrap_or_default();

        let link = resolve_link(&citation_text, doi.as_deref(), &mut diag);

        if title.is_empty() || authors.is_empty() || !link.is_resolved() {
            diag.warn(Warning::IncompleteRecord);
        }

        let publication = Self {
            id: id.to_string(),
            title,
            authors,
            first_author,
            year,
            citation_text,
            doi,
            link,
            description: String::new(),
        };
        (publication, diag)
    }
}

/// "Firstname Lastname" for every author-role person, in source order.
fn format_authors(persons: &[RawPerson]) -> String {
    persons
        .iter()
        .filter(|p| p.role == ContributorRole::Author)
        .map(|p| {
            format!(
                "{} {}",
                p.firstname.as_deref().unwrap_or(""),
                p.lastname.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
