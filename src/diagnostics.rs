use std::fmt;

/// Non-fatal data-quality findings raised while building a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    MissingField { field: &'static str },
    NoUrls,
    NonInstitutionalUrl { url: String },
    MultipleInstitutionalUrls { count: usize },
    MalformedDoi { doi: String },
    AmbiguousDoi { doi: String, matches: usize },
    IncompleteRecord,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingField { field } => write!(f, "missing field '{}'", field),
            Warning::NoUrls => write!(f, "no URLs found in citation text"),
            Warning::NonInstitutionalUrl { url } => {
                write!(f, "no institutional URL in citation text, using {}", url)
            }
            Warning::MultipleInstitutionalUrls { count } => {
                write!(f, "{} institutional URLs in citation text, using the first", count)
            }
            Warning::MalformedDoi { doi } => write!(f, "bad DOI {}", doi),
            Warning::AmbiguousDoi { doi, matches } => {
                write!(f, "{} display options for DOI {}, using the first", matches, doi)
            }
            Warning::IncompleteRecord => write!(f, "unknown details"),
        }
    }
}

/// Collects warnings for one record. Each warning is also logged as it arrives.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    subject: String,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(pure_id = %self.subject, "{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn contains(&self, pred: impl Fn(&Warning) -> bool) -> bool {
        self.warnings.iter().any(pred)
    }
}
