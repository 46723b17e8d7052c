pub mod pure;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not reach {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url} returned status {code}")]
    BadStatus { code: u16, url: String },
    #[error("Unexpected response shape: {0}")]
    ShapeMismatch(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

/// Contributor role as tagged by the API. Only authors are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum ContributorRole {
    Author,
    Other,
}

impl From<Option<String>> for ContributorRole {
    fn from(role: Option<String>) -> Self {
        match role.as_deref() {
            Some("Author") => ContributorRole::Author,
            _ => ContributorRole::Other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPerson {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default = "other_role")]
    pub role: ContributorRole,
}

fn other_role() -> ContributorRole {
    ContributorRole::Other
}

/// One output record as returned by the detail lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPublication {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub persons: Vec<RawPerson>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub harvard: Option<String>,
    #[serde(default, alias = "publicationYear", deserialize_with = "lenient_year")]
    pub year: Option<i32>,
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A remote catalogue of research outputs grouped by project.
#[async_trait]
pub trait PublicationSource: Send + Sync {
    fn name(&self) -> &str;
    async fn output_ids(&self, project_id: &str) -> Result<Vec<String>, FetchError>;
    async fn output_details(&self, pure_id: &str) -> Result<RawPublication, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        let p: RawPerson = serde_json::from_str(
            r#"{"firstname":"Ada","lastname":"Lovelace","role":"Author"}"#,
        )
        .unwrap();
        assert_eq!(p.role, ContributorRole::Author);

        let p: RawPerson = serde_json::from_str(
            r#"{"firstname":"Bob","lastname":"Editor","role":"Editor"}"#,
        )
        .unwrap();
        assert_eq!(p.role, ContributorRole::Other);

        let p: RawPerson = serde_json::from_str(r#"{"firstname":"No","lastname":"Role"}"#).unwrap();
        assert_eq!(p.role, ContributorRole::Other);
    }

    #[test]
    fn test_missing_fields_parse() {
        let raw: RawPublication = serde_json::from_str("{}").unwrap();
        assert!(raw.title.is_none());
        assert!(raw.persons.is_empty());
        assert!(raw.year.is_none());
    }

    #[test]
    fn test_year_number_or_string() {
        let raw: RawPublication = serde_json::from_str(r#"{"year": 2021}"#).unwrap();
        assert_eq!(raw.year, Some(2021));
        let raw: RawPublication = serde_json::from_str(r#"{"publicationYear": "2019"}"#).unwrap();
        assert_eq!(raw.year, Some(2019));
        let raw: RawPublication = serde_json::from_str(r#"{"year": "soon"}"#).unwrap();
        assert_eq!(raw.year, None);
    }
}
