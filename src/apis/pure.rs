use super::{FetchError, PublicationSource, RawPublication};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api-pure.soton.ac.uk";

pub struct PureClient {
    client: reqwest::Client,
    base_url: String,
}

impl PureClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pure-publist/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Single GET against `<base>/<endpoint>/<query>`, no retries.
    pub async fn get(&self, endpoint: &str, query: &str) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}/{}/{}", self.base_url, endpoint, query);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| {
                tracing::error!(url = %url, error = %source, "GET failed");
                FetchError::Unreachable { url: url.clone(), source }
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            tracing::error!(url = %url, status = status.as_u16(), "GET did not succeed");
            return Err(FetchError::BadStatus { code: status.as_u16(), url });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| FetchError::Unreachable { url: url.clone(), source })?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(format!("{}: {}", url, e)))
    }

    async fn get_as<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> Result<T, FetchError> {
        let value = self.get(endpoint, query).await?;
        serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[derive(Deserialize)]
struct ProjectResponse {
    #[serde(default)]
    outputs: Vec<OutputRef>,
}

#[derive(Deserialize)]
struct OutputRef {
    #[serde(rename = "pureId")]
    pure_id: serde_json::Value,
}

#[derive(Deserialize)]
struct OutputsResponse {
    count: u64,
    #[serde(default)]
    publications: Vec<RawPublication>,
}

fn id_to_string(value: &serde_json::Value) -> Result<String, FetchError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(FetchError::Parse(format!("pureId is not a string or number: {}", other))),
    }
}

#[async_trait]
impl PublicationSource for PureClient {
    fn name(&self) -> &str {
        "pure"
    }

    async fn output_ids(&self, project_id: &str) -> Result<Vec<String>, FetchError> {
        let resp: ProjectResponse = self.get_as("project", project_id).await?;
        resp.outputs.iter().map(|o| id_to_string(&o.pure_id)).collect()
    }

    async fn output_details(&self, pure_id: &str) -> Result<RawPublication, FetchError> {
        let query = format!("outputs?limit=1&offset=0&guids={}", pure_id);
        let resp: OutputsResponse = self.get_as(".", &query).await?;
        if resp.count != 1 {
            tracing::error!(pure_id, count = resp.count, "Unexpected publication details");
            return Err(FetchError::ShapeMismatch(format!(
                "expected 1 record for {}, got count {}",
                pure_id, resp.count
            )));
        }
        resp.publications.into_iter().next().ok_or_else(|| {
            FetchError::ShapeMismatch(format!("count is 1 but no publication body for {}", pure_id))
        })
    }
}
