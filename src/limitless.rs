use anyhow::{bail, Result};
use serde_json::Value;
use thiserror::Error;

/// Default page size upstream; a matching explicit `limit` is elided
/// from the query so the request mirrors the implicit default.
pub const DEFAULT_LIMIT: u32 = 5;

/// Errors from the Limitless API wrapper.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Limitless API returned error status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Read the API key from the environment, rejecting unset and blank
/// values before any request is attempted.
pub fn api_key_from_env() -> Result<String> {
    let key = match std::env::var("LIMITLESS_API_KEY") {
        Ok(key) => key,
        Err(_) => bail!("LIMITLESS_API_KEY environment variable is not set"),
    };
    if key.trim().is_empty() {
        bail!("LIMITLESS_API_KEY is empty");
    }
    Ok(key)
}

/// Booleans go on the wire as the literal strings "true"/"false".
pub fn bool_param(value: bool) -> String {
    if value {
        "true".to_string()
    } else {
        "false".to_string()
    }
}

/// Query parameters accepted by the lifelogs listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct LifelogQuery {
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub cursor: Option<String>,
    pub is_starred: Option<bool>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl LifelogQuery {
    /// Lay the query out as wire pairs on top of the configured base
    /// parameters. A base value of the same name is replaced, not
    /// duplicated.
    pub fn to_pairs(&self, base: &[(String, String)]) -> Vec<(String, String)> {
        let mut pairs = base.to_vec();

        if let Some(date) = &self.date {
            upsert(&mut pairs, "date", date.clone());
        }
        if let Some(start) = &self.start {
            upsert(&mut pairs, "start", start.clone());
        }
        if let Some(end) = &self.end {
            upsert(&mut pairs, "end", end.clone());
        }
        if let Some(cursor) = &self.cursor {
            upsert(&mut pairs, "cursor", cursor.clone());
        }
        if let Some(starred) = self.is_starred {
            upsert(&mut pairs, "isStarred", bool_param(starred));
        }
        if let Some(limit) = self.limit {
            if limit != DEFAULT_LIMIT {
                upsert(&mut pairs, "limit", limit.to_string());
            }
        }
        if let Some(search) = &self.search {
            upsert(&mut pairs, "search", search.clone());
        }

        pairs
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: String) {
    match pairs.iter_mut().find(|(key, _)| key == name) {
        Some(pair) => pair.1 = value,
        None => pairs.push((name.to_string(), value)),
    }
}

/// HTTP client for the Limitless lifelogs API. Cheap to clone; every
/// request carries the key in the `X-API-Key` header.
#[derive(Clone)]
pub struct LimitlessClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl LimitlessClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// GET /lifelogs with the given query pairs.
    pub async fn get_lifelogs(&self, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.get_json(format!("{}/lifelogs", self.base_url), query)
            .await
    }

    /// GET /lifelogs/{id}.
    pub async fn get_lifelog(&self, id: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.get_json(format!("{}/lifelogs/{}", self.base_url, id), query)
            .await
    }

    async fn get_json(&self, url: String, query: &[(String, String)]) -> Result<Value, ApiError> {
        log::debug!("GET {} with {} query parameter(s)", url, query.len());

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
