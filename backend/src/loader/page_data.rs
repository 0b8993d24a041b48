//! Data loading for the student list page.
//!
//! The page asks the roster server for its student list once per render. Whatever
//! goes wrong on the way (connection, body, decoding) ends up as the same
//! [`LoadResult::Failure`], so the page only ever has to pick between the two
//! shapes it knows how to render.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// The roster server the page reads from.
pub const DEFAULT_SOURCE_URL: &str = "http://127.0.0.1:8000/";

/// Message handed to the page for every failed load.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid source URL {url}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("Request to {url} failed: {source}")]
    RequestFailed { url: Url, source: reqwest::Error },

    #[error("Failed to read response body: {0}")]
    BodyReadFailed(reqwest::Error),

    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Response body is null")]
    NullBody,
}

/// Outcome of one load, in the shape the page consumes:
/// `{"students": ...}` or `{"error": "Failed to fetch data"}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LoadResult {
    Success {
        /// `None` when the body had no `content` field; omitted when serialized.
        #[serde(skip_serializing_if = "Option::is_none")]
        students: Option<Value>,
    },
    Failure {
        #[serde(rename = "error")]
        message: String,
    },
}

impl LoadResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn failed() -> Self {
        Self::Failure {
            message: FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PageDataLoader {
    client: reqwest::Client,
    source_url: String,
}

impl Default for PageDataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDataLoader {
    /// Loader bound to [`DEFAULT_SOURCE_URL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(reqwest::Client::new(), DEFAULT_SOURCE_URL)
    }

    #[must_use]
    pub fn with_source(client: reqwest::Client, source_url: impl Into<String>) -> Self {
        Self {
            client,
            source_url: source_url.into(),
        }
    }

    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Fetches the page data. Never fails: errors are logged and reported as
    /// [`LoadResult::Failure`].
    pub async fn load(&self) -> LoadResult {
        match self.fetch_content().await {
            Ok(students) => LoadResult::Success { students },
            Err(e) => {
                tracing::error!(source_url = %self.source_url, "Error loading data: {e}");
                LoadResult::failed()
            }
        }
    }

    async fn fetch_content(&self) -> Result<Option<Value>, FetchError> {
        let url = Url::parse(&self.source_url).map_err(|source| FetchError::InvalidUrl {
            url: self.source_url.clone(),
            source,
        })?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::RequestFailed { url, source })?;

        // the status is not checked, any JSON body is accepted
        tracing::debug!(status = %response.status(), "Page data response received");

        let body = response.bytes().await.map_err(FetchError::BodyReadFailed)?;
        let data: Value = serde_json::from_slice(&body)?;
        extract_content(data)
    }
}

/// Pulls `content` out of a decoded body without looking at its shape.
///
/// Bodies that are not objects have no `content` and yield `None`; only a
/// `null` body is an error, since there is nothing to read a field from.
pub fn extract_content(data: Value) -> Result<Option<Value>, FetchError> {
    match data {
        Value::Null => Err(FetchError::NullBody),
        Value::Object(mut fields) => Ok(fields.remove("content")),
        _ => Ok(None),
    }
}

/// Loads the page data from [`DEFAULT_SOURCE_URL`].
pub async fn load() -> LoadResult {
    PageDataLoader::new().load().await
}
