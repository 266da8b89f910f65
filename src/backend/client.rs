use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{
    mapper,
    wire::{ConfirmPayload, PlanResponse, SearchRequest},
};
use crate::domain::{Config, PlanningResult, Review, Tools};

/// Errors raised while talking to the workflow backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent, or the response could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Endpoint of the request.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{url} responded with {status}")]
    Status {
        /// Endpoint of the request.
        url: String,
        /// Status of the response.
        status: StatusCode,
    },

    /// The response body is not what the contract describes.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// Endpoint of the request.
        url: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The confirm payload could not be encoded.
    #[error("failed to encode the confirm payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The two operations of the workflow backend.
///
/// [`HttpWorkflow`] is the real implementation; anything else (tests, replays)
/// can stand in for it.
#[async_trait]
pub trait Workflow {
    /// Decomposes a prompt into introduction phrases and indicator groups.
    async fn decompose(&self, prompt: &str, tools: Tools) -> Result<Review, BackendError>;

    /// Turns confirmed review material into ranked planning results.
    async fn plan(&self, payload: &ConfirmPayload) -> Result<Vec<PlanningResult>, BackendError>;
}

/// [`Workflow`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWorkflow {
    client: Client,
    decompose_url: String,
    plan_url: String,
}

impl HttpWorkflow {
    /// Creates a client for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BackendError::Client)?;

        Ok(Self {
            client,
            decompose_url: config.decompose_url.clone(),
            plan_url: config.plan_url.clone(),
        })
    }

    async fn post(&self, url: &str, request: SearchRequest) -> Result<Vec<u8>, BackendError> {
        let transport = |source| BackendError::Transport {
            url: url.to_string(),
            source,
        };

        debug!(url, search_type = ?request.search_type, "sending request");
        let response = self
            .client
            .post(url)
            .json(&request.into_body())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!(url, bytes = body.len(), "received response");
        Ok(body.to_vec())
    }

    fn decode<T: serde::de::DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, BackendError> {
        serde_json::from_slice(body).map_err(|source| BackendError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Workflow for HttpWorkflow {
    #[instrument(level = "debug", skip(self, prompt))]
    async fn decompose(&self, prompt: &str, tools: Tools) -> Result<Review, BackendError> {
        let body = self
            .post(&self.decompose_url, SearchRequest::decompose(prompt, tools))
            .await?;
        let response: Value = Self::decode(&self.decompose_url, &body)?;
        Ok(mapper::review(&response))
    }

    #[instrument(level = "debug", skip_all)]
    async fn plan(&self, payload: &ConfirmPayload) -> Result<Vec<PlanningResult>, BackendError> {
        let body = self
            .post(&self.plan_url, SearchRequest::plan(payload)?)
            .await?;
        let response: PlanResponse = Self::decode(&self.plan_url, &body)?;
        Ok(mapper::planning_results(response))
    }
}
