//! Boundary to the indexing/question-answering service.
//!
//! The controller only sees the [`Backend`] trait. [`HttpBackend`] is the real
//! implementation: two JSON `POST` endpoints, `/index` and `/query`.

pub mod wire;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::{IndexInfo, QueryResult};

use self::wire::{IndexRequest, IndexResponse, QueryRequest, QueryResponse};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Asks the service to clone and index `repo_url`.
    async fn index(&self, repo_url: &str) -> Result<IndexInfo, ApiError>;

    /// Asks `question` against the current index, retrieving up to `top_k` chunks.
    async fn query(&self, question: &str, top_k: i64) -> Result<QueryResult, ApiError>;
}

pub struct HttpBackend {
    client: Client,
    index_url: String,
    query_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            index_url: config.endpoint("index"),
            query_url: config.endpoint("query"),
        }
    }

    async fn post<B, R>(&self, url: &str, body: &B, what: &'static str) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!(url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(url, %status, len = bytes.len(), "response received");

        if !status.is_success() {
            let detail = wire::error_detail(&bytes).map_err(|source| ApiError::Decode {
                what: "error response",
                source,
            })?;
            return Err(ApiError::Rejected { status, detail });
        }

        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { what, source })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn index(&self, repo_url: &str) -> Result<IndexInfo, ApiError> {
        let response: IndexResponse = self
            .post(&self.index_url, &IndexRequest { repo_url }, "index response")
            .await?;
        Ok(response.into())
    }

    async fn query(&self, question: &str, top_k: i64) -> Result<QueryResult, ApiError> {
        let response: QueryResponse = self
            .post(
                &self.query_url,
                &QueryRequest { question, top_k },
                "query response",
            )
            .await?;
        Ok(response.into_result(question, Utc::now()))
    }
}
