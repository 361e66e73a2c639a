//! Outbound calls to the learning service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{KnowledgeGraph, LearningPath},
    error::describe_error_body,
    protocol::{
        ChatRequest, ChatResponse, GenerateKnowledgeGraphRequest, GenerateKnowledgeGraphResponse,
        GeneratePathRequest, GeneratePathResponse, CHAT_ENDPOINT,
        GENERATE_KNOWLEDGE_GRAPH_ENDPOINT, GENERATE_PATH_ENDPOINT,
    },
};
use tracing::{debug, warn};

use crate::error::GatewayError;

pub const EMPTY_GRAPH_MESSAGE: &str =
    "Failed to generate a valid Knowledge Graph. Please try a different topic.";
pub const EMPTY_ANSWER_MESSAGE: &str = "The assistant returned no answer. Please rephrase the question.";

#[async_trait]
pub trait LearningService: Send + Sync {
    /// Returns a non-empty graph, or `MalformedResponse` when the service sent none.
    async fn generate_knowledge_graph(&self, topic: &str) -> Result<KnowledgeGraph, GatewayError>;
    /// An absent `path` in the response is an empty path, not a failure.
    async fn generate_path(&self, request: &GeneratePathRequest)
        -> Result<LearningPath, GatewayError>;
    async fn ask(&self, question: &str) -> Result<String, GatewayError>;
}

pub struct HttpLearningService {
    http: Client,
    server_url: String,
}

impl HttpLearningService {
    pub fn new(server_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(
        server_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            server_url: server_url.into(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.server_url);
        debug!(%url, "posting to learning service");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = describe_error_body(&text);
            warn!(%url, status = status.as_u16(), %message, "learning service rejected request");
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl LearningService for HttpLearningService {
    async fn generate_knowledge_graph(&self, topic: &str) -> Result<KnowledgeGraph, GatewayError> {
        let response: GenerateKnowledgeGraphResponse = self
            .post_json(
                GENERATE_KNOWLEDGE_GRAPH_ENDPOINT,
                &GenerateKnowledgeGraphRequest {
                    topic: topic.to_string(),
                },
            )
            .await?;

        match response.knowledge_graph {
            Some(graph) if !graph.is_empty() => Ok(graph),
            _ => {
                warn!(topic, "learning service returned an empty knowledge graph");
                Err(GatewayError::malformed(EMPTY_GRAPH_MESSAGE))
            }
        }
    }

    async fn generate_path(
        &self,
        request: &GeneratePathRequest,
    ) -> Result<LearningPath, GatewayError> {
        let response: GeneratePathResponse =
            self.post_json(GENERATE_PATH_ENDPOINT, request).await?;
        Ok(response.path.unwrap_or_default())
    }

    async fn ask(&self, question: &str) -> Result<String, GatewayError> {
        let response: ChatResponse = self
            .post_json(
                CHAT_ENDPOINT,
                &ChatRequest {
                    question: question.to_string(),
                },
            )
            .await?;

        response
            .answer
            .filter(|answer| !answer.trim().is_empty())
            .ok_or_else(|| GatewayError::malformed(EMPTY_ANSWER_MESSAGE))
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
