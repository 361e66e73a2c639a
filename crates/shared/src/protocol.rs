use serde::{Deserialize, Serialize};

use crate::domain::{KnowledgeGraph, LearningPath};

pub const GENERATE_KNOWLEDGE_GRAPH_ENDPOINT: &str = "/generate_knowledge_graph";
pub const GENERATE_PATH_ENDPOINT: &str = "/generate_path";
pub const CHAT_ENDPOINT: &str = "/chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateKnowledgeGraphRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateKnowledgeGraphResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<KnowledgeGraph>,
}

/// The whole graph travels with every path request; the service keeps no session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePathRequest {
    pub goal: String,
    pub known_concepts: Vec<String>,
    pub struggling_concepts: Vec<String>,
    pub knowledge_graph: KnowledgeGraph,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratePathResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<LearningPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}
