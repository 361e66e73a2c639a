use shared::domain::{ConceptSet, KnowledgeGraph, LearningPath};

/// Loading flag and banners for one request-issuing part of the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsystemStatus {
    pub loading: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl SubsystemStatus {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.clear_banners();
    }

    pub(crate) fn clear_banners(&mut self) {
        self.message = None;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.message = Some(message.into());
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>) {
        self.loading = false;
        self.error = Some(error.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub topic: String,
    pub goal: String,
    pub question: String,
    pub knowledge_graph: KnowledgeGraph,
    pub learning_path: LearningPath,
    pub known_concepts: ConceptSet,
    pub struggling_concepts: ConceptSet,
    pub graph_status: SubsystemStatus,
    pub path_status: SubsystemStatus,
    pub chat_status: SubsystemStatus,
    pub chat_answer: Option<String>,
    /// Bumped by every reset.
    pub epoch: u64,
}

impl SessionState {
    /// Known and struggling never both hold the same concept after this.
    pub fn mark_complete(&mut self, concept: &str) {
        self.known_concepts.insert(concept.to_string());
        self.struggling_concepts.shift_remove(concept);
    }

    /// Known membership is left alone: a concept can be known but shaky.
    pub fn mark_struggling(&mut self, concept: &str) {
        self.struggling_concepts.insert(concept.to_string());
    }

    pub fn reset(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self {
            epoch,
            ..Self::default()
        };
    }

    pub fn any_loading(&self) -> bool {
        self.graph_status.loading || self.path_status.loading || self.chat_status.loading
    }
}
