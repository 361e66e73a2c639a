//! The interaction controller: owns the session state, calls the learning
//! service, and publishes a fresh [`AppView`] after every mutation.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Context;
use shared::protocol::GeneratePathRequest;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    service::{HttpLearningService, LearningService},
    state::SessionState,
    view::{self, AppView, UserIntent},
};

pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic for the Knowledge Graph.";
pub const NO_GRAPH_MESSAGE: &str = "Please generate a Knowledge Graph first.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";
pub const PATH_SUCCESS_MESSAGE: &str = "Learning path generated successfully!";
pub const ANSWER_SUCCESS_MESSAGE: &str = "The assistant answered your question.";
pub const RESET_MESSAGE: &str = "Knowledge state reset.";

const GRAPH_FAILURE_PREFIX: &str = "Failed to generate KG";
const PATH_FAILURE_PREFIX: &str = "Failed to generate path";
const CHAT_FAILURE_PREFIX: &str = "Failed to get an answer";
const VIEW_CHANNEL_CAPACITY: usize = 256;

pub struct LearningSession {
    service: Arc<dyn LearningService>,
    regenerate_delay: Duration,
    inner: Mutex<SessionState>,
    views: broadcast::Sender<AppView>,
    regeneration_ticket: AtomicU64,
    pending_regeneration: Mutex<Option<JoinHandle<()>>>,
}

impl LearningSession {
    pub fn new(service: Arc<dyn LearningService>, regenerate_delay: Duration) -> Arc<Self> {
        let (views, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        Arc::new(Self {
            service,
            regenerate_delay,
            inner: Mutex::new(SessionState::default()),
            views,
            regeneration_ticket: AtomicU64::new(0),
            pending_regeneration: Mutex::new(None),
        })
    }

    /// Builds a session talking HTTP to the configured server.
    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Arc<Self>> {
        let server_url = settings.normalized_server_url()?;
        let service = HttpLearningService::with_timeout(&server_url, settings.request_timeout())
            .context("failed to build learning service http client")?;
        info!(%server_url, "learning session configured");
        Ok(Self::new(Arc::new(service), settings.regenerate_delay()))
    }

    pub fn subscribe_views(&self) -> broadcast::Receiver<AppView> {
        self.views.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    pub async fn view(&self) -> AppView {
        view::render(&*self.inner.lock().await)
    }

    fn publish(&self, state: &SessionState) {
        // No subscribers is fine; the next subscriber can ask for `view()`.
        let _ = self.views.send(view::render(state));
    }

    pub async fn dispatch(self: &Arc<Self>, intent: UserIntent) {
        match intent {
            UserIntent::EditTopic(topic) => self.set_topic(topic).await,
            UserIntent::EditGoal(goal) => self.set_goal(goal).await,
            UserIntent::EditQuestion(question) => self.set_question(question).await,
            UserIntent::GenerateKnowledgeGraph => self.generate_knowledge_graph().await,
            UserIntent::GeneratePath => self.generate_path().await,
            UserIntent::MarkComplete(concept) => self.mark_complete(&concept).await,
            UserIntent::MarkStruggling(concept) => self.mark_struggling(&concept).await,
            UserIntent::Ask => self.ask().await,
            UserIntent::Reset => self.reset().await,
        }
    }

    pub async fn set_topic(&self, topic: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.topic = topic.into();
        self.publish(&state);
    }

    pub async fn set_goal(&self, goal: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.goal = goal.into();
        self.publish(&state);
    }

    pub async fn set_question(&self, question: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.question = question.into();
        self.publish(&state);
    }

    /// Requests a graph for the current topic and replaces the stored one on success.
    ///
    /// The graph loading flag is cleared on every return path.
    pub async fn generate_knowledge_graph(&self) {
        let topic = {
            let mut state = self.inner.lock().await;
            state.graph_status.begin();
            self.publish(&state);

            let topic = state.topic.trim().to_string();
            if topic.is_empty() {
                state.graph_status.fail(EMPTY_TOPIC_MESSAGE);
                self.publish(&state);
                return;
            }
            topic
        };

        info!(%topic, "requesting knowledge graph");
        let outcome = self.service.generate_knowledge_graph(&topic).await;

        let mut state = self.inner.lock().await;
        match outcome {
            Ok(graph) => {
                info!(%topic, concepts = graph.len(), "knowledge graph received");
                state.knowledge_graph = graph;
                state
                    .graph_status
                    .succeed(format!("Knowledge Graph for \"{topic}\" generated successfully!"));
            }
            Err(err) => {
                warn!(%topic, error = %err, "knowledge graph generation failed");
                state
                    .graph_status
                    .fail(err.display_for(GRAPH_FAILURE_PREFIX));
            }
        }
        self.publish(&state);
    }

    /// Manual path request. Any regeneration still waiting on its delay is dropped.
    pub async fn generate_path(&self) {
        self.cancel_pending_regeneration();
        self.run_path_generation(None).await;
    }

    /// With a ticket, the run is dropped unless that ticket is still current once
    /// the state lock is held; a reset racing the delay expiry cannot slip through.
    async fn run_path_generation(&self, ticket: Option<u64>) {
        let request = {
            let mut state = self.inner.lock().await;
            if let Some(ticket) = ticket {
                if self.regeneration_ticket.load(Ordering::SeqCst) != ticket {
                    debug!(ticket, "path regeneration superseded");
                    return;
                }
            }
            if state.knowledge_graph.is_empty() {
                state.path_status.error = Some(NO_GRAPH_MESSAGE.to_string());
                self.publish(&state);
                return;
            }

            state.path_status.begin();
            self.publish(&state);

            GeneratePathRequest {
                goal: state.goal.clone(),
                known_concepts: state.known_concepts.iter().cloned().collect(),
                struggling_concepts: state.struggling_concepts.iter().cloned().collect(),
                knowledge_graph: state.knowledge_graph.clone(),
            }
        };

        info!(
            goal = %request.goal,
            known = request.known_concepts.len(),
            struggling = request.struggling_concepts.len(),
            "requesting learning path"
        );
        let outcome = self.service.generate_path(&request).await;

        let mut state = self.inner.lock().await;
        match outcome {
            Ok(path) => {
                info!(steps = path.len(), "learning path received");
                state.learning_path = path;
                state.path_status.succeed(PATH_SUCCESS_MESSAGE);
            }
            Err(err) => {
                warn!(error = %err, "learning path generation failed");
                state.path_status.fail(err.display_for(PATH_FAILURE_PREFIX));
            }
        }
        self.publish(&state);
    }

    pub async fn mark_complete(self: &Arc<Self>, concept: &str) {
        {
            let mut state = self.inner.lock().await;
            state.mark_complete(concept);
            state.path_status.message =
                Some(format!("\"{concept}\" marked as complete! Regenerating path..."));
            self.publish(&state);
        }
        info!(concept, "concept marked complete");
        self.schedule_regeneration().await;
    }

    pub async fn mark_struggling(self: &Arc<Self>, concept: &str) {
        {
            let mut state = self.inner.lock().await;
            state.mark_struggling(concept);
            state.path_status.message = Some(format!(
                "\"{concept}\" marked as struggling. Regenerating path for review..."
            ));
            self.publish(&state);
        }
        info!(concept, "concept marked struggling");
        self.schedule_regeneration().await;
    }

    /// Sends the current question to the assistant.
    pub async fn ask(&self) {
        let question = {
            let mut state = self.inner.lock().await;
            state.chat_status.begin();
            self.publish(&state);

            let question = state.question.trim().to_string();
            if question.is_empty() {
                state.chat_status.fail(EMPTY_QUESTION_MESSAGE);
                self.publish(&state);
                return;
            }
            question
        };

        debug!(%question, "asking assistant");
        let outcome = self.service.ask(&question).await;

        let mut state = self.inner.lock().await;
        match outcome {
            Ok(answer) => {
                state.chat_answer = Some(answer);
                state.chat_status.succeed(ANSWER_SUCCESS_MESSAGE);
            }
            Err(err) => {
                warn!(error = %err, "assistant question failed");
                state.chat_status.fail(err.display_for(CHAT_FAILURE_PREFIX));
            }
        }
        self.publish(&state);
    }

    /// Clears everything. A regeneration still waiting on its delay is dropped;
    /// requests already sent still land when they resolve.
    pub async fn reset(&self) {
        self.cancel_pending_regeneration();
        let mut state = self.inner.lock().await;
        state.reset();
        state.path_status.message = Some(RESET_MESSAGE.to_string());
        info!(epoch = state.epoch, "session reset");
        self.publish(&state);
    }

    /// Waits for the most recently scheduled regeneration, if any, to finish.
    pub async fn wait_for_pending_regeneration(&self) {
        let handle = self.pending_regeneration.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "path regeneration task failed");
            }
        }
    }

    async fn schedule_regeneration(self: &Arc<Self>) {
        let ticket = self.regeneration_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Arc::clone(self);
        let delay = self.regenerate_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.run_path_generation(Some(ticket)).await;
        });
        // A replaced handle detaches; its stale ticket makes it exit after the delay.
        *self.pending_regeneration.lock().await = Some(handle);
    }

    fn cancel_pending_regeneration(&self) {
        self.regeneration_ticket.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
