//! Presentation tree projected from [`SessionState`].
//!
//! [`render`] is a pure function of the state and is re-run after every mutation;
//! front-ends draw whatever it returns and send back the [`UserIntent`] carried by
//! the control the user touched.

use std::fmt;

use shared::domain::{Concept, ConceptSet, KnowledgeGraph};

use crate::state::{SessionState, SubsystemStatus};

pub const NO_RESOURCES_PLACEHOLDER: &str = "No specific resources listed for this concept.";
pub const NO_KNOWN_PLACEHOLDER: &str = "No concepts marked as known yet.";
pub const NO_STRUGGLING_PLACEHOLDER: &str = "No concepts marked as struggling yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    EditTopic(String),
    EditGoal(String),
    EditQuestion(String),
    GenerateKnowledgeGraph,
    GeneratePath,
    MarkComplete(String),
    MarkStruggling(String),
    Ask,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputView {
    pub label: &'static str,
    pub value: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
    pub intent: UserIntent,
}

impl ButtonView {
    fn new(label: impl Into<String>, enabled: bool, intent: UserIntent) -> Self {
        Self {
            label: label.into(),
            enabled,
            intent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusView {
    pub loading: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl From<&SubsystemStatus> for StatusView {
    fn from(status: &SubsystemStatus) -> Self {
        Self {
            loading: status.loading,
            message: status.message.clone(),
            error: status.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNodeView {
    pub concept: String,
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPanel {
    pub topic_input: InputView,
    pub generate_button: ButtonView,
    pub status: StatusView,
    pub nodes: Vec<GraphNodeView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceList {
    Links(Vec<ResourceLink>),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntryView {
    /// 1-based position in the path.
    pub position: usize,
    pub concept: String,
    pub resources: ResourceList,
    pub complete_button: ButtonView,
    pub struggling_button: ButtonView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPanel {
    pub goal_input: InputView,
    pub generate_button: ButtonView,
    pub status: StatusView,
    /// False whenever the path is empty; the entry list is then not drawn at all.
    pub visible: bool,
    pub entries: Vec<PathEntryView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPanel {
    pub question_input: InputView,
    pub ask_button: ButtonView,
    pub status: StatusView,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Concept(String),
    /// Shown in italics when the list is empty.
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptListView {
    pub heading: &'static str,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppView {
    pub epoch: u64,
    pub graph: GraphPanel,
    pub path: PathPanel,
    pub chat: ChatPanel,
    pub known: ConceptListView,
    pub struggling: ConceptListView,
    pub reset_button: ButtonView,
}

pub fn render(state: &SessionState) -> AppView {
    AppView {
        epoch: state.epoch,
        graph: render_graph_panel(state),
        path: render_path_panel(state),
        chat: render_chat_panel(state),
        known: render_concept_list("Known Concepts", &state.known_concepts, NO_KNOWN_PLACEHOLDER),
        struggling: render_concept_list(
            "Struggling Concepts",
            &state.struggling_concepts,
            NO_STRUGGLING_PLACEHOLDER,
        ),
        reset_button: ButtonView::new("Reset All", !state.any_loading(), UserIntent::Reset),
    }
}

fn render_graph_panel(state: &SessionState) -> GraphPanel {
    let loading = state.graph_status.loading;
    GraphPanel {
        topic_input: InputView {
            label: "Topic",
            value: state.topic.clone(),
            enabled: !loading,
        },
        generate_button: ButtonView::new(
            "Generate Knowledge Graph",
            !loading && !state.topic.is_empty(),
            UserIntent::GenerateKnowledgeGraph,
        ),
        status: StatusView::from(&state.graph_status),
        nodes: state
            .knowledge_graph
            .concepts()
            .map(|(name, concept)| render_graph_node(name, concept))
            .collect(),
    }
}

fn render_graph_node(name: &str, concept: &Concept) -> GraphNodeView {
    GraphNodeView {
        concept: name.to_string(),
        prerequisites: concept.prerequisites.clone(),
    }
}

fn render_path_panel(state: &SessionState) -> PathPanel {
    let loading = state.path_status.loading;
    let has_graph = !state.knowledge_graph.is_empty();
    PathPanel {
        goal_input: InputView {
            label: "Goal",
            value: state.goal.clone(),
            enabled: !loading && has_graph,
        },
        generate_button: ButtonView::new(
            "Generate Learning Path",
            !loading && has_graph && !state.goal.is_empty(),
            UserIntent::GeneratePath,
        ),
        status: StatusView::from(&state.path_status),
        visible: !state.learning_path.is_empty(),
        entries: state
            .learning_path
            .iter()
            .enumerate()
            .map(|(index, concept)| render_path_entry(index + 1, concept, &state.knowledge_graph))
            .collect(),
    }
}

fn render_path_entry(position: usize, concept: &str, graph: &KnowledgeGraph) -> PathEntryView {
    let resources = graph.resources_for(concept);
    let resources = if resources.is_empty() {
        ResourceList::Placeholder(NO_RESOURCES_PLACEHOLDER)
    } else {
        ResourceList::Links(
            resources
                .iter()
                .map(|resource| ResourceLink {
                    label: format!("{} ({})", resource.title, resource.kind),
                    url: resource.url.clone(),
                })
                .collect(),
        )
    };

    PathEntryView {
        position,
        concept: concept.to_string(),
        resources,
        complete_button: ButtonView::new(
            "Mark as Complete",
            true,
            UserIntent::MarkComplete(concept.to_string()),
        ),
        struggling_button: ButtonView::new(
            "Mark as Struggling",
            true,
            UserIntent::MarkStruggling(concept.to_string()),
        ),
    }
}

fn render_chat_panel(state: &SessionState) -> ChatPanel {
    let loading = state.chat_status.loading;
    ChatPanel {
        question_input: InputView {
            label: "Question",
            value: state.question.clone(),
            enabled: !loading,
        },
        ask_button: ButtonView::new(
            "Ask",
            !loading && !state.question.is_empty(),
            UserIntent::Ask,
        ),
        status: StatusView::from(&state.chat_status),
        answer: state.chat_answer.clone(),
    }
}

fn render_concept_list(
    heading: &'static str,
    concepts: &ConceptSet,
    placeholder: &'static str,
) -> ConceptListView {
    let items = if concepts.is_empty() {
        vec![ListItem::Placeholder(placeholder)]
    } else {
        concepts.iter().cloned().map(ListItem::Concept).collect()
    };
    ConceptListView { heading, items }
}

fn write_input(f: &mut fmt::Formatter<'_>, input: &InputView) -> fmt::Result {
    let suffix = if input.enabled { "" } else { " (disabled)" };
    writeln!(f, "{}: [{}]{suffix}", input.label, input.value)
}

fn write_button(f: &mut fmt::Formatter<'_>, button: &ButtonView) -> fmt::Result {
    let suffix = if button.enabled { "" } else { " (disabled)" };
    writeln!(f, "<{}>{suffix}", button.label)
}

fn write_status(f: &mut fmt::Formatter<'_>, status: &StatusView) -> fmt::Result {
    if status.loading {
        writeln!(f, "  ... working")?;
    }
    if let Some(message) = &status.message {
        writeln!(f, "  ok: {message}")?;
    }
    if let Some(error) = &status.error {
        writeln!(f, "  error: {error}")?;
    }
    Ok(())
}

impl fmt::Display for ConceptListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.heading)?;
        for item in &self.items {
            match item {
                ListItem::Concept(concept) => writeln!(f, "  - {concept}")?,
                ListItem::Placeholder(text) => writeln!(f, "  _{text}_")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Knowledge Graph ==")?;
        write_input(f, &self.graph.topic_input)?;
        write_button(f, &self.graph.generate_button)?;
        write_status(f, &self.graph.status)?;
        for node in &self.graph.nodes {
            writeln!(f, "  * {}", node.concept)?;
            writeln!(f, "    Prerequisites:")?;
            for prerequisite in &node.prerequisites {
                writeln!(f, "      - {prerequisite}")?;
            }
        }

        writeln!(f, "== Learning Path ==")?;
        write_input(f, &self.path.goal_input)?;
        write_button(f, &self.path.generate_button)?;
        write_status(f, &self.path.status)?;
        if self.path.visible {
            for entry in &self.path.entries {
                writeln!(f, "  {}. {}", entry.position, entry.concept)?;
                match &entry.resources {
                    ResourceList::Links(links) => {
                        for link in links {
                            writeln!(f, "     - {} <{}>", link.label, link.url)?;
                        }
                    }
                    ResourceList::Placeholder(text) => writeln!(f, "     _{text}_")?,
                }
            }
        }

        write!(f, "{}", self.known)?;
        write!(f, "{}", self.struggling)?;

        writeln!(f, "== Ask the Assistant ==")?;
        write_input(f, &self.chat.question_input)?;
        write_button(f, &self.chat.ask_button)?;
        write_status(f, &self.chat.status)?;
        if let Some(answer) = &self.chat.answer {
            writeln!(f, "  answer: {answer}")?;
        }

        write_button(f, &self.reset_button)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
