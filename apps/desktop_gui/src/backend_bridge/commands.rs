//! Backend commands queued from UI to backend worker.

use client_core::UserIntent;

pub enum BackendCommand {
    /// Ask the worker to publish the current view.
    RefreshView,
    Dispatch(UserIntent),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::RefreshView => "refresh_view",
            BackendCommand::Dispatch(intent) => match intent {
                UserIntent::EditTopic(_) => "edit_topic",
                UserIntent::EditGoal(_) => "edit_goal",
                UserIntent::EditQuestion(_) => "edit_question",
                UserIntent::GenerateKnowledgeGraph => "generate_knowledge_graph",
                UserIntent::GeneratePath => "generate_path",
                UserIntent::MarkComplete(_) => "mark_complete",
                UserIntent::MarkStruggling(_) => "mark_struggling",
                UserIntent::Ask => "ask",
                UserIntent::Reset => "reset",
            },
        }
    }

    /// Text edits must reach the session in order; everything else may run concurrently.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            BackendCommand::Dispatch(
                UserIntent::EditTopic(_) | UserIntent::EditGoal(_) | UserIntent::EditQuestion(_)
            )
        )
    }
}
