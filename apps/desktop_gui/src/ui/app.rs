use client_core::{
    view::{
        ButtonView, ChatPanel, ConceptListView, GraphPanel, InputView, ListItem, PathPanel,
        ResourceList, StatusView,
    },
    AppView, UserIntent,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
};

const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 160, 67);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(218, 54, 51);

/// Text the user is typing. Only overwritten from the backend view after a reset.
#[derive(Default)]
struct Drafts {
    topic: String,
    goal: String,
    question: String,
}

impl Drafts {
    fn sync_from(&mut self, view: &AppView) {
        self.topic = view.graph.topic_input.value.clone();
        self.goal = view.path.goal_input.value.clone();
        self.question = view.chat.question_input.value.clone();
    }
}

pub struct PathfinderApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: Option<AppView>,
    drafts: Drafts,
    status: String,
    startup_error: Option<UiError>,
}

impl PathfinderApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: None,
            drafts: Drafts::default(),
            status: "Starting...".to_string(),
            startup_error: None,
        };
        dispatch_backend_command(&app.cmd_tx, BackendCommand::RefreshView, &mut app.status);
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::View(view) => self.apply_view(*view),
                UiEvent::Error(err) => {
                    tracing::error!(context = ?err.context(), "{}", err.message());
                    self.status = err.to_string();
                    if err.requires_relaunch() {
                        self.startup_error = Some(err);
                    }
                }
            }
        }
    }

    fn apply_view(&mut self, view: AppView) {
        let epoch_changed = self
            .view
            .as_ref()
            .map_or(true, |current| current.epoch != view.epoch);
        if epoch_changed {
            self.drafts.sync_from(&view);
        }
        self.view = Some(view);
    }

    fn send_intents(&mut self, intents: Vec<UserIntent>) {
        for intent in intents {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::Dispatch(intent),
                &mut self.status,
            );
        }
    }

    fn show_workspace(&mut self, ctx: &egui::Context) {
        let mut intents = Vec::new();

        egui::TopBottomPanel::top("app_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Pathfinder");
                ui.separator();
                ui.label(&self.status);
                if let Some(view) = &self.view {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        show_button(ui, &view.reset_button, &mut intents);
                    });
                }
            });
        });

        let Some(view) = &self.view else {
            egui::CentralPanel::default().show(ctx, |ui| {
                if let Some(err) = &self.startup_error {
                    ui.colored_label(ERROR_COLOR, err.to_string());
                } else {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Connecting to backend worker...");
                    });
                }
            });
            return;
        };

        egui::SidePanel::right("knowledge_state_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    show_concept_list(ui, &view.known);
                    ui.add_space(12.0);
                    show_concept_list(ui, &view.struggling);
                    ui.add_space(12.0);
                    show_chat_panel(ui, &view.chat, &mut self.drafts.question, &mut intents);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_graph_panel(ui, &view.graph, &mut self.drafts.topic, &mut intents);
                ui.add_space(16.0);
                show_path_panel(ui, &view.path, &mut self.drafts.goal, &mut intents);
            });
        });

        self.send_intents(intents);
    }
}

fn show_input(
    ui: &mut egui::Ui,
    input: &InputView,
    draft: &mut String,
    edit: fn(String) -> UserIntent,
    intents: &mut Vec<UserIntent>,
) {
    ui.horizontal(|ui| {
        ui.label(input.label);
        let response = ui.add_enabled(
            input.enabled,
            egui::TextEdit::singleline(draft).desired_width(f32::INFINITY),
        );
        if response.changed() {
            intents.push(edit(draft.clone()));
        }
    });
}

fn show_button(ui: &mut egui::Ui, button: &ButtonView, intents: &mut Vec<UserIntent>) {
    if ui
        .add_enabled(button.enabled, egui::Button::new(button.label.as_str()))
        .clicked()
    {
        intents.push(button.intent.clone());
    }
}

fn show_status(ui: &mut egui::Ui, status: &StatusView) {
    if status.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Working...");
        });
    }
    if let Some(error) = &status.error {
        ui.colored_label(ERROR_COLOR, error);
    }
    if let Some(message) = &status.message {
        ui.colored_label(SUCCESS_COLOR, message);
    }
}

fn show_graph_panel(
    ui: &mut egui::Ui,
    panel: &GraphPanel,
    draft: &mut String,
    intents: &mut Vec<UserIntent>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Knowledge Graph");
        show_input(ui, &panel.topic_input, draft, UserIntent::EditTopic, intents);
        show_button(ui, &panel.generate_button, intents);
        show_status(ui, &panel.status);

        if !panel.nodes.is_empty() {
            ui.separator();
            egui::Grid::new("knowledge_graph_nodes")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    for node in &panel.nodes {
                        ui.strong(&node.concept);
                        ui.vertical(|ui| {
                            ui.label("Prerequisites:");
                            for line in prerequisite_lines(&node.prerequisites) {
                                ui.label(line);
                            }
                        });
                        ui.end_row();
                    }
                });
        }
    });
}

/// Bulleted prerequisites; an empty list draws no rows at all.
fn prerequisite_lines(prerequisites: &[String]) -> Vec<String> {
    prerequisites
        .iter()
        .map(|prerequisite| format!("• {prerequisite}"))
        .collect()
}

fn show_path_panel(
    ui: &mut egui::Ui,
    panel: &PathPanel,
    draft: &mut String,
    intents: &mut Vec<UserIntent>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Learning Path");
        show_input(ui, &panel.goal_input, draft, UserIntent::EditGoal, intents);
        show_button(ui, &panel.generate_button, intents);
        show_status(ui, &panel.status);

        if !panel.visible {
            return;
        }
        ui.separator();
        for entry in &panel.entries {
            ui.horizontal(|ui| {
                ui.strong(format!("{}. {}", entry.position, entry.concept));
                show_button(ui, &entry.complete_button, intents);
                show_button(ui, &entry.struggling_button, intents);
            });
            ui.indent(("path_entry_resources", entry.position), |ui| match &entry.resources {
                ResourceList::Links(links) => {
                    for link in links {
                        ui.hyperlink_to(&link.label, &link.url);
                    }
                }
                ResourceList::Placeholder(text) => {
                    ui.label(egui::RichText::new(*text).italics());
                }
            });
            ui.add_space(6.0);
        }
    });
}

fn show_chat_panel(
    ui: &mut egui::Ui,
    panel: &ChatPanel,
    draft: &mut String,
    intents: &mut Vec<UserIntent>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Ask");
        show_input(ui, &panel.question_input, draft, UserIntent::EditQuestion, intents);
        show_button(ui, &panel.ask_button, intents);
        show_status(ui, &panel.status);
        if let Some(answer) = &panel.answer {
            ui.separator();
            ui.label(answer);
        }
    });
}

fn show_concept_list(ui: &mut egui::Ui, list: &ConceptListView) {
    ui.heading(list.heading);
    for item in &list.items {
        match item {
            ListItem::Concept(concept) => {
                ui.label(format!("• {concept}"));
            }
            ListItem::Placeholder(text) => {
                ui.label(egui::RichText::new(*text).italics());
            }
        }
    }
}

impl eframe::App for PathfinderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.show_workspace(ctx);

        let busy = self.view.as_ref().is_some_and(|view| {
            view.graph.status.loading || view.path.status.loading || view.chat.status.loading
        });
        if busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prerequisites_draw_no_rows() {
        assert!(prerequisite_lines(&[]).is_empty());
    }

    #[test]
    fn prerequisites_are_bulleted_in_order() {
        assert_eq!(
            prerequisite_lines(&["Limits".to_string(), "Functions".to_string()]),
            vec!["• Limits".to_string(), "• Functions".to_string()]
        );
    }
}
