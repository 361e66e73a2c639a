//! Runtime bridge between UI command queue and the learning session.

use std::{sync::Arc, thread};

use client_core::{AppView, ClientSettings, LearningSession};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let session = match LearningSession::from_settings(&settings) {
                Ok(session) => session,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::Configuration,
                        format!("{err:#}"),
                    )));
                    tracing::error!("failed to configure learning session: {err:#}");
                    return;
                }
            };

            let mut views = session.subscribe_views();
            let view_tx = ui_tx.clone();
            tokio::spawn(async move {
                loop {
                    match views.recv().await {
                        Ok(view) => forward_view(&view_tx, view),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "ui fell behind; dropping stale views");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Using learning service at {}",
                settings.server_url
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&session, &ui_tx, cmd).await;
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

async fn handle_command(session: &Arc<LearningSession>, ui_tx: &Sender<UiEvent>, cmd: BackendCommand) {
    if cmd.is_edit() {
        if let BackendCommand::Dispatch(intent) = cmd {
            session.dispatch(intent).await;
        }
        return;
    }

    match cmd {
        BackendCommand::RefreshView => forward_view(ui_tx, session.view().await),
        BackendCommand::Dispatch(intent) => {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                session.dispatch(intent).await;
            });
        }
    }
}

fn forward_view(ui_tx: &Sender<UiEvent>, view: AppView) {
    match ui_tx.try_send(UiEvent::View(Box::new(view))) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::warn!("ui event queue full; view dropped"),
        Err(TrySendError::Disconnected(_)) => tracing::debug!("ui gone; view dropped"),
    }
}
