//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup failure); relaunch the app"
                    .to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::UserIntent;
    use crossbeam_channel::bounded;

    #[test]
    fn queued_command_leaves_status_untouched() {
        let (tx, rx) = bounded(1);
        let mut status = "ready".to_string();

        dispatch_backend_command(
            &tx,
            BackendCommand::Dispatch(UserIntent::GeneratePath),
            &mut status,
        );

        assert_eq!(status, "ready");
        assert_eq!(rx.try_recv().expect("queued").name(), "generate_path");
    }

    #[test]
    fn full_queue_reports_retry() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();

        dispatch_backend_command(&tx, BackendCommand::RefreshView, &mut status);
        dispatch_backend_command(&tx, BackendCommand::RefreshView, &mut status);

        assert_eq!(status, "UI command queue is full; please retry");
    }

    #[test]
    fn disconnected_backend_reports_relaunch() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();

        dispatch_backend_command(&tx, BackendCommand::Dispatch(UserIntent::Reset), &mut status);

        assert!(status.contains("disconnected"), "{status}");
    }

    #[test]
    fn only_text_edits_are_ordered() {
        assert!(BackendCommand::Dispatch(UserIntent::EditGoal("x".into())).is_edit());
        assert!(!BackendCommand::Dispatch(UserIntent::Ask).is_edit());
        assert!(!BackendCommand::RefreshView.is_edit());
    }
}
