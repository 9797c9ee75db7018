use async_trait::async_trait;
use tracing::{error, info, warn};

/// Fire-and-forget notification sink.
///
/// The core never talks to a toast host directly; whichever surface hosts the
/// workspaces injects an implementation.
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
    fn notify_info(&self, message: &str);
    fn notify_warn(&self, message: &str);
}

/// Confirmation collaborator awaited by the navigation guard and the delete
/// flows. The core treats it as a black box.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Notifier that routes everything to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_success(&self, message: &str) {
        info!(kind = "success", "{message}");
    }

    fn notify_error(&self, message: &str) {
        error!(kind = "error", "{message}");
    }

    fn notify_info(&self, message: &str) {
        info!(kind = "info", "{message}");
    }

    fn notify_warn(&self, message: &str) {
        warn!(kind = "warning", "{message}");
    }
}

/// Confirmer with a fixed answer, for non-interactive surfaces.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.0
    }
}
