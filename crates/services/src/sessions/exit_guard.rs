use std::sync::Arc;

use quiz_core::model::SessionId;

use super::tracker::QuizSession;

/// Environment hook that can intercept unload / navigate-away attempts,
/// e.g. a window's close handler or a browser `beforeunload` listener.
pub trait UnloadHost: Send + Sync {
    fn install_unload_guard(&self, session: SessionId);
    fn remove_unload_guard(&self, session: SessionId);
}

/// What the environment should do with a leave attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Leave,
    Stay,
}

/// Keeps the unload hook installed exactly while a session has unsaved answers.
///
/// Call [`ExitGuard::sync`] after every session transition. Dropping the guard
/// tears the hook down.
pub struct ExitGuard {
    host: Arc<dyn UnloadHost>,
    installed: Option<SessionId>,
}

impl ExitGuard {
    #[must_use]
    pub fn new(host: Arc<dyn UnloadHost>) -> Self {
        Self {
            host,
            installed: None,
        }
    }

    /// Install or remove the hook to match the session's state.
    pub fn sync(&mut self, session: &QuizSession) {
        let wanted = session.needs_exit_confirmation().then(|| session.id());
        if wanted == self.installed {
            return;
        }

        self.release();
        if let Some(id) = wanted {
            self.host.install_unload_guard(id);
            self.installed = Some(id);
            tracing::debug!(session = %id, "exit guard installed");
        }
    }

    /// Remove the hook if one is installed.
    pub fn release(&mut self) {
        if let Some(id) = self.installed.take() {
            self.host.remove_unload_guard(id);
            tracing::debug!(session = %id, "exit guard removed");
        }
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Whether a leave attempt right now must be confirmed.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        self.is_installed()
    }

    /// Decide a leave attempt, asking `confirm` only when the hook is installed.
    pub fn request_exit(&self, confirm: impl FnOnce() -> bool) -> ExitDecision {
        if !self.requires_confirmation() || confirm() {
            ExitDecision::Leave
        } else {
            ExitDecision::Stay
        }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.release();
    }
}
