//! Client-side handle on the current session.

use derive_getters::Getters;

/// The player and, once the server has answered, their open session.
///
/// `session_id` is `None` before a session starts, after it ends, and
/// whenever tracking has degraded because the server could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionHandle {
    user_email: String,
    session_id: Option<String>,
}

impl SessionHandle {
    /// A handle for `user_email` with no session yet.
    pub fn new(user_email: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            session_id: None,
        }
    }

    /// Whether actions will be recorded.
    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    pub(crate) fn open(&mut self, session_id: String) {
        self.session_id = Some(session_id);
    }

    pub(crate) fn close(&mut self) -> Option<String> {
        self.session_id.take()
    }
}
