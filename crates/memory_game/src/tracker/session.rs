//! Fire-and-forget session tracking.

use std::sync::Arc;

use memory_tiles::{ActionDetails, SessionOutcome};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::tracker::{SessionHandle, TrackerTransport};

/// Sends session lifecycle calls and actions without blocking play.
///
/// Only [`SessionTracker::start_session`] is awaited. Actions and session
/// closes run on spawned tasks; their failures are logged and dropped.
/// Arrival order at the server is not guaranteed.
#[derive(Debug)]
pub struct SessionTracker<T: TrackerTransport> {
    transport: Arc<T>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<T: TrackerTransport> SessionTracker<T> {
    /// Creates a tracker over the given transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            in_flight: Vec::new(),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Requests a new session and stores its id in `handle`.
    ///
    /// On failure the handle stays inactive and play continues untracked.
    #[instrument(skip(self, handle), fields(user_email = %handle.user_email()))]
    pub async fn start_session(&mut self, handle: &mut SessionHandle) {
        match self.transport.start_session(handle.user_email()).await {
            Ok(session_id) => {
                info!(session_id = %session_id, "Tracking session started");
                handle.open(session_id);
            }
            Err(e) => {
                warn!(error = %e, "Could not start session; playing untracked");
            }
        }
    }

    /// Sends an action in the background. No-op for an inactive handle.
    #[instrument(skip(self, handle, details), fields(kind = %details.kind()))]
    pub fn log_action(&mut self, handle: &SessionHandle, details: ActionDetails) {
        let Some(session_id) = handle.session_id().clone() else {
            debug!("No active session; action dropped");
            return;
        };
        let user_email = handle.user_email().clone();
        let transport = Arc::clone(&self.transport);

        self.spawn(async move {
            if let Err(e) = transport.log_action(&session_id, &user_email, &details).await {
                warn!(error = %e, kind = %details.kind(), "Action not recorded");
            }
        });
    }

    /// Closes the session in the background and clears the handle.
    #[instrument(skip(self, handle))]
    pub fn end_session(&mut self, handle: &mut SessionHandle, outcome: SessionOutcome) {
        let Some(session_id) = handle.close() else {
            debug!("No active session to end");
            return;
        };
        info!(session_id = %session_id, outcome = %outcome, "Ending tracking session");
        let transport = Arc::clone(&self.transport);

        self.spawn(async move {
            if let Err(e) = transport.end_session(&session_id, outcome).await {
                warn!(error = %e, session_id = %session_id, "Session not closed");
            }
        });
    }

    /// Waits for every background call sent so far.
    #[instrument(skip(self), fields(in_flight = self.in_flight.len()))]
    pub async fn flush(&mut self) {
        for task in self.in_flight.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Tracking task panicked");
            }
        }
        debug!("Tracker flushed");
    }

    fn spawn(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        self.in_flight.retain(|t| !t.is_finished());
        self.in_flight.push(tokio::spawn(task));
    }
}
