//! Session tracking: opens a session per game, streams actions to the
//! event store and closes the session with its outcome.

mod game;
mod handle;
mod session;
mod transport;

pub use game::TrackedGame;
pub use handle::SessionHandle;
pub use session::SessionTracker;
pub use transport::{HttpTransport, TrackerTransport};
