//! Memory Game client.
//!
//! A terminal memory-matching game whose sessions and actions are
//! streamed to the analytics server, plus a typed REST client for that
//! server.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod report;
pub mod tracker;
pub mod tui;

pub use client::{
    ActionView, AnalyticsView, ApiClient, DEFAULT_SERVER_URL, ENV_SERVER_URL, SessionView,
    SummaryView, TransportError, resolve_server_url,
};
pub use report::{format_session_log, format_stats};
pub use tracker::{HttpTransport, SessionHandle, SessionTracker, TrackedGame, TrackerTransport};
pub use tui::{PlayOptions, run_tui};
