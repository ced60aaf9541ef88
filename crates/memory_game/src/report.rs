//! Plain-text rendering of analytics for the `stats` command.

use std::fmt::Write;

use serde_json::Value;

use crate::client::{ActionView, AnalyticsView};

/// Renders the summary, recent sessions and the event log, newest first.
pub fn format_stats(view: &AnalyticsView) -> String {
    let summary = &view.summary;
    let mut out = format!(
        "Games: {}  Wins: {}  Win rate: {:.1}%\nAvg duration: {:.1}s  Avg moves: {:.1}  Hints: {}\n",
        summary.total_games,
        summary.wins,
        summary.win_rate,
        summary.average_duration,
        summary.average_moves,
        summary.total_hints
    );

    if !view.recent_sessions.is_empty() {
        out.push_str("\nRecent sessions:\n");
    }
    for session in &view.recent_sessions {
        let duration = session
            .duration_seconds
            .map(|d| format!("{:.1}s", d))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {}  {}  {:<24} {:<10} moves {:>3}  hints {:>2}  undos {:>2}  {}",
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.session_id,
            session.user_email,
            session.outcome.to_string(),
            session.total_moves,
            session.hints_used,
            session.undos_used,
            duration
        );
    }

    if !view.action_log.is_empty() {
        out.push_str("\nEvent log (latest first):\n");
        for action in &view.action_log {
            push_action(&mut out, action, true);
        }
    }
    out
}

/// Renders one session's actions in recorded order.
pub fn format_session_log(session_id: &str, actions: &[ActionView]) -> String {
    let mut out = format!("Session {} ({} actions):\n", session_id, actions.len());
    for action in actions {
        push_action(&mut out, action, false);
    }
    out
}

fn push_action(out: &mut String, action: &ActionView, with_owner: bool) {
    let _ = write!(
        out,
        "  {}  {:<14}",
        action.timestamp.format("%Y-%m-%d %H:%M:%S"),
        action.kind.as_ref()
    );
    let fields = detail_fields(action);
    if !fields.is_empty() {
        let _ = write!(out, " {}", fields);
    }
    if with_owner {
        let _ = write!(out, "  [{} {}]", action.user_email, action.session_id);
    }
    out.push('\n');
}

/// `key=value` pairs of the payload, strings unquoted.
fn detail_fields(action: &ActionView) -> String {
    action
        .details
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{SessionView, SummaryView};
    use chrono::{TimeZone, Utc};
    use memory_tiles::{ActionKind, SessionOutcome};
    use serde_json::json;

    fn action(kind: ActionKind, details: Value, second: u32) -> ActionView {
        ActionView {
            session_id: "s1".to_string(),
            user_email: "a@x.com".to_string(),
            kind,
            details: details.as_object().cloned().unwrap_or_default(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, second).unwrap(),
        }
    }

    fn view() -> AnalyticsView {
        AnalyticsView {
            summary: SummaryView {
                total_games: 1,
                wins: 1,
                win_rate: 100.0,
                average_duration: 12.5,
                average_moves: 4.0,
                total_hints: 0,
            },
            recent_sessions: vec![SessionView {
                session_id: "s1".to_string(),
                user_email: "a@x.com".to_string(),
                start_time: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 0).unwrap(),
                end_time: None,
                duration_seconds: Some(12.5),
                outcome: SessionOutcome::Win,
                total_moves: 4,
                hints_used: 0,
                undos_used: 0,
            }],
            action_log: vec![
                action(ActionKind::GameEnd, json!({"outcome": "win"}), 9),
                action(
                    ActionKind::TileClick,
                    json!({"tile": "🐶", "tileId": 3, "isFirstTile": true}),
                    5,
                ),
            ],
        }
    }

    #[test]
    fn test_stats_include_event_log_in_given_order() {
        let out = format_stats(&view());

        assert!(out.contains("Win rate: 100.0%"));
        assert!(out.contains("moves   4"));
        let log = out.split("Event log (latest first):\n").nth(1).expect("event log");
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("2026-01-02 03:04:09"));
        assert!(lines[0].contains("game_end"));
        assert!(lines[0].contains("outcome=win"));
        assert!(lines[1].contains("tile_click"));
        assert!(lines[1].contains("tile=🐶"));
        assert!(lines[1].contains("tileId=3"));
        assert!(lines[1].contains("[a@x.com s1]"));
    }

    #[test]
    fn test_empty_report_has_no_sections() {
        let mut empty = view();
        empty.recent_sessions.clear();
        empty.action_log.clear();
        let out = format_stats(&empty);
        assert!(!out.contains("Recent sessions"));
        assert!(!out.contains("Event log"));
    }

    #[test]
    fn test_session_log_lists_actions_without_owner() {
        let actions = vec![
            action(ActionKind::GameStart, json!({}), 0),
            action(ActionKind::Hint, json!({}), 1),
        ];
        let out = format_session_log("s1", &actions);
        assert!(out.starts_with("Session s1 (2 actions):\n"));
        assert!(out.lines().nth(1).expect("first").contains("game_start"));
        assert!(out.lines().nth(2).expect("second").trim_end().ends_with("hint"));
        assert!(!out.contains("[a@x.com"));
    }
}
