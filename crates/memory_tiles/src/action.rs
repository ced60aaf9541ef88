//! Typed action payloads recorded for each tracked interaction.
//!
//! Actions are domain events: the client emits them, the server stores
//! them verbatim and never changes them afterwards.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Symbol, TileId};

/// How a session ended.
///
/// `Loss` exists in the stored schema but no game rule produces it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionOutcome {
    /// Every pair matched.
    Win,
    /// Reserved; never emitted.
    Loss,
    /// Open, or closed without a win.
    #[default]
    Incomplete,
}

/// Discriminant of an [`ActionDetails`] payload.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    /// A tile was turned face up.
    TileClick,
    /// Two face-up tiles were compared.
    MatchAttempt,
    /// The player asked for a hint.
    Hint,
    /// The player undid a click.
    Undo,
    /// A session opened.
    GameStart,
    /// A session closed.
    GameEnd,
}

/// Payload of a recorded action, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDetails {
    /// A tile was turned face up.
    #[serde(rename_all = "camelCase")]
    TileClick {
        /// Face of the clicked tile.
        tile: Symbol,
        /// Which tile.
        tile_id: TileId,
        /// Whether it opened a new pair selection.
        is_first_tile: bool,
    },
    /// Two face-up tiles were compared.
    #[serde(rename_all = "camelCase")]
    MatchAttempt {
        /// The compared tiles, in selection order.
        tiles: [TileId; 2],
        /// Whether they share a face.
        is_match: bool,
    },
    /// The player asked for a hint.
    Hint,
    /// The player undid a click.
    Undo,
    /// A session opened.
    GameStart,
    /// A session closed.
    GameEnd {
        /// How it closed.
        outcome: SessionOutcome,
    },
}

impl ActionDetails {
    /// The discriminant of this payload.
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionDetails::TileClick { .. } => ActionKind::TileClick,
            ActionDetails::MatchAttempt { .. } => ActionKind::MatchAttempt,
            ActionDetails::Hint => ActionKind::Hint,
            ActionDetails::Undo => ActionKind::Undo,
            ActionDetails::GameStart => ActionKind::GameStart,
            ActionDetails::GameEnd { .. } => ActionKind::GameEnd,
        }
    }

    /// The payload fields without the `type` tag.
    pub fn fields(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove("type");
                map
            }
            _ => serde_json::Map::new(),
        }
    }

    /// Rebuilds a payload from a kind and its untagged fields.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the fields do not fit the kind.
    pub fn from_fields(
        kind: ActionKind,
        mut fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        fields.insert(
            "type".to_string(),
            serde_json::Value::String(kind.to_string()),
        );
        serde_json::from_value(serde_json::Value::Object(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tile_click_wire_shape() {
        let details = ActionDetails::TileClick {
            tile: Symbol::from("🐶"),
            tile_id: TileId(3),
            is_first_tile: true,
        };
        let value = serde_json::to_value(&details).expect("serialize");
        assert_eq!(
            value,
            json!({"type": "tile_click", "tile": "🐶", "tileId": 3, "isFirstTile": true})
        );
    }

    #[test]
    fn test_unit_variants_carry_only_the_tag() {
        let value = serde_json::to_value(ActionDetails::Hint).expect("serialize");
        assert_eq!(value, json!({"type": "hint"}));
        assert!(ActionDetails::Undo.fields().is_empty());
    }

    #[test]
    fn test_fields_round_trip_through_kind() {
        let details = ActionDetails::MatchAttempt {
            tiles: [TileId(0), TileId(5)],
            is_match: false,
        };
        let rebuilt = ActionDetails::from_fields(details.kind(), details.fields()).expect("parse");
        assert_eq!(rebuilt, details);
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(ActionKind::MatchAttempt.as_ref(), "match_attempt");
        assert_eq!("game_end".parse::<ActionKind>(), Ok(ActionKind::GameEnd));
        assert_eq!(SessionOutcome::Incomplete.to_string(), "incomplete");
        assert!("draw".parse::<SessionOutcome>().is_err());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<ActionDetails, _> = serde_json::from_value(json!({"type": "reset"}));
        assert!(result.is_err());
    }
}
