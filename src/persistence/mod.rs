//! Save/load as a single opaque blob
//!
//! The whole `GameState` is serialized to one JSON string under a fixed key.
//! There is no versioning or migration: a blob that fails to parse is treated
//! as "no save found" and the engine falls back to defaults.

use crate::sim::state::GameState;

/// Fixed key in the local store
pub const SAVE_KEY: &str = "cosmic_crunch_save";

/// Serialize the full state; `None` only on a serializer bug
pub fn encode(state: &GameState) -> Option<String> {
    match serde_json::to_string(state) {
        Ok(blob) => Some(blob),
        Err(e) => {
            log::warn!("save encode failed: {e}");
            None
        }
    }
}

/// Deserialize a blob; corrupt or foreign data degrades to `None`
pub fn decode(blob: &str) -> Option<GameState> {
    match serde_json::from_str(blob) {
        Ok(state) => Some(state),
        Err(e) => {
            log::warn!("save decode failed: {e}");
            None
        }
    }
}
