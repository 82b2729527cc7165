//! Judging phase: a Score belongs to exactly one of the two passes a
//! submission goes through on a table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Appearance,
    TasteTexture,
}
