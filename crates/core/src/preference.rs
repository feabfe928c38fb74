//! Body-part annotations the user attaches to the body model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body regions the UI body model exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Head,
    Torso,
    Arms,
    Legs,
    Feet,
}

impl BodyPart {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::Arms => "arms",
            Self::Legs => "legs",
            Self::Feet => "feet",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user comment about one body part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub body_part: BodyPart,
    #[serde(default)]
    pub comment: String,
}

/// Comma-separated `part: comment` summary used inside prompts.
///
/// Returns `None` when there is nothing to summarise.
pub fn summarize(annotations: &[Annotation]) -> Option<String> {
    let parts: Vec<String> = annotations
        .iter()
        .map(|a| format!("{}: {}", a.body_part, a.comment.trim()))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
