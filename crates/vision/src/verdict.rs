//! Interpreting the free-text result of a style analysis.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};
use silhouette_core::analysis::StyleAnalysis;
use silhouette_core::style::{normalize_category, normalize_style};

/// Text reported when the session produced no result at all.
pub const NO_RESULTS: &str = "No results";

/// First `{` through last `}`: models often wrap JSON in prose or fences.
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));

/// Outcome of a style analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleVerdict {
    /// The result contained a JSON object with at least one known field.
    /// Labels are normalised to the canonical vocabularies.
    Parsed {
        color: Option<String>,
        style: Option<String>,
        item_category: Option<String>,
        text: String,
    },
    /// Anything else, verbatim.
    Raw { text: String },
}

impl StyleVerdict {
    /// Best-effort interpretation of a result string.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let Some(analysis) = JSON_OBJECT_RE
            .find(&text)
            .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
            .and_then(|v| StyleAnalysis::from_value(v).ok())
        else {
            return Self::Raw { text };
        };

        let color = analysis.color().map(|c| c.trim().to_string());
        let style = analysis.style().map(normalize_style);
        let item_category = analysis.item_category().map(normalize_category);
        if color.is_none() && style.is_none() && item_category.is_none() {
            return Self::Raw { text };
        }

        Self::Parsed {
            color,
            style,
            item_category,
            text,
        }
    }

    /// The verdict of a session that produced no result.
    pub fn empty() -> Self {
        Self::Raw {
            text: NO_RESULTS.to_string(),
        }
    }

    /// Original result text.
    pub fn text(&self) -> &str {
        match self {
            Self::Parsed { text, .. } | Self::Raw { text } => text,
        }
    }

    /// The parsed fields as a capture-ready analysis object.
    pub fn analysis(&self) -> Option<StyleAnalysis> {
        let Self::Parsed {
            color,
            style,
            item_category,
            ..
        } = self
        else {
            return None;
        };

        let mut map = Map::new();
        if let Some(color) = color {
            map.insert("color".into(), json!(color));
        }
        if let Some(style) = style {
            map.insert("style".into(), json!(style));
        }
        if let Some(category) = item_category {
            map.insert("itemCategory".into(), json!(category));
        }
        StyleAnalysis::from_value(Value::Object(map)).ok()
    }
}
