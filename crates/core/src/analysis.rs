//! The style-analysis object attached to a capture.
//!
//! Clients post whatever the vision step produced, so the record is kept
//! as a JSON object verbatim and read through typed accessors that know
//! the legacy key spellings (`colour`, `item`).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleAnalysis(serde_json::Map<String, serde_json::Value>);

impl StyleAnalysis {
    /// Accept only JSON objects.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map)),
            _ => Err(CoreError::Validation(
                "styleAnalysis must be a JSON object".into(),
            )),
        }
    }

    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }

    pub fn color(&self) -> Option<&str> {
        self.field(&["color", "colour"])
    }

    pub fn style(&self) -> Option<&str> {
        self.field(&["style"])
    }

    pub fn item_category(&self) -> Option<&str> {
        self.field(&["itemCategory", "item"])
    }

    fn field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.0.get(*k).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
