//! Controlled vocabularies for style vibes, garment styles and item
//! categories, and the mappings between them.
//!
//! The UI speaks in vibes (`street`, `formal`, `sporty`, `manual`); the
//! vision analysis and prompts speak in canonical styles
//! (`streetwear`, `formal`, `active`, plus `custom` for manual picks).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Style vibe picked by the user in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleVibe {
    Street,
    Formal,
    Sporty,
    Manual,
}

impl StyleVibe {
    pub const ALL: [StyleVibe; 4] = [Self::Street, Self::Formal, Self::Sporty, Self::Manual];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Formal => "formal",
            Self::Sporty => "sporty",
            Self::Manual => "manual",
        }
    }

    /// Canonical style this vibe targets.
    pub fn target(self) -> Style {
        match self {
            Self::Street => Style::Streetwear,
            Self::Formal => Style::Formal,
            Self::Sporty => Style::Active,
            Self::Manual => Style::Custom,
        }
    }
}

impl fmt::Display for StyleVibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleVibe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == label)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown style vibe '{s}'. Must be one of: street, formal, sporty, manual"
                ))
            })
    }
}

/// Canonical garment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Streetwear,
    Formal,
    Active,
    Custom,
}

impl Style {
    /// Styles the vision analysis is allowed to report.
    pub const ANALYSIS: [Style; 3] = [Self::Formal, Self::Streetwear, Self::Active];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Streetwear => "streetwear",
            Self::Formal => "formal",
            Self::Active => "active",
            Self::Custom => "custom",
        }
    }

    /// Parse a style label, accepting the synonyms seen across the UI and
    /// older analysis prompts (`baggy`, `street`, `sporty`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "streetwear" | "street" | "baggy" | "casual" => Some(Self::Streetwear),
            "formal" | "smart" => Some(Self::Formal),
            "active" | "sporty" | "athletic" | "activewear" => Some(Self::Active),
            "custom" | "manual" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical clothing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Tops,
    Bottoms,
    Shoes,
    Outerwear,
    Accessories,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 5] = [
        Self::Tops,
        Self::Bottoms,
        Self::Shoes,
        Self::Outerwear,
        Self::Accessories,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tops => "tops",
            Self::Bottoms => "bottoms",
            Self::Shoes => "shoes",
            Self::Outerwear => "outerwear",
            Self::Accessories => "accessories",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "tops" | "top" | "shirt" | "shirts" => Some(Self::Tops),
            "bottoms" | "bottom" | "pants" | "trousers" | "jeans" => Some(Self::Bottoms),
            "shoes" | "shoe" | "footwear" | "sneakers" => Some(Self::Shoes),
            "outerwear" | "jacket" | "jackets" | "coat" | "coats" => Some(Self::Outerwear),
            "accessories" | "accessory" => Some(Self::Accessories),
            _ => None,
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the style token a recommendation should target.
///
/// Known vibes map to their canonical style; anything else passes through
/// trimmed. A blank vibe yields `None` so callers can fall back to the
/// analysed style.
pub fn target_style_for(vibe: &str) -> Option<String> {
    let vibe = vibe.trim();
    if vibe.is_empty() {
        return None;
    }
    match vibe.parse::<StyleVibe>() {
        Ok(known) => Some(known.target().to_string()),
        Err(_) => Some(vibe.to_string()),
    }
}

/// Normalise a style label to the canonical vocabulary, keeping unknown
/// labels verbatim (lowercased).
pub fn normalize_style(label: &str) -> String {
    Style::from_label(label)
        .map(|s| s.to_string())
        .unwrap_or_else(|| label.trim().to_lowercase())
}

/// Normalise an item category label, keeping unknown labels verbatim
/// (lowercased).
pub fn normalize_category(label: &str) -> String {
    ItemCategory::from_label(label)
        .map(|c| c.to_string())
        .unwrap_or_else(|| label.trim().to_lowercase())
}
