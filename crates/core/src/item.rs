//! Clothing item input validation and catalogue filtering.

use serde::Deserialize;
use validator::Validate;

/// Maximum number of items returned by a filtered lookup.
///
/// Filter results are fed into prompts downstream, so they stay small.
pub const FIND_LIMIT: usize = 10;

/// DTO for creating a new item.
///
/// Every field is required. `item` is accepted as a legacy spelling of
/// `itemType`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[validate(length(min = 1, message = "color is required"))]
    pub color: String,
    #[serde(alias = "item")]
    #[validate(length(min = 1, message = "itemType is required"))]
    pub item_type: String,
    #[validate(length(min = 1, message = "style is required"))]
    pub style: String,
    #[validate(url(message = "productLink must be a valid URL"))]
    pub product_link: String,
    #[validate(url(message = "imageLink must be a valid URL"))]
    pub image_link: String,
}

impl CreateItem {
    /// Trim every field, then validate.
    pub fn into_validated(self) -> Result<Self, validator::ValidationErrors> {
        let item = Self {
            color: self.color.trim().to_string(),
            item_type: self.item_type.trim().to_string(),
            style: self.style.trim().to_string(),
            product_link: self.product_link.trim().to_string(),
            image_link: self.image_link.trim().to_string(),
        };
        item.validate()?;
        Ok(item)
    }
}

/// How the supplied filter fields combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// An item matches when any supplied field matches.
    #[default]
    Any,
    /// An item matches only when every supplied field matches.
    All,
}

/// Query parameters for `find`.
///
/// `color` matches case-insensitively as a substring; `style` and
/// `itemType` match exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
    pub color: Option<String>,
    pub style: Option<String>,
    pub item_type: Option<String>,
    #[serde(default, rename = "match")]
    pub mode: MatchMode,
}

impl ItemFilter {
    /// Filter values with blank entries dropped.
    pub fn color(&self) -> Option<&str> {
        non_blank(self.color.as_deref())
    }

    pub fn style(&self) -> Option<&str> {
        non_blank(self.style.as_deref())
    }

    pub fn item_type(&self) -> Option<&str> {
        non_blank(self.item_type.as_deref())
    }

    /// True when no filter field is supplied.
    pub fn is_empty(&self) -> bool {
        self.color().is_none() && self.style().is_none() && self.item_type().is_none()
    }

    /// Evaluate the filter against a single item's fields.
    ///
    /// An empty filter matches everything.
    pub fn matches(&self, color: &str, style: &str, item_type: &str) -> bool {
        let checks: Vec<bool> = [
            self.color()
                .map(|c| color.to_lowercase().contains(&c.to_lowercase())),
            self.style().map(|s| style == s),
            self.item_type().map(|t| item_type == t),
        ]
        .into_iter()
        .flatten()
        .collect();

        if checks.is_empty() {
            return true;
        }
        match self.mode {
            MatchMode::Any => checks.iter().any(|&c| c),
            MatchMode::All => checks.iter().all(|&c| c),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
