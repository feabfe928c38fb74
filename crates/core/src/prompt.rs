//! Prompt templates sent to the generative and vision providers.

use crate::analysis::StyleAnalysis;
use crate::error::CoreError;
use crate::style::{ItemCategory, Style};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a caller-supplied prompt in characters.
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// Headline section of a recommendation.
pub const SECTION_OUTFIT: &str = "OUTFIT:";
/// Priced, linked item list of a recommendation.
pub const SECTION_ITEMS: &str = "ITEMS:";
/// Rationale section of a recommendation.
pub const SECTION_WHY: &str = "WHY IT WORKS:";
/// Styling tip section of a recommendation.
pub const SECTION_TIP: &str = "STYLING TIP:";

/// Section markers, in the order the model is told to emit them.
pub const RECOMMENDATION_SECTIONS: [&str; 4] =
    [SECTION_OUTFIT, SECTION_ITEMS, SECTION_WHY, SECTION_TIP];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a caller-supplied prompt: non-blank and within the length limit.
pub fn validate_prompt(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Prompt is required".to_string()));
    }
    let length = text.chars().count();
    if length > MAX_PROMPT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Prompt exceeds maximum length of {MAX_PROMPT_LENGTH} characters (got {length})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recommendation text
// ---------------------------------------------------------------------------

/// Inputs for [`recommendation_prompt`].
#[derive(Debug, Clone, Default)]
pub struct RecommendationContext<'a> {
    /// Canonical style the outfit should hit (e.g. `streetwear`).
    pub target_style: &'a str,
    /// Analysis of the latest capture, if one exists.
    pub analysis: Option<&'a StyleAnalysis>,
    /// `part: comment` summary of the latest preferences, if any.
    pub preferences: Option<&'a str>,
}

/// Build the stylist prompt asking for exactly one outfit.
pub fn recommendation_prompt(ctx: &RecommendationContext<'_>) -> String {
    let analysis = match ctx.analysis {
        Some(a) => format!(
            "- Color: {}\n- Style: {}\n- Item: {}",
            a.color().unwrap_or("unknown"),
            a.style().unwrap_or("unknown"),
            a.item_category().unwrap_or("unknown"),
        ),
        None => "No photo analysis available".to_string(),
    };
    let preferences = ctx.preferences.unwrap_or("No specific preferences");
    let target = ctx.target_style;

    format!(
        "You are a fashion stylist. Recommend ONE complete outfit for this person.

CURRENT ANALYSIS:
{analysis}

USER PREFERENCES:
{preferences}

TARGET STYLE: {target}

RULES:
- Recommend exactly one outfit. Do not offer alternatives, variations or a second outfit.
- List 3 to 5 items. Every item needs an approximate price and a real product link (https://...).
- Respect the user's preferences for each body part.

Respond in exactly this format:

{SECTION_OUTFIT} <short headline for the look>

{SECTION_ITEMS}
1. <item name> - <price> - <product link>
2. <item name> - <price> - <product link>
3. <item name> - <price> - <product link>

{SECTION_WHY} <two or three sentences on why this works for the person and the {target} style>

{SECTION_TIP} <one practical styling tip>"
    )
}

// ---------------------------------------------------------------------------
// Image edits
// ---------------------------------------------------------------------------

/// Hard constraints shared by every edit of a captured photo.
const IDENTITY_CONSTRAINTS: &str = "HARD CONSTRAINTS:
- Keep the exact same person: face, hair, skin tone, body shape and pose.
- Keep the framing, zoom level, camera angle, lighting and background unchanged.
- Change ONLY the clothing and accessories.
- The result must be a single photo-realistic image, not a collage or a sketch.";

/// Prompt that dresses the captured person in a recommended outfit.
pub fn outfit_photo_prompt(recommendation: &str, target_style: &str) -> String {
    format!(
        "Edit this photo so the person is wearing the outfit described below, \
in a {target_style} style.

{IDENTITY_CONSTRAINTS}

OUTFIT TO APPLY:
{}",
        recommendation.trim()
    )
}

/// Prompt that applies a free-form instruction to the captured photo.
pub fn capture_edit_prompt(instruction: &str) -> String {
    format!(
        "Edit this photo of a person as instructed below.

{IDENTITY_CONSTRAINTS}

INSTRUCTION:
{}",
        instruction.trim()
    )
}

// ---------------------------------------------------------------------------
// Vision analysis
// ---------------------------------------------------------------------------

/// Instruction for the realtime vision provider.
pub fn style_analysis_instruction() -> String {
    let styles: Vec<&str> = Style::ANALYSIS.iter().map(|s| s.as_str()).collect();
    let categories: Vec<&str> = ItemCategory::ALL.iter().map(|c| c.as_str()).collect();
    format!(
        "Analyze the person's style and the most prominent clothing item. \
Output only a JSON object with exactly three properties: \
\"color\" (string, the dominant clothing color), \
\"style\" (one of: {}), \
\"itemCategory\" (one of: {}).",
        styles.join(", "),
        categories.join(", "),
    )
}
