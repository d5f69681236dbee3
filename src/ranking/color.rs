use serde::{Deserialize, Serialize};

use crate::models::TierFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Gold,
    Silver,
    Bronze,
    Emerald,
    Slate,
    Neutral,
}

impl ColorToken {
    pub fn hex(&self) -> &'static str {
        match self {
            ColorToken::Gold => "#facc15",
            ColorToken::Silver => "#cbd5e1",
            ColorToken::Bronze => "#d97706",
            ColorToken::Emerald => "#10b981",
            ColorToken::Slate => "#64748b",
            ColorToken::Neutral => "#6b7280",
        }
    }
}

// Checked in order; the first digit found decides the color.
const LEVEL_COLORS: [(&str, ColorToken); 5] = [
    ("1", ColorToken::Gold),
    ("2", ColorToken::Silver),
    ("3", ColorToken::Bronze),
    ("4", ColorToken::Emerald),
    ("5", ColorToken::Slate),
];

pub struct TierColorResolver;

impl TierColorResolver {
    /// Color for a raw tier code. Codes outside the HT/MT/LT families, or
    /// without a level digit, get [`ColorToken::Neutral`].
    pub fn color_for(tier_code: &str) -> ColorToken {
        let code = tier_code.trim();

        if TierFamily::from_prefix(code).is_none() {
            return ColorToken::Neutral;
        }

        LEVEL_COLORS
            .iter()
            .find(|(marker, _)| code[2..].contains(marker))
            .map(|(_, color)| *color)
            .unwrap_or(ColorToken::Neutral)
    }
}
