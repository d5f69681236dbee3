use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TierBoardError;

/// Competitive formats tracked on the board.
///
/// Declaration order is the canonical display order, so the derived `Ord`
/// keeps ordered maps in that order as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "Crystal")]
    Crystal,
    #[serde(rename = "skywars")]
    Skywars,
    #[serde(rename = "midfight")]
    Midfight,
    #[serde(rename = "bridge")]
    Bridge,
    #[serde(rename = "UHC")]
    Uhc,
    #[serde(rename = "sumo")]
    Sumo,
    #[serde(rename = "nodebuff")]
    Nodebuff,
    #[serde(rename = "bedfight")]
    Bedfight,
}

impl GameMode {
    pub const ALL: [GameMode; 8] = [
        GameMode::Crystal,
        GameMode::Skywars,
        GameMode::Midfight,
        GameMode::Bridge,
        GameMode::Uhc,
        GameMode::Sumo,
        GameMode::Nodebuff,
        GameMode::Bedfight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Crystal => "Crystal",
            GameMode::Skywars => "skywars",
            GameMode::Midfight => "midfight",
            GameMode::Bridge => "bridge",
            GameMode::Uhc => "UHC",
            GameMode::Sumo => "sumo",
            GameMode::Nodebuff => "nodebuff",
            GameMode::Bedfight => "bedfight",
        }
    }

    /// Stored rows use mixed casing, so every comparison ignores case.
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = TierBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.matches(s))
            .ok_or_else(|| TierBoardError::UnknownGameMode(s.to_string()))
    }
}
