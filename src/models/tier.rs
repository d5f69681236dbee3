use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TierBoardError;

/// Sub-tier prefix of a tier code: High, Middle or Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierFamily {
    High,
    Middle,
    Low,
}

impl TierFamily {
    pub fn prefix(&self) -> &'static str {
        match self {
            TierFamily::High => "HT",
            TierFamily::Middle => "MT",
            TierFamily::Low => "LT",
        }
    }

    pub fn from_prefix(code: &str) -> Option<Self> {
        let head = code.get(..2)?;
        if head.eq_ignore_ascii_case("HT") {
            Some(TierFamily::High)
        } else if head.eq_ignore_ascii_case("MT") {
            Some(TierFamily::Middle)
        } else if head.eq_ignore_ascii_case("LT") {
            Some(TierFamily::Low)
        } else {
            None
        }
    }
}

/// A per-gamemode skill bracket such as `HT1` or `LT4`.
///
/// Serialized as its display string so stored rows and JSON bodies carry
/// the same vocabulary the community uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TierCode {
    Ranked { family: TierFamily, level: u8 },
    Retired,
    NotRanked,
}

impl TierCode {
    pub const MAX_LEVEL: u8 = 5;

    pub const fn ranked(family: TierFamily, level: u8) -> Self {
        TierCode::Ranked { family, level }
    }
}

impl fmt::Display for TierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierCode::Ranked { family, level } => write!(f, "{}{}", family.prefix(), level),
            TierCode::Retired => f.write_str("Retired"),
            TierCode::NotRanked => f.write_str("Not Ranked"),
        }
    }
}

impl FromStr for TierCode {
    type Err = TierBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_lowercase();

        match lowered.as_str() {
            "retired" => return Ok(TierCode::Retired),
            "not ranked" | "no rank" | "unranked" => return Ok(TierCode::NotRanked),
            _ => {}
        }

        let family = TierFamily::from_prefix(trimmed)
            .ok_or_else(|| TierBoardError::UnknownTierCode(s.to_string()))?;
        let level: u8 = trimmed[2..]
            .parse()
            .map_err(|_| TierBoardError::UnknownTierCode(s.to_string()))?;

        if !(1..=Self::MAX_LEVEL).contains(&level) {
            return Err(TierBoardError::UnknownTierCode(s.to_string()));
        }

        Ok(TierCode::Ranked { family, level })
    }
}

impl TryFrom<String> for TierCode {
    type Error = TierBoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TierCode> for String {
    fn from(code: TierCode) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!("HT1".parse::<TierCode>().unwrap(), TierCode::ranked(TierFamily::High, 1));
        assert_eq!("mt3".parse::<TierCode>().unwrap(), TierCode::ranked(TierFamily::Middle, 3));
        assert_eq!("LT5".parse::<TierCode>().unwrap(), TierCode::ranked(TierFamily::Low, 5));
        assert_eq!("Retired".parse::<TierCode>().unwrap(), TierCode::Retired);
        assert_eq!("No Rank".parse::<TierCode>().unwrap(), TierCode::NotRanked);
        assert_eq!("Not Ranked".parse::<TierCode>().unwrap(), TierCode::NotRanked);
    }

    #[test]
    fn test_parse_rejects_out_of_vocabulary() {
        assert!("HT0".parse::<TierCode>().is_err());
        assert!("HT6".parse::<TierCode>().is_err());
        assert!("XT1".parse::<TierCode>().is_err());
        assert!("H".parse::<TierCode>().is_err());
        assert!("".parse::<TierCode>().is_err());
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(TierCode::ranked(TierFamily::Middle, 2).to_string(), "MT2");
        assert_eq!(TierCode::NotRanked.to_string(), "Not Ranked");
        assert_eq!(serde_json::to_string(&TierCode::ranked(TierFamily::High, 4)).unwrap(), "\"HT4\"");
    }
}
