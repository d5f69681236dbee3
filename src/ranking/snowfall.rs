use serde::{Deserialize, Serialize};

use crate::models::{Result, TierBoardError, TierCode, TierFamily};

pub const MIN_SUBSCORE: f64 = 0.0;
pub const MAX_SUBSCORE: f64 = 100.0;

/// Inclusive lower bounds, highest first.
pub const SNOWFALL_LADDER: [(f64, TierCode); 12] = [
    (97.0, TierCode::ranked(TierFamily::High, 1)),
    (93.0, TierCode::ranked(TierFamily::Middle, 1)),
    (89.0, TierCode::ranked(TierFamily::Low, 1)),
    (84.0, TierCode::ranked(TierFamily::High, 2)),
    (80.0, TierCode::ranked(TierFamily::Middle, 2)),
    (76.0, TierCode::ranked(TierFamily::Low, 2)),
    (71.0, TierCode::ranked(TierFamily::High, 3)),
    (67.0, TierCode::ranked(TierFamily::Middle, 3)),
    (63.0, TierCode::ranked(TierFamily::Low, 3)),
    (58.0, TierCode::ranked(TierFamily::High, 4)),
    (54.0, TierCode::ranked(TierFamily::Middle, 4)),
    (50.0, TierCode::ranked(TierFamily::Low, 4)),
];

/// The five sub-skill scores of a snowfall evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub playstyle: f64,
    pub movement: f64,
    pub pvp: f64,
    pub building: f64,
    pub projectiles: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnowfallResult {
    /// Full-precision mean, used for classification.
    pub overall: f64,
    pub tier: TierCode,
}

impl SnowfallResult {
    /// Mean rounded to one decimal place.
    pub fn overall_display(&self) -> f64 {
        (self.overall * 10.0).round() / 10.0
    }
}

impl SubScores {
    pub fn new(playstyle: f64, movement: f64, pvp: f64, building: f64, projectiles: f64) -> Self {
        Self { playstyle, movement, pvp, building, projectiles }
    }

    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("playstyle", self.playstyle),
            ("movement", self.movement),
            ("pvp", self.pvp),
            ("building", self.building),
            ("projectiles", self.projectiles),
        ]
    }

    /// Every sub-score must be a whole number in `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named() {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(TierBoardError::Validation(format!(
                    "{} must be a whole number",
                    name
                )));
            }
            if !(MIN_SUBSCORE..=MAX_SUBSCORE).contains(&value) {
                return Err(TierBoardError::Validation(format!(
                    "{} must be between {} and {}",
                    name, MIN_SUBSCORE, MAX_SUBSCORE
                )));
            }
        }
        Ok(())
    }

    pub fn mean(&self) -> f64 {
        let values = self.named();
        values.iter().map(|(_, v)| v).sum::<f64>() / values.len() as f64
    }
}

pub struct SnowfallTierCalculator;

impl SnowfallTierCalculator {
    pub fn calculate(scores: &SubScores) -> Result<SnowfallResult> {
        scores.validate()?;

        let overall = scores.mean();
        Ok(SnowfallResult {
            overall,
            tier: Self::tier_for(overall),
        })
    }

    pub fn tier_for(overall: f64) -> TierCode {
        SNOWFALL_LADDER
            .iter()
            .find(|(floor, _)| overall >= *floor)
            .map(|(_, code)| *code)
            .unwrap_or(TierCode::NotRanked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: f64) -> SubScores {
        SubScores::new(value, value, value, value, value)
    }

    #[test]
    fn test_uniform_scores() {
        let result = SnowfallTierCalculator::calculate(&uniform(97.0)).unwrap();
        assert_eq!(result.overall_display(), 97.0);
        assert_eq!(result.tier.to_string(), "HT1");

        let result = SnowfallTierCalculator::calculate(&uniform(50.0)).unwrap();
        assert_eq!(result.overall_display(), 50.0);
        assert_eq!(result.tier.to_string(), "LT4");

        let result = SnowfallTierCalculator::calculate(&uniform(10.0)).unwrap();
        assert_eq!(result.overall_display(), 10.0);
        assert_eq!(result.tier, TierCode::NotRanked);
    }

    #[test]
    fn test_classification_uses_full_precision() {
        // mean 96.8 rounds to 96.8 for display, still MT1
        let scores = SubScores::new(97.0, 97.0, 97.0, 97.0, 96.0);
        let result = SnowfallTierCalculator::calculate(&scores).unwrap();
        assert_eq!(result.overall_display(), 96.8);
        assert_eq!(result.tier.to_string(), "MT1");

        // 49.96 displays as 50.0 but sits below the LT4 floor
        assert_eq!(SnowfallTierCalculator::tier_for(49.96), TierCode::NotRanked);
    }

    #[test]
    fn test_ladder_boundaries_are_inclusive() {
        for (floor, code) in SNOWFALL_LADDER {
            assert_eq!(SnowfallTierCalculator::tier_for(floor), code);
        }
        assert_eq!(SnowfallTierCalculator::tier_for(100.0).to_string(), "HT1");
        assert_eq!(SnowfallTierCalculator::tier_for(92.99).to_string(), "LT1");
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        assert!(SnowfallTierCalculator::calculate(&SubScores::new(101.0, 50.0, 50.0, 50.0, 50.0)).is_err());
        assert!(SnowfallTierCalculator::calculate(&SubScores::new(50.0, -1.0, 50.0, 50.0, 50.0)).is_err());
        assert!(SnowfallTierCalculator::calculate(&SubScores::new(50.0, 50.0, 50.5, 50.0, 50.0)).is_err());
        assert!(SnowfallTierCalculator::calculate(&SubScores::new(50.0, 50.0, 50.0, f64::NAN, 50.0)).is_err());
        assert!(SnowfallTierCalculator::calculate(&uniform(0.0)).is_ok());
        assert!(SnowfallTierCalculator::calculate(&uniform(100.0)).is_ok());
    }

    #[test]
    fn test_error_names_the_field() {
        let err = SnowfallTierCalculator::calculate(&SubScores::new(50.0, 50.0, 50.0, 50.0, 120.0))
            .unwrap_err();
        assert!(err.to_string().contains("projectiles"));
    }
}
