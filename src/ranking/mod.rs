pub mod aggregate;
pub mod color;
pub mod pagination;
pub mod rank;
pub mod snowfall;

pub use aggregate::{GamemodeTierAggregator, ModeTier, TierLookup};
pub use color::{ColorToken, TierColorResolver};
pub use pagination::{PaginationState, Paginator};
pub use rank::{RankClassifier, RankTier, RANK_TIERS};
pub use snowfall::{SnowfallResult, SnowfallTierCalculator, SubScores};
