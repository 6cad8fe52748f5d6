//! Distance-to-score curve, validated weighting configuration and the
//! composite walkability index.

pub mod config;
pub mod curve;
pub mod walkability;

pub use config::ScoringConfig;
pub use curve::ScoreCurve;
pub use walkability::{WalkabilityCategory, WalkabilityRecord, score_regions};
