pub use crate::{
    DEFAULT_CANDIDATES, DEFAULT_COUNT_RADIUS_M, DEFAULT_SEARCH_CUTOFF_M, DEFAULT_SNAP_RADIUS_M,
    Length,
};

// Re-export key components
pub use crate::error::Error;
pub use crate::loading::{StudyAreaConfig, create_study_area};
pub use crate::model::{Amenity, AmenityCategory, AmenityIndex, Region, StreetGraph, StudyArea};

// Distance features and scoring
pub use crate::features::{
    DistanceFeature, RegionFeatures, RoutingParams, build_distance_features,
    resume_distance_features,
};
pub use crate::scoring::{
    ScoreCurve, ScoringConfig, WalkabilityCategory, WalkabilityRecord, score_regions,
};

// Equity gap analysis
pub use crate::equity::{
    EquityGapAnalyzer, GapFormula, GapRecord, MultiplicativeGap, NeedWeights, SiteRecommendation,
};
