//! This module is responsible for loading the preprocessed input tables
//! (regions, amenities, street network) and building an immutable study
//! area model.

mod builder;
mod config;
pub mod tables;

pub use builder::create_study_area;
pub use config::StudyAreaConfig;
