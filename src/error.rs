use thiserror::Error;

use crate::model::AmenityCategory;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no street node within {radius_m} m of ({x:.5}, {y:.5})")]
    UnresolvableLocation { x: f64, y: f64, radius_m: f64 },
    #[error(
        "street network is too fragmented: largest component covers {share:.1}% of nodes \
         (minimum {required:.1}%)"
    )]
    DisconnectedGraph { share: f64, required: f64 },
    #[error("weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },
    #[error("no amenities loaded for category '{0}'")]
    EmptyCategory(AmenityCategory),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Unrecoverable error: {0}")]
    UnrecoverableError(&'static str),
}
