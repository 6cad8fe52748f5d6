use geo::Point;

/// Polygon-backed analysis unit (census tract or aggregated neighborhood).
///
/// Created once from the preprocessed region table and never mutated;
/// downstream stages key their outputs by `id`.
#[derive(Debug, Clone)]
pub struct Region {
    /// Stable identifier (GEOID or neighborhood id).
    pub id: String,
    /// Human-readable name, when the source table carries one.
    pub name: Option<String>,
    /// Representative point used for routing, WGS84 lon/lat.
    pub centroid: Point<f64>,
    pub population: u32,
    /// `None` where the source value is missing or non-positive.
    pub median_income: Option<f64>,
    pub area_sq_km: f64,
}

impl Region {
    /// Persons per square kilometer, 0.0 for degenerate areas.
    pub fn population_density(&self) -> f64 {
        if self.area_sq_km > 0.0 {
            f64::from(self.population) / self.area_sq_km
        } else {
            0.0
        }
    }
}
