//! Amenity categories and the per-category spatial index

use std::fmt;

use geo::{Distance, Haversine, Point};
use petgraph::graph::NodeIndex;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

/// The eight essential-service categories tracked by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityCategory {
    Parks,
    GroceryStores,
    Hospitals,
    Schools,
    TransitStops,
    Pharmacies,
    Libraries,
    UrgentCare,
}

impl AmenityCategory {
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Parks,
        Self::GroceryStores,
        Self::Hospitals,
        Self::Schools,
        Self::TransitStops,
        Self::Pharmacies,
        Self::Libraries,
        Self::UrgentCare,
    ];

    /// Tag used in input/output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parks => "parks",
            Self::GroceryStores => "grocery_stores",
            Self::Hospitals => "hospitals",
            Self::Schools => "schools",
            Self::TransitStops => "transit_stops",
            Self::Pharmacies => "pharmacies",
            Self::Libraries => "libraries",
            Self::UrgentCare => "urgent_care",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AmenityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point amenity, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Amenity {
    pub category: AmenityCategory,
    /// WGS84 lon/lat.
    pub geometry: Point<f64>,
    /// Relative importance carried through from the source table.
    pub importance: f64,
    /// Street node the amenity snaps to; `None` if it lies beyond the snap
    /// radius and is therefore unreachable by network routing.
    pub node: Option<NodeIndex>,
}

type IndexedAmenity = GeomWithData<Point<f64>, usize>;

/// Amenity locations partitioned by category, each behind an R-tree for
/// nearest-candidate retrieval.
#[derive(Debug, Clone)]
pub struct AmenityIndex {
    amenities: Vec<Amenity>,
    trees: Vec<RTree<IndexedAmenity>>,
}

impl AmenityIndex {
    pub fn build(amenities: Vec<Amenity>) -> Self {
        let mut per_category: Vec<Vec<IndexedAmenity>> = vec![Vec::new(); AmenityCategory::COUNT];
        for (id, amenity) in amenities.iter().enumerate() {
            per_category[amenity.category.index()].push(GeomWithData::new(amenity.geometry, id));
        }

        let trees = per_category.into_iter().map(RTree::bulk_load).collect();
        Self { amenities, trees }
    }

    pub fn len(&self) -> usize {
        self.amenities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amenities.is_empty()
    }

    pub fn category_len(&self, category: AmenityCategory) -> usize {
        self.trees[category.index()].size()
    }

    pub fn amenity(&self, id: usize) -> &Amenity {
        &self.amenities[id]
    }

    pub fn amenities(&self) -> &[Amenity] {
        &self.amenities
    }

    pub(crate) fn amenities_mut(&mut self) -> &mut [Amenity] {
        &mut self.amenities
    }

    pub(crate) fn tree(&self, category: AmenityCategory) -> &RTree<IndexedAmenity> {
        &self.trees[category.index()]
    }

    /// Geodesic distance in meters from `point` to the closest amenity of
    /// `category`, `None` when the category is empty.
    pub fn nearest_in_category(
        &self,
        point: &Point<f64>,
        category: AmenityCategory,
    ) -> Option<(usize, f64)> {
        // The R-tree orders by planar lon/lat distance; re-rank a few
        // neighbors by haversine to absorb latitude distortion.
        self.tree(category)
            .nearest_neighbor_iter(point)
            .take(4)
            .map(|obj| (obj.data, Haversine.distance(*obj.geom(), *point)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amenity(category: AmenityCategory, lon: f64, lat: f64) -> Amenity {
        Amenity {
            category,
            geometry: Point::new(lon, lat),
            importance: 1.0,
            node: None,
        }
    }

    #[test]
    fn categories_round_trip_their_table_tags() {
        for category in AmenityCategory::ALL {
            let tag = format!("\"{category}\"");
            let parsed: AmenityCategory = serde_json::from_str(&tag).unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn index_partitions_by_category() {
        let index = AmenityIndex::build(vec![
            amenity(AmenityCategory::Parks, -118.25, 34.05),
            amenity(AmenityCategory::Parks, -118.26, 34.06),
            amenity(AmenityCategory::Libraries, -118.24, 34.04),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.category_len(AmenityCategory::Parks), 2);
        assert_eq!(index.category_len(AmenityCategory::Libraries), 1);
        assert_eq!(index.category_len(AmenityCategory::Hospitals), 0);
    }

    #[test]
    fn nearest_in_category_returns_geodesic_meters() {
        let index = AmenityIndex::build(vec![
            amenity(AmenityCategory::Parks, -118.25, 34.05),
            amenity(AmenityCategory::Parks, -118.30, 34.05),
        ]);

        let origin = Point::new(-118.2501, 34.05);
        let (id, meters) = index
            .nearest_in_category(&origin, AmenityCategory::Parks)
            .unwrap();
        assert_eq!(id, 0);
        // ~0.0001 degrees of longitude at 34°N is roughly 9 m.
        assert!(meters < 20.0, "got {meters}");
    }

    #[test]
    fn empty_category_has_no_nearest() {
        let index = AmenityIndex::build(Vec::new());
        let origin = Point::new(-118.25, 34.05);
        assert!(
            index
                .nearest_in_category(&origin, AmenityCategory::UrgentCare)
                .is_none()
        );
    }
}
