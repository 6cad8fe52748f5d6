//! CSV table ingestion

mod de;
mod raw_types;

use std::path::Path;

use geo::Point;
use hashbrown::HashSet;

pub use de::deserialize_table;
pub use raw_types::{RawAmenity, RawRegion, RawStreetEdge, RawStreetNode};

use crate::Error;
use crate::model::{Amenity, Region, SegmentRecord, StreetNode};

/// Loads the region table, sorted by region id.
///
/// # Errors
///
/// `IoError` for unreadable tables, `InvalidData` for duplicate region ids
/// or an empty table.
pub fn load_regions(path: &Path) -> Result<Vec<Region>, Error> {
    let raw: Vec<RawRegion> = deserialize_table(path)?;
    if raw.is_empty() {
        return Err(Error::InvalidData(format!(
            "region table '{}' has no parseable rows",
            path.display()
        )));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(raw.len());
    for row in &raw {
        if !seen.insert(row.region_id.as_str()) {
            return Err(Error::InvalidData(format!(
                "duplicate region id {}",
                row.region_id
            )));
        }
    }
    drop(seen);

    let mut regions: Vec<Region> = raw
        .into_iter()
        .map(|row| Region {
            centroid: Point::new(row.centroid_lon, row.centroid_lat),
            name: (!row.name.trim().is_empty()).then(|| row.name.trim().to_string()),
            // Non-positive incomes are placeholder values in the source data
            median_income: row.median_income.filter(|&income| income > 0.0),
            population: row.population,
            area_sq_km: row.area_sq_km,
            id: row.region_id,
        })
        .collect();
    regions.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(regions)
}

/// Loads the amenity table. Rows with unknown category tags are dropped at
/// the CSV layer; snapping to the street network happens later in the
/// builder.
///
/// # Errors
///
/// `IoError` for unreadable tables.
pub fn load_amenities(path: &Path) -> Result<Vec<Amenity>, Error> {
    let raw: Vec<RawAmenity> = deserialize_table(path)?;
    Ok(raw
        .into_iter()
        .map(|row| Amenity {
            category: row.amenity_type,
            geometry: Point::new(row.lon, row.lat),
            importance: row.importance_weight.unwrap_or(1.0),
            node: None,
        })
        .collect())
}

/// # Errors
///
/// `IoError` for unreadable tables.
pub fn load_street_nodes(path: &Path) -> Result<Vec<StreetNode>, Error> {
    let raw: Vec<RawStreetNode> = deserialize_table(path)?;
    Ok(raw
        .into_iter()
        .map(|row| StreetNode {
            id: row.node_id,
            geometry: Point::new(row.lon, row.lat),
        })
        .collect())
}

/// # Errors
///
/// `IoError` for unreadable tables.
pub fn load_street_segments(path: &Path) -> Result<Vec<SegmentRecord>, Error> {
    let raw: Vec<RawStreetEdge> = deserialize_table(path)?;
    Ok(raw
        .into_iter()
        .map(|row| SegmentRecord {
            from: row.from_node,
            to: row.to_node,
            length_m: row.length_m,
            oneway: row.oneway,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AmenityCategory;

    fn parse<T: for<'de> serde::Deserialize<'de>>(csv_text: &str) -> Vec<T> {
        csv::Reader::from_reader(csv_text.as_bytes())
            .deserialize()
            .filter_map(Result::ok)
            .collect()
    }

    #[test]
    fn region_rows_parse_with_missing_income() {
        let rows: Vec<RawRegion> = parse(
            "region_id,name,centroid_lon,centroid_lat,population,median_income,area_sq_km\n\
             06037101110,Sun Valley,-118.37,34.22,4521,,3.1\n\
             06037101122,,-118.30,34.20,3877,61250,2.4\n",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].median_income, None);
        assert_eq!(rows[1].median_income, Some(61_250.0));
    }

    #[test]
    fn amenity_rows_with_unknown_categories_are_dropped() {
        let rows: Vec<RawAmenity> = parse(
            "amenity_type,lon,lat,importance_weight\n\
             grocery_stores,-118.25,34.05,0.9\n\
             tattoo_parlors,-118.26,34.06,0.4\n\
             urgent_care,-118.27,34.07,\n",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amenity_type, AmenityCategory::GroceryStores);
        assert_eq!(rows[1].amenity_type, AmenityCategory::UrgentCare);
        // Empty importance is tolerated; the loader substitutes 1.0.
        assert_eq!(rows[1].importance_weight, None);
    }

    #[test]
    fn edge_rows_parse_oneway_flags() {
        let rows: Vec<RawStreetEdge> = parse(
            "from_node,to_node,length_m,oneway\n\
             1,2,85.3,\n\
             2,3,120.0,true\n\
             3,4,60.0,1\n\
             4,5,70.0,false\n",
        );
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows.iter().map(|r| r.oneway).collect::<Vec<_>>(),
            vec![false, true, true, false]
        );
    }
}
