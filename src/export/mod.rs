//! Output tables for downstream visualization and reporting.
//!
//! Every table is keyed by stable region/category identifiers so downstream
//! joins are exact-match. Unreachable distances serialize as empty fields
//! rather than dropped rows, so "no access" stays distinguishable from
//! "not computed".

use std::io::Write;

use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde::Serialize;
use serde_json::json;

use crate::Error;
use crate::equity::{GapRecord, SiteRecommendation};
use crate::features::RegionFeatures;
use crate::model::AmenityCategory;
use crate::scoring::WalkabilityRecord;

#[derive(Serialize)]
struct DistanceRow<'a> {
    region_id: &'a str,
    category: &'static str,
    distance_m: Option<f64>,
    count_within_1km: u32,
}

/// Writes the distance feature table, one row per region × category.
///
/// # Errors
///
/// `CsvError`/`IoError` on write failure.
pub fn write_distance_features<W: Write>(
    writer: W,
    features: &[RegionFeatures],
) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for region in features {
        for category in AmenityCategory::ALL {
            let feature = region.feature(category);
            csv_writer.serialize(DistanceRow {
                region_id: &region.region_id,
                category: category.as_str(),
                distance_m: feature.distance_m,
                count_within_1km: feature.count_within_radius,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the walkability table: per-category sub-scores, composite index
/// and category label per region.
///
/// # Errors
///
/// `CsvError`/`IoError` on write failure.
pub fn write_walkability<W: Write>(
    writer: W,
    records: &[WalkabilityRecord],
) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["region_id".to_string()];
    header.extend(AmenityCategory::ALL.map(|category| format!("{category}_score")));
    header.push("walkability_index".to_string());
    header.push("walkability_category".to_string());
    csv_writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.region_id.clone()];
        row.extend(
            AmenityCategory::ALL.map(|category| format!("{:.1}", record.subscore(category))),
        );
        row.push(format!("{:.1}", record.index));
        row.push(record.category.as_str().to_string());
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes ranked gap records for one category.
///
/// # Errors
///
/// `CsvError`/`IoError` on write failure.
pub fn write_gap_records<W: Write>(writer: W, records: &[GapRecord]) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct RecommendationRow<'a> {
    region_id: &'a str,
    category: &'static str,
    longitude: f64,
    latitude: f64,
    population_served: u32,
    gap_score: f64,
}

/// Writes proposed facility sites for one category.
///
/// # Errors
///
/// `CsvError`/`IoError` on write failure.
pub fn write_recommendations<W: Write>(
    writer: W,
    category: AmenityCategory,
    sites: &[SiteRecommendation],
) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for site in sites {
        csv_writer.serialize(RecommendationRow {
            region_id: &site.region_id,
            category: category.as_str(),
            longitude: site.location.x(),
            latitude: site.location.y(),
            population_served: site.population_served,
            gap_score: site.gap_score,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Converts proposed facility sites to a `GeoJSON` `FeatureCollection` for
/// map rendering.
///
/// # Errors
///
/// `GeoJsonError` when a feature fails to assemble.
pub fn recommendations_to_geojson(
    category: AmenityCategory,
    sites: &[SiteRecommendation],
) -> Result<FeatureCollection, Error> {
    let mut features = Vec::with_capacity(sites.len());
    for site in sites {
        let geometry = Geometry::new(GeoJsonValue::from(&site.location));
        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "region_id": site.region_id,
                "category": category.as_str(),
                "population_served": site.population_served,
                "gap_score": site.gap_score,
            }
        });
        features.push(Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))?);
    }

    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

/// # Errors
///
/// `GeoJsonError` when serialization fails.
pub fn recommendations_to_geojson_string(
    category: AmenityCategory,
    sites: &[SiteRecommendation],
) -> Result<String, Error> {
    serde_json::to_string(&recommendations_to_geojson(category, sites)?)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity::SiteRecommendation;
    use geo::Point;

    fn sites() -> Vec<SiteRecommendation> {
        vec![SiteRecommendation {
            region_id: "06037206020".to_string(),
            location: Point::new(-118.2651, 34.0440),
            population_served: 5200,
            gap_score: 0.81,
        }]
    }

    #[test]
    fn recommendation_csv_has_coordinates() {
        let mut buffer = Vec::new();
        write_recommendations(&mut buffer, AmenityCategory::Parks, &sites()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with(
            "region_id,category,longitude,latitude,population_served,gap_score\n"
        ));
        assert!(text.contains("06037206020,parks,-118.2651,34.044,5200,0.81"));
    }

    #[test]
    fn geojson_features_carry_properties() {
        let collection =
            recommendations_to_geojson(AmenityCategory::GroceryStores, &sites()).unwrap();
        assert_eq!(collection.features.len(), 1);
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["category"], "grocery_stores");
        assert_eq!(properties["population_served"], 5200);
    }

    #[test]
    fn gap_rows_serialize_snake_case_categories() {
        let record = GapRecord {
            region_id: "t1".to_string(),
            category: AmenityCategory::UrgentCare,
            need_score: 0.7,
            access_score: 0.2,
            gap_score: 0.56,
        };
        let mut buffer = Vec::new();
        write_gap_records(&mut buffer, &[record]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("urgent_care"));
    }
}
