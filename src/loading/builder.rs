use geo::{ConvexHull, Intersects, MultiPoint};
use log::info;
use rayon::prelude::*;

use super::config::StudyAreaConfig;
use super::tables;
use crate::Error;
use crate::model::{AmenityCategory, AmenityIndex, Region, StreetGraph, StudyArea};

/// Builds the immutable study area from the configured input tables.
///
/// The street network loads on its own thread while the region and amenity
/// tables load on the caller thread; amenities are snapped to the network
/// before the model is handed out so routing never re-resolves them.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a table cannot be
/// read, or the street network fails connectivity validation.
pub fn create_study_area(config: &StudyAreaConfig) -> Result<StudyArea, Error> {
    validate_config(config)?;

    info!(
        "Processing street network tables: {} / {}",
        config.nodes_path.display(),
        config.edges_path.display()
    );

    let nodes_path = config.nodes_path.clone();
    let edges_path = config.edges_path.clone();
    let min_component_share = config.min_component_share;
    let graph_handle = std::thread::spawn(move || -> Result<StreetGraph, Error> {
        let nodes = tables::load_street_nodes(&nodes_path)?;
        let segments = tables::load_street_segments(&edges_path)?;
        info!(
            "Street network: {} nodes, {} segments",
            nodes.len(),
            segments.len()
        );
        StreetGraph::build(nodes, &segments, min_component_share)
    });

    info!("Processing region and amenity tables");
    let regions = tables::load_regions(&config.regions_path)?;
    let amenities = tables::load_amenities(&config.amenities_path)?;
    info!(
        "Loaded {} regions and {} amenities",
        regions.len(),
        amenities.len()
    );

    let street_graph = graph_handle
        .join()
        .map_err(|_| Error::UnrecoverableError("street network loading thread panicked"))??;

    let mut amenity_index = AmenityIndex::build(amenities);
    snap_amenities(&mut amenity_index, &street_graph, config.snap_radius_m);
    for category in AmenityCategory::ALL {
        if amenity_index.category_len(category) == 0 {
            // Non-fatal: every region scores the minimum for this category
            log::warn!("{}", Error::EmptyCategory(category));
        }
    }

    validate_region_coverage(&street_graph, &regions);

    info!("Study area model created successfully");
    // Large transient allocations from CSV parsing are not always released
    // back to the system; return free memory from the tail of the heap.
    //
    // # Safety
    //
    // This call is safe to use on linux with glibc implementation
    // which is checked by the cfg attribute in compile time.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::warn!("Memory trimming failed - continuing anyway");
        } else {
            log::debug!("Successfully trimmed unused heap memory");
        }
    }

    Ok(StudyArea {
        street_graph,
        amenity_index,
        regions,
    })
}

fn validate_config(config: &StudyAreaConfig) -> Result<(), Error> {
    for (label, path) in [
        ("region table", &config.regions_path),
        ("amenity table", &config.amenities_path),
        ("street node table", &config.nodes_path),
        ("street edge table", &config.edges_path),
    ] {
        if !path.exists() {
            return Err(Error::InvalidData(format!(
                "{label} not found: {}",
                path.display()
            )));
        }
    }

    if !(config.min_component_share > 0.0 && config.min_component_share <= 1.0) {
        return Err(Error::InvalidData(format!(
            "min_component_share must be in (0, 1], got {}",
            config.min_component_share
        )));
    }
    if !(config.snap_radius_m > 0.0) {
        return Err(Error::InvalidData(format!(
            "snap_radius_m must be positive, got {}",
            config.snap_radius_m
        )));
    }

    Ok(())
}

/// Snap amenities to their nearest street nodes in parallel. Amenities
/// beyond `snap_radius_m` keep `node = None` and stay unreachable for
/// routing, which is reported per category downstream.
fn snap_amenities(index: &mut AmenityIndex, streets: &StreetGraph, snap_radius_m: f64) {
    let snapped: Vec<_> = index
        .amenities()
        .par_iter()
        .map(|amenity| {
            streets
                .nearest_node(&amenity.geometry)
                .and_then(|(node, offset)| (offset <= snap_radius_m).then_some(node))
        })
        .collect();

    let unsnapped = snapped.iter().filter(|node| node.is_none()).count();
    for (amenity, node) in index.amenities_mut().iter_mut().zip(snapped) {
        amenity.node = node;
    }

    if unsnapped > 0 {
        log::warn!(
            "{unsnapped} amenities are more than {snap_radius_m} m from the street network \
             and will be unreachable for routing"
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn validate_region_coverage(streets: &StreetGraph, regions: &[Region]) {
    let graph_nodes: MultiPoint = streets
        .graph
        .node_weights()
        .map(|node| node.geometry)
        .collect();
    let graph_hull = graph_nodes.convex_hull();

    let centroids_outside_hull = regions
        .iter()
        .filter(|region| !region.centroid.intersects(&graph_hull))
        .count();

    let total = regions.len();
    let percentage = (centroids_outside_hull as f64 / total as f64) * 100.0;
    if centroids_outside_hull > 0 {
        log::warn!(
            "{centroids_outside_hull} of {total} region centroids ({percentage:.1}%) are outside \
        the street network coverage area. Their distance features will be unreachable. \
        Consider using a larger network extract that covers all regions."
        );
    }
}
