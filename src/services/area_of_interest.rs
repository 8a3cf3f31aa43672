use crate::error::{AppError, Result};
use crate::models::{AreaOfInterest, BoundingBox, GeometryCollection};
use geo::{BoundingRect, CoordsIter, Geometry};

/// Compute the padded area of interest around every input geometry.
///
/// Geometries are reprojected to geographic coordinates first. Geometries
/// that are empty or carry non-finite coordinates do not contribute to the
/// bounds; if none remain the collection is rejected. A coordinate outside
/// longitude [-180, 180] or latitude [-90, 90] rejects the whole collection.
pub fn build(collection: &GeometryCollection, padding: f64) -> Result<AreaOfInterest> {
    if !padding.is_finite() || padding <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "Padding must be a positive number of degrees, got {}",
            padding
        )));
    }

    if collection.is_empty() {
        return Err(AppError::InvalidInput(
            "GeoJSON contains no features with geometry".to_string(),
        ));
    }

    let bounds = collection
        .features
        .iter()
        .map(|feature| {
            let geometry = collection.crs.geometry_to_geographic(&feature.geometry);
            finite_bounds(&geometry)
        })
        .collect::<Result<Vec<_>>>()?;

    let tight = bounds
        .into_iter()
        .flatten()
        .reduce(|acc, bbox| acc.union(&bbox))
        .ok_or_else(|| {
            AppError::InvalidInput("GeoJSON contains no geometry with finite coordinates".to_string())
        })?;

    let padded = tight.padded(padding);
    if !padded.is_valid() {
        return Err(AppError::InvalidInput(format!(
            "Degenerate area of interest: {:?}",
            padded
        )));
    }

    tracing::info!(
        west = padded.west,
        south = padded.south,
        east = padded.east,
        north = padded.north,
        "Bounding box: West={:.6}, South={:.6}, East={:.6}, North={:.6}",
        padded.west,
        padded.south,
        padded.east,
        padded.north
    );

    Ok(AreaOfInterest::from_bbox(padded))
}

fn finite_bounds(geometry: &Geometry<f64>) -> Result<Option<BoundingBox>> {
    if geometry
        .coords_iter()
        .any(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        tracing::warn!("Ignoring geometry with non-finite coordinates");
        return Ok(None);
    }

    if let Some(c) = geometry
        .coords_iter()
        .find(|c| c.x.abs() > 180.0 || c.y.abs() > 90.0)
    {
        return Err(AppError::InvalidInput(format!(
            "Coordinate ({}, {}) is outside longitude/latitude range",
            c.x, c.y
        )));
    }

    Ok(geometry.bounding_rect().map(BoundingBox::from_rect))
}
