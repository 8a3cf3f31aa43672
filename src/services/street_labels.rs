//! One label per street name, placed on that street's longest segment.

use crate::error::{AppError, Result};
use crate::models::{RoadEdge, TagValue};
use crate::osm::RoadClass;
use geo::{Centroid, LineString, Point};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct StreetLabel {
    pub name: String,
    /// The longest segment seen for this name
    pub geometry: LineString<f64>,
    /// Planar length of `geometry` in CRS units (degrees)
    pub length: f64,
    /// Readable rotation in (-90, 90]
    pub angle_deg: f64,
    /// Centroid of `geometry`
    pub anchor: Point<f64>,
}

/// Select one label per distinct street name.
///
/// Only named edges of a labelled road class qualify. For each name the
/// longest qualifying segment wins; ties keep the first seen. Edges that
/// cannot be placed are skipped without affecting the others.
pub fn select_labels(edges: &[RoadEdge]) -> HashMap<String, StreetLabel> {
    let mut labels: HashMap<String, StreetLabel> = HashMap::new();
    let mut skipped = 0usize;

    for edge in edges.iter().filter(|edge| is_label_candidate(edge)) {
        match candidate(edge) {
            Ok(label) => {
                let longer = labels
                    .get(&label.name)
                    .map_or(true, |current| label.length > current.length);
                if longer {
                    labels.insert(label.name.clone(), label);
                }
            }
            Err(e) => {
                skipped += 1;
                tracing::debug!("Skipping street label candidate {:?}: {}", edge.way_id, e);
            }
        }
    }

    tracing::info!(
        "Selected {} unique street labels ({} candidates skipped)",
        labels.len(),
        skipped
    );

    labels
}

fn is_label_candidate(edge: &RoadEdge) -> bool {
    let Some(highway) = &edge.highway else {
        return false;
    };
    edge.name.is_some()
        && RoadClass::ORDERED
            .iter()
            .filter(|class| class.is_labeled())
            .any(|class| highway.contains_token(class.token()))
}

fn candidate(edge: &RoadEdge) -> Result<StreetLabel> {
    let name = edge
        .name
        .as_ref()
        .ok_or_else(|| AppError::LabelPlacement("edge has no name".to_string()))
        .and_then(normalized_name)?;

    let line = edge
        .geometry
        .as_ref()
        .ok_or_else(|| AppError::LabelPlacement(format!("'{}' has no geometry", name)))?;

    let angle_deg = placement_angle(line)?;
    let length = planar_length(line);
    if !length.is_finite() {
        return Err(AppError::LabelPlacement(format!(
            "'{}' has a non-finite length",
            name
        )));
    }

    let anchor = line
        .centroid()
        .ok_or_else(|| AppError::LabelPlacement(format!("'{}' has no centroid", name)))?;

    Ok(StreetLabel {
        name,
        geometry: line.clone(),
        length,
        angle_deg,
        anchor,
    })
}

/// First of several concurrent names, trimmed. Blank names are rejected.
fn normalized_name(value: &TagValue) -> Result<String> {
    let name = value
        .first()
        .map(str::trim)
        .ok_or_else(|| AppError::LabelPlacement("empty name list".to_string()))?;

    if name.is_empty() {
        return Err(AppError::LabelPlacement("blank name".to_string()));
    }

    Ok(name.to_string())
}

/// Sum of segment lengths in the line's own units.
pub fn planar_length(line: &LineString<f64>) -> f64 {
    line.lines().map(|segment| segment.dx().hypot(segment.dy())).sum()
}

/// Bearing from the first to the last coordinate, normalized so text is
/// never upside-down.
pub fn placement_angle(line: &LineString<f64>) -> Result<f64> {
    let coords = &line.0;
    if coords.len() < 2 {
        return Err(AppError::LabelPlacement(format!(
            "segment has {} coordinate(s), need at least 2",
            coords.len()
        )));
    }

    let first = coords[0];
    let last = coords[coords.len() - 1];
    let angle = (last.y - first.y).atan2(last.x - first.x).to_degrees();

    if !angle.is_finite() {
        return Err(AppError::LabelPlacement(
            "segment has non-finite coordinates".to_string(),
        ));
    }

    Ok(normalize_angle(angle))
}

/// Fold an angle in degrees into (-90, 90].
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let mut angle = angle_deg % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }

    if angle > 90.0 {
        angle - 180.0
    } else if angle <= -90.0 {
        angle + 180.0
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string};

    fn horizontal(name: &str, highway: &str, length: f64) -> RoadEdge {
        RoadEdge::new(
            line_string![(x: 0.0, y: 0.0), (x: length, y: 0.0)],
            highway,
        )
        .named(name)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // -- angle normalization --

    #[test]
    fn normalizes_into_half_open_range() {
        assert_close(normalize_angle(181.0), 1.0);
        assert_close(normalize_angle(-95.0), 85.0);
        assert_close(normalize_angle(90.0), 90.0);
        assert_close(normalize_angle(-90.0), 90.0);
        assert_close(normalize_angle(180.0), 0.0);
        assert_close(normalize_angle(-180.0), 0.0);
        assert_close(normalize_angle(45.0), 45.0);
        assert_close(normalize_angle(-45.0), -45.0);
    }

    #[test]
    fn every_orientation_is_readable() {
        for step in 0..720 {
            let raw = -180.0 + step as f64 * 0.5;
            let angle = normalize_angle(raw);
            assert!(angle > -90.0 && angle <= 90.0, "{raw} -> {angle}");
        }
    }

    #[test]
    fn westward_segment_reads_left_to_right() {
        let line = line_string![(x: 1.0, y: 0.0), (x: 0.0, y: 0.0)];
        assert_close(placement_angle(&line).unwrap(), 0.0);
    }

    #[test]
    fn angle_uses_first_and_last_coordinate() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 5.0, y: -3.0), (x: 1.0, y: 1.0)];
        assert_close(placement_angle(&line).unwrap(), 45.0);
    }

    #[test]
    fn single_coordinate_cannot_be_placed() {
        let line = LineString::new(vec![coord! { x: 0.0, y: 0.0 }]);
        assert!(matches!(
            placement_angle(&line),
            Err(AppError::LabelPlacement(_))
        ));
    }

    // -- selection --

    #[test]
    fn longest_segment_wins() {
        let edges = vec![
            horizontal("Main St", "residential", 10.0),
            horizontal("Main St", "residential", 25.0),
            horizontal("Main St", "residential", 5.0),
        ];
        let labels = select_labels(&edges);
        assert_eq!(labels.len(), 1);
        let main = &labels["Main St"];
        assert_close(main.length, 25.0);
        assert_close(main.anchor.x(), 12.5);
        assert_close(main.anchor.y(), 0.0);
    }

    #[test]
    fn one_label_per_name() {
        let edges = vec![
            horizontal("Main St", "primary", 3.0),
            horizontal("Elm St", "tertiary", 2.0),
            horizontal("Main St", "secondary", 4.0),
            horizontal("Elm St", "residential", 1.0),
        ];
        let labels = select_labels(&edges);
        assert_eq!(labels.len(), 2);
        assert_close(labels["Main St"].length, 4.0);
        assert_close(labels["Elm St"].length, 2.0);
    }

    #[test]
    fn unlabeled_classes_and_unnamed_edges_are_ignored() {
        let unnamed = RoadEdge::new(line_string![(x: 0.0, y: 0.0), (x: 9.0, y: 0.0)], "primary");
        let edges = vec![
            horizontal("Garden Walk", "footway", 9.0),
            horizontal("Back Lane", "service", 9.0),
            horizontal("Trail", "path", 9.0),
            horizontal("Ring Road", "motorway", 9.0),
            unnamed,
        ];
        assert!(select_labels(&edges).is_empty());
    }

    #[test]
    fn link_roads_are_labelled() {
        let labels = select_labels(&[horizontal("Bypass", "trunk_link", 1.0)]);
        assert!(labels.contains_key("Bypass"));
    }

    #[test]
    fn multiple_names_take_first_trimmed() {
        let edge = RoadEdge::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)], "residential")
            .named(TagValue::Multiple(vec!["  Rue Haute ".into(), "Hoogstraat".into()]));
        let labels = select_labels(&[edge]);
        assert!(labels.contains_key("Rue Haute"));
        assert_close(labels["Rue Haute"].angle_deg, 45.0);
    }

    #[test]
    fn bad_edges_do_not_abort_selection() {
        let degenerate = RoadEdge::new(LineString::new(vec![coord! { x: 0.0, y: 0.0 }]), "primary")
            .named("Lonely Rd");
        let missing = RoadEdge {
            geometry: None,
            ..horizontal("Ghost St", "primary", 1.0)
        };
        let blank = horizontal("   ", "primary", 1.0);
        let empty_list = RoadEdge::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)], "primary")
            .named(TagValue::Multiple(vec![]));
        let good = horizontal("Main St", "primary", 2.0);

        let labels = select_labels(&[degenerate, missing, blank, empty_list, good]);
        assert_eq!(labels.len(), 1);
        assert!(labels.contains_key("Main St"));
    }

    #[test]
    fn equal_lengths_keep_first_seen() {
        let first = RoadEdge::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)], "residential")
            .named("Twin St");
        let second = RoadEdge::new(line_string![(x: 0.0, y: 5.0), (x: 0.0, y: 6.0)], "residential")
            .named("Twin St");
        let labels = select_labels(&[first, second]);
        assert_close(labels["Twin St"].anchor.y(), 0.0);
    }

    #[test]
    fn planar_length_sums_segments() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 10.0)];
        assert_close(planar_length(&line), 11.0);
    }
}
