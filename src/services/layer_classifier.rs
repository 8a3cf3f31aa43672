//! Filters fetched OSM tables down to drawable geometries and attaches
//! their static styles.

use crate::models::{FeatureRecord, RoadEdge, StyledGeometry};
use crate::osm::{LayerKind, RoadClass};
use geo::Geometry;

/// Classify one fetched feature table for the given layer.
///
/// Area layers keep only polygonal geometries. The road layer views each
/// record as an edge and delegates to [`classify_roads`]. An empty table
/// yields an empty draw set.
pub fn classify(table: &[FeatureRecord], kind: LayerKind) -> Vec<StyledGeometry> {
    match kind.area_style() {
        Some(style) => {
            let styled: Vec<StyledGeometry> = table
                .iter()
                .filter(|record| record.is_polygonal())
                .filter_map(|record| record.geometry.clone())
                .map(|geometry| StyledGeometry { geometry, style })
                .collect();

            tracing::debug!(
                "Classified {} of {} {} features as polygonal",
                styled.len(),
                table.len(),
                kind
            );
            styled
        }
        None => {
            let edges: Vec<RoadEdge> = table.iter().filter_map(RoadEdge::from_record).collect();
            classify_roads(&edges)
                .into_iter()
                .map(|(_, styled)| styled)
                .collect()
        }
    }
}

/// Style road edges class by class, in [`RoadClass::ORDERED`] order.
///
/// Every edge whose `highway` value contains a class token is emitted for
/// that class, so an edge matching several tokens appears once per match
/// and the later match is drawn over the earlier one. Edges without a
/// geometry or `highway` tag are dropped.
pub fn classify_roads(edges: &[RoadEdge]) -> Vec<(RoadClass, StyledGeometry)> {
    let mut styled = Vec::new();

    for class in RoadClass::ORDERED {
        let style = class.style();
        let before = styled.len();

        for edge in edges {
            let (Some(highway), Some(line)) = (&edge.highway, &edge.geometry) else {
                continue;
            };
            if highway.contains_token(class.token()) {
                styled.push((
                    class,
                    StyledGeometry {
                        geometry: Geometry::LineString(line.clone()),
                        style,
                    },
                ));
            }
        }

        if styled.len() > before {
            tracing::debug!("Road class {}: {} edges", class, styled.len() - before);
        }
    }

    styled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagValue;
    use geo::{line_string, point, polygon, MultiPolygon};

    fn square() -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ])
    }

    fn edge(highway: &str) -> RoadEdge {
        RoadEdge::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)], highway)
    }

    #[test]
    fn empty_table_yields_empty_draw_set() {
        for kind in [
            LayerKind::Buildings,
            LayerKind::Water,
            LayerKind::GreenSpace,
            LayerKind::Roads,
        ] {
            assert!(classify(&[], kind).is_empty());
        }
        assert!(classify_roads(&[]).is_empty());
    }

    #[test]
    fn area_layers_keep_only_polygons() {
        let table = vec![
            FeatureRecord::new(square()).with_tag("building", "yes"),
            FeatureRecord::new(Geometry::MultiPolygon(MultiPolygon::new(vec![]))),
            FeatureRecord::new(Geometry::Point(point!(x: 0.5, y: 0.5))).with_tag("building", "yes"),
            FeatureRecord::new(Geometry::LineString(line_string![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 1.0),
            ])),
            FeatureRecord {
                osm_id: Some(7),
                geometry: None,
                tags: Default::default(),
            },
        ];

        let styled = classify(&table, LayerKind::Buildings);
        assert_eq!(styled.len(), 2);
        assert!(styled.iter().all(|s| s.style.z_order == 2));
    }

    #[test]
    fn water_uses_water_style() {
        let styled = classify(&[FeatureRecord::new(square())], LayerKind::Water);
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].style, LayerKind::Water.area_style().unwrap());
    }

    #[test]
    fn roads_are_emitted_in_class_order() {
        let edges = vec![edge("path"), edge("residential"), edge("motorway")];
        let classes: Vec<RoadClass> = classify_roads(&edges).into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            classes,
            vec![RoadClass::Motorway, RoadClass::Residential, RoadClass::Path]
        );
    }

    #[test]
    fn substring_match_draws_edge_once_per_matching_class() {
        // "footway" and "path" both occur in a multi-valued highway tag
        let mixed = RoadEdge {
            highway: Some(TagValue::Multiple(vec!["footway".into(), "path".into()])),
            ..edge("unused")
        };
        let classes: Vec<RoadClass> = classify_roads(&[mixed])
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(classes, vec![RoadClass::Footway, RoadClass::Path]);
    }

    #[test]
    fn link_roads_match_their_parent_class() {
        let styled = classify_roads(&[edge("Primary_Link")]);
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].0, RoadClass::Primary);
        assert_eq!(styled[0].1.style, RoadClass::Primary.style());
    }

    #[test]
    fn unclassified_and_untagged_edges_are_not_drawn() {
        let untagged = RoadEdge {
            highway: None,
            ..edge("residential")
        };
        let no_geometry = RoadEdge {
            geometry: None,
            ..edge("residential")
        };
        assert!(classify_roads(&[edge("unclassified"), untagged, no_geometry]).is_empty());
    }

    #[test]
    fn road_records_go_through_edge_view() {
        let table = vec![
            FeatureRecord::new(Geometry::LineString(line_string![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
            ]))
            .with_tag("highway", "secondary"),
            FeatureRecord::new(square()).with_tag("highway", "pedestrian"),
        ];
        let styled = classify(&table, LayerKind::Roads);
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].style.z_order, 4);
    }
}
