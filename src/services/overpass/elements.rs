//! Overpass JSON response types and their conversion into feature records
//! and street-network edges.

use crate::models::{FeatureRecord, FeatureTable, RoadEdge, TagValue};
use geo::{Contains, Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Way geometry; entries are `null` for nodes outside the extract
    #[serde(default)]
    pub geometry: Option<Vec<Option<GeometryPoint>>>,
    #[serde(default)]
    pub members: Vec<OverpassMember>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassMember {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Option<Vec<Option<GeometryPoint>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct GeometryPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeometryPoint> for Coord<f64> {
    fn from(point: GeometryPoint) -> Self {
        Coord {
            x: point.lon,
            y: point.lat,
        }
    }
}

/// Convert every element into a feature record. Elements whose geometry
/// cannot be built are kept with `geometry: None`.
pub(crate) fn into_feature_records(elements: Vec<OverpassElement>) -> FeatureTable {
    elements
        .into_iter()
        .map(|elem| {
            let geometry = element_geometry(&elem);
            FeatureRecord {
                osm_id: Some(elem.id),
                geometry,
                tags: elem
                    .tags
                    .into_iter()
                    .map(|(k, v)| (k, TagValue::Single(v)))
                    .collect(),
            }
        })
        .collect()
}

/// Split every highway way into one edge per pair of consecutive nodes.
pub(crate) fn into_road_edges(elements: Vec<OverpassElement>) -> Vec<RoadEdge> {
    let mut edges = Vec::new();

    for elem in elements.into_iter().filter(|e| e.kind == "way") {
        let Some(highway) = elem.tags.get("highway") else {
            continue;
        };
        let Some(points) = &elem.geometry else {
            continue;
        };

        let name = elem.tags.get("name").map(|n| TagValue::from(n.as_str()));

        for pair in points.windows(2) {
            let (Some(a), Some(b)) = (pair[0], pair[1]) else {
                continue;
            };
            edges.push(RoadEdge {
                way_id: Some(elem.id),
                geometry: Some(LineString::from(vec![Coord::from(a), Coord::from(b)])),
                highway: Some(TagValue::from(highway.as_str())),
                name: name.clone(),
            });
        }
    }

    edges
}

fn element_geometry(elem: &OverpassElement) -> Option<Geometry<f64>> {
    match elem.kind.as_str() {
        "node" => match (elem.lat, elem.lon) {
            (Some(lat), Some(lon)) => Some(Geometry::Point(Point::new(lon, lat))),
            _ => None,
        },
        "way" => way_geometry(elem.geometry.as_deref()?),
        "relation" => match elem.tags.get("type").map(String::as_str) {
            Some("multipolygon") | Some("boundary") => multipolygon(&elem.members),
            _ => None,
        },
        _ => None,
    }
}

fn coords(points: &[Option<GeometryPoint>]) -> Vec<Coord<f64>> {
    points.iter().flatten().map(|p| Coord::from(*p)).collect()
}

/// Closed ways become polygons, open ways line strings.
fn way_geometry(points: &[Option<GeometryPoint>]) -> Option<Geometry<f64>> {
    let coords = coords(points);
    if coords.len() < 2 {
        return None;
    }

    let line = LineString::from(coords);
    if line.is_closed() && line.0.len() >= 4 {
        Some(Geometry::Polygon(Polygon::new(line, vec![])))
    } else {
        Some(Geometry::LineString(line))
    }
}

fn multipolygon(members: &[OverpassMember]) -> Option<Geometry<f64>> {
    let member_paths = |role: &str| -> Vec<Vec<Coord<f64>>> {
        members
            .iter()
            .filter(|m| m.kind == "way" && m.role == role)
            .filter_map(|m| m.geometry.as_deref().map(coords))
            .filter(|c| c.len() >= 2)
            .collect()
    };

    let outers = assemble_rings(member_paths("outer"));
    if outers.is_empty() {
        return None;
    }

    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> =
        outers.into_iter().map(|ring| (ring, Vec::new())).collect();

    for inner in assemble_rings(member_paths("inner")) {
        let Some(probe) = inner.0.first().map(|c| Point::from(*c)) else {
            continue;
        };
        if let Some((_, holes)) = polygons
            .iter_mut()
            .find(|(outer, _)| Polygon::new(outer.clone(), vec![]).contains(&probe))
        {
            holes.push(inner);
        }
    }

    let polygons: Vec<Polygon<f64>> = polygons
        .into_iter()
        .map(|(exterior, holes)| Polygon::new(exterior, holes))
        .collect();

    Some(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
}

/// Join way paths end-to-end into closed rings. Paths that cannot be
/// closed are dropped.
pub(crate) fn assemble_rings(mut paths: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut rings = Vec::new();

    while let Some(mut current) = paths.pop() {
        loop {
            if current.len() >= 4 && current.first() == current.last() {
                rings.push(LineString::from(current));
                break;
            }

            let Some(&tail) = current.last() else {
                break;
            };
            let next = paths
                .iter()
                .position(|p| p.first() == Some(&tail) || p.last() == Some(&tail));

            match next {
                Some(idx) => {
                    let mut path = paths.swap_remove(idx);
                    if path.first() != Some(&tail) {
                        path.reverse();
                    }
                    current.extend(path.into_iter().skip(1));
                }
                None => {
                    tracing::debug!("Dropping unclosed ring with {} nodes", current.len());
                    break;
                }
            }
        }
    }

    rings
}
