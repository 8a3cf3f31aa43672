use geo::{Geometry, LineString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An OSM tag value. Merged ways can carry several concurrent values
/// (e.g. two names for one street), so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Single(String),
    Multiple(Vec<String>),
}

impl TagValue {
    /// First value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::Single(value) => Some(value.as_str()),
            TagValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// Case-insensitive substring match of `token` against any value.
    /// `"primary_link"` contains `"primary"`; `["residential", "service"]`
    /// contains both `"residential"` and `"service"`.
    pub fn contains_token(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        match self {
            TagValue::Single(value) => value.to_lowercase().contains(&token),
            TagValue::Multiple(values) => values
                .iter()
                .any(|value| value.to_lowercase().contains(&token)),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Single(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Single(value)
    }
}

/// One OSM element as returned by the feature provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub osm_id: Option<i64>,
    /// `None` when the provider could not build a geometry for the element
    pub geometry: Option<Geometry<f64>>,
    pub tags: HashMap<String, TagValue>,
}

impl FeatureRecord {
    pub fn new(geometry: Geometry<f64>) -> Self {
        FeatureRecord {
            osm_id: None,
            geometry: Some(geometry),
            tags: HashMap::new(),
        }
    }

    pub fn with_tag(mut self, key: &str, value: impl Into<TagValue>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    pub fn is_polygonal(&self) -> bool {
        matches!(
            self.geometry,
            Some(Geometry::Polygon(_)) | Some(Geometry::MultiPolygon(_))
        )
    }
}

/// Feature table fetched for one thematic layer.
pub type FeatureTable = Vec<FeatureRecord>;

/// A street-network edge: a line geometry plus its road classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    pub way_id: Option<i64>,
    pub geometry: Option<LineString<f64>>,
    pub highway: Option<TagValue>,
    pub name: Option<TagValue>,
}

impl RoadEdge {
    pub fn new(geometry: LineString<f64>, highway: impl Into<TagValue>) -> Self {
        RoadEdge {
            way_id: None,
            geometry: Some(geometry),
            highway: Some(highway.into()),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<TagValue>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// View a generic feature record as an edge; only line geometries qualify.
    pub fn from_record(record: &FeatureRecord) -> Option<RoadEdge> {
        let geometry = match &record.geometry {
            Some(Geometry::LineString(line)) => Some(line.clone()),
            Some(Geometry::Line(line)) => Some(LineString::from(vec![line.start, line.end])),
            _ => return None,
        };

        Some(RoadEdge {
            way_id: record.osm_id,
            geometry,
            highway: record.tag("highway").cloned(),
            name: record.tag("name").cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    #[test]
    fn token_match_is_case_insensitive_substring() {
        let value = TagValue::from("Primary_Link");
        assert!(value.contains_token("primary"));
        assert!(!value.contains_token("secondary"));
    }

    #[test]
    fn token_match_over_multiple_values() {
        let value = TagValue::Multiple(vec!["residential".into(), "service".into()]);
        assert!(value.contains_token("residential"));
        assert!(value.contains_token("service"));
        assert!(!value.contains_token("footway"));
    }

    #[test]
    fn first_of_multiple() {
        let value = TagValue::Multiple(vec!["Main St".into(), "Route 9".into()]);
        assert_eq!(value.first(), Some("Main St"));
        assert_eq!(TagValue::Multiple(vec![]).first(), None);
    }

    #[test]
    fn untagged_deserialization() {
        let single: TagValue = serde_json::from_str(r#""Main St""#).unwrap();
        let multiple: TagValue = serde_json::from_str(r#"["A", "B"]"#).unwrap();
        assert_eq!(single, TagValue::from("Main St"));
        assert_eq!(multiple, TagValue::Multiple(vec!["A".into(), "B".into()]));
    }

    #[test]
    fn polygonal_records() {
        let area = FeatureRecord::new(Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ]));
        let node = FeatureRecord::new(Geometry::Point(point!(x: 0.0, y: 0.0)));
        assert!(area.is_polygonal());
        assert!(!node.is_polygonal());
    }

    #[test]
    fn edge_from_record_requires_line() {
        let line = FeatureRecord::new(Geometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ]))
        .with_tag("highway", "residential")
        .with_tag("name", "Elm St");
        let edge = RoadEdge::from_record(&line).unwrap();
        assert_eq!(edge.name, Some(TagValue::from("Elm St")));

        let node = FeatureRecord::new(Geometry::Point(point!(x: 0.0, y: 0.0)));
        assert!(RoadEdge::from_record(&node).is_none());
    }
}
