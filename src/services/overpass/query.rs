//! Overpass QL query construction.

use crate::constants::OVERPASS_MAX_SIZE_BYTES;
use crate::osm::{TagFilter, TagMatch};
use geo::Polygon;

/// Highway values that are not part of a drivable or walkable network.
const EXCLUDED_HIGHWAYS: &[&str] = &[
    "abandoned",
    "construction",
    "no",
    "planned",
    "platform",
    "proposed",
    "raceway",
    "razed",
];

/// Render a polygon's exterior as an Overpass `poly:` filter,
/// `"lat lon lat lon ..."` without the closing duplicate.
pub fn poly_filter(polygon: &Polygon<f64>) -> String {
    let ring = &polygon.exterior().0;
    let open = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => &ring[..],
    };

    let points: Vec<String> = open
        .iter()
        .map(|c| format!("{:.7} {:.7}", c.y, c.x))
        .collect();
    format!(r#"(poly:"{}")"#, points.join(" "))
}

fn header(timeout_secs: u64) -> String {
    format!(
        "[out:json][timeout:{}][maxsize:{}];",
        timeout_secs, OVERPASS_MAX_SIZE_BYTES
    )
}

/// Union of one `nwr` statement per filter clause, returned with geometry.
pub fn features_query(polygon: &Polygon<f64>, filter: &TagFilter, timeout_secs: u64) -> String {
    let poly = poly_filter(polygon);
    let mut query_parts = vec![header(timeout_secs), "(".to_string()];

    for (key, matcher) in &filter.clauses {
        let tag = match matcher {
            TagMatch::Any => format!(r#"["{}"]"#, key),
            TagMatch::OneOf(values) => format!(r#"["{}"~"^({})$"]"#, key, values.join("|")),
        };
        query_parts.push(format!("nwr{}{};", tag, poly));
    }

    query_parts.push(");out geom;".to_string());
    query_parts.join("\n")
}

/// All highway ways except areas and non-network values.
pub fn highway_query(polygon: &Polygon<f64>, timeout_secs: u64) -> String {
    format!(
        "{}\n(\nway[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"^({})$\"]{};\n);out geom;",
        header(timeout_secs),
        EXCLUDED_HIGHWAYS.join("|"),
        poly_filter(polygon)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use crate::osm::LayerKind;

    fn area() -> Polygon<f64> {
        BoundingBox::new(2.348, 48.848, 2.362, 48.862).to_polygon()
    }

    #[test]
    fn poly_filter_is_lat_lon_and_open() {
        let poly = poly_filter(&area());
        assert!(poly.starts_with(r#"(poly:""#));
        assert!(poly.contains("48.8480000 2.3480000"));
        // 4 corners, 2 numbers each
        let inner = poly.trim_start_matches(r#"(poly:""#).trim_end_matches(r#"")"#);
        assert_eq!(inner.split(' ').count(), 8);
    }

    #[test]
    fn building_query() {
        let query = features_query(&area(), &LayerKind::Buildings.tag_filter(), 60);
        assert!(query.contains("[out:json]"));
        assert!(query.contains("[timeout:60]"));
        assert!(query.contains("[maxsize:"));
        assert!(query.contains(r#"nwr["building"](poly:"#));
        assert!(query.ends_with("out geom;"));
    }

    #[test]
    fn value_lists_become_anchored_regex() {
        let query = features_query(&area(), &LayerKind::GreenSpace.tag_filter(), 60);
        assert!(query.contains(r#"["leisure"~"^(park|garden)$"]"#));
        assert!(query.contains(r#"["landuse"~"^(grass|forest|recreation_ground)$"]"#));
    }

    #[test]
    fn highway_query_excludes_areas() {
        let query = highway_query(&area(), 30);
        assert!(query.contains("[timeout:30]"));
        assert!(query.contains(r#"way["highway"]["area"!~"yes"]"#));
        assert!(query.contains("proposed"));
        assert!(query.ends_with("out geom;"));
    }
}
