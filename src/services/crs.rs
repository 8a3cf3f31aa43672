//! Coordinate reference system normalization.
//!
//! Only two families are supported, both statically: geographic lon/lat
//! systems (treated as WGS84) and spherical Web Mercator. Everything else
//! is rejected as invalid input.

use crate::error::{AppError, Result};
use geo::{Coord, Geometry, MapCoords};
use serde_json::Value;

/// Semi-major axis of the WGS84 ellipsoid, used as the sphere radius by
/// Web Mercator.
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    /// Longitude/latitude in degrees
    #[default]
    Geographic,
    /// EPSG:3857 metres
    WebMercator,
}

impl Crs {
    /// Parse the GeoJSON `crs` member. Accepts a plain string
    /// (`"EPSG:3857"`) or a named CRS object
    /// (`{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}`).
    /// A missing or null member means WGS84.
    pub fn from_geojson_member(member: Option<&Value>) -> Result<Self> {
        match member {
            None | Some(Value::Null) => Ok(Crs::Geographic),
            Some(Value::String(name)) => Crs::from_name(name),
            Some(Value::Object(object)) => {
                let name = object
                    .get("properties")
                    .and_then(|props| props.get("name"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            "Invalid CRS: expected a named CRS with properties.name".to_string(),
                        )
                    })?;
                Crs::from_name(name)
            }
            Some(other) => Err(AppError::InvalidInput(format!(
                "Invalid CRS member: {}",
                other
            ))),
        }
    }

    /// Parse a CRS identifier such as `EPSG:4326`, `urn:ogc:def:crs:EPSG::3857`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84` or
    /// `http://www.opengis.net/def/crs/EPSG/0/3857`.
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized = name.trim().to_uppercase();

        if normalized.ends_with("CRS84") {
            return Ok(Crs::Geographic);
        }

        let code = normalized
            .rsplit(|c: char| c == ':' || c == '/')
            .find(|part| !part.is_empty())
            .and_then(|part| part.parse::<u32>().ok())
            .ok_or_else(|| AppError::InvalidInput(format!("Unsupported CRS: {}", name)))?;

        Crs::from_epsg(code)
            .ok_or_else(|| AppError::InvalidInput(format!("Unsupported CRS: {}", name)))
    }

    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 | 4269 | 4258 => Some(Crs::Geographic),
            3857 | 900913 | 3785 | 102100 | 102113 => Some(Crs::WebMercator),
            _ => None,
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Geographic)
    }

    /// Convert one coordinate to longitude/latitude degrees.
    pub fn to_geographic(&self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Crs::Geographic => coord,
            Crs::WebMercator => mercator_to_wgs84(coord),
        }
    }

    pub fn geometry_to_geographic(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        match self {
            Crs::Geographic => geometry.clone(),
            Crs::WebMercator => geometry.map_coords(mercator_to_wgs84),
        }
    }
}

fn mercator_to_wgs84(coord: Coord<f64>) -> Coord<f64> {
    let lon = (coord.x / WEB_MERCATOR_RADIUS_M).to_degrees();
    let lat = (2.0 * (coord.y / WEB_MERCATOR_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Coord { x: lon, y: lat }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_common_identifiers() {
        assert_eq!(Crs::from_name("EPSG:4326").unwrap(), Crs::Geographic);
        assert_eq!(Crs::from_name("epsg:3857").unwrap(), Crs::WebMercator);
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:EPSG::3857").unwrap(),
            Crs::WebMercator
        );
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            Crs::Geographic
        );
        assert_eq!(
            Crs::from_name("http://www.opengis.net/def/crs/EPSG/0/3857").unwrap(),
            Crs::WebMercator
        );
    }

    #[test]
    fn rejects_unknown_crs() {
        assert!(matches!(
            Crs::from_name("EPSG:32633"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(Crs::from_name("not a crs").is_err());
    }

    #[test]
    fn geojson_member_shapes() {
        assert_eq!(Crs::from_geojson_member(None).unwrap(), Crs::Geographic);
        assert_eq!(
            Crs::from_geojson_member(Some(&Value::Null)).unwrap(),
            Crs::Geographic
        );
        assert_eq!(
            Crs::from_geojson_member(Some(&json!("EPSG:3857"))).unwrap(),
            Crs::WebMercator
        );
        let named = json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::4326"}});
        assert_eq!(
            Crs::from_geojson_member(Some(&named)).unwrap(),
            Crs::Geographic
        );
        assert!(Crs::from_geojson_member(Some(&json!(42))).is_err());
        assert!(Crs::from_geojson_member(Some(&json!({"type": "name"}))).is_err());
    }

    #[test]
    fn mercator_origin_and_known_point() {
        let origin = Crs::WebMercator.to_geographic(Coord { x: 0.0, y: 0.0 });
        assert!(origin.x.abs() < 1e-12 && origin.y.abs() < 1e-12);

        // Forward spherical mercator for Paris, then back
        let (lon, lat) = (2.3522_f64, 48.8566_f64);
        let x = WEB_MERCATOR_RADIUS_M * lon.to_radians();
        let y = WEB_MERCATOR_RADIUS_M
            * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                .tan()
                .ln();
        let paris = Crs::WebMercator.to_geographic(Coord { x, y });
        assert!((paris.x - lon).abs() < 1e-9, "lon={}", paris.x);
        assert!((paris.y - lat).abs() < 1e-9, "lat={}", paris.y);
        assert!((x - 261_845.7).abs() < 1.0);
    }
}
