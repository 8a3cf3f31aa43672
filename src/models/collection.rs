use crate::error::{AppError, Result};
use crate::services::crs::Crs;
use geo::Geometry;
use serde_json::{Map, Value};

/// One user-supplied geometry with its GeoJSON properties.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFeature {
    pub geometry: Geometry<f64>,
    pub properties: Map<String, Value>,
}

impl UserFeature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        UserFeature {
            geometry,
            properties: Map::new(),
        }
    }
}

/// The uploaded geometry collection, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryCollection {
    pub features: Vec<UserFeature>,
    pub crs: Crs,
}

impl GeometryCollection {
    pub fn new(features: Vec<UserFeature>, crs: Crs) -> Self {
        GeometryCollection { features, crs }
    }

    /// Parse an uploaded GeoJSON document.
    pub fn from_geojson_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            tracing::debug!("Upload is not valid JSON: {}", e);
            AppError::InvalidInput("Invalid JSON format in uploaded file".to_string())
        })?;
        Self::from_geojson_value(value)
    }

    /// Build a collection from a GeoJSON object that carries `type` and
    /// `features`. Features without a geometry are skipped.
    pub fn from_geojson_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(missing_keys());
        };

        if !object.contains_key("type") || !object.contains_key("features") {
            return Err(missing_keys());
        }

        let crs = Crs::from_geojson_member(object.get("crs"))?;

        let Some(Value::Array(raw_features)) = object.remove("features") else {
            return Err(AppError::InvalidInput(
                "Invalid GeoJSON format. 'features' must be an array.".to_string(),
            ));
        };

        let mut features = Vec::with_capacity(raw_features.len());
        for (idx, raw) in raw_features.into_iter().enumerate() {
            let feature: geojson::Feature = serde_json::from_value(raw).map_err(|e| {
                AppError::InvalidInput(format!("Invalid GeoJSON feature at index {}: {}", idx, e))
            })?;

            let Some(geometry) = feature.geometry else {
                tracing::debug!("Skipping feature {} without geometry", idx);
                continue;
            };

            let geometry = Geometry::<f64>::try_from(geometry).map_err(|e| {
                AppError::InvalidInput(format!("Invalid geometry at index {}: {}", idx, e))
            })?;

            features.push(UserFeature {
                geometry,
                properties: feature.properties.unwrap_or_default(),
            });
        }

        Ok(GeometryCollection { features, crs })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Reproject every geometry to longitude/latitude degrees.
    pub fn into_geographic(self) -> Self {
        if self.crs.is_geographic() {
            return self;
        }

        let crs = self.crs;
        let features = self
            .features
            .into_iter()
            .map(|feature| UserFeature {
                geometry: crs.geometry_to_geographic(&feature.geometry),
                properties: feature.properties,
            })
            .collect();

        GeometryCollection {
            features,
            crs: Crs::Geographic,
        }
    }
}

fn missing_keys() -> AppError {
    AppError::InvalidInput(
        "Invalid GeoJSON format. Must contain 'type' and 'features' fields.".to_string(),
    )
}
