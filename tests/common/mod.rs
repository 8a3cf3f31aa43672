use async_trait::async_trait;
use geo::{line_string, polygon, Geometry, Polygon};
use osmprint::error::{AppError, Result};
use osmprint::models::{FeatureRecord, FeatureTable, RoadEdge, TagValue};
use osmprint::osm::TagFilter;
use osmprint::render::PdfRenderer;
use osmprint::services::{MapService, OsmProvider};
use osmprint::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_TITLE: &str = "Test Map";

/// Provider whose every request fails, counting calls
#[derive(Default)]
pub struct FailingProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl OsmProvider for FailingProvider {
    async fn features_from_polygon(
        &self,
        _polygon: &Polygon<f64>,
        _filter: &TagFilter,
    ) -> Result<FeatureTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::LayerFetch("provider unavailable".to_string()))
    }

    async fn graph_from_polygon(&self, _polygon: &Polygon<f64>) -> Result<Vec<RoadEdge>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::LayerFetch("provider unavailable".to_string()))
    }
}

/// In-memory provider serving fixed features (filtered by the requested
/// tags) and a fixed street network.
#[derive(Default)]
pub struct StaticProvider {
    pub features: FeatureTable,
    pub edges: Vec<RoadEdge>,
    pub fail_graph: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl OsmProvider for StaticProvider {
    async fn features_from_polygon(
        &self,
        _polygon: &Polygon<f64>,
        filter: &TagFilter,
    ) -> Result<FeatureTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .features
            .iter()
            .filter(|record| filter.matches(|key| record.tag(key).and_then(TagValue::first)))
            .cloned()
            .collect())
    }

    async fn graph_from_polygon(&self, _polygon: &Polygon<f64>) -> Result<Vec<RoadEdge>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_graph {
            return Err(AppError::LayerFetch("street network unavailable".to_string()));
        }
        Ok(self.edges.clone())
    }
}

/// A small neighbourhood in central Paris: one building, one pond, one
/// park and two named streets.
#[allow(dead_code)]
pub fn paris_provider() -> StaticProvider {
    let building: Geometry<f64> = polygon![
        (x: 2.3500, y: 48.8500),
        (x: 2.3504, y: 48.8500),
        (x: 2.3504, y: 48.8503),
        (x: 2.3500, y: 48.8503),
    ]
    .into();
    let pond: Geometry<f64> = polygon![
        (x: 2.3510, y: 48.8510),
        (x: 2.3515, y: 48.8510),
        (x: 2.3515, y: 48.8514),
    ]
    .into();
    let park: Geometry<f64> = polygon![
        (x: 2.3490, y: 48.8490),
        (x: 2.3498, y: 48.8490),
        (x: 2.3498, y: 48.8497),
        (x: 2.3490, y: 48.8497),
    ]
    .into();

    StaticProvider {
        features: vec![
            FeatureRecord::new(building).with_tag("building", "yes"),
            FeatureRecord::new(pond).with_tag("natural", "water"),
            FeatureRecord::new(park).with_tag("leisure", "park"),
        ],
        edges: vec![
            RoadEdge::new(
                line_string![(x: 2.3495, y: 48.8505), (x: 2.3520, y: 48.8505)],
                "primary",
            )
            .named("Rue de Rivoli"),
            RoadEdge::new(
                line_string![(x: 2.3505, y: 48.8495), (x: 2.3505, y: 48.8515)],
                "residential",
            )
            .named("Rue du Temple"),
            RoadEdge::new(
                line_string![(x: 2.3495, y: 48.8495), (x: 2.3500, y: 48.8498)],
                "footway",
            ),
        ],
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn service_with(provider: Arc<dyn OsmProvider>) -> MapService {
    MapService::new(provider, Arc::new(PdfRenderer::new()), 0.002, TEST_TITLE)
}

#[allow(dead_code)]
pub fn app_state(provider: Arc<dyn OsmProvider>) -> Arc<AppState> {
    Arc::new(AppState {
        map_service: service_with(provider),
        request_timeout: Duration::from_secs(30),
        max_upload_bytes: 1024 * 1024,
    })
}

/// A route line plus a point, as a GeoJSON FeatureCollection.
#[allow(dead_code)]
pub fn sample_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "route"},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[2.3500, 48.8500], [2.3510, 48.8508]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "start"},
                "geometry": {"type": "Point", "coordinates": [2.3500, 48.8500]}
            }
        ]
    })
}

/// Check if we should skip real API tests
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok()
}
