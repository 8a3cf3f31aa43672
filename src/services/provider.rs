use crate::error::Result;
use crate::models::{FeatureTable, RoadEdge};
use crate::osm::TagFilter;
use async_trait::async_trait;
use geo::Polygon;

/// Source of contextual OSM data for an area of interest.
///
/// Both calls are treated as always-fallible: network errors, provider
/// errors and empty areas are all expected.
#[async_trait]
pub trait OsmProvider: Send + Sync {
    /// Features within `polygon` whose tags match `filter`.
    async fn features_from_polygon(
        &self,
        polygon: &Polygon<f64>,
        filter: &TagFilter,
    ) -> Result<FeatureTable>;

    /// Street-network edges within `polygon`, one per pair of consecutive
    /// way nodes.
    async fn graph_from_polygon(&self, polygon: &Polygon<f64>) -> Result<Vec<RoadEdge>>;
}
