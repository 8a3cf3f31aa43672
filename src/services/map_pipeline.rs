use crate::error::{AppError, Result};
use crate::models::{AreaOfInterest, ComposedMap, GeometryCollection};
use crate::osm::LayerKind;
use crate::render::MapRenderer;
use crate::services::map_composer::{self, LayerOutcome, LayerResults};
use crate::services::provider::OsmProvider;
use crate::services::{area_of_interest, layer_classifier, street_labels};
use std::sync::Arc;

/// The full request pipeline: area of interest, per-layer fetch and
/// classification, label selection, composition and rendering.
///
/// Each step runs sequentially. Contextual layers are fetched one after
/// another and each failure only drops its own layer.
#[derive(Clone)]
pub struct MapService {
    provider: Arc<dyn OsmProvider>,
    renderer: Arc<dyn MapRenderer>,
    padding_deg: f64,
    title: String,
}

impl MapService {
    pub fn new(
        provider: Arc<dyn OsmProvider>,
        renderer: Arc<dyn MapRenderer>,
        padding_deg: f64,
        title: impl Into<String>,
    ) -> Self {
        MapService {
            provider,
            renderer,
            padding_deg,
            title: title.into(),
        }
    }

    /// Parse an uploaded GeoJSON document and render it to PDF bytes.
    pub async fn generate_pdf_from_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let collection = GeometryCollection::from_geojson_bytes(bytes)?;
        self.generate_pdf(collection).await
    }

    pub async fn generate_pdf(&self, collection: GeometryCollection) -> Result<Vec<u8>> {
        let map = self.compose_map(collection).await?;

        let renderer = Arc::clone(&self.renderer);
        let pdf = tokio::task::spawn_blocking(move || renderer.render(&map))
            .await
            .map_err(|e| AppError::Render(format!("render task failed: {}", e)))??;

        tracing::info!("Rendered PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }

    /// Build the ordered draw list without rendering it. Fails only on
    /// invalid input.
    pub async fn compose_map(&self, collection: GeometryCollection) -> Result<ComposedMap> {
        let area = area_of_interest::build(&collection, self.padding_deg)?;
        let user_data = collection.into_geographic();

        let layers = self.fetch_layers(&area).await;
        tracing::info!(
            "{} of 4 contextual layers loaded",
            layers.loaded_count()
        );

        map_composer::compose(&area, layers, &user_data, &self.title)
    }

    async fn fetch_layers(&self, area: &AreaOfInterest) -> LayerResults {
        let mut results = LayerResults::default();

        for kind in LayerKind::AREA_LAYERS {
            tracing::info!("Downloading {}...", kind);
            let outcome = LayerOutcome::from_result(
                kind.as_str(),
                self.provider
                    .features_from_polygon(&area.polygon, &kind.tag_filter())
                    .await,
            )
            .map(|table| {
                let styled = layer_classifier::classify(&table, kind);
                tracing::info!("Plotted {} {} features", styled.len(), kind);
                styled
            });

            match kind {
                LayerKind::Buildings => results.buildings = outcome,
                LayerKind::Water => results.water = outcome,
                LayerKind::GreenSpace => results.green_space = outcome,
                LayerKind::Roads => {}
            }
        }

        tracing::info!("Downloading street network...");
        let edges = LayerOutcome::from_result(
            LayerKind::Roads.as_str(),
            self.provider.graph_from_polygon(&area.polygon).await,
        );

        match edges {
            LayerOutcome::Loaded(edges) => {
                let roads = layer_classifier::classify_roads(&edges);
                tracing::info!(
                    "Plotted {} street segments ({} class draws)",
                    edges.len(),
                    roads.len()
                );
                results.roads = LayerOutcome::Loaded(roads);
                results.labels = LayerOutcome::Loaded(street_labels::select_labels(&edges));
            }
            LayerOutcome::Omitted(reason) => {
                results.labels = LayerOutcome::Omitted(format!("no street network: {}", reason));
                results.roads = LayerOutcome::Omitted(reason);
            }
        }

        results
    }
}
