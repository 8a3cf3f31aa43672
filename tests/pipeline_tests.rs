use osmprint::error::AppError;
use osmprint::models::{GeometryCollection, MapLayer, Primitive};
use osmprint::osm::{LayerKind, RoadClass};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

mod common;

fn sample_collection() -> GeometryCollection {
    GeometryCollection::from_geojson_value(common::sample_geojson()).unwrap()
}

#[tokio::test]
async fn test_all_layers_failing_still_renders_user_data() {
    let provider = Arc::new(common::FailingProvider::default());
    let service = common::service_with(provider.clone());

    let map = service.compose_map(sample_collection()).await.unwrap();

    assert_eq!(map.instructions.len(), 2);
    assert!(map
        .instructions
        .iter()
        .all(|i| i.layer == MapLayer::UserData));
    assert_eq!(map.decorations.title, common::TEST_TITLE);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 4);

    let pdf = service.generate_pdf(sample_collection()).await.unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_empty_collection_is_rejected_before_fetching() {
    let provider = Arc::new(common::FailingProvider::default());
    let service = common::service_with(provider.clone());

    let collection =
        GeometryCollection::from_geojson_value(json!({"type": "FeatureCollection", "features": []}))
            .unwrap();
    let result = service.compose_map(collection).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_layers_are_stacked_by_z_order() {
    let service = common::service_with(Arc::new(common::paris_provider()));
    let map = service.compose_map(sample_collection()).await.unwrap();

    let z: Vec<u8> = map.instructions.iter().map(|i| i.z_order).collect();
    assert!(z.windows(2).all(|w| w[0] <= w[1]), "{z:?}");

    let last = map.instructions.last().unwrap();
    assert_eq!(last.layer, MapLayer::UserData);

    let position = |layer: MapLayer| {
        map.instructions
            .iter()
            .position(|i| i.layer == layer)
            .unwrap_or_else(|| panic!("missing layer {layer:?}"))
    };
    assert!(position(MapLayer::Context(LayerKind::Water)) < position(MapLayer::Context(LayerKind::Buildings)));
    assert!(position(MapLayer::Context(LayerKind::GreenSpace)) < position(MapLayer::Road(RoadClass::Footway)));
    assert!(position(MapLayer::Road(RoadClass::Residential)) < position(MapLayer::Road(RoadClass::Primary)));
    assert!(position(MapLayer::Road(RoadClass::Primary)) < position(MapLayer::StreetLabels));
    assert!(position(MapLayer::StreetLabels) < position(MapLayer::UserData));
}

#[tokio::test]
async fn test_named_major_streets_are_labelled_once() {
    let service = common::service_with(Arc::new(common::paris_provider()));
    let map = service.compose_map(sample_collection()).await.unwrap();

    let labels: Vec<(&str, f64)> = map
        .instructions_for(MapLayer::StreetLabels)
        .filter_map(|i| match &i.primitive {
            Primitive::Text {
                text, angle_deg, ..
            } => Some((text.as_str(), *angle_deg)),
            _ => None,
        })
        .collect();

    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].0, "Rue de Rivoli");
    assert!(labels[0].1.abs() < 1e-9);
    assert_eq!(labels[1].0, "Rue du Temple");
    assert!((labels[1].1 - 90.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_street_network_failure_drops_roads_and_labels_only() {
    let provider = common::StaticProvider {
        fail_graph: true,
        ..common::paris_provider()
    };
    let service = common::service_with(Arc::new(provider));
    let map = service.compose_map(sample_collection()).await.unwrap();

    assert!(map
        .instructions
        .iter()
        .all(|i| !matches!(i.layer, MapLayer::Road(_) | MapLayer::StreetLabels)));
    assert_eq!(
        map.instructions_for(MapLayer::Context(LayerKind::Buildings))
            .count(),
        1
    );
    assert_eq!(map.instructions_for(MapLayer::UserData).count(), 2);
}

#[tokio::test]
async fn test_mercator_input_is_reprojected() {
    let collection = GeometryCollection::from_geojson_value(json!({
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Point", "coordinates": [261600.0, 6250000.0]}
        }]
    }))
    .unwrap();

    let service = common::service_with(Arc::new(common::FailingProvider::default()));
    let map = service.compose_map(collection).await.unwrap();

    assert!(map.extent.west > 2.0 && map.extent.east < 2.5, "{:?}", map.extent);
    assert!(map.extent.south > 48.5 && map.extent.north < 49.0, "{:?}", map.extent);
}
