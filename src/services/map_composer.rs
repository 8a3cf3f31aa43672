//! Orders every layer into one z-sorted draw list plus fixed decorations.

use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{
    AreaOfInterest, ComposedMap, Decorations, DrawInstruction, GeometryCollection, LabelStyle,
    LegendEntry, LegendSymbol, MapLayer, Primitive, Rgb, StyleRule, StyledGeometry,
};
use crate::osm::{LayerKind, RoadClass};
use crate::services::street_labels::StreetLabel;
use std::collections::HashMap;
use std::fmt;

/// Outcome of one independently fallible layer step. A failed or empty
/// fetch becomes `Omitted` and the map is drawn without that layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome<T> {
    Loaded(T),
    Omitted(String),
}

impl<T> LayerOutcome<T> {
    /// Absorb a step result, logging the failure instead of propagating it.
    pub fn from_result<E: fmt::Display>(layer: &str, result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => LayerOutcome::Loaded(value),
            Err(e) => {
                tracing::warn!("{} failed, layer omitted: {}", layer, e);
                LayerOutcome::Omitted(e.to_string())
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LayerOutcome<U> {
        match self {
            LayerOutcome::Loaded(value) => LayerOutcome::Loaded(f(value)),
            LayerOutcome::Omitted(reason) => LayerOutcome::Omitted(reason),
        }
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            LayerOutcome::Loaded(value) => Some(value),
            LayerOutcome::Omitted(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.as_loaded().is_some()
    }
}

impl<T> Default for LayerOutcome<T> {
    fn default() -> Self {
        LayerOutcome::Omitted("not fetched".to_string())
    }
}

/// Classified contextual layers for one map.
#[derive(Debug, Clone, Default)]
pub struct LayerResults {
    pub buildings: LayerOutcome<Vec<StyledGeometry>>,
    pub water: LayerOutcome<Vec<StyledGeometry>>,
    pub green_space: LayerOutcome<Vec<StyledGeometry>>,
    pub roads: LayerOutcome<Vec<(RoadClass, StyledGeometry)>>,
    pub labels: LayerOutcome<HashMap<String, StreetLabel>>,
}

impl LayerResults {
    pub fn loaded_count(&self) -> usize {
        [
            self.buildings.is_loaded(),
            self.water.is_loaded(),
            self.green_space.is_loaded(),
            self.roads.is_loaded(),
        ]
        .iter()
        .filter(|loaded| **loaded)
        .count()
    }
}

/// Compose the ordered draw list.
///
/// Context layers are emitted in fetch order (buildings, water, green
/// space, then roads by class), then street labels and finally the user's
/// data. The list is then stable-sorted by z-order, so equal z-orders keep
/// emission order and the user's data always ends up on top.
pub fn compose(
    area: &AreaOfInterest,
    layers: LayerResults,
    user_data: &GeometryCollection,
    title: &str,
) -> Result<ComposedMap> {
    if user_data.is_empty() {
        return Err(AppError::InvalidInput(
            "GeoJSON contains no features with geometry".to_string(),
        ));
    }

    let mut instructions = Vec::new();

    let area_layers = [
        (LayerKind::Buildings, layers.buildings),
        (LayerKind::Water, layers.water),
        (LayerKind::GreenSpace, layers.green_space),
    ];
    for (kind, outcome) in area_layers {
        if let LayerOutcome::Loaded(styled) = outcome {
            instructions.extend(styled.into_iter().map(|s| DrawInstruction {
                layer: MapLayer::Context(kind),
                z_order: s.style.z_order,
                primitive: Primitive::Shape {
                    geometry: s.geometry,
                    style: s.style,
                },
            }));
        }
    }

    if let LayerOutcome::Loaded(roads) = layers.roads {
        instructions.extend(roads.into_iter().map(|(class, s)| DrawInstruction {
            layer: MapLayer::Road(class),
            z_order: s.style.z_order,
            primitive: Primitive::Shape {
                geometry: s.geometry,
                style: s.style,
            },
        }));
    }

    if let LayerOutcome::Loaded(labels) = layers.labels {
        let mut labels: Vec<StreetLabel> = labels.into_values().collect();
        // Hash order is arbitrary; sort so output is reproducible
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        instructions.extend(labels.into_iter().map(label_instruction));
    }

    instructions.extend(user_instructions(user_data));

    instructions.sort_by_key(|instruction| instruction.z_order);

    tracing::info!(
        "Composed {} draw instructions for {} user features",
        instructions.len(),
        user_data.len()
    );

    Ok(ComposedMap {
        extent: area.bbox,
        background: hex(AXES_BACKGROUND_HEX),
        instructions,
        decorations: decorations(title),
    })
}

fn label_instruction(label: StreetLabel) -> DrawInstruction {
    DrawInstruction {
        layer: MapLayer::StreetLabels,
        z_order: Z_ORDER_STREET_LABELS,
        primitive: Primitive::Text {
            text: label.name,
            anchor: label.anchor,
            angle_deg: label.angle_deg,
            style: LabelStyle {
                font_size: STREET_LABEL_FONT_SIZE,
                color: hex(STREET_LABEL_HEX),
                italic: true,
                background: Some(Rgb::WHITE),
                background_opacity: STREET_LABEL_BOX_ALPHA,
            },
        },
    }
}

fn user_instructions(user_data: &GeometryCollection) -> impl Iterator<Item = DrawInstruction> + '_ {
    let count = user_data.len();
    user_data
        .features
        .iter()
        .enumerate()
        .map(move |(idx, feature)| DrawInstruction {
            layer: MapLayer::UserData,
            z_order: Z_ORDER_USER_DATA,
            primitive: Primitive::Shape {
                geometry: feature.geometry.clone(),
                style: StyleRule::area(
                    reds(ramp_position(idx, count)),
                    hex(USER_DATA_EDGE_HEX),
                    USER_DATA_LINE_WIDTH,
                    USER_DATA_ALPHA,
                    Z_ORDER_USER_DATA,
                ),
            },
        })
}

/// Evenly spaced position of feature `idx` along the colour ramp.
fn ramp_position(idx: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        idx as f64 / (count - 1) as f64
    }
}

/// Sample the Reds ramp at `t` in `0..=1`.
pub fn reds(t: f64) -> Rgb {
    let stops: Vec<Rgb> = REDS_RAMP_HEX.iter().map(|h| hex(h)).collect();
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(stops.len() - 1);
    stops[lower].lerp(stops[upper], scaled - lower as f64)
}

fn decorations(title: &str) -> Decorations {
    Decorations {
        title: title.to_string(),
        x_label: "Longitude".to_string(),
        y_label: "Latitude".to_string(),
        grid: true,
        north_arrow: Some((0.96, 0.96)),
        legend: vec![
            LegendEntry {
                label: "Your Data".to_string(),
                symbol: LegendSymbol::Line {
                    color: hex(USER_DATA_EDGE_HEX),
                    width: 3.0,
                },
            },
            LegendEntry {
                label: "Roads".to_string(),
                symbol: LegendSymbol::Line {
                    color: hex(ROAD_LEGEND_HEX),
                    width: 2.0,
                },
            },
            LegendEntry {
                label: "Buildings".to_string(),
                symbol: LegendSymbol::Patch {
                    fill: hex(AXES_BACKGROUND_HEX),
                    edge: Rgb::new(0x99, 0x99, 0x99),
                },
            },
        ],
    }
}

// Constant colours are validated by the tests below
fn hex(value: &str) -> Rgb {
    Rgb::from_hex(value).unwrap_or(Rgb::BLACK)
}
