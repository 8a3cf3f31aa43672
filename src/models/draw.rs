use crate::models::geo::BoundingBox;
use crate::models::style::{Rgb, StyleRule};
use crate::osm::{LayerKind, RoadClass};
use geo::{Geometry, Point};

/// Which part of the map an instruction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayer {
    Context(LayerKind),
    Road(RoadClass),
    StreetLabels,
    UserData,
}

/// A styled geometry produced by the layer classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledGeometry {
    pub geometry: Geometry<f64>,
    pub style: StyleRule,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font_size: f32,
    pub color: Rgb,
    pub italic: bool,
    /// Background box behind the text; `None` draws bare text
    pub background: Option<Rgb>,
    pub background_opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Shape {
        geometry: Geometry<f64>,
        style: StyleRule,
    },
    Text {
        text: String,
        anchor: Point<f64>,
        /// Counter-clockwise rotation in degrees
        angle_deg: f64,
        style: LabelStyle,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub layer: MapLayer,
    pub z_order: u8,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendSymbol {
    Line { color: Rgb, width: f32 },
    Patch { fill: Rgb, edge: Rgb },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub symbol: LegendSymbol,
}

/// Fixed page furniture, independent of which layers loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: bool,
    /// Position of the north indicator as fractions of the axes box
    pub north_arrow: Option<(f32, f32)>,
    pub legend: Vec<LegendEntry>,
}

/// Everything the renderer needs for one page, draws sorted by z-order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMap {
    pub extent: BoundingBox,
    pub background: Rgb,
    pub instructions: Vec<DrawInstruction>,
    pub decorations: Decorations,
}

impl ComposedMap {
    pub fn instructions_for(&self, layer: MapLayer) -> impl Iterator<Item = &DrawInstruction> {
        self.instructions
            .iter()
            .filter(move |instruction| instruction.layer == layer)
    }
}
