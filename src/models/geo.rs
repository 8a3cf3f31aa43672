use geo::{coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in geographic coordinates (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        BoundingBox {
            west,
            south,
            east,
            north,
        }
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        BoundingBox {
            west: rect.min().x,
            south: rect.min().y,
            east: rect.max().x,
            north: rect.max().y,
        }
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        BoundingBox {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Expand every side by `padding` degrees.
    pub fn padded(&self, padding: f64) -> Self {
        BoundingBox {
            west: self.west - padding,
            south: self.south - padding,
            east: self.east + padding,
            north: self.north + padding,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn mid_latitude(&self) -> f64 {
        (self.south + self.north) / 2.0
    }

    /// Non-degenerate and finite: west < east and south < north.
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.west < self.east
            && self.south < self.north
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }
}

/// The padded region used as the query area for every contextual layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    pub bbox: BoundingBox,
    pub polygon: Polygon<f64>,
}

impl AreaOfInterest {
    pub fn from_bbox(bbox: BoundingBox) -> Self {
        AreaOfInterest {
            polygon: bbox.to_polygon(),
            bbox,
        }
    }
}
