//! Page geometry: where the map axes sit on the page and how geographic
//! coordinates map into them.

use crate::constants::*;
use crate::models::BoundingBox;
use geo::Coord;

/// Axes rectangle in PDF points, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl AxesBox {
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub extent: BoundingBox,
    pub axes: AxesBox,
}

impl Viewport {
    /// Fit `extent` into the page margins, keeping ground distances
    /// isotropic: one degree of longitude is drawn `cos(mid latitude)`
    /// as wide as one degree of latitude.
    pub fn fit(extent: BoundingBox, page_width: f32, page_height: f32) -> Self {
        let avail_x = PAGE_MARGIN_LEFT_PT;
        let avail_y = PAGE_MARGIN_BOTTOM_PT;
        let avail_w = page_width - PAGE_MARGIN_LEFT_PT - PAGE_MARGIN_RIGHT_PT;
        let avail_h = page_height - PAGE_MARGIN_BOTTOM_PT - PAGE_MARGIN_TOP_PT;

        let lon_scale = extent.mid_latitude().to_radians().cos().max(0.01);
        let ground_ratio = (extent.height() / (extent.width() * lon_scale)) as f32;

        let (width, height) = if avail_h / avail_w > ground_ratio {
            (avail_w, avail_w * ground_ratio)
        } else {
            (avail_h / ground_ratio, avail_h)
        };

        Viewport {
            extent,
            axes: AxesBox {
                x: avail_x + (avail_w - width) / 2.0,
                y: avail_y + (avail_h - height) / 2.0,
                width,
                height,
            },
        }
    }

    /// Geographic coordinate to page point.
    pub fn project(&self, coord: Coord<f64>) -> (f32, f32) {
        let fx = (coord.x - self.extent.west) / self.extent.width();
        let fy = (coord.y - self.extent.south) / self.extent.height();
        self.fraction(fx as f32, fy as f32)
    }

    /// Axes-fraction position to page point.
    pub fn fraction(&self, fx: f32, fy: f32) -> (f32, f32) {
        (
            self.axes.x + fx * self.axes.width,
            self.axes.y + fy * self.axes.height,
        )
    }
}

/// Round tick positions covering `[min, max]`, stepping by 1, 2, 2.5 or 5
/// times a power of ten so roughly `target` ticks fit.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let step = match nice_step(min, max, target) {
        Some(step) => step,
        None => return Vec::new(),
    };

    let eps = step * 1e-9;
    let mut ticks = Vec::new();
    let mut i = (min / step).ceil() as i64;
    // a nice step never yields more than about twice the target
    while ticks.len() <= target.saturating_mul(2) {
        let value = i as f64 * step;
        if value > max + eps {
            break;
        }
        ticks.push(value);
        i += 1;
    }
    ticks
}

pub fn nice_step(min: f64, max: f64, target: usize) -> Option<f64> {
    if !min.is_finite() || !max.is_finite() || max <= min || target == 0 {
        return None;
    }

    let raw = (max - min) / target as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }

    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw * (1.0 - 1e-9))
        .filter(|step| step.is_finite())
}

/// Decimal places needed to print ticks spaced by `step` distinctly.
pub fn tick_decimals(step: f64) -> usize {
    let exponent = step.log10().floor();
    let mantissa = step / 10f64.powf(exponent);
    let mut decimals = (-exponent).max(0.0) as usize;
    if (mantissa - 2.5).abs() < 1e-6 {
        decimals += 1;
    }
    decimals
}

pub fn format_tick(value: f64, decimals: usize) -> String {
    // Avoid "-0.000"
    let value = if value.abs() < 10f64.powi(-(decimals as i32 + 1)) {
        0.0
    } else {
        value
    };
    format!("{:.*}", decimals, value)
}
