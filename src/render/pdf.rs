//! Single-page vector PDF output.

use super::layout::{self, Viewport};
use super::text::{encode_win_ansi, text_width};
use super::MapRenderer;
use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{
    BoundingBox, ComposedMap, Decorations, LabelStyle, LegendEntry, LegendSymbol, Primitive, Rgb,
    StyleRule,
};
use geo::{Coord, Geometry, LineString, Point, Polygon};
use pdf_writer::types::{LineCapStyle, LineJoinStyle};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::BTreeMap;

const TICK_TARGET: usize = 6;
const TICK_LENGTH_PT: f32 = 3.5;
const FRAME_LINE_WIDTH: f32 = 0.8;
/// Bezier control distance for a quarter circle of radius 1
const KAPPA: f32 = 0.552_284_8;

const FIRST_FONT_ID: i32 = 6;
const FIRST_GRAPHICS_STATE_ID: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
            Font::Italic => b"F3",
        }
    }

    fn base_font(self) -> &'static [u8] {
        match self {
            Font::Regular => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
            Font::Italic => b"Helvetica-Oblique",
        }
    }

    fn object_id(self) -> Ref {
        let offset = match self {
            Font::Regular => 0,
            Font::Bold => 1,
            Font::Italic => 2,
        };
        Ref::new(FIRST_FONT_ID + offset)
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

/// Renders a [`ComposedMap`] onto one landscape letter page using the
/// standard Helvetica faces.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    page_width: f32,
    page_height: f32,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::with_page_size(PAGE_WIDTH_PT, PAGE_HEIGHT_PT)
    }

    pub fn with_page_size(page_width: f32, page_height: f32) -> Self {
        PdfRenderer {
            page_width,
            page_height,
        }
    }

    fn assemble(&self, stream: Vec<u8>, graphics_states: &[(String, f32)], title: &str) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let info_id = Ref::new(5);

        let mut pdf = Pdf::new();

        pdf.stream(content_id, &stream).filter(Filter::FlateDecode);

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let state_refs: Vec<(&str, Ref)> = graphics_states
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), Ref::new(FIRST_GRAPHICS_STATE_ID + i as i32)))
            .collect();

        {
            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height))
                .parent(page_tree_id)
                .contents(content_id);

            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for font in Font::ALL {
                    fonts.pair(Name(font.resource_name()), font.object_id());
                }
            }
            if !state_refs.is_empty() {
                let mut states = resources.ext_g_states();
                for (name, id) in &state_refs {
                    states.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        for font in Font::ALL {
            pdf.type1_font(font.object_id())
                .base_font(Name(font.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        for ((_, id), (_, alpha)) in state_refs.iter().zip(graphics_states) {
            pdf.ext_graphics(*id)
                .non_stroking_alpha(*alpha)
                .stroking_alpha(*alpha);
        }

        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr(concat!("osmprint ", env!("CARGO_PKG_VERSION"))));

        pdf.finish()
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MapRenderer for PdfRenderer {
    fn render(&self, map: &ComposedMap) -> Result<Vec<u8>> {
        if !map.extent.is_valid() {
            return Err(AppError::Render(format!(
                "map extent is empty or not finite: {:?}",
                map.extent
            )));
        }

        let viewport = Viewport::fit(map.extent, self.page_width, self.page_height);
        let ticks = Ticks::for_extent(&map.extent);
        let mut painter = Painter::new(viewport);

        painter.axes_background(map.background);
        if map.decorations.grid {
            painter.grid(&ticks);
        }

        painter.begin_clip();
        for instruction in &map.instructions {
            match &instruction.primitive {
                Primitive::Shape { geometry, style } => painter.shape(geometry, style),
                Primitive::Text {
                    text,
                    anchor,
                    angle_deg,
                    style,
                } => painter.label(text, *anchor, *angle_deg, style),
            }
        }
        painter.end_clip();

        painter.frame(&ticks);
        painter.decorations(&map.decorations);

        let (stream, graphics_states) = painter.finish();
        let pdf = self.assemble(stream, &graphics_states, &map.decorations.title);

        tracing::debug!(
            "Wrote {} instructions, {} graphics states",
            map.instructions.len(),
            graphics_states.len()
        );
        Ok(pdf)
    }
}

struct Ticks {
    lon: Vec<f64>,
    lat: Vec<f64>,
    lon_decimals: usize,
    lat_decimals: usize,
}

impl Ticks {
    fn for_extent(extent: &BoundingBox) -> Self {
        let decimals = |min: f64, max: f64| {
            layout::nice_step(min, max, TICK_TARGET)
                .map(layout::tick_decimals)
                .unwrap_or(0)
        };

        Ticks {
            lon: layout::nice_ticks(extent.west, extent.east, TICK_TARGET),
            lat: layout::nice_ticks(extent.south, extent.north, TICK_TARGET),
            lon_decimals: decimals(extent.west, extent.east),
            lat_decimals: decimals(extent.south, extent.north),
        }
    }
}

/// Content-stream writer that also tracks which opacity levels were used,
/// one ExtGState per distinct level.
struct Painter {
    content: Content,
    viewport: Viewport,
    alpha_states: BTreeMap<u16, String>,
}

impl Painter {
    fn new(viewport: Viewport) -> Self {
        Painter {
            content: Content::new(),
            viewport,
            alpha_states: BTreeMap::new(),
        }
    }

    /// Compressed content stream plus `(resource name, alpha)` pairs.
    fn finish(self) -> (Vec<u8>, Vec<(String, f32)>) {
        let raw = self.content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);

        let states = self
            .alpha_states
            .into_iter()
            .map(|(permille, name)| (name, permille as f32 / 1000.0))
            .collect();

        (compressed, states)
    }

    fn alpha(&mut self, opacity: f32) {
        let permille = (opacity.clamp(0.0, 1.0) * 1000.0).round() as u16;
        let next = self.alpha_states.len();
        let name = self
            .alpha_states
            .entry(permille)
            .or_insert_with(|| format!("GS{}", next))
            .clone();
        self.content.set_parameters(Name(name.as_bytes()));
    }

    fn fill_color(&mut self, color: Rgb) {
        let (r, g, b) = color.to_unit();
        self.content.set_fill_rgb(r, g, b);
    }

    fn stroke_color(&mut self, color: Rgb) {
        let (r, g, b) = color.to_unit();
        self.content.set_stroke_rgb(r, g, b);
    }

    /// Append a subpath through the projected coordinates. Non-finite
    /// points are dropped; returns false (and emits nothing) when too few
    /// remain.
    fn trace(&mut self, coords: impl IntoIterator<Item = Coord<f64>>, close: bool) -> bool {
        let viewport = self.viewport;
        let points: Vec<(f32, f32)> = coords
            .into_iter()
            .map(|c| viewport.project(c))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        let required = if close { 3 } else { 2 };
        if points.len() < required {
            return false;
        }

        self.content.move_to(points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            self.content.line_to(x, y);
        }
        if close {
            self.content.close_path();
        }
        true
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        let k = KAPPA * r;
        self.content.move_to(cx + r, cy);
        self.content.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        self.content.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        self.content.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        self.content.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        self.content.close_path();
    }

    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32) {
        let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
        let k = KAPPA * r;
        let (right, top) = (x + w, y + h);
        self.content.move_to(x + r, y);
        self.content.line_to(right - r, y);
        self.content.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
        self.content.line_to(right, top - r);
        self.content.cubic_to(right, top - r + k, right - r + k, top, right - r, top);
        self.content.line_to(x + r, top);
        self.content.cubic_to(x + r - k, top, x, top - r + k, x, top - r);
        self.content.line_to(x, y + r);
        self.content.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
        self.content.close_path();
    }

    fn show_text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32, align: Align) {
        let width = text_width(text, size, font == Font::Bold);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let bytes = encode_win_ansi(text);
        self.content
            .begin_text()
            .set_font(Name(font.resource_name()), size)
            .next_line(x, y)
            .show(Str(&bytes))
            .end_text();
    }

    fn axes_background(&mut self, color: Rgb) {
        let axes = self.viewport.axes;
        self.content.save_state();
        self.fill_color(color);
        self.content.rect(axes.x, axes.y, axes.width, axes.height);
        self.content.fill_nonzero();
        self.content.restore_state();
    }

    /// Dotted lines at every tick, beneath all map layers.
    fn grid(&mut self, ticks: &Ticks) {
        let axes = self.viewport.axes;
        let extent = self.viewport.extent;
        if ticks.lon.is_empty() && ticks.lat.is_empty() {
            return;
        }

        self.content.save_state();
        self.alpha(GRID_ALPHA);
        self.stroke_color(Rgb::from_hex(GRID_HEX).unwrap_or(Rgb::BLACK));
        self.content.set_line_width(GRID_LINE_WIDTH);
        self.content.set_dash_pattern([1.0, 1.65], 0.0);

        for &lon in &ticks.lon {
            let (x, _) = self.viewport.project(Coord { x: lon, y: extent.south });
            self.content.move_to(x, axes.y);
            self.content.line_to(x, axes.top());
        }
        for &lat in &ticks.lat {
            let (_, y) = self.viewport.project(Coord { x: extent.west, y: lat });
            self.content.move_to(axes.x, y);
            self.content.line_to(axes.right(), y);
        }
        self.content.stroke();
        self.content.restore_state();
    }

    fn begin_clip(&mut self) {
        let axes = self.viewport.axes;
        self.content.save_state();
        self.content.rect(axes.x, axes.y, axes.width, axes.height);
        self.content.clip_nonzero();
        self.content.end_path();
    }

    fn end_clip(&mut self) {
        self.content.restore_state();
    }

    fn shape(&mut self, geometry: &Geometry<f64>, style: &StyleRule) {
        match geometry {
            Geometry::Polygon(polygon) => self.polygon(polygon, style),
            Geometry::MultiPolygon(polygons) => {
                for polygon in &polygons.0 {
                    self.polygon(polygon, style);
                }
            }
            Geometry::Rect(rect) => self.polygon(&rect.to_polygon(), style),
            Geometry::Triangle(triangle) => self.polygon(&triangle.to_polygon(), style),
            Geometry::LineString(line) => self.line(line, style),
            Geometry::MultiLineString(lines) => {
                for line in &lines.0 {
                    self.line(line, style);
                }
            }
            Geometry::Line(line) => self.line(&LineString::from(vec![line.start, line.end]), style),
            Geometry::Point(point) => self.marker(*point, style),
            Geometry::MultiPoint(points) => {
                for point in &points.0 {
                    self.marker(*point, style);
                }
            }
            Geometry::GeometryCollection(collection) => {
                for member in &collection.0 {
                    self.shape(member, style);
                }
            }
        }
    }

    fn apply_area_style(&mut self, style: &StyleRule) {
        self.alpha(style.opacity);
        if let Some(fill) = style.fill {
            self.fill_color(fill);
        }
        if let Some(stroke) = style.stroke {
            self.stroke_color(stroke);
        }
        self.content.set_line_width(style.line_width);
        self.content.set_line_join(LineJoinStyle::RoundJoin);
    }

    fn paint_area(&mut self, style: &StyleRule, even_odd: bool) {
        let stroked = style.stroke.is_some() && style.line_width > 0.0;
        match (style.fill.is_some(), stroked, even_odd) {
            (true, true, true) => self.content.fill_even_odd_and_stroke(),
            (true, true, false) => self.content.fill_nonzero_and_stroke(),
            (true, false, true) => self.content.fill_even_odd(),
            (true, false, false) => self.content.fill_nonzero(),
            (false, true, _) => self.content.stroke(),
            (false, false, _) => self.content.end_path(),
        };
    }

    fn polygon(&mut self, polygon: &Polygon<f64>, style: &StyleRule) {
        self.content.save_state();
        self.apply_area_style(style);
        if self.trace(polygon.exterior().coords().copied(), true) {
            for hole in polygon.interiors() {
                self.trace(hole.coords().copied(), true);
            }
            self.paint_area(style, true);
        }
        self.content.restore_state();
    }

    fn line(&mut self, line: &LineString<f64>, style: &StyleRule) {
        let Some(color) = style.stroke.or(style.fill) else {
            return;
        };

        self.content.save_state();
        self.alpha(style.opacity);
        self.stroke_color(color);
        self.content.set_line_width(style.line_width);
        self.content.set_line_cap(LineCapStyle::RoundCap);
        self.content.set_line_join(LineJoinStyle::RoundJoin);
        if self.trace(line.coords().copied(), false) {
            self.content.stroke();
        }
        self.content.restore_state();
    }

    fn marker(&mut self, point: Point<f64>, style: &StyleRule) {
        let (x, y) = self.viewport.project(point.0);
        if !x.is_finite() || !y.is_finite() {
            return;
        }

        self.content.save_state();
        self.apply_area_style(style);
        self.circle(x, y, USER_DATA_MARKER_RADIUS_PT);
        self.paint_area(style, false);
        self.content.restore_state();
    }

    /// Text centred on `anchor`, rotated counter-clockwise by `angle_deg`,
    /// over an optional rounded box.
    fn label(&mut self, text: &str, anchor: Point<f64>, angle_deg: f64, style: &LabelStyle) {
        let (x, y) = self.viewport.project(anchor.0);
        if !x.is_finite() || !y.is_finite() || !angle_deg.is_finite() || text.trim().is_empty() {
            return;
        }

        let size = style.font_size;
        let font = if style.italic { Font::Italic } else { Font::Regular };
        let (sin, cos) = (angle_deg as f32).to_radians().sin_cos();

        self.content.save_state();
        self.content.transform([cos, sin, -sin, cos, x, y]);

        if let Some(background) = style.background {
            let width = text_width(text, size, false);
            let pad = 0.3 * size;
            self.alpha(style.background_opacity);
            self.fill_color(background);
            self.rounded_rect(
                -width / 2.0 - pad,
                -size / 2.0 - pad,
                width + 2.0 * pad,
                size + 2.0 * pad,
                pad,
            );
            self.content.fill_nonzero();
        }

        self.alpha(1.0);
        self.fill_color(style.color);
        self.show_text(text, font, size, 0.0, -0.35 * size, Align::Center);
        self.content.restore_state();
    }

    /// Axes frame, tick marks and tick labels.
    fn frame(&mut self, ticks: &Ticks) {
        let axes = self.viewport.axes;
        let extent = self.viewport.extent;
        let lon_positions: Vec<(f32, String)> = ticks
            .lon
            .iter()
            .map(|&lon| {
                let (x, _) = self.viewport.project(Coord { x: lon, y: extent.south });
                (x, layout::format_tick(lon, ticks.lon_decimals))
            })
            .collect();
        let lat_positions: Vec<(f32, String)> = ticks
            .lat
            .iter()
            .map(|&lat| {
                let (_, y) = self.viewport.project(Coord { x: extent.west, y: lat });
                (y, layout::format_tick(lat, ticks.lat_decimals))
            })
            .collect();

        self.content.save_state();
        self.alpha(1.0);
        self.stroke_color(Rgb::BLACK);
        self.fill_color(Rgb::BLACK);
        self.content.set_line_width(FRAME_LINE_WIDTH);
        self.content.rect(axes.x, axes.y, axes.width, axes.height);
        for (x, _) in &lon_positions {
            self.content.move_to(*x, axes.y);
            self.content.line_to(*x, axes.y - TICK_LENGTH_PT);
        }
        for (y, _) in &lat_positions {
            self.content.move_to(axes.x, *y);
            self.content.line_to(axes.x - TICK_LENGTH_PT, *y);
        }
        self.content.stroke();

        let size = TICK_LABEL_FONT_SIZE;
        for (x, text) in &lon_positions {
            let baseline = axes.y - TICK_LENGTH_PT - 2.0 - 0.75 * size;
            self.show_text(text, Font::Regular, size, *x, baseline, Align::Center);
        }
        for (y, text) in &lat_positions {
            let right = axes.x - TICK_LENGTH_PT - 2.5;
            self.show_text(text, Font::Regular, size, right, *y - 0.35 * size, Align::Right);
        }
        self.content.restore_state();
    }

    fn decorations(&mut self, decorations: &Decorations) {
        let axes = self.viewport.axes;

        self.content.save_state();
        self.alpha(1.0);
        self.fill_color(Rgb::BLACK);

        if !decorations.title.is_empty() {
            self.show_text(
                &decorations.title,
                Font::Bold,
                TITLE_FONT_SIZE,
                axes.center_x(),
                axes.top() + TITLE_PAD_PT,
                Align::Center,
            );
        }

        let size = AXIS_LABEL_FONT_SIZE;
        self.show_text(
            &decorations.x_label,
            Font::Regular,
            size,
            axes.center_x(),
            axes.y - 30.0,
            Align::Center,
        );

        self.content.save_state();
        self.content.transform([0.0, 1.0, -1.0, 0.0, axes.x - 46.0, axes.y + axes.height / 2.0]);
        self.show_text(&decorations.y_label, Font::Regular, size, 0.0, 0.0, Align::Center);
        self.content.restore_state();
        self.content.restore_state();

        if let Some((fx, fy)) = decorations.north_arrow {
            self.north_arrow(fx, fy);
        }
        if !decorations.legend.is_empty() {
            self.legend(&decorations.legend);
        }
    }

    fn north_arrow(&mut self, fx: f32, fy: f32) {
        let (cx, cy) = self.viewport.fraction(fx, fy);
        let size = NORTH_ARROW_FONT_SIZE;
        let radius = 0.75 * size;

        self.content.save_state();
        self.alpha(1.0);
        self.fill_color(Rgb::WHITE);
        self.stroke_color(Rgb::BLACK);
        self.content.set_line_width(2.0);
        self.circle(cx, cy, radius);
        self.content.fill_nonzero_and_stroke();

        self.fill_color(Rgb::BLACK);
        self.show_text("N", Font::Bold, size, cx, cy - 0.35 * size, Align::Center);

        // Arrow pointing up, just below the circle
        let tip = cy - radius - 4.0;
        self.content.move_to(cx, tip);
        self.content.line_to(cx - 4.0, tip - 6.0);
        self.content.line_to(cx + 4.0, tip - 6.0);
        self.content.close_path();
        self.content.fill_nonzero();
        self.content.set_line_width(1.5);
        self.content.move_to(cx, tip - 6.0);
        self.content.line_to(cx, tip - 16.0);
        self.content.stroke();
        self.content.restore_state();
    }

    /// Framed legend in the upper-left corner of the axes.
    fn legend(&mut self, entries: &[LegendEntry]) {
        let axes = self.viewport.axes;
        let size = LEGEND_FONT_SIZE;
        let row = size * 1.6;
        let pad = 6.0;
        let handle = 20.0;
        let gap = 6.0;

        let text_w = entries
            .iter()
            .map(|entry| text_width(&entry.label, size, false))
            .fold(0.0_f32, f32::max);
        let width = pad + handle + gap + text_w + pad;
        let height = 2.0 * pad + row * entries.len() as f32;
        let x0 = axes.x + 8.0;
        let top = axes.top() - 8.0;

        self.content.save_state();
        self.alpha(LEGEND_FRAME_ALPHA);
        self.fill_color(Rgb::WHITE);
        self.stroke_color(Rgb::new(0xcc, 0xcc, 0xcc));
        self.content.set_line_width(FRAME_LINE_WIDTH);
        self.rounded_rect(x0, top - height, width, height, 3.0);
        self.content.fill_nonzero_and_stroke();
        self.alpha(1.0);

        for (i, entry) in entries.iter().enumerate() {
            let cy = top - pad - row * (i as f32 + 0.5);
            match entry.symbol {
                LegendSymbol::Line { color, width } => {
                    self.stroke_color(color);
                    self.content.set_line_width(width);
                    self.content.move_to(x0 + pad, cy);
                    self.content.line_to(x0 + pad + handle, cy);
                    self.content.stroke();
                }
                LegendSymbol::Patch { fill, edge } => {
                    self.fill_color(fill);
                    self.stroke_color(edge);
                    self.content.set_line_width(FRAME_LINE_WIDTH);
                    self.content.rect(x0 + pad, cy - 0.35 * size, handle, 0.7 * size);
                    self.content.fill_nonzero_and_stroke();
                }
            }

            self.fill_color(Rgb::BLACK);
            self.show_text(
                &entry.label,
                Font::Regular,
                size,
                x0 + pad + handle + gap,
                cy - 0.35 * size,
                Align::Left,
            );
        }
        self.content.restore_state();
    }
}
