//! Stable application-wide constants.
//!
//! Values here are page geometry, cartographic styling, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! Deployment knobs (host, padding, timeouts) live in
//! [`Config`](crate::config::Config) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "8000";

// --- Request limits ---

/// Default per-request pipeline deadline. Overridden by `REQUEST_TIMEOUT_SECS`.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 180;
/// Default upload size limit (20 MiB). Overridden by `MAX_UPLOAD_BYTES`.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

// --- Area of interest ---

/// Padding added on every side of the input bounds, in degrees (~200 m at
/// mid-latitudes). Overridden by `MAP_PADDING_DEG`.
pub const DEFAULT_PADDING_DEG: f64 = 0.002;

// --- Overpass defaults ---

/// Server-side and client-side timeout for a single Overpass query.
pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 60;
/// Retries after the first attempt (2 = 3 total attempts).
pub const OVERPASS_RETRY_MAX_ATTEMPTS: usize = 2;
/// Upper bound on the Overpass response size, in bytes.
pub const OVERPASS_MAX_SIZE_BYTES: u64 = 536_870_912;
pub const OVERPASS_HTTP_TOO_MANY_REQUESTS: u16 = 429;
pub const OVERPASS_HTTP_GATEWAY_TIMEOUT: u16 = 504;

// --- Page geometry (PDF points, 72 per inch) ---

/// 11 in wide, landscape letter.
pub const PAGE_WIDTH_PT: f32 = 792.0;
/// 8.5 in tall.
pub const PAGE_HEIGHT_PT: f32 = 612.0;

pub const PAGE_MARGIN_LEFT_PT: f32 = 64.0;
pub const PAGE_MARGIN_RIGHT_PT: f32 = 24.0;
pub const PAGE_MARGIN_TOP_PT: f32 = 56.0;
pub const PAGE_MARGIN_BOTTOM_PT: f32 = 48.0;

// --- Typography ---

pub const TITLE_FONT_SIZE: f32 = 18.0;
/// Gap between the top of the axes and the title baseline.
pub const TITLE_PAD_PT: f32 = 20.0;
pub const AXIS_LABEL_FONT_SIZE: f32 = 11.0;
pub const TICK_LABEL_FONT_SIZE: f32 = 8.0;
pub const LEGEND_FONT_SIZE: f32 = 9.0;
pub const STREET_LABEL_FONT_SIZE: f32 = 7.0;
pub const NORTH_ARROW_FONT_SIZE: f32 = 18.0;

pub const DEFAULT_MAP_TITLE: &str = "Map with Streets, Buildings and Labels";

// --- Stacking order ---

pub const Z_ORDER_STREET_LABELS: u8 = 15;
pub const Z_ORDER_USER_DATA: u8 = 20;

// --- Styling ---

/// Axes background behind all contextual layers.
pub const AXES_BACKGROUND_HEX: &str = "#d9d9d9";
pub const STREET_LABEL_HEX: &str = "#333333";
pub const STREET_LABEL_BOX_ALPHA: f32 = 0.8;
pub const USER_DATA_EDGE_HEX: &str = "#8b0000";
pub const USER_DATA_LINE_WIDTH: f32 = 2.5;
pub const USER_DATA_ALPHA: f32 = 0.8;
/// Radius used for point geometries in the user layer.
pub const USER_DATA_MARKER_RADIUS_PT: f32 = 4.0;
pub const ROAD_LEGEND_HEX: &str = "#666666";
pub const GRID_HEX: &str = "#808080";
pub const GRID_ALPHA: f32 = 0.2;
pub const GRID_LINE_WIDTH: f32 = 0.5;
pub const LEGEND_FRAME_ALPHA: f32 = 0.9;

/// ColorBrewer "Reds" ramp, light to dark.
pub const REDS_RAMP_HEX: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15",
    "#67000d",
];
