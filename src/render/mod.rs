pub mod layout;
pub mod pdf;
pub mod text;

use crate::error::Result;
use crate::models::ComposedMap;

pub use pdf::PdfRenderer;

/// Turns a composed map into document bytes. Rendering is CPU-bound and
/// synchronous; async callers should run it on a blocking thread.
pub trait MapRenderer: Send + Sync {
    fn render(&self, map: &ComposedMap) -> Result<Vec<u8>>;
}
