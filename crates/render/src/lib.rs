//! Page rasterization and overlay compositing.
//!
//! [`PdfProvider`] implements the document provider on top of pdfium.
//! Without a bound pdfium library it still parses page geometry and
//! produces blank pages of the right size, which is enough for headless
//! redaction runs.

mod compose;
mod error;
mod pdfium;
mod provider;

pub use compose::{compose, save_png};
pub use error::RenderError;
pub use pdfium::{bind, OpenDocument, Rasterizer};
pub use provider::PdfProvider;

/// 缩放 1.0 对应 72 DPI
pub const POINTS_PER_INCH: f64 = 72.0;

/// 原生尺寸按缩放换算为像素，至少 1 像素
pub(crate) fn target_size(points: f64, scale: f64) -> u32 {
    (points * scale).round().max(1.0) as u32
}
