//! PDF structure access and the lopdf-backed export provider.
//!
//! [`inspect`] reads page geometry without rendering anything, and
//! [`LopdfExporter`] burns opaque rectangles into page content streams.

mod error;
mod export;
mod metadata;
mod page_box;

pub use error::PdfError;
pub use export::{LopdfDocument, LopdfExporter};
pub use metadata::stamp_redaction_metadata;
pub use page_box::{page_box, page_geometry, page_rotation, PageBox};

use lopdf::Document;
use veil_core::{DocumentInfo, PageSize};

/// 解析文档并读取每页原生尺寸和旋转
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo, PdfError> {
    let doc = load(bytes)?;
    let pages: Vec<PageSize> = doc
        .get_pages()
        .values()
        .map(|id| page_geometry(&doc, *id))
        .collect();
    if pages.is_empty() {
        return Err(PdfError::NoPages);
    }
    log::info!("[Inspect] 共 {} 页", pages.len());
    Ok(DocumentInfo { pages })
}

pub(crate) fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    let doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(PdfError::Encrypted);
    }
    Ok(doc)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_reads_inherited_media_box() {
        let info = inspect(&fixtures::sample_pdf(3)).unwrap();
        assert_eq!(info.page_count(), 3);
        assert_eq!(info.native_size(2), Some(PageSize::new(612.0, 792.0)));
    }

    #[test]
    fn test_inspect_reports_rotation() {
        let info = inspect(&fixtures::rotated_pdf(1, Some(90))).unwrap();
        let page = info.native_size(1).unwrap();
        assert_eq!(page.rotation, veil_core::Rotation::Cw90);
        assert_eq!((page.width, page.height), (612.0, 792.0));
        assert_eq!(page.displayed(), (792.0, 612.0));
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let err = inspect(b"%PDF-1.7\nnot really a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }
}
