//! 按页导出：把脱敏区域画成不透明色块并重新序列化

use std::collections::BTreeMap;

use crate::error::{RedactError, Result};
use crate::provider::{ExportProvider, FillColor};
use crate::store::Redaction;

/// 导出产物
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 输出文件名：前缀 + 原文件名
pub fn export_file_name(prefix: &str, source_name: &str) -> String {
    let name = source_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("document.pdf");
    format!("{}{}", prefix, name)
}

/// 按页分组，页码升序
pub fn group_by_page(redactions: &[Redaction]) -> BTreeMap<u32, Vec<&Redaction>> {
    let mut groups: BTreeMap<u32, Vec<&Redaction>> = BTreeMap::new();
    for redaction in redactions {
        groups.entry(redaction.page).or_default().push(redaction);
    }
    groups
}

/// 在原始文档副本上应用全部脱敏区域
///
/// 矩形已经在文档空间，无需再做变换；超出页面的部分被裁剪，
/// 完全落在页面外的区域跳过。失败时不影响 `source`。
pub fn apply_redactions(
    provider: &dyn ExportProvider,
    source: &[u8],
    redactions: &[Redaction],
) -> Result<Vec<u8>> {
    if redactions.is_empty() {
        return Err(RedactError::ExportPrecondition("no redactions"));
    }

    let mut document = provider.open(source).map_err(|e| RedactError::ExportFailure {
        page: e.page,
        reason: e.message,
    })?;
    let total = document.page_count();

    for (page, group) in group_by_page(redactions) {
        let size = document
            .page_size(page)
            .ok_or_else(|| RedactError::ExportFailure {
                page: Some(page),
                reason: format!("document has {} pages", total),
            })?;

        log::info!("[Export] 页 {}: {} 个区域", page, group.len());
        for redaction in group {
            let Some(rect) = redaction.rect.clip_to_page(size) else {
                log::warn!(
                    "[Export] 区域 {} 完全位于页 {} 之外，跳过",
                    redaction.id,
                    page
                );
                continue;
            };
            document
                .fill_rect(page, rect, FillColor::BLACK)
                .map_err(|e| RedactError::ExportFailure {
                    page: e.page.or(Some(page)),
                    reason: e.message,
                })?;
        }
    }

    document.save().map_err(|e| RedactError::ExportFailure {
        page: e.page,
        reason: e.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::geometry::{DocumentRect, PageSize};
    use crate::provider::MutableDocument;
    use crate::store::{RedactionOrigin, RegionId};
    use std::sync::{Arc, Mutex};

    type FillLog = Arc<Mutex<Vec<(u32, DocumentRect)>>>;

    struct RecordingProvider {
        pages: Vec<PageSize>,
        fills: FillLog,
        fail_on_page: Option<u32>,
    }

    struct RecordingDocument {
        pages: Vec<PageSize>,
        fills: FillLog,
        fail_on_page: Option<u32>,
    }

    impl ExportProvider for RecordingProvider {
        fn open(&self, _bytes: &[u8]) -> std::result::Result<Box<dyn MutableDocument>, ProviderError> {
            Ok(Box::new(RecordingDocument {
                pages: self.pages.clone(),
                fills: self.fills.clone(),
                fail_on_page: self.fail_on_page,
            }))
        }
    }

    impl MutableDocument for RecordingDocument {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_size(&self, page: u32) -> Option<PageSize> {
            self.pages.get(page.checked_sub(1)? as usize).copied()
        }

        fn fill_rect(
            &mut self,
            page: u32,
            rect: DocumentRect,
            _color: FillColor,
        ) -> std::result::Result<(), ProviderError> {
            if self.fail_on_page == Some(page) {
                return Err(ProviderError::new("content stream is corrupt"));
            }
            self.fills.lock().unwrap().push((page, rect));
            Ok(())
        }

        fn save(self: Box<Self>) -> std::result::Result<Vec<u8>, ProviderError> {
            Ok(b"%PDF-1.7 redacted".to_vec())
        }
    }

    fn provider(pages: usize) -> RecordingProvider {
        RecordingProvider {
            pages: vec![PageSize::new(612.0, 792.0); pages],
            fills: Arc::new(Mutex::new(Vec::new())),
            fail_on_page: None,
        }
    }

    fn redaction(id: u64, page: u32, rect: DocumentRect) -> Redaction {
        Redaction {
            id: RegionId(id),
            page,
            rect,
            origin: RedactionOrigin::Manual,
        }
    }

    #[test]
    fn test_empty_set_is_precondition_error() {
        let p = provider(1);
        let err = apply_redactions(&p, b"%PDF-1.7", &[]).unwrap_err();
        assert_eq!(err, RedactError::ExportPrecondition("no redactions"));
        assert!(p.fills.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pages_processed_in_ascending_order() {
        let p = provider(3);
        let rect = DocumentRect::new(10.0, 10.0, 20.0, 20.0);
        let redactions = vec![
            redaction(1, 3, rect),
            redaction(2, 1, rect),
            redaction(3, 3, rect),
        ];
        let bytes = apply_redactions(&p, b"%PDF-1.7", &redactions).unwrap();
        assert!(!bytes.is_empty());

        let pages: Vec<u32> = p.fills.lock().unwrap().iter().map(|(page, _)| *page).collect();
        assert_eq!(pages, vec![1, 3, 3]);
    }

    #[test]
    fn test_out_of_bounds_rect_is_clipped() {
        let p = provider(1);
        let redactions = vec![
            redaction(1, 1, DocumentRect::new(600.0, -5.0, 40.0, 25.0)),
            redaction(2, 1, DocumentRect::new(900.0, 900.0, 10.0, 10.0)),
        ];
        apply_redactions(&p, b"%PDF-1.7", &redactions).unwrap();
        let fills = p.fills.lock().unwrap();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].1, DocumentRect::new(600.0, 0.0, 12.0, 20.0));
    }

    #[test]
    fn test_failure_reports_page() {
        let mut p = provider(2);
        p.fail_on_page = Some(2);
        let rect = DocumentRect::new(10.0, 10.0, 20.0, 20.0);
        let err = apply_redactions(&p, b"%PDF-1.7", &[redaction(1, 2, rect)]).unwrap_err();
        assert!(matches!(err, RedactError::ExportFailure { page: Some(2), .. }));
    }

    #[test]
    fn test_missing_page_fails() {
        let p = provider(1);
        let rect = DocumentRect::new(10.0, 10.0, 20.0, 20.0);
        let err = apply_redactions(&p, b"%PDF-1.7", &[redaction(1, 4, rect)]).unwrap_err();
        assert!(matches!(err, RedactError::ExportFailure { page: Some(4), .. }));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("redacted_", "report.pdf"), "redacted_report.pdf");
        assert_eq!(
            export_file_name("redacted_", "/tmp/in/report.pdf"),
            "redacted_report.pdf"
        );
        assert_eq!(export_file_name("redacted_", ""), "redacted_document.pdf");
    }
}
