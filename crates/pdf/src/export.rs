//! 基于 lopdf 的导出提供者
//!
//! 每个有区域的页面在原内容流前后各追加一个新的内容流：
//! 前面一个只有 `q`，后面一个先 `Q` 恢复原始图形状态，再在页面坐标系里
//! 画不透明矩形。其他页面的内容流原样保留。

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use veil_core::{DocumentRect, ExportProvider, FillColor, MutableDocument, PageSize, ProviderError};

use crate::error::PdfError;
use crate::metadata::stamp_redaction_metadata;
use crate::page_box::{page_box, PageBox};

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExporter;

impl ExportProvider for LopdfExporter {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn MutableDocument>, ProviderError> {
        Ok(Box::new(LopdfDocument::load(bytes)?))
    }
}

#[derive(Debug, Clone, Copy)]
struct Fill {
    rect: DocumentRect,
    color: FillColor,
}

/// 可修改的文档副本，矩形在 `save` 时统一写入
pub struct LopdfDocument {
    doc: Document,
    pages: Vec<(ObjectId, PageBox)>,
    fills: BTreeMap<u32, Vec<Fill>>,
}

impl LopdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = crate::load(bytes)?;
        let pages: Vec<(ObjectId, PageBox)> = doc
            .get_pages()
            .values()
            .map(|id| (*id, page_box(&doc, *id)))
            .collect();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }
        Ok(Self {
            doc,
            pages,
            fills: BTreeMap::new(),
        })
    }

    fn page(&self, page: u32) -> Result<(ObjectId, PageBox), PdfError> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .copied()
            .ok_or(PdfError::MissingPage {
                page,
                total: self.pages.len() as u32,
            })
    }

    fn write_page(&mut self, page: u32, fills: &[Fill]) -> Result<(), PdfError> {
        let (page_id, bounds) = self.page(page)?;
        let encode_err = |e: lopdf::Error| PdfError::Content {
            page,
            reason: e.to_string(),
        };

        let open = Content {
            operations: vec![Operation::new("q", vec![])],
        }
        .encode()
        .map_err(encode_err)?;
        let overlay = overlay_content(bounds, fills).encode().map_err(encode_err)?;

        let open_id = self.doc.add_object(Stream::new(Dictionary::new(), open));
        let overlay_id = self.doc.add_object(Stream::new(Dictionary::new(), overlay));

        let mut contents = vec![Object::Reference(open_id)];
        contents.extend(self.existing_contents(page_id));
        contents.push(Object::Reference(overlay_id));

        let page_dict = self
            .doc
            .get_dictionary_mut(page_id)
            .map_err(|e| PdfError::Content {
                page,
                reason: e.to_string(),
            })?;
        page_dict.set("Contents", Object::Array(contents));

        log::info!("[BlackOverlay] 页 {}: 写入 {} 个黑框", page, fills.len());
        Ok(())
    }

    /// 页面现有的内容流引用，Contents 可能是单个引用、数组或指向数组的引用
    fn existing_contents(&self, page_id: ObjectId) -> Vec<Object> {
        let Ok(dict) = self.doc.get_dictionary(page_id) else {
            return Vec::new();
        };
        match dict.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(other) => {
                log::warn!("[BlackOverlay] 忽略无法识别的 Contents: {:?}", other);
                Vec::new()
            }
            Err(_) => Vec::new(),
        }
    }
}

fn overlay_content(bounds: PageBox, fills: &[Fill]) -> Content {
    let mut operations = vec![Operation::new("Q", vec![]), Operation::new("q", vec![])];

    for fill in fills {
        let FillColor { r, g, b } = fill.color;
        operations.push(Operation::new(
            "rg",
            vec![
                Object::Real(r),
                Object::Real(g),
                Object::Real(b),
            ],
        ));
        // 区域坐标相对页面左下角，需要加上边界框原点
        let rect = fill.rect;
        log::debug!(
            "[BlackOverlay] 绘制黑框: x={:.2}, y={:.2}, w={:.2}, h={:.2}",
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
        operations.push(Operation::new(
            "re",
            vec![
                Object::Real((bounds.llx + rect.x) as f32),
                Object::Real((bounds.lly + rect.y) as f32),
                Object::Real(rect.width as f32),
                Object::Real(rect.height as f32),
            ],
        ));
        operations.push(Operation::new("f", vec![]));
    }

    operations.push(Operation::new("Q", vec![]));
    Content { operations }
}

impl MutableDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_size(&self, page: u32) -> Option<PageSize> {
        self.page(page).ok().map(|(_, b)| b.size())
    }

    fn fill_rect(
        &mut self,
        page: u32,
        rect: DocumentRect,
        color: FillColor,
    ) -> Result<(), ProviderError> {
        self.page(page)?;
        if !rect.is_valid() {
            return Err(ProviderError::on_page(page, "rectangle has no area"));
        }
        self.fills.entry(page).or_default().push(Fill { rect, color });
        Ok(())
    }

    fn save(mut self: Box<Self>) -> Result<Vec<u8>, ProviderError> {
        let fills = std::mem::take(&mut self.fills);
        for (page, group) in &fills {
            self.write_page(*page, group)?;
        }

        stamp_redaction_metadata(&mut self.doc);
        self.doc.compress();

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        log::info!("[Export] 已序列化 {} 字节", output.len());
        Ok(output)
    }
}
