//! 文档提供者：lopdf 解析结构，pdfium 渲染页面

use std::cell::RefCell;
use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use veil_core::{DocumentInfo, DocumentProvider, ProviderError, Raster};

use crate::error::RenderError;
use crate::pdfium::{OpenDocument, Rasterizer};
use crate::target_size;

struct Loaded {
    info: DocumentInfo,
    /// 无渲染模式下为 `None`
    pages: Option<OpenDocument>,
}

pub struct PdfProvider {
    rasterizer: Option<Rasterizer>,
    current: RefCell<Option<Loaded>>,
}

impl PdfProvider {
    /// 不渲染页面内容，`render` 输出对应尺寸的白页
    pub fn headless() -> Self {
        Self {
            rasterizer: None,
            current: RefCell::new(None),
        }
    }

    pub fn with_rasterizer(rasterizer: Rasterizer) -> Self {
        Self {
            rasterizer: Some(rasterizer),
            current: RefCell::new(None),
        }
    }

    pub fn is_headless(&self) -> bool {
        self.rasterizer.is_none()
    }

    pub fn info(&self) -> Option<DocumentInfo> {
        self.current.borrow().as_ref().map(|l| l.info.clone())
    }
}

#[async_trait(?Send)]
impl DocumentProvider for PdfProvider {
    async fn load(&self, bytes: Arc<[u8]>) -> Result<DocumentInfo, ProviderError> {
        let parse_bytes = bytes.clone();
        let info = tokio::task::spawn_blocking(move || veil_pdf::inspect(&parse_bytes))
            .await
            .map_err(|e| ProviderError::new(e.to_string()))??;
        let pages = match &self.rasterizer {
            Some(rasterizer) => Some(rasterizer.open(bytes.to_vec())?),
            None => None,
        };

        // 只有解析成功才替换当前文档
        *self.current.borrow_mut() = Some(Loaded {
            info: info.clone(),
            pages,
        });
        Ok(info)
    }

    async fn render(&self, page: u32, scale: f64) -> Result<Raster, ProviderError> {
        let current = self.current.borrow();
        let loaded = current.as_ref().ok_or(RenderError::NotLoaded)?;
        let size = loaded
            .info
            .native_size(page)
            .ok_or_else(|| ProviderError::on_page(page, "page index out of range"))?;

        match &loaded.pages {
            Some(pages) => Ok(pages.render_page(page, scale)?),
            None => {
                let (width, height) = size.displayed();
                Ok(RgbaImage::from_pixel(
                    target_size(width, scale),
                    target_size(height, scale),
                    Rgba([255, 255, 255, 255]),
                ))
            }
        }
    }

    fn unload(&self) {
        if self.current.borrow_mut().take().is_some() {
            log::debug!("[Render] 已释放当前文档");
        }
    }
}
