//! pdfium 绑定与页面渲染

use std::path::{Path, PathBuf};

use image::RgbaImage;
use pdfium_render::prelude::*;

use crate::error::RenderError;
use crate::target_size;

/// pdfium 库的搜索路径
fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("libs"));
            paths.push(exe_dir.to_path_buf());

            #[cfg(target_os = "macos")]
            {
                if let Some(contents_dir) = exe_dir.parent() {
                    paths.push(contents_dir.join("Resources").join("libs"));
                }
            }
        }
    }

    paths.push(PathBuf::from("libs"));
    paths.push(PathBuf::from("./"));
    paths
}

/// 绑定 pdfium
///
/// 指定了目录时只在该目录查找；否则依次尝试可执行文件附近的目录、
/// 当前目录，最后是系统库。
pub fn bind(library_dir: Option<&Path>) -> Result<Rasterizer, RenderError> {
    if let Some(dir) = library_dir {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(dir);
        return Pdfium::bind_to_library(&lib_path)
            .map(|bindings| {
                log::info!("[Pdfium] 已从 {:?} 加载", lib_path);
                Rasterizer::new(bindings)
            })
            .map_err(|e| RenderError::Bind(format!("{:?}: {}", lib_path, e)));
    }

    for path in search_paths() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&path);
        log::debug!("[Pdfium] 尝试加载: {:?}", lib_path);
        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            log::info!("[Pdfium] 已从 {:?} 加载", path);
            return Ok(Rasterizer::new(bindings));
        }
    }

    log::debug!("[Pdfium] 尝试加载系统库");
    Pdfium::bind_to_system_library()
        .map(Rasterizer::new)
        .map_err(|e| RenderError::Bind(e.to_string()))
}

/// 已绑定的 pdfium 实例
///
/// 库在进程内只初始化一次，绑定之后不再释放，
/// 打开的文档因此可以跨多次渲染保留。
pub struct Rasterizer {
    pdfium: &'static Pdfium,
}

/// pdfium 中已打开的文档，翻页和缩放时不再重新解析
pub struct OpenDocument {
    document: PdfDocument<'static>,
}

impl Rasterizer {
    fn new(bindings: Box<dyn PdfiumLibraryBindings>) -> Self {
        Self {
            pdfium: Box::leak(Box::new(Pdfium::new(bindings))),
        }
    }

    pub fn open(&self, bytes: Vec<u8>) -> Result<OpenDocument, RenderError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| RenderError::Open(e.to_string()))?;
        log::debug!("[Pdfium] 已打开文档，共 {} 页", document.pages().len());
        Ok(OpenDocument { document })
    }
}

impl OpenDocument {
    /// 渲染第 `page` 页（从 1 开始），输出像素尺寸为旋转后的显示尺寸乘以 `scale`
    pub fn render_page(&self, page: u32, scale: f64) -> Result<RgbaImage, RenderError> {
        let page_err = |reason: String| RenderError::Page { page, reason };

        let index = page
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| page_err("page index out of range".to_string()))?;
        let pdf_page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| page_err(e.to_string()))?;

        let width = target_size(pdf_page.width().value as f64, scale);
        let height = target_size(pdf_page.height().value as f64, scale);
        log::debug!(
            "[Render] 页面 {}: {}x{} pt -> {}x{} px (缩放 {:.2})",
            page,
            pdf_page.width().value,
            pdf_page.height().value,
            width,
            height,
            scale
        );

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| page_err(e.to_string()))?;

        Ok(bitmap.as_image().to_rgba8())
    }
}
