//! 外部能力接口
//!
//! 文档渲染、实体检测和文档修改都是可替换的外部实现，
//! 核心逻辑只依赖这里的 trait。

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::geometry::{DocumentRect, PageSize};
use crate::store::Category;

/// 渲染结果
pub type Raster = RgbaImage;

/// 文档载入后的结构信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// 每页原生尺寸，下标 0 对应第 1 页
    pub pages: Vec<PageSize>,
}

impl DocumentInfo {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// 页码从 1 开始
    pub fn native_size(&self, page: u32) -> Option<PageSize> {
        if page == 0 {
            return None;
        }
        self.pages.get(page as usize - 1).copied()
    }
}

/// 文档提供者：解析文档结构，把页面渲染成位图
///
/// 渲染引擎由构造方注入。`unload` 释放当前文档占用的资源，
/// 会话在关闭文档时调用；再次 `load` 会直接替换之前的文档。
#[async_trait(?Send)]
pub trait DocumentProvider {
    async fn load(&self, bytes: Arc<[u8]>) -> Result<DocumentInfo, ProviderError>;

    /// `page` 从 1 开始，`scale` 为显示缩放（1.0 = 每点一像素）
    async fn render(&self, page: u32, scale: f64) -> Result<Raster, ProviderError>;

    fn unload(&self) {}
}

/// 检测器返回的单条结果，矩形位于文档空间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub page: u32,
    pub rect: DocumentRect,
    pub category: Category,
    pub excerpt: String,
    pub confidence: f64,
}

/// 敏感实体检测器
///
/// 可能很慢、可能失败；调用方不依赖结果的顺序和数量。
#[async_trait(?Send)]
pub trait Detector {
    async fn detect(&self, bytes: Arc<[u8]>) -> Result<Vec<Detection>, ProviderError>;

    /// 用于日志
    fn name(&self) -> &str;
}

/// 不透明填充颜色（RGB，0-1）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl FillColor {
    pub const BLACK: FillColor = FillColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
}

/// 导出提供者：打开原始文档的可修改副本
///
/// 序列化在阻塞线程池中执行，因此要求 `Send + Sync`。
pub trait ExportProvider: Send + Sync {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn MutableDocument>, ProviderError>;
}

/// 可修改的文档副本
pub trait MutableDocument: Send {
    fn page_count(&self) -> u32;

    /// 页码从 1 开始
    fn page_size(&self, page: u32) -> Option<PageSize>;

    /// 在文档空间矩形处绘制不透明填充
    fn fill_rect(
        &mut self,
        page: u32,
        rect: DocumentRect,
        color: FillColor,
    ) -> Result<(), ProviderError>;

    fn save(self: Box<Self>) -> Result<Vec<u8>, ProviderError>;
}
