//! 坐标映射
//!
//! 显示空间：按当前缩放渲染后的像素网格，原点在左上角。
//! 文档空间：页面原生坐标（PDF 点），与缩放无关，原点在左下角。
//!
//! 所有区域都以文档空间存储，只在渲染时转换到显示空间，
//! 这样缩放之后覆盖层仍然与内容对齐。
//!
//! 带 `/Rotate` 的页面按旋转后的方向显示，文档空间仍是未旋转的页面坐标。

use serde::{Deserialize, Serialize};

/// 显示空间中的点（像素，左上角原点）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 文档空间中的点（左下角原点）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentPoint {
    pub x: f64,
    pub y: f64,
}

impl DocumentPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 显示空间矩形，`(x, y)` 为左上角
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    /// 由两个角点构造，宽高总是非负
    pub fn from_corners(a: DisplayPoint, b: DisplayPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn top_left(&self) -> DisplayPoint {
        DisplayPoint::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> DisplayPoint {
        DisplayPoint::new(self.x + self.width, self.y + self.height)
    }
}

/// 文档空间矩形，`(x, y)` 为左下角
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DocumentRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 由两个角点构造，宽高总是非负
    pub fn from_corners(a: DocumentPoint, b: DocumentPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// 宽高为正且全部有限
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// 裁剪到 `[0, page_width] x [0, page_height]`，完全落在页面外时返回 `None`
    pub fn clip_to_page(&self, page: PageSize) -> Option<DocumentRect> {
        let left = self.x.max(0.0);
        let bottom = self.y.max(0.0);
        let right = (self.x + self.width).min(page.width);
        let top = (self.y + self.height).min(page.height);

        if right <= left || top <= bottom {
            return None;
        }
        Some(DocumentRect::new(left, bottom, right - left, top - bottom))
    }
}

/// 页面显示时的顺时针旋转角度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// 负角度和超过 360 的角度按模 360 归一；不是 90 的倍数时返回 `None`
    pub fn from_degrees(degrees: i64) -> Option<Rotation> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// 90° 和 270° 时显示宽高互换
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = String;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be a multiple of 90, got {}", degrees))
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> i64 {
        rotation.degrees()
    }
}

/// 页面原生尺寸（文档空间单位，未旋转）及显示旋转
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::None,
        }
    }

    pub const fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }

    /// 旋转后显示出来的宽高（文档单位）
    pub fn displayed(&self) -> (f64, f64) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// 显示空间与文档空间之间的变换
///
/// 只携带缩放比例和页面几何，不持有任何其他状态。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f64,
    page: PageSize,
}

impl Transform {
    pub fn new(scale: f64, page: PageSize) -> Self {
        Self { scale, page }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn page(&self) -> PageSize {
        self.page
    }

    pub fn page_height(&self) -> f64 {
        self.page.height
    }

    /// 显示像素 -> 未旋转的页面坐标
    pub fn to_document(&self, p: DisplayPoint) -> DocumentPoint {
        let (w, h) = (self.page.width, self.page.height);
        let u = p.x / self.scale;
        let v = p.y / self.scale;
        match self.page.rotation {
            Rotation::None => to_document(p.x, p.y, self.scale, h),
            Rotation::Cw90 => DocumentPoint::new(v, u),
            Rotation::Cw180 => DocumentPoint::new(w - u, v),
            Rotation::Cw270 => DocumentPoint::new(w - v, h - u),
        }
    }

    pub fn to_display(&self, p: DocumentPoint) -> DisplayPoint {
        let (w, h) = (self.page.width, self.page.height);
        let s = self.scale;
        match self.page.rotation {
            Rotation::None => to_display(p.x, p.y, s, h),
            Rotation::Cw90 => DisplayPoint::new(p.y * s, p.x * s),
            Rotation::Cw180 => DisplayPoint::new((w - p.x) * s, p.y * s),
            Rotation::Cw270 => DisplayPoint::new((h - p.y) * s, (w - p.x) * s),
        }
    }

    /// 两个角点分别变换后再归一化
    pub fn rect_to_document(&self, rect: DisplayRect) -> DocumentRect {
        DocumentRect::from_corners(
            self.to_document(rect.top_left()),
            self.to_document(rect.bottom_right()),
        )
    }

    pub fn rect_to_display(&self, rect: DocumentRect) -> DisplayRect {
        let a = self.to_display(DocumentPoint::new(rect.x, rect.y));
        let b = self.to_display(DocumentPoint::new(rect.x + rect.width, rect.y + rect.height));
        DisplayRect::from_corners(a, b)
    }
}

/// 显示像素 -> 文档坐标（纵向翻转）
pub fn to_document(px: f64, py: f64, scale: f64, page_height: f64) -> DocumentPoint {
    DocumentPoint {
        x: px / scale,
        y: page_height - py / scale,
    }
}

/// 文档坐标 -> 显示像素，`to_document` 的精确逆变换
pub fn to_display(x: f64, y: f64, scale: f64, page_height: f64) -> DisplayPoint {
    DisplayPoint {
        x: x * scale,
        y: (page_height - y) * scale,
    }
}
