//! 覆盖层：把当前页的区域转换到显示空间，供渲染器绘制

use serde::Serialize;

use crate::geometry::{DisplayRect, Transform};
use crate::store::{RegionId, RegionStore};

/// 覆盖层样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStyle {
    /// 已确认区域：纯黑
    Redaction,
    /// 待审核建议：半透明红底 + 红色描边
    Suggestion,
    /// 拖拽预览：深色半透明 + 红色描边
    Preview,
}

/// RGBA 颜色
pub type Rgba = [u8; 4];

impl OverlayStyle {
    pub fn fill(&self) -> Rgba {
        match self {
            OverlayStyle::Redaction => [0, 0, 0, 255],
            OverlayStyle::Suggestion => [255, 0, 0, 77],
            OverlayStyle::Preview => [0, 0, 0, 204],
        }
    }

    /// 描边颜色与线宽（像素）
    pub fn stroke(&self) -> Option<(Rgba, u32)> {
        match self {
            OverlayStyle::Redaction => None,
            OverlayStyle::Suggestion | OverlayStyle::Preview => Some(([255, 0, 0, 255], 2)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayItem {
    /// 预览矩形没有 id
    pub id: Option<RegionId>,
    pub rect: DisplayRect,
    pub style: OverlayStyle,
}

/// 一次重绘需要的全部覆盖层，按绘制顺序排列
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayPlan {
    pub page: u32,
    pub scale: f64,
    pub items: Vec<OverlayItem>,
}

impl OverlayPlan {
    /// 先画已确认区域，再画建议，最后画拖拽预览
    pub fn build(
        store: &RegionStore,
        page: u32,
        transform: Transform,
        show_suggestions: bool,
        preview: Option<DisplayRect>,
    ) -> Self {
        let mut items: Vec<OverlayItem> = store
            .redactions_for_page(page)
            .map(|r| OverlayItem {
                id: Some(r.id),
                rect: transform.rect_to_display(r.rect),
                style: OverlayStyle::Redaction,
            })
            .collect();

        if show_suggestions {
            items.extend(store.suggestions_for_page(page).map(|s| OverlayItem {
                id: Some(s.id),
                rect: transform.rect_to_display(s.rect),
                style: OverlayStyle::Suggestion,
            }));
        }

        if let Some(rect) = preview {
            items.push(OverlayItem {
                id: None,
                rect,
                style: OverlayStyle::Preview,
            });
        }

        Self {
            page,
            scale: transform.scale(),
            items,
        }
    }

    pub fn of_style(&self, style: OverlayStyle) -> impl Iterator<Item = &OverlayItem> {
        self.items.iter().filter(move |item| item.style == style)
    }
}
