//! 视口管理：当前页码与缩放比例

use serde::Serialize;

use crate::config::SessionConfig;
use crate::geometry::{PageSize, Transform};

/// 视口状态快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    /// 当前页码，从 1 开始
    pub page: u32,
    pub scale: f64,
}

/// 视口管理器
///
/// 所有操作都是同步的，返回值表示状态是否真的发生了变化，
/// 由会话负责把变化通知给渲染器和覆盖层。
#[derive(Debug, Clone)]
pub struct ViewportManager {
    page: u32,
    scale: f64,
    pages: Vec<PageSize>,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
}

impl ViewportManager {
    /// `pages` 不能为空，会话在载入阶段已经保证
    pub fn new(pages: Vec<PageSize>, config: &SessionConfig) -> Self {
        Self {
            page: 1,
            scale: round_scale(config.initial_scale.clamp(config.min_scale, config.max_scale)),
            pages,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
        }
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            page: self.page,
            scale: self.scale,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn total_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    /// 页码从 1 开始
    pub fn page_size(&self, page: u32) -> Option<PageSize> {
        if page == 0 {
            return None;
        }
        self.pages.get(page as usize - 1).copied()
    }

    pub fn contains_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages()
    }

    /// 当前页、当前缩放下的坐标变换
    pub fn transform(&self) -> Transform {
        let page = self
            .page_size(self.page)
            .unwrap_or(PageSize::new(0.0, 0.0));
        Transform::new(self.scale, page)
    }

    /// 越界时不做任何事
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if !self.contains_page(page) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_to(self.scale + self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_to(self.scale - self.zoom_step)
    }

    /// 设置到指定缩放，超出区间时夹到边界
    pub fn zoom_to(&mut self, scale: f64) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let next = round_scale(scale.clamp(self.min_scale, self.max_scale));
        if next == self.scale {
            return false;
        }
        self.scale = next;
        true
    }
}

/// 保留六位小数，避免反复步进累积误差（1.2 + 0.2 * 9 仍然落在 3.0）
fn round_scale(scale: f64) -> f64 {
    (scale * 1e6).round() / 1e6
}
