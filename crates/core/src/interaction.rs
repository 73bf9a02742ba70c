//! 指针手势 -> 脱敏区域
//!
//! 两个状态：`Idle` 和 `Dragging`。拖拽过程中只产生预览矩形，
//! 只有松开指针且矩形足够大时才写入区域存储。

use crate::geometry::{DisplayPoint, DisplayRect, Transform};
use crate::store::{RedactionOrigin, RegionId, RegionStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureState {
    Idle,
    Dragging {
        anchor: DisplayPoint,
        current: DisplayPoint,
    },
}

/// `pointer_up` 的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// 已写入存储
    Committed(RegionId),
    /// 矩形小于阈值，视为误点击
    TooSmall(DisplayRect),
    /// 当前没有进行中的拖拽
    Ignored,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    state: CaptureState,
    mode_enabled: bool,
    min_size: f64,
}

impl InteractionController {
    /// `min_size` 为显示空间像素，与缩放无关
    pub fn new(min_size: f64) -> Self {
        Self {
            state: CaptureState::Idle,
            mode_enabled: false,
            min_size,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, CaptureState::Dragging { .. })
    }

    pub fn mode_enabled(&self) -> bool {
        self.mode_enabled
    }

    /// 关闭脱敏模式时丢弃进行中的拖拽
    pub fn set_mode(&mut self, enabled: bool) {
        self.mode_enabled = enabled;
        if !enabled {
            self.cancel();
        }
    }

    /// 开始拖拽；模式关闭或有后台任务时拒绝
    pub fn pointer_down(&mut self, point: DisplayPoint, processing: bool) -> bool {
        if !self.mode_enabled || processing || self.is_dragging() {
            return false;
        }
        self.state = CaptureState::Dragging {
            anchor: point,
            current: point,
        };
        true
    }

    /// 更新预览矩形，不修改存储
    pub fn pointer_move(&mut self, point: DisplayPoint) -> Option<DisplayRect> {
        match &mut self.state {
            CaptureState::Dragging { anchor, current } => {
                *current = point;
                Some(DisplayRect::from_corners(*anchor, point))
            }
            CaptureState::Idle => None,
        }
    }

    /// 当前预览矩形
    pub fn preview(&self) -> Option<DisplayRect> {
        match self.state {
            CaptureState::Dragging { anchor, current } => {
                Some(DisplayRect::from_corners(anchor, current))
            }
            CaptureState::Idle => None,
        }
    }

    /// 结束拖拽
    ///
    /// 宽或高小于阈值时丢弃；否则用当前页的变换转换到文档空间，
    /// 以 `Manual` 来源写入存储。无论结果如何都回到 `Idle`。
    pub fn pointer_up(
        &mut self,
        point: DisplayPoint,
        transform: Transform,
        page: u32,
        store: &mut RegionStore,
    ) -> CaptureOutcome {
        let anchor = match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Dragging { anchor, .. } => anchor,
            CaptureState::Idle => return CaptureOutcome::Ignored,
        };

        let rect = DisplayRect::from_corners(anchor, point);
        if rect.width < self.min_size || rect.height < self.min_size {
            log::debug!(
                "[Capture] 丢弃过小的选区: {:.1}x{:.1}px",
                rect.width,
                rect.height
            );
            return CaptureOutcome::TooSmall(rect);
        }

        let doc_rect = transform.rect_to_document(rect);
        match store.add_redaction(doc_rect, page, RedactionOrigin::Manual) {
            Some(id) => {
                log::info!(
                    "[Capture] 页 {} 新增手动脱敏区域 {}: 显示 ({:.1}, {:.1}, {:.1}, {:.1}) -> 文档 ({:.2}, {:.2}, {:.2}, {:.2})",
                    page,
                    id,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    doc_rect.x,
                    doc_rect.y,
                    doc_rect.width,
                    doc_rect.height
                );
                CaptureOutcome::Committed(id)
            }
            None => CaptureOutcome::Ignored,
        }
    }

    /// 指针离开画布或模式被关闭
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = CaptureState::Idle;
        was_dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DocumentRect, PageSize};
    use crate::store::SessionId;

    const PAGE: PageSize = PageSize::new(612.0, 800.0);

    fn controller() -> InteractionController {
        let mut controller = InteractionController::new(10.0);
        controller.set_mode(true);
        controller
    }

    fn drag(
        controller: &mut InteractionController,
        store: &mut RegionStore,
        from: (f64, f64),
        to: (f64, f64),
        scale: f64,
    ) -> CaptureOutcome {
        assert!(controller.pointer_down(DisplayPoint::new(from.0, from.1), false));
        controller.pointer_move(DisplayPoint::new(to.0, to.1));
        controller.pointer_up(
            DisplayPoint::new(to.0, to.1),
            Transform::new(scale, PAGE),
            1,
            store,
        )
    }

    #[test]
    fn test_small_drag_is_discarded() {
        let mut store = RegionStore::new(SessionId(1));
        let mut c = controller();
        let outcome = drag(&mut c, &mut store, (10.0, 10.0), (15.0, 15.0), 1.0);
        assert!(matches!(outcome, CaptureOutcome::TooSmall(_)));
        assert!(store.redactions().is_empty());
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_threshold_is_in_display_pixels() {
        let mut store = RegionStore::new(SessionId(1));
        let mut c = controller();
        let outcome = drag(&mut c, &mut store, (10.0, 10.0), (22.0, 25.0), 3.0);
        assert!(matches!(outcome, CaptureOutcome::Committed(_)));
        assert_eq!(store.redactions().len(), 1);
    }

    #[test]
    fn test_geometry_example() {
        let mut store = RegionStore::new(SessionId(1));
        let mut c = controller();
        drag(&mut c, &mut store, (50.0, 50.0), (150.0, 80.0), 1.0);
        assert_eq!(
            store.redactions()[0].rect,
            DocumentRect::new(50.0, 720.0, 100.0, 30.0)
        );
        assert_eq!(store.redactions()[0].origin, RedactionOrigin::Manual);
    }

    #[test]
    fn test_move_only_previews() {
        let store = RegionStore::new(SessionId(1));
        let mut c = controller();
        c.pointer_down(DisplayPoint::new(100.0, 100.0), false);
        let preview = c.pointer_move(DisplayPoint::new(40.0, 160.0)).unwrap();
        assert_eq!(preview.x, 40.0);
        assert_eq!(preview.y, 100.0);
        assert_eq!(preview.width, 60.0);
        assert_eq!(preview.height, 60.0);
        assert_eq!(c.preview(), Some(preview));
        assert!(store.redactions().is_empty());
    }

    #[test]
    fn test_gated_by_mode_and_processing() {
        let mut c = InteractionController::new(10.0);
        assert!(!c.pointer_down(DisplayPoint::new(0.0, 0.0), false));
        c.set_mode(true);
        assert!(!c.pointer_down(DisplayPoint::new(0.0, 0.0), true));
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_disabling_mode_cancels_drag() {
        let mut store = RegionStore::new(SessionId(1));
        let mut c = controller();
        c.pointer_down(DisplayPoint::new(0.0, 0.0), false);
        c.set_mode(false);
        let outcome = c.pointer_up(
            DisplayPoint::new(100.0, 100.0),
            Transform::new(1.0, PAGE),
            1,
            &mut store,
        );
        assert_eq!(outcome, CaptureOutcome::Ignored);
        assert!(store.redactions().is_empty());
    }

    #[test]
    fn test_pointer_leave_discards() {
        let mut c = controller();
        c.pointer_down(DisplayPoint::new(0.0, 0.0), false);
        assert!(c.cancel());
        assert!(!c.cancel());
        assert!(c.pointer_move(DisplayPoint::new(5.0, 5.0)).is_none());
    }
}
