//! 录制的拖拽手势回放
//!
//! 文件格式：
//!
//! ```json
//! { "gestures": [ { "page": 1, "zoom": 1.5, "from": {"x": 90, "y": 120}, "to": {"x": 260, "y": 150} } ] }
//! ```
//!
//! 坐标是录制时所在缩放下的显示空间像素，`zoom` 缺省时沿用当前缩放。

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use veil_core::{CaptureOutcome, DisplayPoint, Session};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub page: u32,
    #[serde(default)]
    pub zoom: Option<f64>,
    pub from: DisplayPoint,
    pub to: DisplayPoint,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GestureFile {
    pub gestures: Vec<Gesture>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub committed: usize,
    pub discarded: usize,
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Gesture>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gestures from {}", path.display()))?;
    let file: GestureFile = serde_json::from_str(&raw)
        .with_context(|| format!("malformed gesture file {}", path.display()))?;
    Ok(file.gestures)
}

/// 依次把手势送进交互控制器，和用户在画布上拖拽走同一条路径
pub fn replay(session: &Session, gestures: &[Gesture]) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    session.set_redaction_mode(true);

    for (i, gesture) in gestures.iter().enumerate() {
        session
            .go_to_page(gesture.page)
            .with_context(|| format!("gesture {} targets page {}", i + 1, gesture.page))?;
        if let Some(zoom) = gesture.zoom {
            session.zoom_to(zoom);
        }

        if !session.pointer_down(gesture.from) {
            log::warn!("[Replay] 手势 {} 未能开始拖拽", i + 1);
            summary.discarded += 1;
            continue;
        }
        session.pointer_move(gesture.to);
        match session.pointer_up(gesture.to) {
            CaptureOutcome::Committed(id) => {
                log::info!("[Replay] 手势 {} -> 区域 {}", i + 1, id);
                summary.committed += 1;
            }
            CaptureOutcome::TooSmall(rect) => {
                log::warn!(
                    "[Replay] 手势 {} 选区过小 ({:.1}x{:.1})，已丢弃",
                    i + 1,
                    rect.width,
                    rect.height
                );
                summary.discarded += 1;
            }
            CaptureOutcome::Ignored => summary.discarded += 1,
        }
    }

    session.set_redaction_mode(false);
    Ok(summary)
}
