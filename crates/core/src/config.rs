use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 会话配置
///
/// 所有字段都有默认值，配置文件里可以只写需要覆盖的部分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// 最小缩放比例
    pub min_scale: f64,
    /// 最大缩放比例
    pub max_scale: f64,
    /// 每次放大/缩小的步长
    pub zoom_step: f64,
    /// 打开文档时的初始缩放
    pub initial_scale: f64,
    /// 拖拽框的最小宽高（显示空间像素），更小的视为误点击
    pub min_capture_size: f64,
    /// 导出文件名前缀
    pub export_prefix: String,
    /// 上传文件大小上限（字节）
    pub max_upload_bytes: usize,
    /// 检测完成后是否显示建议覆盖层
    pub show_suggestions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            zoom_step: 0.2,
            initial_scale: 1.2,
            min_capture_size: 10.0,
            export_prefix: "redacted_".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            show_suggestions: true,
        }
    }
}

impl SessionConfig {
    /// 检查缩放区间与阈值是否自洽
    pub fn validate(&self) -> Result<(), CoreError> {
        let finite = [
            self.min_scale,
            self.max_scale,
            self.zoom_step,
            self.initial_scale,
            self.min_capture_size,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(CoreError::InvalidConfig("values must be finite"));
        }
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return Err(CoreError::InvalidConfig("scale range is empty"));
        }
        if self.zoom_step <= 0.0 {
            return Err(CoreError::InvalidConfig("zoom step must be positive"));
        }
        if self.initial_scale < self.min_scale || self.initial_scale > self.max_scale {
            return Err(CoreError::InvalidConfig("initial scale outside range"));
        }
        if self.min_capture_size < 0.0 {
            return Err(CoreError::InvalidConfig("capture size must not be negative"));
        }
        if self.max_upload_bytes == 0 {
            return Err(CoreError::InvalidConfig("upload limit must be positive"));
        }
        Ok(())
    }
}
