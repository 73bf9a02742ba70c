//! Sensitive-entity detectors.
//!
//! Detectors only propose regions. Nothing they return is applied until the
//! user accepts it through the session.

mod error;
mod http;
mod stub;

pub use error::DetectError;
pub use http::HttpDetector;
pub use stub::StubDetector;

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use veil_core::Detector;

/// 检测器选择
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DetectorConfig {
    /// 固定的演示结果，可选人为延迟
    #[serde(rename_all = "camelCase")]
    Stub {
        #[serde(default)]
        delay_ms: u64,
    },
    /// 远程检测服务
    #[serde(rename_all = "camelCase")]
    Http {
        endpoint: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig::Stub { delay_ms: 0 }
    }
}

/// 按配置构建检测器
pub fn build(config: &DetectorConfig) -> Result<Rc<dyn Detector>, DetectError> {
    match config {
        DetectorConfig::Stub { delay_ms } => {
            log::info!("[Detector] 使用演示检测器 (延迟 {}ms)", delay_ms);
            Ok(Rc::new(StubDetector::new(Duration::from_millis(*delay_ms))))
        }
        DetectorConfig::Http {
            endpoint,
            timeout_secs,
        } => {
            log::info!("[Detector] 使用远程检测服务: {}", endpoint);
            Ok(Rc::new(HttpDetector::new(
                endpoint,
                Duration::from_secs(*timeout_secs),
            )?))
        }
    }
}
