use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use veil_core::SessionConfig;
use veil_detect::DetectorConfig;

/// 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "VEIL_CONFIG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    // ============ 会话 ============
    pub session: SessionConfig,

    // ============ 检测 ============
    pub detector: DetectorConfig,

    // ============ 渲染 ============
    /// pdfium 库所在目录，未设置时自动搜索
    pub pdfium_library_path: Option<PathBuf>,
    /// 预览图的 DPI
    pub render_dpi: u32,

    // ============ 日志 ============
    pub log_level: String,
    /// 额外写入的日志文件
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            detector: DetectorConfig::default(),
            pdfium_library_path: None,
            render_dpi: 150,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown log level: {0}")]
    LogLevel(String),
    #[error(transparent)]
    Session(#[from] veil_core::CoreError),
}

impl AppConfig {
    /// 文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("[Config] {} 不存在，使用默认配置", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.session.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// 预览渲染对应的缩放比例
    pub fn preview_scale(&self) -> f64 {
        self.render_dpi as f64 / veil_render::POINTS_PER_INCH
    }
}

/// 命令行参数优先，其次环境变量，最后是当前目录下的 veil.json
pub fn resolve_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from("veil.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.session.initial_scale, 1.2);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("veil.json");

        let config = AppConfig {
            detector: DetectorConfig::Http {
                endpoint: "http://localhost:9000/detect".to_string(),
                timeout_secs: 10,
            },
            render_dpi: 96,
            log_level: "debug".to_string(),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veil.json");
        fs::write(&path, r#"{"session":{"maxScale":4.0},"renderDpi":72}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.session.max_scale, 4.0);
        assert_eq!(config.session.min_scale, 0.5);
        assert_eq!(config.preview_scale(), 1.0);
        assert_eq!(config.detector, DetectorConfig::Stub { delay_ms: 0 });
    }

    #[test]
    fn test_inconsistent_limits_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veil.json");
        fs::write(&path, r#"{"session":{"minScale":2.0,"maxScale":1.0}}"#).unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Session(_))
        ));
    }
}
