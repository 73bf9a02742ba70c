//! 错误类型

use thiserror::Error;

/// 会话级错误
///
/// 载入与导出失败对该次操作是终止性的，但会话原有状态保持不变，
/// 由用户决定是否重试。检测失败不在此列：会话会降级为空建议集。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RedactError {
    #[error("invalid input format: {0}")]
    InvalidInputFormat(String),

    #[error("failed to load document: {0}")]
    LoadFailure(String),

    #[error("detection failed: {0}")]
    DetectionFailure(String),

    #[error("nothing to export: {0}")]
    ExportPrecondition(&'static str),

    #[error("export failed{}: {reason}", page_suffix(.page))]
    ExportFailure { page: Option<u32>, reason: String },

    #[error("failed to render page {page}: {reason}")]
    RenderFailure { page: u32, reason: String },

    #[error("page {page} out of range (document has {total} pages)")]
    PageIndexOutOfRange { page: u32, total: u32 },

    #[error("{0} already in progress")]
    Busy(&'static str),

    #[error("no document is open")]
    NoDocument,
}

fn page_suffix(page: &Option<u32>) -> String {
    match page {
        Some(page) => format!(" on page {}", page),
        None => String::new(),
    }
}

/// 外部能力（文档提供者、检测器、导出提供者）返回的错误
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ProviderError {
    /// 出错的页码（从 1 开始），未知时为 `None`
    pub page: Option<u32>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            page: None,
            message: message.into(),
        }
    }

    pub fn on_page(page: u32, message: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            message: message.into(),
        }
    }
}

/// 配置与装配阶段的错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, RedactError>;
