//! 上传文件入口：格式检查

use std::sync::Arc;

use crate::error::{RedactError, Result};

/// PDF 文件头可以出现在前 1024 字节内的任意位置
const HEADER_SEARCH_WINDOW: usize = 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";

/// 通过格式检查的源文档
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    bytes: Arc<[u8]>,
}

impl SourceDocument {
    /// 检查上传内容是否为 PDF，并且不超过大小上限
    pub fn from_upload(name: impl Into<String>, bytes: Vec<u8>, max_bytes: usize) -> Result<Self> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(RedactError::InvalidInputFormat(format!("{} is empty", name)));
        }
        if bytes.len() > max_bytes {
            return Err(RedactError::InvalidInputFormat(format!(
                "{} is {} bytes, limit is {}",
                name,
                bytes.len(),
                max_bytes
            )));
        }
        if !has_pdf_header(&bytes) {
            return Err(RedactError::InvalidInputFormat(format!(
                "{} is not a PDF document",
                name
            )));
        }
        Ok(Self {
            name,
            bytes: Arc::from(bytes),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|w| w == PDF_MAGIC)
}
