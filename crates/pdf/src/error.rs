use thiserror::Error;
use veil_core::ProviderError;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("encrypted documents are not supported")]
    Encrypted,

    #[error("document has no pages")]
    NoPages,

    #[error("page {page} does not exist (document has {total} pages)")]
    MissingPage { page: u32, total: u32 },

    #[error("failed to write content for page {page}: {reason}")]
    Content { page: u32, reason: String },

    #[error("failed to save PDF: {0}")]
    Save(String),
}

impl PdfError {
    pub fn page(&self) -> Option<u32> {
        match self {
            PdfError::MissingPage { page, .. } | PdfError::Content { page, .. } => Some(*page),
            _ => None,
        }
    }
}

impl From<PdfError> for ProviderError {
    fn from(err: PdfError) -> Self {
        ProviderError {
            page: err.page(),
            message: err.to_string(),
        }
    }
}
