use thiserror::Error;
use veil_core::ProviderError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdfium library is unavailable: {0}")]
    Bind(String),

    #[error("failed to open document: {0}")]
    Open(String),

    #[error("failed to render page {page}: {reason}")]
    Page { page: u32, reason: String },

    #[error("no document is loaded")]
    NotLoaded,

    #[error("failed to save image: {0}")]
    Save(#[from] image::ImageError),
}

impl From<RenderError> for ProviderError {
    fn from(err: RenderError) -> Self {
        match &err {
            RenderError::Page { page, .. } => ProviderError::on_page(*page, err.to_string()),
            _ => ProviderError::new(err.to_string()),
        }
    }
}
