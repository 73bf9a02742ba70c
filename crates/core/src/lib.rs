//! Core model for interactive PDF redaction.
//!
//! Regions are stored in document space (native page units, bottom-left
//! origin) and only mapped to display space when drawn, so overlays stay
//! aligned at any zoom level. Rendering, detection and export are pluggable
//! providers; [`Session`] orchestrates them on a single logical thread.

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod notify;
pub mod overlay;
pub mod provider;
pub mod session;
pub mod source;
pub mod store;
pub mod viewport;

pub use config::SessionConfig;
pub use error::{CoreError, ProviderError, RedactError, Result};
pub use export::{apply_redactions, export_file_name, ExportArtifact};
pub use geometry::{
    DisplayPoint, DisplayRect, DocumentPoint, DocumentRect, PageSize, Rotation, Transform,
};
pub use interaction::{CaptureOutcome, CaptureState, InteractionController};
pub use notify::{SessionEvent, SubscriptionId};
pub use overlay::{OverlayItem, OverlayPlan, OverlayStyle, Rgba};
pub use provider::{
    Detection, Detector, DocumentInfo, DocumentProvider, ExportProvider, FillColor,
    MutableDocument, Raster,
};
pub use session::{
    DetectionOutcome, DocumentSummary, RedactionSummary, RenderedPage, Session, SuggestionEntry,
};
pub use source::SourceDocument;
pub use store::{Category, Redaction, RedactionOrigin, RegionId, RegionStore, SessionId, Suggestion};
pub use viewport::{ViewportManager, ViewportState};
