//! Capture boxed regions and embedded images from PDF pages.
//!
//! Painted paths are filtered by size, near-duplicates collapsed, nested boxes
//! removed, and the outermost boxes rendered top to bottom through a
//! [`RegionRenderer`] into an [`ArtifactSink`]. Regions reported by a
//! [`TableDetector`] are captured the same way.

pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod images;
pub mod order;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod sink;
pub mod tables;

pub use config::{ExtractionConfig, ImageFilterConfig};
pub use document::PdfSource;
pub use error::BoxError;
pub use filter::{FilterOutcome, FilterStats, filter_candidates};
pub use geometry::{PageBounds, Rectangle, clip_rect, is_contained};
pub use order::order_by_reading;
pub use page::{DrawingShape, PageLayout};
pub use pipeline::{
    ExtractionSummary, PagePlan, PlannedBox, extract_document, extract_pages, plan_page,
    plan_pages,
};
pub use render::{OutlineRenderer, RegionRenderer, RenderedRegion};
pub use resolver::resolve_outermost;
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use tables::{TableDetector, TableStats};
