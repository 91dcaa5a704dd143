use log::{debug, warn};

use crate::config::ExtractionConfig;
use crate::error::BoxError;
use crate::geometry::{Rectangle, clip_rect};
use crate::page::PageLayout;
use crate::pipeline::capture_region;
use crate::render::RegionRenderer;
use crate::sink::{ArtifactSink, table_artifact_name};

/// Finds table regions on a page.
///
/// Only the bounding box matters here; cell structure is left to the detector.
pub trait TableDetector {
    fn detect(&self, page: &PageLayout) -> Result<Vec<Rectangle>, BoxError>;
}

impl<F> TableDetector for F
where
    F: Fn(&PageLayout) -> Result<Vec<Rectangle>, BoxError>,
{
    fn detect(&self, page: &PageLayout) -> Result<Vec<Rectangle>, BoxError> {
        self(page)
    }
}

/// Counters for table snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub found: usize,
    pub captured: usize,
    /// Detected regions with no area on the page.
    pub off_page: usize,
    /// Detector errors plus regions that failed to render or persist.
    pub failed: usize,
}

/// Snapshot every table the detector reports, in detection order.
///
/// Tables are captured exactly, without the padding boxes get.
pub fn capture_tables<D, R, S>(
    page: &PageLayout,
    detector: &D,
    config: &ExtractionConfig,
    renderer: &R,
    sink: &mut S,
    stats: &mut TableStats,
) where
    D: TableDetector + ?Sized,
    R: RegionRenderer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    let tables = match detector.detect(page) {
        Ok(tables) => tables,
        Err(err) => {
            warn!("page {}: table detection failed: {err}", page.number());
            stats.failed += 1;
            return;
        }
    };
    for (i, table) in tables.iter().enumerate() {
        stats.found += 1;
        let name = table_artifact_name(page.number(), i + 1);
        let Some(clip) = clip_rect(table, 0.0, &page.bounds) else {
            warn!("{name}: table {table:?} has no area on the page, skipping");
            stats.off_page += 1;
            continue;
        };
        match capture_region(page, &clip, &name, config, renderer, sink) {
            Ok(location) => {
                debug!("{name}: saved to {location}");
                stats.captured += 1;
            }
            Err(err) => {
                warn!("{name}: {err}");
                stats.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageBounds;
    use crate::render::OutlineRenderer;
    use crate::sink::MemorySink;

    fn page() -> PageLayout {
        PageLayout::from_rects(1, PageBounds::new(300.0, 300.0), &[])
    }

    #[test]
    fn tables_are_named_in_detection_order() {
        let detector = |_: &PageLayout| -> Result<Vec<Rectangle>, BoxError> {
            Ok(vec![
                Rectangle::new(10.0, 200.0, 110.0, 260.0),
                Rectangle::new(10.0, 10.0, 110.0, 60.0),
                Rectangle::new(400.0, 400.0, 500.0, 500.0),
            ])
        };
        let mut sink = MemorySink::new();
        let mut stats = TableStats::default();
        capture_tables(
            &page(),
            &detector,
            &ExtractionConfig::default(),
            &OutlineRenderer::new(),
            &mut sink,
            &mut stats,
        );

        assert_eq!(sink.names(), vec!["p2_table_1", "p2_table_2"]);
        assert_eq!(stats.found, 3);
        assert_eq!(stats.captured, 2);
        assert_eq!(stats.off_page, 1);
    }

    #[test]
    fn table_clip_is_not_padded() {
        let detector = |_: &PageLayout| -> Result<Vec<Rectangle>, BoxError> {
            Ok(vec![Rectangle::new(10.0, 10.0, 60.0, 40.0)])
        };
        let mut sink = MemorySink::new();
        let mut stats = TableStats::default();
        capture_tables(
            &page(),
            &detector,
            &ExtractionConfig::default(),
            &OutlineRenderer::new(),
            &mut sink,
            &mut stats,
        );
        let png = &sink.artifacts[0].bytes;
        // IHDR width and height at the default 2x scale.
        assert_eq!(&png[16..20], &100u32.to_be_bytes());
        assert_eq!(&png[20..24], &60u32.to_be_bytes());
    }

    #[test]
    fn detector_error_is_counted() {
        let detector = |_: &PageLayout| -> Result<Vec<Rectangle>, BoxError> {
            Err(BoxError::Render("no text layer".into()))
        };
        let mut sink = MemorySink::new();
        let mut stats = TableStats::default();
        capture_tables(
            &page(),
            &detector,
            &ExtractionConfig::default(),
            &OutlineRenderer::new(),
            &mut sink,
            &mut stats,
        );
        assert!(sink.artifacts.is_empty());
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.found, 0);
    }
}
