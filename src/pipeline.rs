use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::ExtractionConfig;
use crate::document::PdfSource;
use crate::error::BoxError;
use crate::filter::{FilterStats, filter_candidates};
use crate::geometry::{Rectangle, clip_rect};
use crate::images::{EmbeddedImage, ImageFilter, ImageRejection};
use crate::order::order_by_reading;
use crate::page::PageLayout;
use crate::render::RegionRenderer;
use crate::resolver::resolve_outermost;
use crate::sink::{ArtifactSink, box_artifact_name, image_artifact_name};
use crate::tables::{TableDetector, TableStats, capture_tables};

/// An outermost box with its reading-order index and capture rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedBox {
    /// One-based position in top-to-bottom order.
    pub order: usize,
    pub rect: Rectangle,
    /// `None` when the padded box lies entirely off the page.
    pub clip: Option<Rectangle>,
}

/// Everything the core decided for one page, before any rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_index: usize,
    pub boxes: Vec<PlannedBox>,
    pub filter: FilterStats,
    /// Candidates that survived the filter.
    pub candidates: usize,
}

impl PagePlan {
    pub fn nested(&self) -> usize {
        self.candidates - self.boxes.len()
    }
}

/// Filter, resolve, order and clip the boxes of one page.
pub fn plan_page(page: &PageLayout, config: &ExtractionConfig) -> PagePlan {
    let outcome = filter_candidates(page.shape_rects(), &page.bounds, config);
    let outermost = resolve_outermost(&outcome.candidates);
    let boxes = order_by_reading(&outermost)
        .into_iter()
        .enumerate()
        .map(|(i, rect)| PlannedBox {
            order: i + 1,
            rect,
            clip: clip_rect(&rect, config.clip_padding, &page.bounds),
        })
        .collect::<Vec<_>>();
    debug!(
        "page {}: {} shapes, {} candidates, {} outermost boxes",
        page.number(),
        outcome.stats.shapes_seen,
        outcome.candidates.len(),
        boxes.len()
    );
    PagePlan {
        page_index: page.index,
        boxes,
        filter: outcome.stats,
        candidates: outcome.candidates.len(),
    }
}

/// Plan pages in parallel. Plans come back in the order of `pages`.
pub fn plan_pages(pages: &[PageLayout], config: &ExtractionConfig) -> Vec<PagePlan> {
    pages.par_iter().map(|page| plan_page(page, config)).collect()
}

/// Counters for embedded image extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageStats {
    pub found: usize,
    pub saved: usize,
    pub skipped_small: usize,
    pub skipped_duplicate: usize,
    pub skipped_unsupported: usize,
    pub failed: usize,
}

/// Aggregate outcome of a run; every skip category is counted, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub shapes_seen: usize,
    pub invalid_shapes: usize,
    pub normalized_shapes: usize,
    pub skipped_too_small: usize,
    pub skipped_too_large: usize,
    pub skipped_duplicate: usize,
    pub candidates_found: usize,
    pub nested_boxes: usize,
    pub boxes_captured: usize,
    pub empty_clips: usize,
    pub render_failures: usize,
    pub tables: TableStats,
    pub images: ImageStats,
}

impl ExtractionSummary {
    pub fn record_plan(&mut self, plan: &PagePlan) {
        let stats = &plan.filter;
        self.shapes_seen += stats.shapes_seen;
        self.invalid_shapes += stats.invalid;
        self.normalized_shapes += stats.normalized;
        self.skipped_too_small += stats.too_small;
        self.skipped_too_large += stats.too_large;
        self.skipped_duplicate += stats.duplicate;
        self.candidates_found += plan.candidates;
        self.nested_boxes += plan.nested();
    }

    /// Outermost boxes found, captured or not.
    pub fn outermost_boxes(&self) -> usize {
        self.boxes_captured + self.empty_clips + self.render_failures
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pages processed     : {} ({} failed)",
            self.pages_processed, self.pages_failed
        )?;
        writeln!(f, "Drawing shapes      : {}", self.shapes_seen)?;
        writeln!(f, "Candidates found    : {}", self.candidates_found)?;
        writeln!(f, "Outermost boxes     : {}", self.outermost_boxes())?;
        writeln!(f, "Boxes captured      : {}", self.boxes_captured)?;
        writeln!(f, "Skipped (too small) : {}", self.skipped_too_small)?;
        writeln!(f, "Skipped (too large) : {}", self.skipped_too_large)?;
        writeln!(f, "Skipped (duplicate) : {}", self.skipped_duplicate)?;
        writeln!(f, "Skipped (nested)    : {}", self.nested_boxes)?;
        writeln!(
            f,
            "Skipped (invalid)   : {} ({} normalized)",
            self.invalid_shapes, self.normalized_shapes
        )?;
        writeln!(f, "Skipped (off page)  : {}", self.empty_clips)?;
        write!(f, "Render failures     : {}", self.render_failures)?;
        let tables = &self.tables;
        if tables.found > 0 || tables.failed > 0 {
            writeln!(f)?;
            writeln!(f, "Tables found        : {}", tables.found)?;
            writeln!(f, "Tables captured     : {}", tables.captured)?;
            write!(
                f,
                "Table failures      : {} ({} off page)",
                tables.failed, tables.off_page
            )?;
        }
        let images = &self.images;
        if images.found > 0 {
            writeln!(f)?;
            writeln!(f, "Images found        : {}", images.found)?;
            writeln!(f, "Images saved        : {}", images.saved)?;
            writeln!(
                f,
                "Images skipped      : {} small, {} duplicate, {} unsupported",
                images.skipped_small, images.skipped_duplicate, images.skipped_unsupported
            )?;
            write!(f, "Image failures      : {}", images.failed)?;
        }
        Ok(())
    }
}

/// Render `clip` and persist it as a PNG named `name`.
pub(crate) fn capture_region<R, S>(
    page: &PageLayout,
    clip: &Rectangle,
    name: &str,
    config: &ExtractionConfig,
    renderer: &R,
    sink: &mut S,
) -> Result<String, BoxError>
where
    R: RegionRenderer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    let region = renderer.render(page, clip, config.render_scale)?;
    sink.persist(name, "png", &region.to_png()?)
}

/// Render and persist every planned box of a page.
///
/// A failing box is logged and counted; the remaining boxes are still captured.
pub fn capture_page<R, S>(
    page: &PageLayout,
    plan: &PagePlan,
    config: &ExtractionConfig,
    renderer: &R,
    sink: &mut S,
    summary: &mut ExtractionSummary,
) where
    R: RegionRenderer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    for planned in &plan.boxes {
        let name = box_artifact_name(page.number(), planned.order);
        let Some(clip) = planned.clip else {
            warn!("{name}: box {:?} has no area on the page, skipping", planned.rect);
            summary.empty_clips += 1;
            continue;
        };
        match capture_region(page, &clip, &name, config, renderer, sink) {
            Ok(location) => {
                debug!("{name}: saved to {location}");
                summary.boxes_captured += 1;
            }
            Err(err) => {
                warn!("{name}: {err}");
                summary.render_failures += 1;
            }
        }
    }
}

/// Plan and capture already loaded pages, plus the tables `tables` detects on them.
pub fn extract_pages<R, S>(
    pages: &[PageLayout],
    config: &ExtractionConfig,
    tables: Option<&dyn TableDetector>,
    renderer: &R,
    sink: &mut S,
) -> Result<ExtractionSummary, BoxError>
where
    R: RegionRenderer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    config.validate()?;
    let mut summary = ExtractionSummary::default();
    for (page, plan) in pages.iter().zip(plan_pages(pages, config)) {
        summary.pages_processed += 1;
        summary.record_plan(&plan);
        if !plan.boxes.is_empty() {
            info!(
                "page {}: found {} outermost boxes",
                page.number(),
                plan.boxes.len()
            );
        }
        capture_page(page, &plan, config, renderer, sink, &mut summary);
        if let Some(detector) = tables {
            capture_tables(page, detector, config, renderer, sink, &mut summary.tables);
        }
    }
    Ok(summary)
}

/// Filter one page's images and persist the survivors.
pub fn save_page_images<S>(
    page_number: usize,
    images: &[EmbeddedImage],
    filter: &mut ImageFilter,
    sink: &mut S,
    stats: &mut ImageStats,
) where
    S: ArtifactSink + ?Sized,
{
    let mut order = 0;
    for image in images {
        stats.found += 1;
        let extension = match filter.check(image) {
            Ok(extension) => extension,
            Err(ImageRejection::TooSmall) => {
                stats.skipped_small += 1;
                continue;
            }
            Err(ImageRejection::Duplicate) => {
                stats.skipped_duplicate += 1;
                continue;
            }
            Err(ImageRejection::Unsupported) => {
                debug!("page {page_number}: {} has no standalone format", image.name);
                stats.skipped_unsupported += 1;
                continue;
            }
        };
        order += 1;
        let name = image_artifact_name(page_number, order);
        match sink.persist(&name, extension, &image.data) {
            Ok(_) => stats.saved += 1,
            Err(err) => {
                warn!("{name}: {err}");
                stats.failed += 1;
            }
        }
    }
}

/// Extract boxes, detected tables and optionally images from a PDF file.
///
/// Only failing to open the document is an error; page, box, table and image
/// failures are counted in the returned summary.
pub fn extract_document<R, S>(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
    tables: Option<&dyn TableDetector>,
    renderer: &R,
    sink: &mut S,
) -> Result<ExtractionSummary, BoxError>
where
    R: RegionRenderer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    config.validate()?;
    let path = path.as_ref();
    let source = PdfSource::open(path)?;
    let page_count = source.page_count();
    info!("opened {} ({page_count} pages)", path.display());

    let mut pages = Vec::with_capacity(page_count);
    let mut pages_failed = 0;
    for index in 0..page_count {
        match source.load_page(index) {
            Ok(page) => pages.push(page),
            Err(err) => {
                warn!("page {}: {err}", index + 1);
                pages_failed += 1;
            }
        }
    }

    let mut summary = extract_pages(&pages, config, tables, renderer, sink)?;
    summary.pages_failed = pages_failed;

    if config.extract_images {
        let mut filter = ImageFilter::new(config.images.clone());
        for page in &pages {
            match source.embedded_images(page.index) {
                Ok(found) => {
                    summary.images.failed += found.failures;
                    save_page_images(
                        page.number(),
                        &found.images,
                        &mut filter,
                        sink,
                        &mut summary.images,
                    );
                }
                Err(err) => {
                    warn!("page {}: image extraction failed: {err}", page.number());
                    summary.images.failed += 1;
                }
            }
        }
    }

    info!(
        "{}: captured {} boxes from {} pages",
        path.display(),
        summary.boxes_captured,
        summary.pages_processed
    );
    Ok(summary)
}
