use std::path::Path;

use log::debug;
use pdf::content::{Matrix, Op, Point, Rect};
use pdf::file::{CachedFile, FileOptions};
use pdf::object::{Page, PageRc};

use crate::error::BoxError;
use crate::geometry::PageBounds;
use crate::images::{PageImages, collect_page_images};
use crate::page::{DrawingShape, PageLayout};

/// Points sampled along each cubic Bézier segment.
const CURVE_STEPS: usize = 8;

/// Maps PDF device space (origin bottom-left of the MediaBox) to top-left page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpace {
    pub left: f32,
    pub top: f32,
    pub bounds: PageBounds,
}

impl PageSpace {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        let (left, right) = (left.min(right), left.max(right));
        let (bottom, top) = (bottom.min(top), bottom.max(top));
        Self {
            left,
            top,
            bounds: PageBounds::new(right - left, top - bottom),
        }
    }

    pub fn to_page(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (x - self.left, self.top - y)
    }
}

/// An open PDF document that hands out per-page drawing layouts.
pub struct PdfSource {
    file: CachedFile<Vec<u8>>,
}

impl PdfSource {
    /// Open a PDF file using the `pdf` crate with the default cached options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BoxError> {
        let file = FileOptions::cached().open(path)?;
        Ok(Self { file })
    }

    pub fn page_count(&self) -> usize {
        self.file.num_pages() as usize
    }

    fn page(&self, index: usize) -> Result<PageRc, BoxError> {
        Ok(self.file.get_page(index as u32)?)
    }

    /// Collect every painted path on the page as a [`DrawingShape`].
    pub fn load_page(&self, index: usize) -> Result<PageLayout, BoxError> {
        let page = self.page(index)?;
        let page_ref: &Page = &page;
        let space = page_space(page_ref)?;
        let resolver = self.file.resolver();
        let shapes = match &page_ref.contents {
            Some(content) => collect_shapes(&content.operations(&resolver)?, &space),
            None => Vec::new(),
        };
        debug!("page {}: {} painted paths", index + 1, shapes.len());
        Ok(PageLayout::new(index, space.bounds, shapes))
    }

    /// Raster images drawn on the page, positioned in page space.
    pub fn embedded_images(&self, index: usize) -> Result<PageImages, BoxError> {
        let page = self.page(index)?;
        let page_ref: &Page = &page;
        let space = page_space(page_ref)?;
        let resolver = self.file.resolver();
        let operations = match &page_ref.contents {
            Some(content) => content.operations(&resolver)?,
            None => return Ok(PageImages::default()),
        };
        collect_page_images(page_ref, &operations, &resolver, &space)
    }
}

fn page_space(page: &Page) -> Result<PageSpace, BoxError> {
    let media = page.media_box()?;
    Ok(PageSpace::new(media.left, media.bottom, media.right, media.top))
}

/// Path under construction, already in page space.
#[derive(Default)]
struct PathBuilder {
    subpaths: Vec<Vec<(f32, f32)>>,
}

impl PathBuilder {
    fn move_to(&mut self, point: (f32, f32)) {
        self.subpaths.push(vec![point]);
    }

    fn line_to(&mut self, point: (f32, f32)) {
        match self.subpaths.last_mut() {
            Some(current) => current.push(point),
            None => self.move_to(point),
        }
    }

    fn close(&mut self) {
        if let Some(current) = self.subpaths.last_mut() {
            if let Some(&first) = current.first() {
                current.push(first);
            }
        }
    }

    fn current_point(&self) -> Option<(f32, f32)> {
        self.subpaths.last().and_then(|s| s.last().copied())
    }

    fn take(&mut self) -> Vec<Vec<(f32, f32)>> {
        std::mem::take(&mut self.subpaths)
    }
}

/// Walk content operators and emit one shape per painted path.
pub fn collect_shapes(ops: &[Op], space: &PageSpace) -> Vec<DrawingShape> {
    let mut ctm = Matrix::default();
    let mut stack: Vec<Matrix> = Vec::new();
    let mut path = PathBuilder::default();
    let mut shapes = Vec::new();
    let map = |ctm: &Matrix, p: &Point| space.to_page(apply_matrix(ctm, (p.x, p.y)));

    for op in ops {
        match op {
            Op::Save => stack.push(ctm),
            Op::Restore => ctm = stack.pop().unwrap_or_default(),
            Op::Transform { matrix } => ctm = multiply_matrix(matrix, &ctm),
            Op::MoveTo { p } => path.move_to(map(&ctm, p)),
            Op::LineTo { p } => path.line_to(map(&ctm, p)),
            Op::CurveTo { c1, c2, p } => {
                let start = path.current_point().unwrap_or_else(|| map(&ctm, p));
                let (c1, c2, end) = (map(&ctm, c1), map(&ctm, c2), map(&ctm, p));
                for step in 1..=CURVE_STEPS {
                    let t = step as f32 / CURVE_STEPS as f32;
                    path.line_to(cubic_point(start, c1, c2, end, t));
                }
            }
            Op::Rect { rect } => {
                let mut corners = rect_to_points(rect).into_iter().map(|pt| {
                    space.to_page(apply_matrix(&ctm, pt))
                });
                if let Some(first) = corners.next() {
                    path.move_to(first);
                    corners.for_each(|pt| path.line_to(pt));
                }
            }
            Op::Close => path.close(),
            Op::Stroke | Op::Fill { .. } | Op::FillAndStroke { .. } => {
                if let Some(shape) = DrawingShape::from_polylines(path.take()) {
                    shapes.push(shape);
                }
            }
            Op::EndPath => {
                path.take();
            }
            _ => {}
        }
    }
    shapes
}

fn cubic_point(
    p0: (f32, f32),
    p1: (f32, f32),
    p2: (f32, f32),
    p3: (f32, f32),
    t: f32,
) -> (f32, f32) {
    let u = 1.0 - t;
    let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    (
        b0 * p0.0 + b1 * p1.0 + b2 * p2.0 + b3 * p3.0,
        b0 * p0.1 + b1 * p1.1 + b2 * p2.1 + b3 * p3.1,
    )
}

fn rect_to_points(rect: &Rect) -> Vec<(f32, f32)> {
    let Rect {
        x,
        y,
        width,
        height,
    } = *rect;
    let x2 = x + width;
    let y2 = y + height;
    vec![(x, y), (x2, y), (x2, y2), (x, y2), (x, y)]
}

/// `left × right` in PDF row-vector convention, so `cm` is `multiply_matrix(m, ctm)`.
pub(crate) fn multiply_matrix(left: &Matrix, right: &Matrix) -> Matrix {
    Matrix {
        a: left.a * right.a + left.b * right.c,
        b: left.a * right.b + left.b * right.d,
        c: left.c * right.a + left.d * right.c,
        d: left.c * right.b + left.d * right.d,
        e: left.e * right.a + left.f * right.c + right.e,
        f: left.e * right.b + left.f * right.d + right.f,
    }
}

pub(crate) fn apply_matrix(matrix: &Matrix, point: (f32, f32)) -> (f32, f32) {
    (
        matrix.a * point.0 + matrix.c * point.1 + matrix.e,
        matrix.b * point.0 + matrix.d * point.1 + matrix.f,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;

    fn letter() -> PageSpace {
        PageSpace::new(0.0, 0.0, 200.0, 300.0)
    }

    fn re(x: f32, y: f32, width: f32, height: f32) -> Op {
        Op::Rect {
            rect: Rect {
                x,
                y,
                width,
                height,
            },
        }
    }

    #[test]
    fn stroked_rect_is_flipped_to_top_left() {
        let shapes = collect_shapes(&[re(10.0, 20.0, 100.0, 80.0), Op::Stroke], &letter());
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].rect, Rectangle::new(10.0, 200.0, 110.0, 280.0));
    }

    #[test]
    fn transform_applies_until_restore() {
        let translate = Matrix {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 50.0,
            f: 0.0,
        };
        let ops = [
            Op::Save,
            Op::Transform { matrix: translate },
            re(0.0, 0.0, 60.0, 60.0),
            Op::Stroke,
            Op::Restore,
            re(0.0, 0.0, 60.0, 60.0),
            Op::Stroke,
        ];
        let shapes = collect_shapes(&ops, &letter());
        assert_eq!(shapes[0].rect, Rectangle::new(50.0, 240.0, 110.0, 300.0));
        assert_eq!(shapes[1].rect, Rectangle::new(0.0, 240.0, 60.0, 300.0));
    }

    #[test]
    fn end_path_discards_clip_paths() {
        let ops = [re(0.0, 0.0, 100.0, 100.0), Op::EndPath, Op::Stroke];
        assert!(collect_shapes(&ops, &letter()).is_empty());
    }

    #[test]
    fn line_paths_become_one_shape() {
        let ops = [
            Op::MoveTo {
                p: Point { x: 10.0, y: 10.0 },
            },
            Op::LineTo {
                p: Point { x: 90.0, y: 10.0 },
            },
            Op::LineTo {
                p: Point { x: 90.0, y: 70.0 },
            },
            Op::Close,
            Op::Stroke,
        ];
        let shapes = collect_shapes(&ops, &letter());
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].rect, Rectangle::new(10.0, 230.0, 90.0, 290.0));
        assert_eq!(shapes[0].polylines[0].len(), 4);
    }

    #[test]
    fn media_box_offset_is_removed() {
        let space = PageSpace::new(100.0, 100.0, 300.0, 400.0);
        assert_eq!(space.bounds, PageBounds::new(200.0, 300.0));
        assert_eq!(space.to_page((100.0, 400.0)), (0.0, 0.0));
    }
}
