use crate::geometry::{PageBounds, Rectangle};

/// One painted path on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingShape {
    /// Bounding rectangle of every point in the path.
    pub rect: Rectangle,
    /// Subpaths as point lists in page space, used for outline rendering.
    pub polylines: Vec<Vec<(f32, f32)>>,
}

impl DrawingShape {
    /// Build a shape from its subpaths. Returns `None` if there are no points.
    pub fn from_polylines(polylines: Vec<Vec<(f32, f32)>>) -> Option<Self> {
        let rect = Rectangle::bounding(polylines.iter().flatten().copied())?;
        Some(Self { rect, polylines })
    }

    /// A closed rectangular outline, as produced by an `re` operator.
    pub fn rectangle(rect: Rectangle) -> Self {
        let outline = vec![
            (rect.x0, rect.y0),
            (rect.x1, rect.y0),
            (rect.x1, rect.y1),
            (rect.x0, rect.y1),
            (rect.x0, rect.y0),
        ];
        Self {
            rect,
            polylines: vec![outline],
        }
    }
}

/// Drawing content of a single page, valid for one processing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Zero-based position in the document.
    pub index: usize,
    pub bounds: PageBounds,
    pub shapes: Vec<DrawingShape>,
}

impl PageLayout {
    pub fn new(index: usize, bounds: PageBounds, shapes: Vec<DrawingShape>) -> Self {
        Self {
            index,
            bounds,
            shapes,
        }
    }

    /// Page built from bare rectangles, each treated as a stroked `re` path.
    pub fn from_rects(index: usize, bounds: PageBounds, rects: &[Rectangle]) -> Self {
        let shapes = rects.iter().copied().map(DrawingShape::rectangle).collect();
        Self::new(index, bounds, shapes)
    }

    /// One-based page number used in artifact names.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn shape_rects(&self) -> impl Iterator<Item = Rectangle> + '_ {
        self.shapes.iter().map(|shape| shape.rect)
    }
}
