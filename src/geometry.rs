/// Axis-aligned rectangle in page space (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rectangle {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle enclosing every point, or `None` for an empty iterator.
    pub fn bounding(points: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
        let mut points = points.into_iter();
        let (x, y) = points.next()?;
        let mut rect = Self::new(x, y, x, y);
        for (x, y) in points {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Finite with non-negative extents.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.x1 >= self.x0 && self.y1 >= self.y0
    }

    /// A rectangle with zero or negative extent covers nothing.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Swap inverted coordinates so that `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    /// Non-strict containment of `other` inside `self`.
    pub fn contains(&self, other: &Rectangle) -> bool {
        is_contained(other, self)
    }

    /// Clamp to `bounds`. The result may be empty; check [`Rectangle::is_empty`].
    pub fn intersect(&self, bounds: &Rectangle) -> Rectangle {
        Rectangle {
            x0: self.x0.max(bounds.x0),
            y0: self.y0.max(bounds.y0),
            x1: self.x1.min(bounds.x1),
            y1: self.y1.min(bounds.y1),
        }
    }

    /// Grow every edge outward by `pad`.
    pub fn expand(&self, pad: f32) -> Rectangle {
        Rectangle {
            x0: self.x0 - pad,
            y0: self.y0 - pad,
            x1: self.x1 + pad,
            y1: self.y1 + pad,
        }
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.x0 <= other.x1 && self.x1 >= other.x0 && self.y0 <= other.y1 && self.y1 >= other.y0
    }
}

/// True iff `inner` lies within `outer`, edges included. Identical rectangles contain each other.
pub fn is_contained(inner: &Rectangle, outer: &Rectangle) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Page extents in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    pub width: f32,
    pub height: f32,
}

impl PageBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Padded capture rectangle for a box, kept inside the page.
///
/// Returns `None` when nothing of the padded box lies on the page.
pub fn clip_rect(rect: &Rectangle, padding: f32, bounds: &PageBounds) -> Option<Rectangle> {
    let clip = rect.expand(padding).intersect(&bounds.rect());
    if clip.is_empty() {
        return None;
    }
    Some(clip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_reflexive() {
        let r = Rectangle::new(10.0, 10.0, 100.0, 100.0);
        assert!(is_contained(&r, &r));
    }

    #[test]
    fn containment_is_closed_on_edges() {
        let outer = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let touching = Rectangle::new(0.0, 50.0, 100.0, 100.0);
        assert!(outer.contains(&touching));
        let poking_out = Rectangle::new(0.0, 50.0, 100.5, 100.0);
        assert!(!outer.contains(&poking_out));
    }

    #[test]
    fn clip_is_clamped_to_page() {
        let clip = clip_rect(
            &Rectangle::new(0.0, 0.0, 40.0, 40.0),
            2.0,
            &PageBounds::new(50.0, 50.0),
        );
        assert_eq!(clip, Some(Rectangle::new(0.0, 0.0, 42.0, 42.0)));
    }

    #[test]
    fn clip_outside_page_is_none() {
        let clip = clip_rect(
            &Rectangle::new(80.0, 80.0, 120.0, 120.0),
            2.0,
            &PageBounds::new(50.0, 50.0),
        );
        assert_eq!(clip, None);
    }

    #[test]
    fn intersection_can_be_empty() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn normalized_swaps_inverted_corners() {
        let r = Rectangle::new(100.0, 80.0, 10.0, 20.0).normalized();
        assert_eq!(r, Rectangle::new(10.0, 20.0, 100.0, 80.0));
        assert!(r.is_valid());
    }

    #[test]
    fn bounding_covers_all_points() {
        let r = Rectangle::bounding([(5.0, 9.0), (1.0, 3.0), (7.0, 4.0)]).unwrap();
        assert_eq!(r, Rectangle::new(1.0, 3.0, 7.0, 9.0));
        assert!(Rectangle::bounding(std::iter::empty()).is_none());
    }
}
