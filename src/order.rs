use std::cmp::Ordering;

use crate::geometry::Rectangle;

/// Top-to-bottom order by `y0`, stable on ties. Columns are not detected.
pub fn order_by_reading(boxes: &[Rectangle]) -> Vec<Rectangle> {
    let mut ordered = boxes.to_vec();
    ordered.sort_by(|a, b| a.y0.partial_cmp(&b.y0).unwrap_or(Ordering::Equal));
    ordered
}
