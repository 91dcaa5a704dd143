use std::cmp::Ordering;

use crate::geometry::{Rectangle, is_contained};

/// Keep only the outermost candidates.
///
/// Candidates are visited largest area first; one that lies inside an already
/// selected rectangle is dropped. Any ancestor of a nested box has at least its
/// area and is therefore selected before it, so one pass suffices. The sort is
/// stable, so among identical rectangles the earliest input wins.
pub fn resolve_outermost(candidates: &[Rectangle]) -> Vec<Rectangle> {
    let mut by_area = candidates.to_vec();
    by_area.sort_by(|a, b| b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal));

    let mut selected: Vec<Rectangle> = Vec::with_capacity(by_area.len());
    for candidate in by_area {
        let nested = selected
            .iter()
            .any(|outer| is_contained(&candidate, outer));
        if !nested {
            selected.push(candidate);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_nothing() {
        assert!(resolve_outermost(&[]).is_empty());
    }

    #[test]
    fn single_candidate_is_outermost() {
        let r = Rectangle::new(0.0, 0.0, 60.0, 60.0);
        assert_eq!(resolve_outermost(&[r]), vec![r]);
    }

    #[test]
    fn drops_doubly_nested_boxes() {
        let outer = Rectangle::new(0.0, 0.0, 300.0, 300.0);
        let middle = Rectangle::new(10.0, 10.0, 200.0, 200.0);
        let inner = Rectangle::new(20.0, 20.0, 100.0, 100.0);
        assert_eq!(resolve_outermost(&[inner, middle, outer]), vec![outer]);
    }

    #[test]
    fn identical_rectangles_keep_one() {
        let r = Rectangle::new(5.0, 5.0, 80.0, 80.0);
        assert_eq!(resolve_outermost(&[r, r]), vec![r]);
    }

    #[test]
    fn equal_area_overlaps_are_both_kept_in_input_order() {
        let a = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let b = Rectangle::new(50.0, 50.0, 150.0, 150.0);
        assert_eq!(resolve_outermost(&[b, a]), vec![b, a]);
    }

    #[test]
    fn output_is_largest_first() {
        let small = Rectangle::new(300.0, 0.0, 360.0, 60.0);
        let large = Rectangle::new(0.0, 0.0, 200.0, 200.0);
        assert_eq!(resolve_outermost(&[small, large]), vec![large, small]);
    }
}
