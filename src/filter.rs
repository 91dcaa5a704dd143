use log::warn;

use crate::config::ExtractionConfig;
use crate::geometry::{PageBounds, Rectangle};

/// Why a shape did not become a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Non-finite coordinates.
    Invalid,
    TooSmall,
    TooLarge,
    Duplicate,
}

/// Per-page counters for the candidate filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub shapes_seen: usize,
    pub invalid: usize,
    /// Inverted rectangles that were repaired and kept going.
    pub normalized: usize,
    pub too_small: usize,
    pub too_large: usize,
    pub duplicate: usize,
}

impl FilterStats {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Invalid => self.invalid += 1,
            Rejection::TooSmall => self.too_small += 1,
            Rejection::TooLarge => self.too_large += 1,
            Rejection::Duplicate => self.duplicate += 1,
        }
    }
}

/// Result of filtering one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub candidates: Vec<Rectangle>,
    pub stats: FilterStats,
}

/// Reduce a page's raw shape rectangles to distinct, size-bounded candidates.
pub fn filter_candidates<I>(
    shapes: I,
    bounds: &PageBounds,
    config: &ExtractionConfig,
) -> FilterOutcome
where
    I: IntoIterator<Item = Rectangle>,
{
    let max_area = bounds.area() * config.max_area_fraction;
    let mut outcome = FilterOutcome::default();

    for raw in shapes {
        outcome.stats.shapes_seen += 1;
        if !raw.is_finite() {
            warn!("dropping shape with non-finite coordinates: {raw:?}");
            outcome.stats.record(Rejection::Invalid);
            continue;
        }
        let rect = if raw.is_valid() {
            raw
        } else {
            warn!("normalizing inverted shape rectangle: {raw:?}");
            outcome.stats.normalized += 1;
            raw.normalized()
        };

        match classify(&rect, &outcome.candidates, max_area, config) {
            Some(rejection) => outcome.stats.record(rejection),
            None => outcome.candidates.push(rect),
        }
    }

    outcome
}

fn classify(
    rect: &Rectangle,
    accepted: &[Rectangle],
    max_area: f32,
    config: &ExtractionConfig,
) -> Option<Rejection> {
    if rect.width() < config.min_width || rect.height() < config.min_height {
        return Some(Rejection::TooSmall);
    }
    if rect.area() > max_area {
        return Some(Rejection::TooLarge);
    }
    // Per-page shape counts are small, a pairwise scan is enough.
    if accepted
        .iter()
        .any(|existing| is_near_duplicate(existing, rect, config.dedup_tolerance))
    {
        return Some(Rejection::Duplicate);
    }
    None
}

/// Origin and size all differ by strictly less than `tolerance`.
pub fn is_near_duplicate(a: &Rectangle, b: &Rectangle, tolerance: f32) -> bool {
    (a.x0 - b.x0).abs() < tolerance
        && (a.y0 - b.y0).abs() < tolerance
        && (a.width() - b.width()).abs() < tolerance
        && (a.height() - b.height()).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageBounds {
        PageBounds::new(500.0, 500.0)
    }

    #[test]
    fn drops_shapes_below_minimum_size() {
        let outcome = filter_candidates(
            [
                Rectangle::new(100.0, 100.0, 130.0, 200.0),
                Rectangle::new(300.0, 10.0, 400.0, 40.0),
            ],
            &page(),
            &ExtractionConfig::default(),
        );
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.too_small, 2);
    }

    #[test]
    fn drops_page_sized_backgrounds() {
        let outcome = filter_candidates(
            [Rectangle::new(0.0, 0.0, 500.0, 500.0)],
            &page(),
            &ExtractionConfig::default(),
        );
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.stats.too_large, 1);
    }

    #[test]
    fn area_exactly_at_ceiling_is_kept() {
        let config = ExtractionConfig::default().with_max_area_fraction(0.5);
        let outcome = filter_candidates(
            [Rectangle::new(0.0, 0.0, 250.0, 500.0)],
            &page(),
            &config,
        );
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[test]
    fn collapses_stroke_and_fill_of_same_box() {
        let outcome = filter_candidates(
            [
                Rectangle::new(10.0, 10.0, 110.0, 110.0),
                Rectangle::new(11.0, 11.0, 111.0, 111.0),
            ],
            &page(),
            &ExtractionConfig::default(),
        );
        assert_eq!(outcome.candidates, vec![Rectangle::new(10.0, 10.0, 110.0, 110.0)]);
        assert_eq!(outcome.stats.duplicate, 1);
    }

    #[test]
    fn difference_at_tolerance_stays_distinct() {
        let outcome = filter_candidates(
            [
                Rectangle::new(10.0, 10.0, 110.0, 110.0),
                Rectangle::new(12.0, 10.0, 112.0, 110.0),
            ],
            &page(),
            &ExtractionConfig::default(),
        );
        assert_eq!(outcome.candidates.len(), 2);
    }

    #[test]
    fn zero_tolerance_keeps_identical_shapes() {
        let rect = Rectangle::new(10.0, 10.0, 110.0, 110.0);
        let config = ExtractionConfig::default().with_dedup_tolerance(0.0);
        let outcome = filter_candidates([rect, rect], &page(), &config);
        assert_eq!(outcome.candidates, vec![rect, rect]);
        assert_eq!(outcome.stats.duplicate, 0);
    }

    #[test]
    fn repairs_inverted_and_rejects_non_finite() {
        let outcome = filter_candidates(
            [
                Rectangle::new(200.0, 200.0, 100.0, 100.0),
                Rectangle::new(f32::NAN, 0.0, 100.0, 100.0),
            ],
            &page(),
            &ExtractionConfig::default(),
        );
        assert_eq!(outcome.candidates, vec![Rectangle::new(100.0, 100.0, 200.0, 200.0)]);
        assert_eq!(outcome.stats.normalized, 1);
        assert_eq!(outcome.stats.invalid, 1);
        assert_eq!(outcome.stats.shapes_seen, 2);
    }
}
