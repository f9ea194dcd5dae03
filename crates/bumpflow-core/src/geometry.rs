//! Geometry helpers shared by hit-testing and bump lookup.

use kurbo::{Point, Rect};

/// Distance from `point` to the closed segment `start..end`.
///
/// A zero-length segment measures to `start`.
pub fn point_segment_distance(point: Point, start: Point, end: Point) -> f64 {
    let segment = end - start;
    let offset = point - start;

    let len_sq = segment.hypot2();
    if len_sq < f64::EPSILON {
        return offset.hypot();
    }

    // Project onto the segment, clamped to its endpoints
    let t = (offset.dot(segment) / len_sq).clamp(0.0, 1.0);
    let projection = start + segment * t;
    point.distance(projection)
}

/// Index of the candidate closest to `target`. The first candidate wins a tie.
pub fn nearest_by_distance<I>(target: Point, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = Point>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let dist = target.distance(candidate);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((index, dist)),
        }
    }
    best.map(|(index, _)| index)
}

/// Closed-interval containment: points on the edges count as inside.
pub fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment_interior() {
        let d = point_segment_distance(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        let before = point_segment_distance(Point::new(-3.0, 4.0), a, b);
        assert!((before - 5.0).abs() < 1e-9);

        let after = point_segment_distance(Point::new(13.0, 4.0), a, b);
        assert!((after - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let p = Point::new(3.0, 4.0);
        let d = point_segment_distance(p, Point::ZERO, Point::ZERO);
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let target = Point::new(0.0, 0.0);
        let candidates = [
            Point::new(5.0, 0.0),
            Point::new(-5.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(nearest_by_distance(target, candidates), Some(2));

        let tied = [Point::new(5.0, 0.0), Point::new(0.0, 5.0)];
        assert_eq!(nearest_by_distance(target, tied), Some(0));
    }

    #[test]
    fn test_nearest_of_nothing() {
        assert_eq!(nearest_by_distance(Point::ZERO, Vec::<Point>::new()), None);
    }

    #[test]
    fn test_inclusive_containment() {
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        assert!(rect_contains_inclusive(rect, Point::new(100.0, 60.0)));
        assert!(rect_contains_inclusive(rect, Point::new(0.0, 0.0)));
        assert!(!rect_contains_inclusive(rect, Point::new(100.1, 30.0)));
    }
}
