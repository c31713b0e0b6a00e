use super::{Point, StrokeDirection};
use crate::config::StrokeConfig;

/// Turns pointer samples into a stroke.
///
/// The first sample becomes the anchor. Each later sample is measured from
/// the anchor; once it travels past the active threshold the anchor moves to
/// it and its direction is recorded. Repeated directions collapse into one.
#[derive(Debug, Clone)]
pub struct StrokeTracker {
    start_threshold: f32,
    direction_change_threshold: f32,
    extension_threshold: f32,
    anchor: Option<Point>,
    directions: Vec<StrokeDirection>,
}

impl StrokeTracker {
    #[must_use]
    pub fn new(
        start_threshold: f32,
        direction_change_threshold: f32,
        extension_threshold: f32,
    ) -> Self {
        Self {
            start_threshold,
            direction_change_threshold,
            extension_threshold,
            anchor: None,
            directions: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &StrokeConfig) -> Self {
        Self::new(
            config.start_threshold,
            config.direction_change_threshold,
            config.extension_threshold,
        )
    }

    /// Feed one sample. Returns the direction when a new one was appended.
    pub fn feed_point(&mut self, point: Point) -> Option<StrokeDirection> {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                self.anchor = Some(point);
                return None;
            }
        };

        let dx = (point.x - anchor.x) as f32;
        let dy = (point.y - anchor.y) as f32;
        let dir = StrokeDirection::from_delta(dx, dy)?;

        let threshold = self.threshold_for(dir);
        if dx * dx + dy * dy < threshold * threshold {
            return None;
        }

        self.anchor = Some(point);
        if self.directions.last() == Some(&dir) {
            return None;
        }
        self.directions.push(dir);
        Some(dir)
    }

    #[must_use]
    pub fn directions(&self) -> &[StrokeDirection] {
        &self.directions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn reset(&mut self) {
        self.anchor = None;
        self.directions.clear();
    }

    fn threshold_for(&self, dir: StrokeDirection) -> f32 {
        match self.directions.last() {
            None => self.start_threshold,
            Some(last) if *last == dir => self.extension_threshold,
            Some(_) => self.direction_change_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StrokeDirection::*;

    fn feed(tracker: &mut StrokeTracker, points: &[(i32, i32)]) {
        for point in points {
            tracker.feed_point(Point::from(*point));
        }
    }

    #[test]
    fn test_jitter_below_start_threshold() {
        let mut tracker = StrokeTracker::new(10.0, 20.0, 10.0);
        feed(&mut tracker, &[(0, 0), (3, 4), (-5, 2), (0, 9)]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_down_then_right() {
        let mut tracker = StrokeTracker::new(10.0, 20.0, 10.0);
        feed(
            &mut tracker,
            &[(0, 0), (0, 5), (0, 12), (0, 18), (10, 20), (25, 20)],
        );
        assert_eq!(tracker.directions(), &[Down, Right]);
    }

    #[test]
    fn test_extension_collapses() {
        let mut tracker = StrokeTracker::new(10.0, 20.0, 10.0);
        feed(&mut tracker, &[(0, 0), (15, 0), (30, 0), (45, 2), (90, 0)]);
        assert_eq!(tracker.directions(), &[Right]);
    }

    #[test]
    fn test_direction_change_needs_larger_travel() {
        let mut tracker = StrokeTracker::new(10.0, 20.0, 10.0);
        feed(&mut tracker, &[(0, 0), (15, 0), (15, -15)]);
        assert_eq!(tracker.directions(), &[Right]);

        tracker.feed_point(Point::new(15, -40));
        assert_eq!(tracker.directions(), &[Right, Up]);
    }

    #[test]
    fn test_back_and_forth() {
        let mut tracker = StrokeTracker::new(10.0, 20.0, 10.0);
        feed(&mut tracker, &[(0, 0), (30, 0), (0, 0), (30, 0)]);
        assert_eq!(tracker.directions(), &[Right, Left, Right]);
    }

    #[test]
    fn test_reset() {
        let mut tracker = StrokeTracker::new(10.0, 20.0, 10.0);
        feed(&mut tracker, &[(0, 0), (0, -30)]);
        assert_eq!(tracker.directions(), &[Up]);
        tracker.reset();
        assert!(tracker.is_empty());
        feed(&mut tracker, &[(100, 100), (100, 105)]);
        assert!(tracker.is_empty());
    }
}
