use crate::events::PhysicalReleaseEvent;
use std::collections::HashMap;

/// Releases the machine must swallow.
///
/// A release lands here when its chord level was already resolved by an
/// abnormal end or a reset, so the physical release arriving later carries
/// no meaning.
#[derive(Debug, Default, Clone)]
pub struct InvalidReleaseCounter {
    counts: HashMap<PhysicalReleaseEvent, usize>,
}

impl InvalidReleaseCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_next(&mut self, release: PhysicalReleaseEvent) {
        *self.counts.entry(release).or_insert(0) += 1;
    }

    pub fn ignore_next_all<I>(&mut self, releases: I)
    where
        I: IntoIterator<Item = PhysicalReleaseEvent>,
    {
        for release in releases {
            self.ignore_next(release);
        }
    }

    #[must_use]
    pub fn count(&self, release: PhysicalReleaseEvent) -> usize {
        self.counts.get(&release).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Consume one pending count.
    ///
    /// # Panics
    /// When `release` has no pending count. Callers check `count` first.
    pub fn count_down(&mut self, release: PhysicalReleaseEvent) {
        match self.counts.get_mut(&release) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.counts.remove(&release);
            }
            None => panic!("count_down on {} with no pending invalid release", release),
        }
    }

    /// Consume one pending count if there is one
    pub fn try_consume(&mut self, release: PhysicalReleaseEvent) -> bool {
        if self.count(release) == 0 {
            return false;
        }
        self.count_down(release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{LogicalKey, PhysicalKey};

    fn release(key: LogicalKey) -> PhysicalReleaseEvent {
        PhysicalKey::primary(key).release()
    }

    #[test]
    fn test_counts_per_release() {
        let mut invalid = InvalidReleaseCounter::new();
        assert!(invalid.is_empty());

        invalid.ignore_next(release(LogicalKey::A));
        invalid.ignore_next_all([release(LogicalKey::A), release(LogicalKey::B)]);
        assert_eq!(invalid.count(release(LogicalKey::A)), 2);
        assert_eq!(invalid.count(release(LogicalKey::B)), 1);
        assert_eq!(invalid.count(release(LogicalKey::C)), 0);
        assert_eq!(invalid.total(), 3);
    }

    #[test]
    fn test_count_down_to_empty() {
        let mut invalid = InvalidReleaseCounter::new();
        invalid.ignore_next_all([release(LogicalKey::A), release(LogicalKey::A)]);

        invalid.count_down(release(LogicalKey::A));
        assert_eq!(invalid.count(release(LogicalKey::A)), 1);
        assert!(invalid.try_consume(release(LogicalKey::A)));
        assert!(!invalid.try_consume(release(LogicalKey::A)));
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_variants_are_distinct() {
        let mut invalid = InvalidReleaseCounter::new();
        invalid.ignore_next(PhysicalKey::new(LogicalKey::Ctrl, 1).release());
        assert_eq!(invalid.count(PhysicalKey::new(LogicalKey::Ctrl, 0).release()), 0);
        assert_eq!(invalid.count(PhysicalKey::new(LogicalKey::Ctrl, 1).release()), 1);
    }

    #[test]
    #[should_panic]
    fn test_count_down_at_zero_panics() {
        let mut invalid = InvalidReleaseCounter::new();
        invalid.count_down(release(LogicalKey::A));
    }
}
