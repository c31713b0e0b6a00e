use super::state::State;
use crate::context::ContextManager;
use crate::events::PhysicalReleaseEvent;
use smallvec::SmallVec;
use std::collections::HashSet;

// Chords rarely nest deeper than this
const INLINE_DEPTH: usize = 4;

/// One open chord level: the release that closes it and the state to return to
pub struct HistoryRecord<C: ContextManager> {
    pub release: PhysicalReleaseEvent,
    pub state: State<C>,
}

impl<C: ContextManager> Clone for HistoryRecord<C> {
    fn clone(&self) -> Self {
        Self {
            release: self.release,
            state: self.state.clone(),
        }
    }
}

/// Result of matching an out-of-order release against the history
pub struct HistoryQuery<C: ContextManager> {
    /// State to jump back to
    pub found: State<C>,
    /// Releases of the inner levels unwound by the jump
    pub skipped: SmallVec<[PhysicalReleaseEvent; INLINE_DEPTH]>,
}

/// Stack of open chord levels, oldest first. Never empty; extended by copy.
pub struct History<C: ContextManager> {
    records: SmallVec<[HistoryRecord<C>; INLINE_DEPTH]>,
}

impl<C: ContextManager> Clone for History<C> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<C: ContextManager> History<C> {
    #[must_use]
    pub fn new(release: PhysicalReleaseEvent, state: State<C>) -> Self {
        let mut records = SmallVec::new();
        records.push(HistoryRecord { release, state });
        Self { records }
    }

    /// Copy of this history with one more level
    #[must_use]
    pub fn push(&self, release: PhysicalReleaseEvent, state: State<C>) -> Self {
        let mut records = self.records.clone();
        records.push(HistoryRecord { release, state });
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[HistoryRecord<C>] {
        &self.records
    }

    /// The outermost level; its state is the idle state
    #[must_use]
    pub fn first(&self) -> &HistoryRecord<C> {
        &self.records[0]
    }

    /// The innermost level
    #[must_use]
    pub fn last(&self) -> &HistoryRecord<C> {
        &self.records[self.records.len() - 1]
    }

    #[must_use]
    pub fn end_triggers(&self) -> HashSet<PhysicalReleaseEvent> {
        self.records.iter().map(|r| r.release).collect()
    }

    /// Every recorded release except the innermost one
    #[must_use]
    pub fn abnormal_end_triggers(&self) -> HashSet<PhysicalReleaseEvent> {
        self.records.iter().rev().skip(1).map(|r| r.release).collect()
    }

    /// Find the outermost level closed by `release`
    #[must_use]
    pub fn query(&self, release: PhysicalReleaseEvent) -> Option<HistoryQuery<C>> {
        let index = self.records.iter().position(|r| r.release == release)?;
        Some(HistoryQuery {
            found: self.records[index].state.clone(),
            skipped: self.records[index + 1..].iter().map(|r| r.release).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PlainContext;
    use crate::keys::{LogicalKey, PhysicalKey};
    use crate::machine::idle::IdleState;
    use crate::machine::state::StateIds;
    use crate::tree::RootElement;
    use std::sync::Arc;

    fn release(key: LogicalKey) -> PhysicalReleaseEvent {
        PhysicalKey::primary(key).release()
    }

    fn idle(ids: &mut StateIds) -> State<PlainContext> {
        State::Idle(Arc::new(IdleState::new(
            ids.next_id(),
            Arc::new(RootElement::new()),
        )))
    }

    #[test]
    fn test_push_copies() {
        let mut ids = StateIds::default();
        let base = History::new(release(LogicalKey::A), idle(&mut ids));
        let longer = base.push(release(LogicalKey::B), idle(&mut ids));

        assert_eq!(base.len(), 1);
        assert_eq!(longer.len(), 2);
        assert_eq!(longer.first().release, release(LogicalKey::A));
        assert_eq!(longer.last().release, release(LogicalKey::B));
    }

    #[test]
    fn test_end_triggers() {
        let mut ids = StateIds::default();
        let history = History::new(release(LogicalKey::A), idle(&mut ids))
            .push(release(LogicalKey::B), idle(&mut ids))
            .push(release(LogicalKey::C), idle(&mut ids));

        assert_eq!(history.end_triggers().len(), 3);
        let abnormal = history.abnormal_end_triggers();
        assert_eq!(abnormal.len(), 2);
        assert!(abnormal.contains(&release(LogicalKey::A)));
        assert!(abnormal.contains(&release(LogicalKey::B)));
        assert!(!abnormal.contains(&release(LogicalKey::C)));
    }

    #[test]
    fn test_query_skips_inner_levels() {
        let mut ids = StateIds::default();
        let s0 = idle(&mut ids);
        let s1 = idle(&mut ids);
        let s2 = idle(&mut ids);
        let history = History::new(release(LogicalKey::A), s0.clone())
            .push(release(LogicalKey::B), s1.clone())
            .push(release(LogicalKey::C), s2);

        let query = history.query(release(LogicalKey::A)).unwrap();
        assert!(query.found.same(&s0));
        assert_eq!(
            query.skipped.as_slice(),
            &[release(LogicalKey::B), release(LogicalKey::C)]
        );

        let query = history.query(release(LogicalKey::B)).unwrap();
        assert!(query.found.same(&s1));
        assert_eq!(query.skipped.as_slice(), &[release(LogicalKey::C)]);

        assert!(history.query(release(LogicalKey::D)).is_none());
    }
}
