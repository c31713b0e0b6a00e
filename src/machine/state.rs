use super::gesture::GestureState;
use super::idle::IdleState;
use super::invalid::InvalidReleaseCounter;
use super::notify::Notification;
use crate::context::ContextManager;
use crate::events::{PhysicalEvent, PhysicalReleaseEvent};
use crate::stroke::StrokeSampler;
use std::fmt;
use std::sync::Arc;

/// Unique id of one state value, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u64);

impl StateId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StateIds {
    next: u64,
}

impl StateIds {
    pub(crate) fn next_id(&mut self) -> StateId {
        let id = StateId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Gesture,
}

/// Plain-data view of a state, safe to hand to callbacks and logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub id: StateId,
    pub kind: StateKind,
    pub depth: usize,
    pub can_cancel: bool,
    /// Release that resolves the innermost open chord
    pub end_trigger: Option<PhysicalReleaseEvent>,
}

impl fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StateKind::Idle => write!(f, "idle{}", self.id),
            StateKind::Gesture => {
                write!(f, "gesture{} depth={}", self.id, self.depth)?;
                if let Some(end) = self.end_trigger {
                    write!(f, " until {}", end)?;
                }
                if !self.can_cancel {
                    f.write_str(" (committed)")?;
                }
                Ok(())
            }
        }
    }
}

/// Machine state. Values are immutable; identity is the allocation.
pub enum State<C: ContextManager> {
    Idle(Arc<IdleState<C>>),
    Gesture(Arc<GestureState<C>>),
}

impl<C: ContextManager> Clone for State<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle(state) => Self::Idle(Arc::clone(state)),
            Self::Gesture(state) => Self::Gesture(Arc::clone(state)),
        }
    }
}

impl<C: ContextManager> fmt::Debug for State<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({})", self.snapshot())
    }
}

impl<C: ContextManager> State<C> {
    #[must_use]
    pub fn id(&self) -> StateId {
        match self {
            Self::Idle(state) => state.id(),
            Self::Gesture(state) => state.id(),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Idle(_) => 0,
            Self::Gesture(state) => state.depth(),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle(_))
    }

    #[must_use]
    pub fn as_gesture(&self) -> Option<&Arc<GestureState<C>>> {
        match self {
            Self::Idle(_) => None,
            Self::Gesture(state) => Some(state),
        }
    }

    /// Identity comparison
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle(a), Self::Idle(b)) => Arc::ptr_eq(a, b),
            (Self::Gesture(a), Self::Gesture(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        match self {
            Self::Idle(state) => StateSnapshot {
                id: state.id(),
                kind: StateKind::Idle,
                depth: 0,
                can_cancel: false,
                end_trigger: None,
            },
            Self::Gesture(state) => state.snapshot(),
        }
    }

    pub(crate) fn input(&self, event: &PhysicalEvent, step: &mut Step<'_, C>) -> (bool, Self) {
        match self {
            Self::Idle(state) => state.input(event, step),
            Self::Gesture(state) => state.input(event, step),
        }
    }

    pub(crate) fn timeout(&self) -> Self {
        match self {
            Self::Idle(_) => self.clone(),
            Self::Gesture(state) => state.timeout(),
        }
    }

    pub(crate) fn reset(&self, step: &mut Step<'_, C>) -> Self {
        match self {
            Self::Idle(_) => self.clone(),
            Self::Gesture(state) => state.reset(step),
        }
    }

    pub(crate) fn cancel(&self) -> Self {
        match self {
            Self::Idle(_) => self.clone(),
            Self::Gesture(state) => state.cancel(),
        }
    }
}

/// Machine resources a state touches while computing its successor
pub(crate) struct Step<'a, C: ContextManager> {
    pub context: &'a C,
    pub invalid: &'a mut InvalidReleaseCounter,
    pub sampler: &'a StrokeSampler,
    pub ids: &'a mut StateIds,
    /// Notifications raised during the step, sent once the step is applied
    pub notices: &'a mut Vec<Notification>,
}
