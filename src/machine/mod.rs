//! Gesture state machine
//!
//! This module handles:
//! - State values (`state`, `idle`, `gesture`) and their open-chord `history`
//! - Bookkeeping of releases that must be swallowed (`invalid`)
//! - Timeout countdowns on a dedicated thread (`timer`)
//! - Lifecycle notifications delivered off the lock (`notify`)
//!
//! `GestureMachine` ties them together behind one lock.

pub mod gesture;
pub mod history;
pub mod idle;
pub mod invalid;
pub mod notify;
pub mod state;
pub(crate) mod timer;

pub use gesture::GestureState;
pub use history::{History, HistoryQuery, HistoryRecord};
pub use idle::IdleState;
pub use invalid::InvalidReleaseCounter;
pub use notify::{GestureCallbacks, LoggingCallbacks, Notification, Notifier};
pub use state::{State, StateId, StateKind, StateSnapshot};

use crate::config::GestureConfig;
use crate::context::ContextManager;
use crate::events::{PhysicalEvent, PhysicalReleaseEvent};
use crate::lock;
use crate::stroke::{Point, StrokeDirection, StrokeSampler};
use crate::tree::RootElement;
use state::{StateIds, Step};
use std::sync::{Arc, Mutex, Weak};
use timer::TimerHandle;
use tracing::{debug, info, trace};

#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Chorded gesture recognizer.
///
/// Executors run on the thread that calls `input`, `reset` or `cancel`
/// (or on the timeout thread) while the machine lock is held, so they must
/// not feed events back into the same machine. Callbacks have no such
/// restriction.
pub struct GestureMachine<C: ContextManager> {
    inner: Arc<MachineInner<C>>,
}

struct MachineInner<C: ContextManager> {
    config: GestureConfig,
    context: C,
    notifier: Notifier,
    timer: TimerHandle,
    core: Mutex<MachineCore<C>>,
}

struct MachineCore<C: ContextManager> {
    current: State<C>,
    invalid: InvalidReleaseCounter,
    sampler: StrokeSampler,
    ids: StateIds,
    /// Bumped on every state change; stale timer expiries are ignored
    generation: u64,
}

impl<C: ContextManager> GestureMachine<C> {
    /// Start a machine over `root`
    #[allow(clippy::missing_errors_doc)]
    pub fn new(
        config: GestureConfig,
        context: C,
        root: RootElement<C::Eval, C::Exec>,
        callbacks: Arc<dyn GestureCallbacks>,
    ) -> Result<Self, MachineError> {
        let notifier = Notifier::spawn(callbacks).map_err(|source| MachineError::Spawn {
            name: "gesture-callbacks",
            source,
        })?;
        let (timer, timer_rx) = TimerHandle::channel();

        let mut ids = StateIds::default();
        let idle = IdleState::new(ids.next_id(), Arc::new(root));
        let sampler = StrokeSampler::new(&config.stroke, Some(notifier.clone()));

        let inner = Arc::new(MachineInner {
            config,
            context,
            notifier,
            timer,
            core: Mutex::new(MachineCore {
                current: State::Idle(Arc::new(idle)),
                invalid: InvalidReleaseCounter::new(),
                sampler,
                ids,
                generation: 0,
            }),
        });

        let weak: Weak<MachineInner<C>> = Arc::downgrade(&inner);
        timer::spawn(timer_rx, move |generation| {
            if let Some(inner) = weak.upgrade() {
                inner.expire(generation);
            }
        })
        .map_err(|source| MachineError::Spawn {
            name: "gesture-timeout",
            source,
        })?;

        info!(
            "Gesture machine started (timeout {}ms)",
            inner.config.gesture_timeout_ms
        );
        Ok(Self { inner })
    }

    /// Start a machine with default configuration and logging callbacks
    #[allow(clippy::missing_errors_doc)]
    pub fn with_defaults(
        context: C,
        root: RootElement<C::Eval, C::Exec>,
    ) -> Result<Self, MachineError> {
        Self::new(
            GestureConfig::default(),
            context,
            root,
            Arc::new(LoggingCallbacks),
        )
    }

    /// Feed one event, with the pointer position when it is known.
    /// Returns whether the event was consumed.
    pub fn input(&self, event: PhysicalEvent, point: Option<Point>) -> bool {
        self.inner.input(event, point)
    }

    /// Unwind every open chord back to idle
    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Abandon the current gesture when its level has no press or release
    /// executors. Returns whether the state changed.
    pub fn cancel(&self) -> bool {
        self.inner.cancel()
    }

    #[must_use]
    pub fn current_state(&self) -> State<C> {
        lock(&self.inner.core).current.clone()
    }

    #[must_use]
    pub fn invalid_release_count(&self, release: PhysicalReleaseEvent) -> usize {
        lock(&self.inner.core).invalid.count(release)
    }

    /// Swallow the next occurrence of `release`
    pub fn ignore_next(&self, release: PhysicalReleaseEvent) {
        lock(&self.inner.core).invalid.ignore_next(release);
    }

    /// Stroke drawn since the current state was entered
    #[must_use]
    pub fn current_strokes(&self) -> Vec<StrokeDirection> {
        lock(&self.inner.core).sampler.strokes()
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn context(&self) -> &C {
        &self.inner.context
    }
}

impl<C: ContextManager> Drop for GestureMachine<C> {
    fn drop(&mut self) {
        self.inner.timer.shutdown();
    }
}

impl<C: ContextManager> MachineInner<C> {
    fn input(&self, event: PhysicalEvent, point: Option<Point>) -> bool {
        let mut guard = lock(&self.core);
        let core = &mut *guard;

        if let Some(point) = point {
            if !core.current.is_idle() {
                core.sampler.queue(point);
            }
        }

        match event {
            PhysicalEvent::Null => return false,
            PhysicalEvent::Release(release) if core.invalid.try_consume(release) => {
                debug!("Swallowed invalid {}", release);
                return true;
            }
            _ => {}
        }

        let mut notices = Vec::new();
        let (consumed, next) = {
            let mut step = Step {
                context: &self.context,
                invalid: &mut core.invalid,
                sampler: &core.sampler,
                ids: &mut core.ids,
                notices: &mut notices,
            };
            core.current.input(&event, &mut step)
        };
        trace!("{} consumed={}", event, consumed);

        for notice in notices {
            self.notifier.send(notice);
        }
        self.set_state(core, next);
        consumed
    }

    fn reset(&self) {
        let mut guard = lock(&self.core);
        let core = &mut *guard;
        let last = core.current.clone();

        if !last.is_idle() {
            let mut notices = Vec::new();
            let mut state = last.clone();
            loop {
                let next = {
                    let mut step = Step {
                        context: &self.context,
                        invalid: &mut core.invalid,
                        sampler: &core.sampler,
                        ids: &mut core.ids,
                        notices: &mut notices,
                    };
                    state.reset(&mut step)
                };
                if next.same(&state) {
                    break;
                }
                state = next;
            }
            debug!("Reset unwound {} level(s)", last.depth());
            for notice in notices {
                self.notifier.send(notice);
            }
            self.set_state(core, state);
        }

        self.notifier.send(Notification::MachineReset(last.snapshot()));
    }

    fn cancel(&self) -> bool {
        let mut guard = lock(&self.core);
        let core = &mut *guard;
        if core.current.is_idle() {
            return false;
        }

        let last = core.current.clone();
        let next = last.cancel();
        if next.same(&last) {
            return false;
        }
        debug!("Cancelled {}", last.snapshot());
        self.notifier
            .send(Notification::GestureCancelled(last.snapshot()));
        self.set_state(core, next);
        true
    }

    fn expire(&self, generation: u64) {
        let mut guard = lock(&self.core);
        let core = &mut *guard;
        if core.generation != generation || core.current.is_idle() {
            trace!("Ignoring stale timeout generation {}", generation);
            return;
        }

        let last = core.current.clone();
        let mut state = last.clone();
        loop {
            let next = state.timeout();
            if next.same(&state) {
                break;
            }
            state = next;
        }

        if !state.same(&last) {
            debug!("Gesture timed out at {}", last.snapshot());
            self.set_state(core, state);
            self.notifier
                .send(Notification::GestureTimeout(last.snapshot()));
        }
    }

    fn set_state(&self, core: &mut MachineCore<C>, next: State<C>) {
        if core.current.same(&next) {
            return;
        }

        // The retired sampler's worker winds down on its own.
        core.sampler = StrokeSampler::new(&self.config.stroke, Some(self.notifier.clone()));
        self.notifier.send(Notification::StrokeReset);

        core.generation += 1;
        if next.is_idle() {
            self.timer.disarm();
        } else {
            self.timer
                .arm(core.generation, self.config.gesture_timeout());
        }

        let previous = std::mem::replace(&mut core.current, next);
        let from = previous.snapshot();
        let to = core.current.snapshot();
        debug!("{} -> {}", from, to);
        self.notifier.send(Notification::StateChanged { from, to });
    }
}
