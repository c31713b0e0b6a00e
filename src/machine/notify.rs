//! Lifecycle notifications.
//!
//! The machine never calls user callbacks while holding its lock. Every
//! notification goes through an unbounded channel to a dispatcher thread
//! which invokes the registered `GestureCallbacks` in order.

use super::state::StateSnapshot;
use crate::stroke::{format_stroke, StrokeDirection};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    StateChanged {
        from: StateSnapshot,
        to: StateSnapshot,
    },
    GestureCancelled(StateSnapshot),
    GestureTimeout(StateSnapshot),
    MachineReset(StateSnapshot),
    StrokeReset,
    StrokeUpdated(Vec<StrokeDirection>),
}

/// Hooks for machine lifecycle events. Every method defaults to a no-op.
///
/// Callbacks run on the dispatcher thread and may call back into the machine.
pub trait GestureCallbacks: Send + Sync + 'static {
    fn on_state_changed(&self, _from: &StateSnapshot, _to: &StateSnapshot) {}

    /// A chord was released without anything firing
    fn on_gesture_cancelled(&self, _state: &StateSnapshot) {}

    fn on_gesture_timeout(&self, _state: &StateSnapshot) {}

    fn on_machine_reset(&self, _state: &StateSnapshot) {}

    fn on_stroke_reset(&self) {}

    fn on_stroke_updated(&self, _strokes: &[StrokeDirection]) {}
}

/// Callbacks that only log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCallbacks;

impl GestureCallbacks for LoggingCallbacks {
    fn on_state_changed(&self, from: &StateSnapshot, to: &StateSnapshot) {
        debug!("State changed: {} -> {}", from, to);
    }

    fn on_gesture_cancelled(&self, state: &StateSnapshot) {
        debug!("Gesture cancelled: {}", state);
    }

    fn on_gesture_timeout(&self, state: &StateSnapshot) {
        debug!("Gesture timed out: {}", state);
    }

    fn on_machine_reset(&self, state: &StateSnapshot) {
        debug!("Machine reset from {}", state);
    }

    fn on_stroke_updated(&self, strokes: &[StrokeDirection]) {
        trace!("Stroke updated: {}", format_stroke(strokes));
    }
}

/// Sending half of the dispatcher channel
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    /// Start a dispatcher thread for `callbacks`. It exits once every
    /// `Notifier` clone is dropped and the queue is drained.
    pub fn spawn(callbacks: Arc<dyn GestureCallbacks>) -> std::io::Result<Self> {
        let (tx, rx) = unbounded();
        thread::Builder::new()
            .name("gesture-callbacks".to_string())
            .spawn(move || run_dispatcher(callbacks.as_ref(), rx))?;
        Ok(Self { tx })
    }

    pub fn send(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            trace!("Callback dispatcher gone, dropping notification");
        }
    }
}

fn run_dispatcher(callbacks: &dyn GestureCallbacks, rx: Receiver<Notification>) {
    for notification in rx {
        let delivered = catch_unwind(AssertUnwindSafe(|| dispatch(callbacks, &notification)));
        if delivered.is_err() {
            error!("Gesture callback panicked while handling {:?}", notification);
        }
    }
    trace!("Callback dispatcher stopped");
}

fn dispatch(callbacks: &dyn GestureCallbacks, notification: &Notification) {
    match notification {
        Notification::StateChanged { from, to } => callbacks.on_state_changed(from, to),
        Notification::GestureCancelled(state) => callbacks.on_gesture_cancelled(state),
        Notification::GestureTimeout(state) => callbacks.on_gesture_timeout(state),
        Notification::MachineReset(state) => callbacks.on_machine_reset(state),
        Notification::StrokeReset => callbacks.on_stroke_reset(),
        Notification::StrokeUpdated(strokes) => callbacks.on_stroke_updated(strokes),
    }
}
