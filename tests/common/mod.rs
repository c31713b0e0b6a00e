#![allow(dead_code)]

use chordmux::machine::{GestureCallbacks, Notification, StateSnapshot};
use chordmux::tree::RootElement;
use chordmux::{
    GestureConfig, GestureMachine, LogicalKey, PhysicalEvent, PhysicalKey, PhysicalReleaseEvent,
    PlainContext, StrokeDirection,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub type Root = RootElement<(), ()>;

const WAIT: Duration = Duration::from_secs(2);

/// Forwards every callback into a channel
pub struct Recorder {
    tx: Sender<Notification>,
}

impl GestureCallbacks for Recorder {
    fn on_state_changed(&self, from: &StateSnapshot, to: &StateSnapshot) {
        let _ = self.tx.send(Notification::StateChanged {
            from: from.clone(),
            to: to.clone(),
        });
    }

    fn on_gesture_cancelled(&self, state: &StateSnapshot) {
        let _ = self.tx.send(Notification::GestureCancelled(state.clone()));
    }

    fn on_gesture_timeout(&self, state: &StateSnapshot) {
        let _ = self.tx.send(Notification::GestureTimeout(state.clone()));
    }

    fn on_machine_reset(&self, state: &StateSnapshot) {
        let _ = self.tx.send(Notification::MachineReset(state.clone()));
    }

    fn on_stroke_reset(&self) {
        let _ = self.tx.send(Notification::StrokeReset);
    }

    fn on_stroke_updated(&self, strokes: &[StrokeDirection]) {
        let _ = self.tx.send(Notification::StrokeUpdated(strokes.to_vec()));
    }
}

pub struct Notifications {
    rx: Receiver<Notification>,
}

impl Notifications {
    /// Everything delivered up to and including the next machine-reset
    /// notification. Callbacks arrive in order, so an idle `reset` works as
    /// a flush marker.
    pub fn until_reset(&self) -> Vec<Notification> {
        let mut seen = Vec::new();
        while let Ok(notification) = self.rx.recv_timeout(WAIT) {
            let done = matches!(notification, Notification::MachineReset(_));
            seen.push(notification);
            if done {
                break;
            }
        }
        seen
    }

    pub fn wait_for<F>(&self, pred: F) -> Option<Notification>
    where
        F: Fn(&Notification) -> bool,
    {
        let deadline = Instant::now() + WAIT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(notification) if pred(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Everything delivered within `window`
    pub fn drain_for(&self, window: Duration) -> Vec<Notification> {
        let deadline = Instant::now() + window;
        let mut seen = Vec::new();
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(notification) => seen.push(notification),
                Err(_) => return seen,
            }
        }
    }
}

pub fn count<F>(seen: &[Notification], pred: F) -> usize
where
    F: Fn(&Notification) -> bool,
{
    seen.iter().filter(|n| pred(n)).count()
}

pub fn is_cancelled(notification: &Notification) -> bool {
    matches!(notification, Notification::GestureCancelled(_))
}

pub fn is_timeout(notification: &Notification) -> bool {
    matches!(notification, Notification::GestureTimeout(_))
}

pub fn is_reset(notification: &Notification) -> bool {
    matches!(notification, Notification::MachineReset(_))
}

pub fn start(root: Root) -> (GestureMachine<PlainContext>, Notifications) {
    start_with(GestureConfig::default(), root)
}

pub fn start_with(config: GestureConfig, root: Root) -> (GestureMachine<PlainContext>, Notifications) {
    chordmux::logging::init_for_tests();
    let (tx, rx) = unbounded();
    let machine = GestureMachine::new(config, PlainContext, root, Arc::new(Recorder { tx }))
        .expect("machine should start");
    (machine, Notifications { rx })
}

pub fn short_timeout() -> GestureConfig {
    GestureConfig {
        gesture_timeout_ms: 50,
        ..GestureConfig::default()
    }
}

pub fn press(key: LogicalKey) -> PhysicalEvent {
    PhysicalKey::primary(key).press().into()
}

pub fn release(key: LogicalKey) -> PhysicalEvent {
    PhysicalKey::primary(key).release().into()
}

pub fn fire(key: LogicalKey) -> PhysicalEvent {
    PhysicalKey::primary(key).fire().into()
}

pub fn release_event(key: LogicalKey) -> PhysicalReleaseEvent {
    PhysicalKey::primary(key).release()
}

/// Counts executor invocations
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn action(&self) -> impl Fn(&()) -> anyhow::Result<()> + Send + Sync + 'static {
        let count = Arc::clone(&self.0);
        move |_: &()| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

/// Records executor invocations in order
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<&'static str>>>);

impl Trace {
    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    pub fn action(
        &self,
        label: &'static str,
    ) -> impl Fn(&()) -> anyhow::Result<()> + Send + Sync + 'static {
        let entries = Arc::clone(&self.0);
        move |_: &()| {
            entries.lock().unwrap().push(label);
            Ok(())
        }
    }
}
