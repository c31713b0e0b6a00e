#![allow(clippy::pedantic, clippy::module_inception)]

pub mod cluster;
pub mod config;
pub mod context;
pub mod events;
pub mod keys;
pub mod logging;
pub mod machine;
pub mod stroke;
pub mod tree;

pub use cluster::{GestureMachineCluster, GestureMachineProfile, ReloadableGestureMachine};
pub use config::{ConfigError, GestureConfig, StrokeConfig};
pub use context::{ContextManager, PlainContext};
pub use events::{PhysicalEvent, PhysicalFireEvent, PhysicalPressEvent, PhysicalReleaseEvent};
pub use keys::{LogicalKey, PhysicalKey};
pub use machine::{GestureCallbacks, GestureMachine, MachineError, State, StateSnapshot};
pub use stroke::{Point, StrokeDirection};

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
/// Everything guarded in this crate stays consistent across a panic because
/// state values are swapped whole.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock_read<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(PoisonError::into_inner)
}
