//! Several machines sharing one input stream.
//!
//! A cluster offers each event to its profiles in order and stops at the
//! first machine that consumes it. `ReloadableGestureMachine` lets the host
//! swap the whole cluster while input keeps flowing.

use crate::context::ContextManager;
use crate::events::PhysicalEvent;
use crate::lock_read;
use crate::machine::GestureMachine;
use crate::stroke::Point;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// A named machine
pub struct GestureMachineProfile<C: ContextManager> {
    name: String,
    machine: GestureMachine<C>,
}

impl<C: ContextManager> GestureMachineProfile<C> {
    pub fn new(name: impl Into<String>, machine: GestureMachine<C>) -> Self {
        Self {
            name: name.into(),
            machine,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn machine(&self) -> &GestureMachine<C> {
        &self.machine
    }
}

pub struct GestureMachineCluster<C: ContextManager> {
    profiles: Vec<GestureMachineProfile<C>>,
}

impl<C: ContextManager> GestureMachineCluster<C> {
    #[must_use]
    pub fn new(profiles: Vec<GestureMachineProfile<C>>) -> Self {
        Self { profiles }
    }

    /// Cluster that consumes nothing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    #[must_use]
    pub fn profiles(&self) -> &[GestureMachineProfile<C>] {
        &self.profiles
    }

    pub fn input(&self, event: PhysicalEvent, point: Option<Point>) -> bool {
        for profile in &self.profiles {
            if profile.machine.input(event, point) {
                debug!("{} consumed by profile {}", event, profile.name);
                return true;
            }
        }
        false
    }

    pub fn reset(&self) {
        for profile in &self.profiles {
            profile.machine.reset();
        }
    }
}

/// Holder for the active cluster
pub struct ReloadableGestureMachine<C: ContextManager> {
    instance: RwLock<Arc<GestureMachineCluster<C>>>,
}

impl<C: ContextManager> ReloadableGestureMachine<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            instance: RwLock::new(Arc::new(GestureMachineCluster::empty())),
        }
    }

    /// Current cluster. The returned handle stays valid across `replace`.
    #[must_use]
    pub fn instance(&self) -> Arc<GestureMachineCluster<C>> {
        Arc::clone(&lock_read(&self.instance))
    }

    #[must_use]
    pub fn is_activated(&self) -> bool {
        !self.instance().is_empty()
    }

    pub fn input(&self, event: PhysicalEvent, point: Option<Point>) -> bool {
        self.instance().input(event, point)
    }

    pub fn reset(&self) {
        self.instance().reset();
    }

    /// Install `cluster` and return the one it replaces. The old cluster
    /// is reset first so chords it still holds run their release executors.
    pub fn replace(&self, cluster: GestureMachineCluster<C>) -> Arc<GestureMachineCluster<C>> {
        let profiles = cluster.profiles.len();
        let previous = {
            let mut instance = self
                .instance
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *instance, Arc::new(cluster))
        };
        previous.reset();
        info!("Gesture machine reloaded with {} profile(s)", profiles);
        previous
    }
}

impl<C: ContextManager> Default for ReloadableGestureMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}
