//! Input events.
//!
//! Two families live here:
//! - trigger events, which appear in the decision tree and name either a
//!   logical key (any physical variant matches) or one physical key
//! - physical events, which the host feeds into the machine
//!
//! Every press has exactly one opposition release and vice versa.

use crate::keys::{LogicalKey, PhysicalKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key identity used by tree triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyRef {
    Logical(LogicalKey),
    Physical(PhysicalKey),
}

impl KeyRef {
    #[must_use]
    pub const fn logical_key(self) -> LogicalKey {
        match self {
            Self::Logical(key) => key,
            Self::Physical(physical) => physical.key,
        }
    }
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(key) => write!(f, "{}", key),
            Self::Physical(physical) => write!(f, "{}", physical),
        }
    }
}

/// Single-throw trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FireEvent(pub KeyRef);

/// Double-throw trigger (the press half)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PressEvent(pub KeyRef);

/// Double-throw trigger (the release half)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseEvent(pub KeyRef);

impl FireEvent {
    /// True when this trigger names the event's physical key or its logical key
    #[must_use]
    pub fn matches(&self, event: &PhysicalFireEvent) -> bool {
        *self == event.as_trigger() || *self == event.logical_normalized()
    }
}

impl PressEvent {
    #[must_use]
    pub const fn opposition(self) -> ReleaseEvent {
        ReleaseEvent(self.0)
    }

    #[must_use]
    pub fn matches(&self, event: &PhysicalPressEvent) -> bool {
        *self == event.as_trigger() || *self == event.logical_normalized()
    }
}

impl ReleaseEvent {
    #[must_use]
    pub const fn opposition(self) -> PressEvent {
        PressEvent(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalFireEvent(pub PhysicalKey);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalPressEvent(pub PhysicalKey);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalReleaseEvent(pub PhysicalKey);

impl PhysicalFireEvent {
    #[must_use]
    pub const fn key(self) -> PhysicalKey {
        self.0
    }

    #[must_use]
    pub const fn as_trigger(self) -> FireEvent {
        FireEvent(KeyRef::Physical(self.0))
    }

    #[must_use]
    pub const fn logical_normalized(self) -> FireEvent {
        FireEvent(KeyRef::Logical(self.0.key))
    }
}

impl PhysicalPressEvent {
    #[must_use]
    pub const fn key(self) -> PhysicalKey {
        self.0
    }

    #[must_use]
    pub const fn opposition(self) -> PhysicalReleaseEvent {
        PhysicalReleaseEvent(self.0)
    }

    #[must_use]
    pub const fn as_trigger(self) -> PressEvent {
        PressEvent(KeyRef::Physical(self.0))
    }

    #[must_use]
    pub const fn logical_normalized(self) -> PressEvent {
        PressEvent(KeyRef::Logical(self.0.key))
    }
}

impl PhysicalReleaseEvent {
    #[must_use]
    pub const fn key(self) -> PhysicalKey {
        self.0
    }

    #[must_use]
    pub const fn opposition(self) -> PhysicalPressEvent {
        PhysicalPressEvent(self.0)
    }

    #[must_use]
    pub const fn as_trigger(self) -> ReleaseEvent {
        ReleaseEvent(KeyRef::Physical(self.0))
    }

    #[must_use]
    pub const fn logical_normalized(self) -> ReleaseEvent {
        ReleaseEvent(KeyRef::Logical(self.0.key))
    }
}

/// An event delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalEvent {
    Fire(PhysicalFireEvent),
    Press(PhysicalPressEvent),
    Release(PhysicalReleaseEvent),
    /// No key involved; hosts use it to deliver bare pointer motion
    Null,
}

impl From<PhysicalFireEvent> for PhysicalEvent {
    fn from(event: PhysicalFireEvent) -> Self {
        Self::Fire(event)
    }
}

impl From<PhysicalPressEvent> for PhysicalEvent {
    fn from(event: PhysicalPressEvent) -> Self {
        Self::Press(event)
    }
}

impl From<PhysicalReleaseEvent> for PhysicalEvent {
    fn from(event: PhysicalReleaseEvent) -> Self {
        Self::Release(event)
    }
}

impl fmt::Display for PhysicalFireEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fire", self.0)
    }
}

impl fmt::Display for PhysicalPressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} press", self.0)
    }
}

impl fmt::Display for PhysicalReleaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} release", self.0)
    }
}

impl fmt::Display for PhysicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire(event) => fmt::Display::fmt(event, f),
            Self::Press(event) => fmt::Display::fmt(event, f),
            Self::Release(event) => fmt::Display::fmt(event, f),
            Self::Null => f.write_str("null"),
        }
    }
}

impl LogicalKey {
    #[must_use]
    pub const fn fire(self) -> FireEvent {
        FireEvent(KeyRef::Logical(self))
    }

    #[must_use]
    pub const fn press(self) -> PressEvent {
        PressEvent(KeyRef::Logical(self))
    }

    #[must_use]
    pub const fn release(self) -> ReleaseEvent {
        ReleaseEvent(KeyRef::Logical(self))
    }
}

impl PhysicalKey {
    #[must_use]
    pub const fn fire(self) -> PhysicalFireEvent {
        PhysicalFireEvent(self)
    }

    #[must_use]
    pub const fn press(self) -> PhysicalPressEvent {
        PhysicalPressEvent(self)
    }

    #[must_use]
    pub const fn release(self) -> PhysicalReleaseEvent {
        PhysicalReleaseEvent(self)
    }

    /// Tree trigger naming exactly this physical key
    #[must_use]
    pub const fn press_trigger(self) -> PressEvent {
        PressEvent(KeyRef::Physical(self))
    }

    #[must_use]
    pub const fn fire_trigger(self) -> FireEvent {
        FireEvent(KeyRef::Physical(self))
    }
}
