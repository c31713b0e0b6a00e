//! Decision tree node shapes.
//!
//! A tree is built once by the host and then only read. `E` is the
//! evaluation context guards see, `X` the execution context executors see.
//!
//! ```ignore
//! let root = RootElement::new().when(
//!     WhenElement::new(|_: &()| true).on_press(
//!         DoubleThrowElement::new(LogicalKey::RightButton.press())
//!             .on_stroke(StrokeElement::new(vec![StrokeDirection::Down]).do_action(|_: &()| Ok(())))
//!     ),
//! );
//! ```

use crate::events::{FireEvent, PressEvent};
use crate::stroke::{format_stroke, StrokeDirection};
use std::fmt;
use std::sync::Arc;

pub type Guard<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
pub type Executor<X> = Arc<dyn Fn(&X) -> anyhow::Result<()> + Send + Sync>;

pub struct RootElement<E, X> {
    when_elements: Vec<Arc<WhenElement<E, X>>>,
}

impl<E, X> RootElement<E, X> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            when_elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn when(mut self, element: WhenElement<E, X>) -> Self {
        self.when_elements.push(Arc::new(element));
        self
    }

    #[must_use]
    pub fn when_elements(&self) -> &[Arc<WhenElement<E, X>>] {
        &self.when_elements
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.when_elements.iter().any(|w| w.is_full())
    }
}

impl<E, X> Default for RootElement<E, X> {
    fn default() -> Self {
        Self::new()
    }
}

/// Guarded group of root-level triggers
pub struct WhenElement<E, X> {
    guard: Guard<E>,
    single_throw_elements: Vec<Arc<SingleThrowElement<X>>>,
    double_throw_elements: Vec<Arc<DoubleThrowElement<X>>>,
}

impl<E, X> WhenElement<E, X> {
    pub fn new<F>(guard: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            guard: Arc::new(guard),
            single_throw_elements: Vec::new(),
            double_throw_elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn on_fire(mut self, element: SingleThrowElement<X>) -> Self {
        self.single_throw_elements.push(Arc::new(element));
        self
    }

    #[must_use]
    pub fn on_press(mut self, element: DoubleThrowElement<X>) -> Self {
        self.double_throw_elements.push(Arc::new(element));
        self
    }

    #[must_use]
    pub fn guard(&self) -> &Guard<E> {
        &self.guard
    }

    #[must_use]
    pub fn single_throw_elements(&self) -> &[Arc<SingleThrowElement<X>>] {
        &self.single_throw_elements
    }

    #[must_use]
    pub fn double_throw_elements(&self) -> &[Arc<DoubleThrowElement<X>>] {
        &self.double_throw_elements
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.single_throw_elements.iter().any(|s| s.is_full())
            || self.double_throw_elements.iter().any(|d| d.is_full())
    }
}

/// Momentary trigger with Do executors
pub struct SingleThrowElement<X> {
    trigger: FireEvent,
    do_executors: Vec<Executor<X>>,
}

impl<X> SingleThrowElement<X> {
    #[must_use]
    pub fn new(trigger: FireEvent) -> Self {
        Self {
            trigger,
            do_executors: Vec::new(),
        }
    }

    #[must_use]
    pub fn do_action<F>(mut self, executor: F) -> Self
    where
        F: Fn(&X) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.do_executors.push(Arc::new(executor));
        self
    }

    #[must_use]
    pub fn trigger(&self) -> FireEvent {
        self.trigger
    }

    #[must_use]
    pub fn do_executors(&self) -> &[Executor<X>] {
        &self.do_executors
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.do_executors.is_empty()
    }
}

/// Held trigger. Its children are reachable while the trigger is held.
pub struct DoubleThrowElement<X> {
    trigger: PressEvent,
    press_executors: Vec<Executor<X>>,
    do_executors: Vec<Executor<X>>,
    release_executors: Vec<Executor<X>>,
    single_throw_elements: Vec<Arc<SingleThrowElement<X>>>,
    double_throw_elements: Vec<Arc<DoubleThrowElement<X>>>,
    stroke_elements: Vec<Arc<StrokeElement<X>>>,
}

impl<X> DoubleThrowElement<X> {
    #[must_use]
    pub fn new(trigger: PressEvent) -> Self {
        Self {
            trigger,
            press_executors: Vec::new(),
            do_executors: Vec::new(),
            release_executors: Vec::new(),
            single_throw_elements: Vec::new(),
            double_throw_elements: Vec::new(),
            stroke_elements: Vec::new(),
        }
    }

    /// Runs as soon as the trigger is pressed
    #[must_use]
    pub fn press_action<F>(mut self, executor: F) -> Self
    where
        F: Fn(&X) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.press_executors.push(Arc::new(executor));
        self
    }

    /// Runs on release when no stroke was drawn
    #[must_use]
    pub fn do_action<F>(mut self, executor: F) -> Self
    where
        F: Fn(&X) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.do_executors.push(Arc::new(executor));
        self
    }

    /// Runs on release, after Do or stroke executors
    #[must_use]
    pub fn release_action<F>(mut self, executor: F) -> Self
    where
        F: Fn(&X) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.release_executors.push(Arc::new(executor));
        self
    }

    #[must_use]
    pub fn on_fire(mut self, element: SingleThrowElement<X>) -> Self {
        self.single_throw_elements.push(Arc::new(element));
        self
    }

    #[must_use]
    pub fn on_press(mut self, element: DoubleThrowElement<X>) -> Self {
        self.double_throw_elements.push(Arc::new(element));
        self
    }

    #[must_use]
    pub fn on_stroke(mut self, element: StrokeElement<X>) -> Self {
        self.stroke_elements.push(Arc::new(element));
        self
    }

    #[must_use]
    pub fn trigger(&self) -> PressEvent {
        self.trigger
    }

    #[must_use]
    pub fn press_executors(&self) -> &[Executor<X>] {
        &self.press_executors
    }

    #[must_use]
    pub fn do_executors(&self) -> &[Executor<X>] {
        &self.do_executors
    }

    #[must_use]
    pub fn release_executors(&self) -> &[Executor<X>] {
        &self.release_executors
    }

    #[must_use]
    pub fn single_throw_elements(&self) -> &[Arc<SingleThrowElement<X>>] {
        &self.single_throw_elements
    }

    #[must_use]
    pub fn double_throw_elements(&self) -> &[Arc<DoubleThrowElement<X>>] {
        &self.double_throw_elements
    }

    #[must_use]
    pub fn stroke_elements(&self) -> &[Arc<StrokeElement<X>>] {
        &self.stroke_elements
    }

    #[must_use]
    pub fn has_executors(&self) -> bool {
        !self.press_executors.is_empty()
            || !self.do_executors.is_empty()
            || !self.release_executors.is_empty()
    }

    #[must_use]
    pub fn has_full_children(&self) -> bool {
        self.single_throw_elements.iter().any(|s| s.is_full())
            || self.double_throw_elements.iter().any(|d| d.is_full())
            || self.stroke_elements.iter().any(|s| s.is_full())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.has_executors() || self.has_full_children()
    }
}

/// Direction sequence with Do executors
pub struct StrokeElement<X> {
    strokes: Vec<StrokeDirection>,
    do_executors: Vec<Executor<X>>,
}

impl<X> StrokeElement<X> {
    #[must_use]
    pub fn new(strokes: Vec<StrokeDirection>) -> Self {
        Self {
            strokes,
            do_executors: Vec::new(),
        }
    }

    #[must_use]
    pub fn do_action<F>(mut self, executor: F) -> Self
    where
        F: Fn(&X) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.do_executors.push(Arc::new(executor));
        self
    }

    #[must_use]
    pub fn strokes(&self) -> &[StrokeDirection] {
        &self.strokes
    }

    #[must_use]
    pub fn do_executors(&self) -> &[Executor<X>] {
        &self.do_executors
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.strokes.is_empty() && !self.do_executors.is_empty()
    }
}

// Queries over a set of double-throw elements reached by one press.

pub fn any_press_executors<X>(elements: &[Arc<DoubleThrowElement<X>>]) -> bool {
    elements.iter().any(|e| !e.press_executors().is_empty())
}

pub fn any_do_executors<X>(elements: &[Arc<DoubleThrowElement<X>>]) -> bool {
    elements.iter().any(|e| !e.do_executors().is_empty())
}

pub fn any_release_executors<X>(elements: &[Arc<DoubleThrowElement<X>>]) -> bool {
    elements.iter().any(|e| !e.release_executors().is_empty())
}

pub fn any_executors<X>(elements: &[Arc<DoubleThrowElement<X>>]) -> bool {
    elements.iter().any(|e| e.has_executors())
}

/// Whether pressing into `elements` opens a new gesture level
pub fn can_transition<X>(elements: &[Arc<DoubleThrowElement<X>>]) -> bool {
    any_do_executors(elements) || elements.iter().any(|e| e.has_full_children())
}

impl<E, X> fmt::Debug for RootElement<E, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootElement")
            .field("when_elements", &self.when_elements)
            .finish()
    }
}

impl<E, X> fmt::Debug for WhenElement<E, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhenElement")
            .field("single_throw_elements", &self.single_throw_elements)
            .field("double_throw_elements", &self.double_throw_elements)
            .finish_non_exhaustive()
    }
}

impl<X> fmt::Debug for SingleThrowElement<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleThrowElement")
            .field("trigger", &self.trigger)
            .field("do_executors", &self.do_executors.len())
            .finish()
    }
}

impl<X> fmt::Debug for DoubleThrowElement<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoubleThrowElement")
            .field("trigger", &self.trigger)
            .field("press_executors", &self.press_executors.len())
            .field("do_executors", &self.do_executors.len())
            .field("release_executors", &self.release_executors.len())
            .field("single_throw_elements", &self.single_throw_elements)
            .field("double_throw_elements", &self.double_throw_elements)
            .field("stroke_elements", &self.stroke_elements)
            .finish()
    }
}

impl<X> fmt::Debug for StrokeElement<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrokeElement")
            .field("strokes", &format_stroke(&self.strokes))
            .field("do_executors", &self.do_executors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::LogicalKey;

    fn noop(_: &()) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_single_throw_needs_do() {
        assert!(!SingleThrowElement::<()>::new(LogicalKey::WheelUp.fire()).is_full());
        assert!(SingleThrowElement::new(LogicalKey::WheelUp.fire())
            .do_action(noop)
            .is_full());
    }

    #[test]
    fn test_stroke_needs_directions_and_do() {
        assert!(!StrokeElement::new(vec![]).do_action(noop).is_full());
        assert!(!StrokeElement::<()>::new(vec![StrokeDirection::Up]).is_full());
        assert!(StrokeElement::new(vec![StrokeDirection::Up])
            .do_action(noop)
            .is_full());
    }

    #[test]
    fn test_double_throw_full_through_children() {
        let empty = DoubleThrowElement::<()>::new(LogicalKey::RightButton.press());
        assert!(!empty.is_full());

        let press_only =
            DoubleThrowElement::new(LogicalKey::RightButton.press()).press_action(noop);
        assert!(press_only.is_full());
        assert!(!press_only.has_full_children());

        let empty_child = DoubleThrowElement::<()>::new(LogicalKey::RightButton.press())
            .on_press(DoubleThrowElement::new(LogicalKey::LeftButton.press()));
        assert!(!empty_child.is_full());

        let nested = DoubleThrowElement::new(LogicalKey::RightButton.press()).on_press(
            DoubleThrowElement::new(LogicalKey::LeftButton.press()).do_action(noop),
        );
        assert!(nested.is_full());
        assert!(nested.has_full_children());
    }

    #[test]
    fn test_root_fullness() {
        let empty: RootElement<(), ()> = RootElement::new().when(WhenElement::new(|_: &()| true));
        assert!(!empty.is_full());

        let root: RootElement<(), ()> = RootElement::new().when(
            WhenElement::new(|_: &()| true)
                .on_fire(SingleThrowElement::new(LogicalKey::WheelDown.fire()).do_action(noop)),
        );
        assert!(root.is_full());
    }

    #[test]
    fn test_can_transition() {
        let press_only = vec![Arc::new(
            DoubleThrowElement::new(LogicalKey::A.press()).press_action(noop),
        )];
        assert!(!can_transition(&press_only));
        assert!(any_press_executors(&press_only));

        let with_do = vec![Arc::new(
            DoubleThrowElement::new(LogicalKey::A.press()).do_action(noop),
        )];
        assert!(can_transition(&with_do));
    }
}
