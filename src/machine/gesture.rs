use super::history::History;
use super::notify::Notification;
use super::state::{State, StateId, StateKind, StateSnapshot, Step};
use crate::context::{self, ContextManager};
use crate::events::{
    FireEvent, PhysicalEvent, PhysicalFireEvent, PhysicalPressEvent, PhysicalReleaseEvent,
    PressEvent,
};
use crate::stroke::{format_stroke, StrokeDirection};
use crate::tree::{
    any_executors, any_press_executors, any_release_executors, can_transition,
    DoubleThrowElement, SingleThrowElement, StrokeElement,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

type DoubleThrow<C> = Arc<DoubleThrowElement<<C as ContextManager>::Exec>>;

/// Depth >= 1: one or more chords are held.
///
/// `double_throw_elements` are the elements whose press opened the current
/// level; their children are what can fire next.
pub struct GestureState<C: ContextManager> {
    id: StateId,
    ctx: Arc<C::Eval>,
    history: History<C>,
    double_throw_elements: Vec<DoubleThrow<C>>,
    can_cancel: bool,
    single_throw_triggers: HashSet<FireEvent>,
    double_throw_triggers: HashSet<PressEvent>,
    normal_end_trigger: PhysicalReleaseEvent,
    abnormal_end_triggers: HashSet<PhysicalReleaseEvent>,
}

impl<C: ContextManager> GestureState<C> {
    #[must_use]
    pub fn new(
        id: StateId,
        ctx: Arc<C::Eval>,
        history: History<C>,
        double_throw_elements: Vec<DoubleThrow<C>>,
        can_cancel: bool,
    ) -> Self {
        let full = || double_throw_elements.iter().filter(|d| d.is_full());

        let single_throw_triggers = full()
            .flat_map(|d| d.single_throw_elements())
            .filter(|s| s.is_full())
            .map(|s| s.trigger())
            .collect();
        let double_throw_triggers = full()
            .flat_map(|d| d.double_throw_elements())
            .filter(|d| d.is_full())
            .map(|d| d.trigger())
            .collect();

        let normal_end_trigger = history.last().release;
        let abnormal_end_triggers = history.abnormal_end_triggers();

        Self {
            id,
            ctx,
            history,
            double_throw_elements,
            can_cancel,
            single_throw_triggers,
            double_throw_triggers,
            normal_end_trigger,
            abnormal_end_triggers,
        }
    }

    /// Same level, with cancellation switched off
    fn committed(&self, id: StateId) -> Self {
        Self {
            id,
            ctx: Arc::clone(&self.ctx),
            history: self.history.clone(),
            double_throw_elements: self.double_throw_elements.clone(),
            can_cancel: false,
            single_throw_triggers: self.single_throw_triggers.clone(),
            double_throw_triggers: self.double_throw_triggers.clone(),
            normal_end_trigger: self.normal_end_trigger,
            abnormal_end_triggers: self.abnormal_end_triggers.clone(),
        }
    }

    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.can_cancel
    }

    #[must_use]
    pub fn history(&self) -> &History<C> {
        &self.history
    }

    #[must_use]
    pub fn eval_context(&self) -> &C::Eval {
        &self.ctx
    }

    #[must_use]
    pub fn double_throw_elements(&self) -> &[DoubleThrow<C>] {
        &self.double_throw_elements
    }

    #[must_use]
    pub fn normal_end_trigger(&self) -> PhysicalReleaseEvent {
        self.normal_end_trigger
    }

    #[must_use]
    pub fn abnormal_end_triggers(&self) -> &HashSet<PhysicalReleaseEvent> {
        &self.abnormal_end_triggers
    }

    /// State the normal end trigger returns to
    #[must_use]
    pub fn last_state(&self) -> State<C> {
        self.history.last().state.clone()
    }

    fn is_single_throw_trigger(&self, fire: &PhysicalFireEvent) -> bool {
        self.single_throw_triggers.contains(&fire.as_trigger())
            || self.single_throw_triggers.contains(&fire.logical_normalized())
    }

    fn is_double_throw_trigger(&self, press: &PhysicalPressEvent) -> bool {
        self.double_throw_triggers.contains(&press.as_trigger())
            || self.double_throw_triggers.contains(&press.logical_normalized())
    }

    fn full_elements(&self) -> impl Iterator<Item = &DoubleThrow<C>> {
        self.double_throw_elements.iter().filter(|d| d.is_full())
    }

    fn single_throw_elements(
        &self,
        fire: &PhysicalFireEvent,
    ) -> Vec<Arc<SingleThrowElement<C::Exec>>> {
        self.full_elements()
            .flat_map(|d| d.single_throw_elements())
            .filter(|s| s.is_full() && s.trigger().matches(fire))
            .cloned()
            .collect()
    }

    fn child_double_throw_elements(&self, press: &PhysicalPressEvent) -> Vec<DoubleThrow<C>> {
        self.full_elements()
            .flat_map(|d| d.double_throw_elements())
            .filter(|d| d.is_full() && d.trigger().matches(press))
            .cloned()
            .collect()
    }

    fn stroke_elements(&self, strokes: &[StrokeDirection]) -> Vec<Arc<StrokeElement<C::Exec>>> {
        self.full_elements()
            .flat_map(|d| d.stroke_elements())
            .filter(|s| s.is_full() && s.strokes() == strokes)
            .cloned()
            .collect()
    }

    pub(crate) fn input(
        self: &Arc<Self>,
        event: &PhysicalEvent,
        step: &mut Step<'_, C>,
    ) -> (bool, State<C>) {
        match event {
            PhysicalEvent::Fire(fire) if self.is_single_throw_trigger(fire) => {
                let elements = self.single_throw_elements(fire);
                if !elements.is_empty() {
                    debug!("{} matched {} single-throw element(s)", fire, elements.len());
                    context::execute_single_throw(step.context, &self.ctx, &elements);
                    let next = self.committed(step.ids.next_id());
                    return (true, State::Gesture(Arc::new(next)));
                }
            }
            PhysicalEvent::Press(press) if self.is_double_throw_trigger(press) => {
                let elements = self.child_double_throw_elements(press);
                if !elements.is_empty() {
                    debug!("{} matched {} double-throw element(s)", press, elements.len());
                    context::execute_press(step.context, &self.ctx, &elements);
                    if can_transition(&elements) {
                        let history = self
                            .history
                            .push(press.opposition(), State::Gesture(Arc::clone(self)));
                        let next = Self::new(
                            step.ids.next_id(),
                            Arc::clone(&self.ctx),
                            history,
                            elements,
                            self.can_cancel,
                        );
                        return (true, State::Gesture(Arc::new(next)));
                    }
                    return (true, State::Gesture(Arc::clone(self)));
                }
            }
            PhysicalEvent::Release(release) => {
                if *release == self.normal_end_trigger {
                    return (true, self.resolve(step));
                }

                if self.abnormal_end_triggers.contains(release) {
                    if let Some(query) = self.history.query(*release) {
                        debug!(
                            "{} released out of order, unwinding {} level(s)",
                            release,
                            query.skipped.len() + 1
                        );
                        step.invalid.ignore_next_all(query.skipped);
                        return (true, query.found);
                    }
                }

                let press = release.opposition();
                if self.is_double_throw_trigger(&press) {
                    let elements = self.child_double_throw_elements(&press);
                    if any_press_executors(&elements) || any_release_executors(&elements) {
                        debug!("{} runs release executors of a non-transitioning chord", release);
                        context::execute_release(step.context, &self.ctx, &elements);
                        return (true, State::Gesture(Arc::clone(self)));
                    }
                }
            }
            _ => {}
        }
        (false, State::Gesture(Arc::clone(self)))
    }

    /// Close the innermost level after its normal end trigger
    fn resolve(&self, step: &mut Step<'_, C>) -> State<C> {
        let strokes = step.sampler.strokes();
        if !strokes.is_empty() {
            let elements = self.stroke_elements(&strokes);
            debug!(
                "Stroke {} matched {} stroke element(s)",
                format_stroke(&strokes),
                elements.len()
            );
            context::execute_stroke(step.context, &self.ctx, &elements);
            context::execute_release(step.context, &self.ctx, &self.double_throw_elements);
        } else if any_executors(&self.double_throw_elements) {
            context::execute_do(step.context, &self.ctx, &self.double_throw_elements);
            context::execute_release(step.context, &self.ctx, &self.double_throw_elements);
        } else if self.can_cancel {
            debug!("Gesture {} released with nothing fired", self.id);
            step.notices
                .push(Notification::GestureCancelled(self.snapshot()));
        }
        self.last_state()
    }

    pub(crate) fn timeout(self: &Arc<Self>) -> State<C> {
        if !any_executors(&self.double_throw_elements) && self.can_cancel {
            return self.last_state();
        }
        State::Gesture(Arc::clone(self))
    }

    pub(crate) fn reset(&self, step: &mut Step<'_, C>) -> State<C> {
        step.invalid.ignore_next(self.normal_end_trigger);
        context::execute_release(step.context, &self.ctx, &self.double_throw_elements);
        self.last_state()
    }

    /// Drop straight back to idle unless the level has press or release
    /// executors whose pairing would be broken
    pub(crate) fn cancel(self: &Arc<Self>) -> State<C> {
        if any_press_executors(&self.double_throw_elements)
            || any_release_executors(&self.double_throw_elements)
        {
            return State::Gesture(Arc::clone(self));
        }
        self.history.first().state.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            id: self.id,
            kind: StateKind::Gesture,
            depth: self.depth(),
            can_cancel: self.can_cancel,
            end_trigger: Some(self.normal_end_trigger),
        }
    }
}
