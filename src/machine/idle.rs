use super::gesture::GestureState;
use super::history::History;
use super::state::{State, StateId, Step};
use crate::context::{self, ContextManager};
use crate::events::{FireEvent, PhysicalEvent, PhysicalFireEvent, PhysicalPressEvent, PressEvent};
use crate::tree::{
    any_press_executors, any_release_executors, can_transition, DoubleThrowElement, RootElement,
    SingleThrowElement, WhenElement,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

type Root<C> = RootElement<<C as ContextManager>::Eval, <C as ContextManager>::Exec>;
type When<C> = WhenElement<<C as ContextManager>::Eval, <C as ContextManager>::Exec>;

/// Depth 0: no chord is held
pub struct IdleState<C: ContextManager> {
    id: StateId,
    root: Arc<Root<C>>,
    single_throw_triggers: HashSet<FireEvent>,
    double_throw_triggers: HashSet<PressEvent>,
}

impl<C: ContextManager> IdleState<C> {
    #[must_use]
    pub fn new(id: StateId, root: Arc<Root<C>>) -> Self {
        let full_whens = root.when_elements().iter().filter(|w| w.is_full());

        let mut single_throw_triggers = HashSet::new();
        let mut double_throw_triggers = HashSet::new();
        for when in full_whens {
            single_throw_triggers.extend(
                when.single_throw_elements()
                    .iter()
                    .filter(|s| s.is_full())
                    .map(|s| s.trigger()),
            );
            double_throw_triggers.extend(
                when.double_throw_elements()
                    .iter()
                    .filter(|d| d.is_full())
                    .map(|d| d.trigger()),
            );
        }

        Self {
            id,
            root,
            single_throw_triggers,
            double_throw_triggers,
        }
    }

    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub fn root(&self) -> &Arc<Root<C>> {
        &self.root
    }

    fn is_single_throw_trigger(&self, fire: &PhysicalFireEvent) -> bool {
        self.single_throw_triggers.contains(&fire.as_trigger())
            || self.single_throw_triggers.contains(&fire.logical_normalized())
    }

    fn is_double_throw_trigger(&self, press: &PhysicalPressEvent) -> bool {
        self.double_throw_triggers.contains(&press.as_trigger())
            || self.double_throw_triggers.contains(&press.logical_normalized())
    }

    /// Full whens whose guard passes, in declaration order
    fn evaluate_whens(&self, manager: &C, eval: &C::Eval) -> Vec<&Arc<When<C>>> {
        self.root
            .when_elements()
            .iter()
            .filter(|w| w.is_full() && manager.evaluate(eval, w))
            .collect()
    }

    fn single_throw_elements(
        whens: &[&Arc<When<C>>],
        fire: &PhysicalFireEvent,
    ) -> Vec<Arc<SingleThrowElement<C::Exec>>> {
        whens
            .iter()
            .flat_map(|w| w.single_throw_elements())
            .filter(|s| s.is_full() && s.trigger().matches(fire))
            .cloned()
            .collect()
    }

    fn double_throw_elements(
        whens: &[&Arc<When<C>>],
        press: &PhysicalPressEvent,
    ) -> Vec<Arc<DoubleThrowElement<C::Exec>>> {
        whens
            .iter()
            .flat_map(|w| w.double_throw_elements())
            .filter(|d| d.is_full() && d.trigger().matches(press))
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
                let eval = step.context.create_eval_context();
                let whens = self.evaluate_whens(step.context, &eval);
                let elements = Self::single_throw_elements(&whens, fire);
                if !elements.is_empty() {
                    debug!("{} matched {} root single-throw element(s)", fire, elements.len());
                    context::execute_single_throw(step.context, &eval, &elements);
                    return (true, State::Idle(Arc::clone(self)));
                }
            }
            PhysicalEvent::Press(press) if self.is_double_throw_trigger(press) => {
                let eval = step.context.create_eval_context();
                let whens = self.evaluate_whens(step.context, &eval);
                let elements = Self::double_throw_elements(&whens, press);
                if !elements.is_empty() {
                    debug!("{} matched {} root double-throw element(s)", press, elements.len());
                    context::execute_press(step.context, &eval, &elements);
                    if can_transition(&elements) {
                        let history = History::new(press.opposition(), State::Idle(Arc::clone(self)));
                        let next = GestureState::new(
                            step.ids.next_id(),
                            Arc::new(eval),
                            history,
                            elements,
                            true,
                        );
                        return (true, State::Gesture(Arc::new(next)));
                    }
                    return (true, State::Idle(Arc::clone(self)));
                }
            }
            PhysicalEvent::Release(release) if self.is_double_throw_trigger(&release.opposition()) => {
                let eval = step.context.create_eval_context();
                let whens = self.evaluate_whens(step.context, &eval);
                let elements = Self::double_throw_elements(&whens, &release.opposition());
                if any_press_executors(&elements) || any_release_executors(&elements) {
                    debug!("{} runs release executors of a non-transitioning chord", release);
                    context::execute_release(step.context, &eval, &elements);
                    return (true, State::Idle(Arc::clone(self)));
                }
            }
            _ => {}
        }
        (false, State::Idle(Arc::clone(self)))
    }
}
