//! Evaluation and execution contexts.
//!
//! A `ContextManager` creates one evaluation context when a gesture starts
//! (guards read it) and a fresh execution context for every batch of
//! executors. Both types are chosen by the host.

use crate::tree::{
    DoubleThrowElement, Executor, SingleThrowElement, StrokeElement, WhenElement,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

pub trait ContextManager: Send + Sync + 'static {
    type Eval: Send + Sync + 'static;
    type Exec: Send + Sync + 'static;

    fn create_eval_context(&self) -> Self::Eval;

    fn create_exec_context(&self, eval: &Self::Eval) -> Self::Exec;

    /// Run a guard. A panicking guard counts as false.
    fn evaluate(&self, ctx: &Self::Eval, when: &WhenElement<Self::Eval, Self::Exec>) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (when.guard())(ctx))) {
            Ok(passed) => passed,
            Err(_) => {
                error!("When guard panicked, treating it as false");
                false
            }
        }
    }

    /// Run one executor. Failures are logged and never reach the machine.
    fn execute(&self, ctx: &Self::Exec, executor: &Executor<Self::Exec>) {
        match catch_unwind(AssertUnwindSafe(|| executor(ctx))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Executor failed: {:#}", e),
            Err(_) => error!("Executor panicked"),
        }
    }
}

/// Context manager for hosts that need no context data
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainContext;

impl ContextManager for PlainContext {
    type Eval = ();
    type Exec = ();

    fn create_eval_context(&self) -> Self::Eval {}

    fn create_exec_context(&self, _eval: &Self::Eval) -> Self::Exec {}
}

/// Run every executor in order with one shared execution context.
/// No context is created for an empty batch.
fn execute_batch<'a, C, I>(manager: &C, eval: &C::Eval, executors: I)
where
    C: ContextManager,
    I: IntoIterator<Item = &'a Executor<C::Exec>>,
{
    let mut executors = executors.into_iter().peekable();
    if executors.peek().is_none() {
        return;
    }
    let ctx = manager.create_exec_context(eval);
    for executor in executors {
        manager.execute(&ctx, executor);
    }
}

pub(crate) fn execute_press<C: ContextManager>(
    manager: &C,
    eval: &C::Eval,
    elements: &[Arc<DoubleThrowElement<C::Exec>>],
) {
    execute_batch(manager, eval, elements.iter().flat_map(|e| e.press_executors()));
}

pub(crate) fn execute_do<C: ContextManager>(
    manager: &C,
    eval: &C::Eval,
    elements: &[Arc<DoubleThrowElement<C::Exec>>],
) {
    execute_batch(manager, eval, elements.iter().flat_map(|e| e.do_executors()));
}

pub(crate) fn execute_release<C: ContextManager>(
    manager: &C,
    eval: &C::Eval,
    elements: &[Arc<DoubleThrowElement<C::Exec>>],
) {
    execute_batch(manager, eval, elements.iter().flat_map(|e| e.release_executors()));
}

pub(crate) fn execute_single_throw<C: ContextManager>(
    manager: &C,
    eval: &C::Eval,
    elements: &[Arc<SingleThrowElement<C::Exec>>],
) {
    execute_batch(manager, eval, elements.iter().flat_map(|e| e.do_executors()));
}

pub(crate) fn execute_stroke<C: ContextManager>(
    manager: &C,
    eval: &C::Eval,
    elements: &[Arc<StrokeElement<C::Exec>>],
) {
    execute_batch(manager, eval, elements.iter().flat_map(|e| e.do_executors()));
}
