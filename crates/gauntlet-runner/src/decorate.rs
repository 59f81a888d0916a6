use crate::context::ExecutionContext;
use crate::error::WorksAlreadyError;
use crate::suite::{TestCase, TestId};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run a test case with its full decoration applied: panic containment,
/// then not-yet-implemented inversion, then the retry loop around both.
///
/// Only the final attempt's failure surfaces; earlier failures are logged
/// and discarded.
pub(crate) fn execute(
    id: &TestId,
    case: &TestCase,
    ctx: &mut ExecutionContext,
) -> anyhow::Result<()> {
    let attempts = case.meta.retry.max(1);
    for attempt in 1..attempts {
        match attempt_once(case, ctx) {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::debug!(test = %id, attempt, error = %err, "attempt failed, retrying");
            }
        }
    }
    attempt_once(case, ctx)
}

fn attempt_once(case: &TestCase, ctx: &mut ExecutionContext) -> anyhow::Result<()> {
    let outcome = run_contained(case, ctx);
    if case.meta.not_yet_implemented {
        invert(outcome)
    } else {
        outcome
    }
}

/// A panicking test body must not take the whole run down: the suite still
/// has other profiles to serve and a driver to shut down at the end.
fn run_contained(case: &TestCase, ctx: &mut ExecutionContext) -> anyhow::Result<()> {
    match catch_unwind(AssertUnwindSafe(|| (case.body)(ctx))) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!(
            "test panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn invert(result: anyhow::Result<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Err(WorksAlreadyError.into()),
        Err(err) => {
            tracing::debug!(error = %err, "failed as expected for a not-yet-implemented test");
            Ok(())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
