//! Removal of previously created subscriptions and functions.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use futures_util::stream;

use crate::arn::FunctionId;
use crate::error::{GatewayError, ReconcileError};
use crate::gateway::GatewayClient;
use crate::state::{ReconciliationState, StateStore};

#[derive(Debug, Default)]
pub(super) struct Removed {
    pub subscriptions: Vec<String>,
    pub functions: Vec<FunctionId>,
}

/// Unsubscribe everything, then delete every function.
///
/// Each confirmed removal is written to the store before the next completion is
/// processed. Objects the gateway no longer knows are forgotten as if removed.
pub(super) async fn teardown(
    client: &dyn GatewayClient,
    store: &dyn StateStore,
    state: &mut ReconciliationState,
    concurrency: usize,
) -> Result<Removed, ReconcileError> {
    let subscriptions = state.subscriptions.clone();
    let subscriptions = remove_each(
        store,
        state,
        subscriptions,
        concurrency,
        "unsubscribe",
        |id: String| async move { client.unsubscribe(&id).await },
        |state, id| state.subscriptions = state.without_subscription(id),
    )
    .await?;

    let functions = state.functions.clone();
    let functions = remove_each(
        store,
        state,
        functions,
        concurrency,
        "delete_function",
        |id: FunctionId| async move { client.delete_function(&id).await },
        |state, id| state.functions = state.without_function(id),
    )
    .await?;

    Ok(Removed {
        subscriptions,
        functions,
    })
}

/// Run `call` for every item with at most `concurrency` calls in flight.
///
/// After the first failure no further calls start. Calls already in flight are
/// still awaited and recorded, then the first failure is returned.
async fn remove_each<T, F, Fut>(
    store: &dyn StateStore,
    state: &mut ReconciliationState,
    items: Vec<T>,
    concurrency: usize,
    operation: &'static str,
    call: F,
    forget: fn(&mut ReconciliationState, &T),
) -> Result<Vec<T>, ReconcileError>
where
    T: Clone + Display,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), GatewayError>>,
{
    let aborted = AtomicBool::new(false);
    let call = &call;
    let aborted_ref = &aborted;

    let mut completions = stream::iter(items)
        .map(|item| async move {
            if aborted_ref.load(Ordering::SeqCst) {
                return (item, None);
            }
            let outcome = call(item.clone()).await;
            (item, Some(outcome))
        })
        .buffer_unordered(concurrency.max(1));

    let mut removed = Vec::new();
    let mut first_error = None;

    while let Some((item, outcome)) = completions.next().await {
        match outcome {
            None => continue,
            Some(Ok(())) => {
                tracing::info!(operation, id = %item, "Removed from gateway");
            }
            Some(Err(e)) if e.is_not_found() => {
                tracing::warn!(operation, id = %item, "Already absent on gateway, forgetting");
            }
            Some(Err(e)) => {
                tracing::error!(operation, id = %item, error = %e, "Teardown call failed");
                aborted.store(true, Ordering::SeqCst);
                if first_error.is_none() {
                    first_error = Some(ReconcileError::remote(operation, item.to_string(), e));
                }
                continue;
            }
        }
        forget(state, &item);
        store.save(state).await?;
        removed.push(item);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(removed),
    }
}
