//! Registration of planned functions and their subscriptions.

use crate::arn::FunctionId;
use crate::error::ReconcileError;
use crate::gateway::GatewayClient;
use crate::state::{ReconciliationState, StateStore};

use super::plan::{FunctionPlan, ReconcilePlan};

#[derive(Debug, Default)]
pub(super) struct Created {
    pub functions: Vec<FunctionId>,
    pub subscriptions: Vec<String>,
}

/// Register each function, then subscribe its bindings, persisting after every call.
pub(super) async fn create(
    client: &dyn GatewayClient,
    store: &dyn StateStore,
    state: &mut ReconciliationState,
    plan: &ReconcilePlan,
) -> Result<Created, ReconcileError> {
    let mut created = Created::default();

    for function in &plan.functions {
        register(client, function).await?;
        if !state.functions.contains(&function.function_id) {
            state.functions.push(function.function_id.clone());
        }
        store.save(state).await?;
        created.functions.push(function.function_id.clone());

        for spec in &function.subscriptions {
            let subscription_id = client.subscribe(spec).await.map_err(|e| {
                ReconcileError::remote(
                    "subscribe",
                    format!("{} {} {}", function.name, spec.event, spec.path),
                    e,
                )
            })?;
            tracing::info!(
                function = %function.name,
                subscription_id = %subscription_id,
                event = %spec.event,
                path = %spec.path,
                "Subscription created"
            );
            state.subscriptions.push(subscription_id.clone());
            store.save(state).await?;
            created.subscriptions.push(subscription_id);
        }
    }

    Ok(created)
}

/// Plain register when the gateway upserts; otherwise an existing registration
/// is refreshed in place.
async fn register(
    client: &dyn GatewayClient,
    function: &FunctionPlan,
) -> Result<(), ReconcileError> {
    let id = &function.function_id;
    match client.register_function(id, &function.provider).await {
        Ok(()) => {}
        Err(e) if e.is_already_exists() && !client.register_is_upsert() => {
            tracing::info!(
                function = %function.name,
                function_id = %id,
                "Function already registered, updating"
            );
            client
                .update_function(id, &function.provider)
                .await
                .map_err(|e| ReconcileError::remote("update_function", id.to_string(), e))?;
        }
        Err(e) => return Err(ReconcileError::remote("register_function", id.to_string(), e)),
    }
    tracing::info!(
        function = %function.name,
        function_id = %id,
        arn = %function.arn,
        "Function registered"
    );
    Ok(())
}
