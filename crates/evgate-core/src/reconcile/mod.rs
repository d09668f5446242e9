//! Reconciliation of gateway functions and subscriptions.
//!
//! A run has three steps:
//! - plan: validate deployment outputs and derive FunctionIds (no remote calls)
//! - teardown: unsubscribe every tracked subscription, then delete every tracked function
//! - create: register each planned function, then subscribe its bindings
//!
//! The state store is written after every successful remote mutation, so an
//! interrupted run leaves state that matches the gateway to within one call.

mod create;
mod plan;
mod teardown;

use std::sync::Arc;

use crate::arn::FunctionId;
use crate::descriptor::{DEFAULT_REGION, FunctionEventDeclaration, GatewayConfig};
use crate::error::ReconcileError;
use crate::gateway::GatewayClient;
use crate::outputs::DeploymentOutputs;
use crate::state::{ReconciliationState, StateStore};

pub use plan::{FunctionPlan, ReconcilePlan, build_plan, subscription_path};

pub type DynGatewayClient = Arc<dyn GatewayClient>;
pub type DynStateStore = Arc<dyn StateStore>;

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Region passed to the gateway with each function registration.
    pub region: String,
    /// Maximum teardown calls in flight within one phase.
    pub teardown_concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            teardown_concurrency: 1,
        }
    }
}

impl ReconcileOptions {
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_teardown_concurrency(mut self, concurrency: usize) -> Self {
        self.teardown_concurrency = concurrency.max(1);
        self
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    pub state: ReconciliationState,
    pub removed_subscriptions: Vec<String>,
    pub removed_functions: Vec<FunctionId>,
    pub registered_functions: Vec<FunctionId>,
    pub created_subscriptions: Vec<String>,
}

pub struct Reconciler {
    client: DynGatewayClient,
    store: DynStateStore,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(client: DynGatewayClient, store: DynStateStore) -> Self {
        Self {
            client,
            store,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn plan(
        &self,
        config: &GatewayConfig,
        outputs: &DeploymentOutputs,
        declarations: &[FunctionEventDeclaration],
    ) -> Result<ReconcilePlan, ReconcileError> {
        build_plan(config, outputs, declarations, &self.options.region)
    }

    /// Load prior state from the store and reconcile against it.
    pub async fn run(
        &self,
        config: &GatewayConfig,
        outputs: &DeploymentOutputs,
        declarations: &[FunctionEventDeclaration],
    ) -> Result<ReconcileResult, ReconcileError> {
        let prior = self.store.load().await?;
        self.reconcile(config, outputs, declarations, prior).await
    }

    /// Tear down everything in `prior`, then create the declared set.
    ///
    /// Every input is validated first: a configuration or deployment data error
    /// returns before any remote call is made.
    pub async fn reconcile(
        &self,
        config: &GatewayConfig,
        outputs: &DeploymentOutputs,
        declarations: &[FunctionEventDeclaration],
        prior: ReconciliationState,
    ) -> Result<ReconcileResult, ReconcileError> {
        if config.subdomain.is_empty() {
            return Err(ReconcileError::configuration("subdomain is empty"));
        }
        if config.api_key.is_empty() {
            return Err(ReconcileError::configuration("apikey is empty"));
        }
        let plan = self.plan(config, outputs, declarations)?;

        let mut state = prior;
        tracing::info!(
            subscriptions = state.subscriptions.len(),
            functions = state.functions.len(),
            "Tearing down previous gateway state"
        );
        let removed = teardown::teardown(
            self.client.as_ref(),
            self.store.as_ref(),
            &mut state,
            self.options.teardown_concurrency,
        )
        .await?;

        tracing::info!(
            functions = plan.functions.len(),
            subscriptions = plan.subscription_count(),
            "Creating gateway functions and subscriptions"
        );
        let created =
            create::create(self.client.as_ref(), self.store.as_ref(), &mut state, &plan).await?;

        tracing::info!(
            removed_subscriptions = removed.subscriptions.len(),
            removed_functions = removed.functions.len(),
            registered = created.functions.len(),
            subscribed = created.subscriptions.len(),
            "Event gateway reconciled"
        );

        Ok(ReconcileResult {
            state,
            removed_subscriptions: removed.subscriptions,
            removed_functions: removed.functions,
            registered_functions: created.functions,
            created_subscriptions: created.subscriptions,
        })
    }
}
