//! Keeps an event gateway's registered functions and subscriptions in line with a
//! serverless deployment.
//!
//! Previously created gateway objects are recorded in a local state file. Each
//! reconciliation removes all of them and recreates the set declared by the
//! current deployment, writing the state file after every remote call.

pub mod arn;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod gateway;
pub mod iam;
pub mod outputs;
pub mod reconcile;
pub mod state;

pub use arn::{ArnError, FunctionId, derive_function_id, stable_arn};
pub use descriptor::{
    EventBinding, FunctionEventDeclaration, GatewayConfig, ServiceDescriptor, load_descriptor,
};
pub use emit::{EmitError, emit};
pub use error::{DescriptorError, GatewayError, ReconcileError, StateStoreError};
pub use gateway::{GatewayClient, HttpGatewayClient, ProviderSpec, SubscriptionSpec};
pub use outputs::{DeploymentOutputs, IamCredentials};
pub use reconcile::{
    DynGatewayClient, DynStateStore, FunctionPlan, ReconcileOptions, ReconcilePlan,
    ReconcileResult, Reconciler,
};
pub use state::{FileStateStore, MemoryStateStore, ReconciliationState, StateStore};
