//! Event gateway client contract.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::arn::FunctionId;
use crate::error::GatewayError;

pub use http::HttpGatewayClient;

pub const AWS_LAMBDA_PROVIDER: &str = "awslambda";

/// How the gateway reaches a registered function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub arn: String,
    pub region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

impl ProviderSpec {
    pub fn aws_lambda(
        arn: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            provider_type: AWS_LAMBDA_PROVIDER.to_string(),
            arn: arn.into(),
            region: region.into(),
            aws_access_key_id: access_key_id.into(),
            aws_secret_access_key: secret_access_key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    pub function_id: FunctionId,
    pub event: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Remote operations the reconciler depends on.
///
/// Retry and timeout policy for individual calls belongs to the implementation.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn register_function(
        &self,
        id: &FunctionId,
        provider: &ProviderSpec,
    ) -> Result<(), GatewayError>;

    /// Replace the provider of an already registered function.
    async fn update_function(
        &self,
        id: &FunctionId,
        provider: &ProviderSpec,
    ) -> Result<(), GatewayError>;

    async fn delete_function(&self, id: &FunctionId) -> Result<(), GatewayError>;

    /// Returns the subscription id assigned by the gateway.
    async fn subscribe(&self, spec: &SubscriptionSpec) -> Result<String, GatewayError>;

    async fn unsubscribe(&self, subscription_id: &str) -> Result<(), GatewayError>;

    async fn emit(&self, event: &str, data: &Value) -> Result<(), GatewayError>;

    /// Whether `register_function` replaces an existing registration.
    fn register_is_upsert(&self) -> bool {
        false
    }
}
