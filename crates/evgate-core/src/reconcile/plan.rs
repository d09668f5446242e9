//! Desired gateway registrations computed from declarations and deployment outputs.

use serde::Serialize;

use crate::arn::{FunctionId, derive_function_id, stable_arn};
use crate::descriptor::{FunctionEventDeclaration, GatewayConfig, normalize_path};
use crate::error::ReconcileError;
use crate::gateway::{ProviderSpec, SubscriptionSpec};
use crate::outputs::DeploymentOutputs;

/// One function to register and the subscriptions that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionPlan {
    pub name: String,
    pub function_id: FunctionId,
    /// Unqualified ARN the gateway invokes.
    pub arn: String,
    #[serde(skip)]
    pub provider: ProviderSpec,
    pub subscriptions: Vec<SubscriptionSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    pub functions: Vec<FunctionPlan>,
}

impl ReconcilePlan {
    pub fn subscription_count(&self) -> usize {
        self.functions.iter().map(|f| f.subscriptions.len()).sum()
    }
}

/// `/<subdomain>` followed by the absolute binding path.
pub fn subscription_path(subdomain: &str, path: &str) -> String {
    format!("/{subdomain}{}", normalize_path(path))
}

/// Validate every input the creation phase needs and resolve ids.
///
/// Fails before anything is sent to the gateway when IAM outputs, function ARN
/// outputs, or well-formed ARNs are missing.
pub fn build_plan(
    config: &GatewayConfig,
    outputs: &DeploymentOutputs,
    declarations: &[FunctionEventDeclaration],
    region: &str,
) -> Result<ReconcilePlan, ReconcileError> {
    let credentials = outputs.iam_credentials()?;

    let mut functions = Vec::new();
    for decl in declarations.iter().filter(|d| !d.bindings.is_empty()) {
        let versioned = outputs.function_arn(&decl.function)?;
        let arn = stable_arn(versioned)
            .map_err(|e| ReconcileError::deployment_data(format!("{}: {e}", decl.function)))?;
        let function_id = derive_function_id(arn)
            .map_err(|e| ReconcileError::deployment_data(format!("{}: {e}", decl.function)))?;

        let subscriptions = decl
            .bindings
            .iter()
            .map(|b| SubscriptionSpec {
                function_id: function_id.clone(),
                event: b.event.clone(),
                path: subscription_path(&config.subdomain, &b.path),
                cors: b.cors,
                method: b.method.clone(),
            })
            .collect();

        functions.push(FunctionPlan {
            name: decl.function.clone(),
            function_id,
            arn: arn.to_string(),
            provider: ProviderSpec::aws_lambda(
                arn,
                region,
                credentials.access_key_id.as_str(),
                credentials.secret_access_key.as_str(),
            ),
            subscriptions,
        });
    }

    Ok(ReconcilePlan { functions })
}
