use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use evgate_core::{
    DeploymentOutputs, FileStateStore, FunctionEventDeclaration, GatewayConfig,
    HttpGatewayClient, ServiceDescriptor,
};

/// Everything loaded from the descriptor for one invocation.
pub struct Deployment {
    pub descriptor: ServiceDescriptor,
    pub gateway: GatewayConfig,
    pub declarations: Vec<FunctionEventDeclaration>,
}

impl Deployment {
    pub fn load(path: &Path) -> Result<Self> {
        let descriptor = evgate_core::load_descriptor(path)
            .with_context(|| format!("Failed to load descriptor {}", path.display()))?;
        let gateway = descriptor
            .gateway_config()
            .context("Invalid custom.eventgateway configuration")?;
        let declarations = descriptor.declarations();
        Ok(Self {
            descriptor,
            gateway,
            declarations,
        })
    }

    pub fn region(&self) -> &str {
        self.descriptor.region()
    }

    pub fn client(&self) -> Arc<HttpGatewayClient> {
        Arc::new(HttpGatewayClient::new(&self.gateway))
    }
}

pub fn load_outputs(path: &Path) -> Result<DeploymentOutputs> {
    DeploymentOutputs::load(path).context("Failed to load deployment outputs")
}

pub fn state_store(path: &Path) -> Arc<FileStateStore> {
    Arc::new(FileStateStore::new(path))
}
