use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by a gateway client adapter.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Object not found on gateway")]
    NotFound,

    #[error("Object already exists on gateway")]
    AlreadyExists,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Errors raised while reading or writing the persisted reconciliation state.
#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("State I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures while loading the deployment descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Failed to load descriptor: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Descriptor has no custom.eventgateway block")]
    MissingGatewayBlock,

    #[error("Descriptor field is missing or empty: {0}")]
    MissingField(&'static str),

    #[error("Invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Top-level reconciliation failure taxonomy.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Deployment data error: {0}")]
    DeploymentData(String),

    #[error("Remote call {operation} failed for {id}: {source}")]
    Remote {
        operation: &'static str,
        id: String,
        #[source]
        source: GatewayError,
    },

    #[error("State store error: {0}")]
    StateStore(#[from] StateStoreError),
}

impl ReconcileError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn deployment_data(message: impl Into<String>) -> Self {
        Self::DeploymentData(message.into())
    }

    pub fn remote(operation: &'static str, id: impl Into<String>, source: GatewayError) -> Self {
        Self::Remote {
            operation,
            id: id.into(),
            source,
        }
    }

    /// Stable label for logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::DeploymentData(_) => "deployment_data",
            Self::Remote { .. } => "remote_call",
            Self::StateStore(_) => "state_store",
        }
    }
}

impl From<DescriptorError> for ReconcileError {
    fn from(e: DescriptorError) -> Self {
        Self::Configuration(e.to_string())
    }
}
