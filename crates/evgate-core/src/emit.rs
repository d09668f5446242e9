//! Manual event emission through the gateway's events API.

use serde_json::Value;
use thiserror::Error;

use crate::error::GatewayError;
use crate::gateway::GatewayClient;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Event name is required")]
    MissingEvent,

    #[error("Event data is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Failed to emit event: {0}")]
    Gateway(#[from] GatewayError),
}

/// Parse `payload` as JSON and send it as event `event`. Returns the parsed data.
pub async fn emit(
    client: &dyn GatewayClient,
    event: &str,
    payload: &str,
) -> Result<Value, EmitError> {
    let event = event.trim();
    if event.is_empty() {
        return Err(EmitError::MissingEvent);
    }
    let data: Value = serde_json::from_str(payload)?;
    client.emit(event, &data).await?;
    tracing::info!(event, "Event emitted");
    Ok(data)
}
