//! Function ARN handling and FunctionId derivation.
//!
//! A Lambda ARN carries an optional version or alias as its eighth colon-delimited
//! segment. The gateway always targets the unqualified ("latest") ARN, and the
//! FunctionId is the hex SHA-256 of that ARN, so repeated deployments of the same
//! function produce the same id.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const STABLE_SEGMENTS: usize = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArnError {
    #[error("Malformed ARN \"{arn}\": expected at least 7 ':'-separated segments, got {found}")]
    TooFewSegments { arn: String, found: usize },
}

/// Deterministic identifier for a function registered with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FunctionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for FunctionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Strip the version/alias suffix, keeping the first seven segments.
pub fn stable_arn(arn: &str) -> Result<&str, ArnError> {
    let found = arn.split(':').count();
    if found < STABLE_SEGMENTS {
        return Err(ArnError::TooFewSegments {
            arn: arn.to_string(),
            found,
        });
    }
    // Byte offset of the seventh ':' (end of the seventh segment), if any.
    let end = arn
        .match_indices(':')
        .nth(STABLE_SEGMENTS - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(arn.len());
    Ok(&arn[..end])
}

/// Hex-encoded SHA-256 of the stable ARN.
pub fn derive_function_id(arn: &str) -> Result<FunctionId, ArnError> {
    let stable = stable_arn(arn)?;
    Ok(FunctionId(hash_hex(stable)))
}

fn hash_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)
}
