//! Deployment outputs: the key/value set produced by the infrastructure stack.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ReconcileError;

pub const ACCESS_KEY_OUTPUT: &str = "EventGatewayUserAccessKey";
pub const SECRET_KEY_OUTPUT: &str = "EventGatewayUserSecretKey";

const QUALIFIED_ARN_SUFFIX: &str = "LambdaFunctionQualifiedArn";

/// IAM principal the gateway uses to invoke functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IamCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentOutputs {
    values: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct OutputEntry {
    #[serde(rename = "OutputKey")]
    key: String,
    #[serde(rename = "OutputValue")]
    value: String,
}

#[derive(Deserialize)]
struct StackEntry {
    #[serde(rename = "Outputs", default)]
    outputs: Vec<OutputEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutputsDocument {
    DescribeStacks {
        #[serde(rename = "Stacks")]
        stacks: Vec<StackEntry>,
    },
    Stack {
        #[serde(rename = "Outputs")]
        outputs: Vec<OutputEntry>,
    },
    List(Vec<OutputEntry>),
    Flat(BTreeMap<String, String>),
}

impl DeploymentOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Exact lookup, falling back to a case-insensitive match.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .or_else(|| {
                self.values
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Both IAM outputs, or a deployment data error naming the missing key.
    pub fn iam_credentials(&self) -> Result<IamCredentials, ReconcileError> {
        let access_key_id = self.required(ACCESS_KEY_OUTPUT)?;
        let secret_access_key = self.required(SECRET_KEY_OUTPUT)?;
        Ok(IamCredentials {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        })
    }

    /// Versioned ARN output of a function.
    pub fn function_arn(&self, function: &str) -> Result<&str, ReconcileError> {
        self.required(&function_arn_output_key(function))
    }

    fn required(&self, key: &str) -> Result<&str, ReconcileError> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ReconcileError::deployment_data(format!("missing output {key}")))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ReconcileError> {
        let doc: OutputsDocument = serde_json::from_str(content).map_err(|e| {
            ReconcileError::deployment_data(format!("invalid deployment outputs: {e}"))
        })?;
        let values = match doc {
            OutputsDocument::DescribeStacks { stacks } => {
                let stack = stacks.into_iter().next().ok_or_else(|| {
                    ReconcileError::deployment_data("deployment outputs contain no stack")
                })?;
                collect_entries(stack.outputs)
            }
            OutputsDocument::Stack { outputs } | OutputsDocument::List(outputs) => {
                collect_entries(outputs)
            }
            OutputsDocument::Flat(values) => values,
        };
        Ok(Self { values })
    }

    pub fn load(path: &Path) -> Result<Self, ReconcileError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReconcileError::deployment_data(format!(
                "cannot read deployment outputs {}: {e}",
                path.display()
            ))
        })?;
        let outputs = Self::from_json_str(&content)?;
        if outputs.is_empty() {
            tracing::warn!(path = %path.display(), "Deployment outputs file has no entries");
        } else {
            tracing::debug!(
                path = %path.display(),
                count = outputs.len(),
                "Loaded deployment outputs"
            );
        }
        Ok(outputs)
    }
}

fn collect_entries(entries: Vec<OutputEntry>) -> BTreeMap<String, String> {
    entries.into_iter().map(|e| (e.key, e.value)).collect()
}

/// Logical name used for a function in generated template ids.
///
/// `my-func_v2` becomes `MyDashfuncUnderscorev2`.
pub fn normalized_function_name(function: &str) -> String {
    let replaced = function.replace('-', "Dash").replace('_', "Underscore");
    let mut chars = replaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn function_arn_output_key(function: &str) -> String {
    format!("{}{QUALIFIED_ARN_SUFFIX}", normalized_function_name(function))
}
