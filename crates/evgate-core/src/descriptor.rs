//! Deployment descriptor: the `custom.eventgateway` block and per-function
//! `eventgateway` event bindings.
//!
//! The descriptor is read with the `config` crate, so YAML, JSON and TOML files all
//! work, and any field can be overridden from the environment, e.g.
//! `EVGATE__CUSTOM__EVENTGATEWAY__APIKEY=...`.

use std::path::Path;

use config::{Config, Environment, File};
use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::error::DescriptorError;

/// Configuration API of the hosted gateway.
pub const DEFAULT_CONFIG_URL: &str = "https://config.eventgateway-dev.io";
/// Domain under which each tenant's events API lives.
pub const HOSTED_EVENTS_DOMAIN: &str = "eventgateway-dev.io";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_HTTP_METHOD: &str = "GET";
pub const HTTP_EVENT: &str = "http";

/// Resolved gateway settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub subdomain: String,
    pub api_key: String,
    pub events_url: Url,
    pub config_url: Url,
    /// The remote register call replaces an existing registration instead of failing.
    pub register_upsert: bool,
}

impl GatewayConfig {
    /// Build a config with the hosted endpoint URLs derived from the subdomain.
    pub fn hosted(subdomain: &str, api_key: &str) -> Result<Self, DescriptorError> {
        Ok(Self {
            subdomain: subdomain.to_string(),
            api_key: api_key.to_string(),
            events_url: hosted_events_url(subdomain)?,
            config_url: parse_url("configUrl", DEFAULT_CONFIG_URL)?,
            register_upsert: false,
        })
    }
}

fn hosted_events_url(subdomain: &str) -> Result<Url, DescriptorError> {
    parse_url(
        "subdomain",
        &format!("https://{subdomain}.{HOSTED_EVENTS_DOMAIN}"),
    )
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, DescriptorError> {
    Url::parse(raw).map_err(|source| DescriptorError::InvalidUrl { field, source })
}

/// One event binding attached to a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub event: String,
    /// Always absolute.
    pub path: String,
    pub cors: Option<bool>,
    /// Set only for `http` events.
    pub method: Option<String>,
}

impl EventBinding {
    pub fn new(event: impl Into<String>) -> Self {
        let event = event.into();
        let method = (event == HTTP_EVENT).then(|| DEFAULT_HTTP_METHOD.to_string());
        Self {
            event,
            path: "/".to_string(),
            cors: None,
            method,
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = normalize_path(path);
        self
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = Some(cors);
        self
    }

    pub fn with_method(mut self, method: &str) -> Self {
        if self.event == HTTP_EVENT {
            self.method = Some(method.to_uppercase());
        }
        self
    }

    fn from_raw(raw: &RawBinding) -> Option<Self> {
        let event = raw.event.as_deref().filter(|e| !e.is_empty())?;
        let mut binding = Self::new(event).with_path(raw.path.as_deref().unwrap_or("/"));
        if let Some(cors) = raw.cors {
            binding = binding.with_cors(cors);
        }
        if let Some(method) = raw.method.as_deref() {
            binding = binding.with_method(method);
        }
        Some(binding)
    }
}

/// A function and the gateway events it subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEventDeclaration {
    pub function: String,
    pub bindings: Vec<EventBinding>,
}

impl FunctionEventDeclaration {
    pub fn new(function: impl Into<String>, bindings: Vec<EventBinding>) -> Self {
        Self {
            function: function.into(),
            bindings,
        }
    }
}

/// Prefix a leading `/` when missing.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub custom: CustomSection,
    #[serde(default)]
    pub functions: IndexMap<String, FunctionDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomSection {
    #[serde(default)]
    pub eventgateway: Option<GatewayBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayBlock {
    pub subdomain: Option<String>,
    pub apikey: Option<String>,
    #[serde(alias = "eventsurl")]
    pub events_url: Option<String>,
    #[serde(alias = "configurl")]
    pub config_url: Option<String>,
    #[serde(default, alias = "registerupsert")]
    pub register_upsert: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionDefinition {
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

/// An entry of a function's `events` list; only `eventgateway` entries matter here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDefinition {
    #[serde(default)]
    pub eventgateway: Option<RawBinding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBinding {
    pub event: Option<String>,
    pub path: Option<String>,
    pub cors: Option<bool>,
    pub method: Option<String>,
}

impl ServiceDescriptor {
    /// Resolve and validate the gateway block.
    pub fn gateway_config(&self) -> Result<GatewayConfig, DescriptorError> {
        let block = self
            .custom
            .eventgateway
            .as_ref()
            .ok_or(DescriptorError::MissingGatewayBlock)?;
        let subdomain = non_empty(block.subdomain.as_deref(), "subdomain")?;
        let api_key = non_empty(block.apikey.as_deref(), "apikey")?;

        let mut cfg = GatewayConfig::hosted(subdomain, api_key)?;
        if let Some(events_url) = block.events_url.as_deref() {
            cfg.events_url = parse_url("eventsUrl", events_url)?;
        }
        if let Some(config_url) = block.config_url.as_deref() {
            cfg.config_url = parse_url("configUrl", config_url)?;
        }
        cfg.register_upsert = block.register_upsert;
        Ok(cfg)
    }

    /// Every declared function with its active gateway bindings, in declaration order.
    pub fn declarations(&self) -> Vec<FunctionEventDeclaration> {
        self.functions
            .iter()
            .map(|(name, def)| {
                let bindings = def
                    .events
                    .iter()
                    .filter_map(|e| e.eventgateway.as_ref())
                    .filter_map(EventBinding::from_raw)
                    .collect();
                FunctionEventDeclaration::new(name.clone(), bindings)
            })
            .collect()
    }

    pub fn region(&self) -> &str {
        &self.provider.region
    }
}

fn non_empty<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, DescriptorError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DescriptorError::MissingField(field))
}

/// Load a descriptor file, applying `EVGATE__*` environment overrides.
pub fn load_descriptor(path: &Path) -> Result<ServiceDescriptor, DescriptorError> {
    let cfg = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("EVGATE")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;
    let descriptor: ServiceDescriptor = cfg.try_deserialize()?;
    tracing::debug!(
        path = %path.display(),
        service = descriptor.service.as_deref().unwrap_or("-"),
        functions = descriptor.functions.len(),
        "Loaded deployment descriptor"
    );
    Ok(descriptor)
}
