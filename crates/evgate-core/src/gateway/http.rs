use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{GatewayClient, ProviderSpec, SubscriptionSpec};
use crate::arn::FunctionId;
use crate::descriptor::GatewayConfig;
use crate::error::GatewayError;

/// Gateway adapter speaking the configuration and events HTTP APIs.
pub struct HttpGatewayClient {
    http: reqwest::Client,
    config_url: Url,
    events_url: Url,
    api_key: String,
    register_upsert: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionBody<'a> {
    function_id: &'a FunctionId,
    provider: &'a ProviderSpec,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResponse {
    subscription_id: String,
}

impl HttpGatewayClient {
    /// The API key is passed explicitly; nothing is read from the environment.
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            http,
            config_url: config.config_url.clone(),
            events_url: config.events_url.clone(),
            api_key: config.api_key.clone(),
            register_upsert: config.register_upsert,
        }
    }

    fn config_endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.config_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Transport(format!("invalid configuration URL {}", self.config_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn register_function(
        &self,
        id: &FunctionId,
        provider: &ProviderSpec,
    ) -> Result<(), GatewayError> {
        let url = self.config_endpoint(&["v1", "functions"])?;
        let resp = self
            .request(Method::POST, url)
            .json(&FunctionBody {
                function_id: id,
                provider,
            })
            .send()
            .await?;
        check_status(resp).await.map(drop)
    }

    async fn update_function(
        &self,
        id: &FunctionId,
        provider: &ProviderSpec,
    ) -> Result<(), GatewayError> {
        let url = self.config_endpoint(&["v1", "functions", id.as_str()])?;
        let resp = self
            .request(Method::PUT, url)
            .json(&FunctionBody {
                function_id: id,
                provider,
            })
            .send()
            .await?;
        check_status(resp).await.map(drop)
    }

    async fn delete_function(&self, id: &FunctionId) -> Result<(), GatewayError> {
        let url = self.config_endpoint(&["v1", "functions", id.as_str()])?;
        let resp = self.request(Method::DELETE, url).send().await?;
        check_status(resp).await.map(drop)
    }

    async fn subscribe(&self, spec: &SubscriptionSpec) -> Result<String, GatewayError> {
        let url = self.config_endpoint(&["v1", "subscriptions"])?;
        let resp = self.request(Method::POST, url).json(spec).send().await?;
        let body = check_status(resp).await?;
        let parsed: SubscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(format!("subscribe: {e}")))?;
        Ok(parsed.subscription_id)
    }

    async fn unsubscribe(&self, subscription_id: &str) -> Result<(), GatewayError> {
        // Subscription ids contain '/' and ',' and must stay one path segment.
        let url = self.config_endpoint(&["v1", "subscriptions", subscription_id])?;
        let resp = self.request(Method::DELETE, url).send().await?;
        check_status(resp).await.map(drop)
    }

    async fn emit(&self, event: &str, data: &Value) -> Result<(), GatewayError> {
        let resp = self
            .http
            .post(self.events_url.clone())
            .header("Event", event)
            .json(data)
            .send()
            .await?;
        check_status(resp).await.map(drop)
    }

    fn register_is_upsert(&self) -> bool {
        self.register_upsert
    }
}

/// Map the status to a gateway error, returning the body on success.
async fn check_status(resp: Response) -> Result<String, GatewayError> {
    let status = resp.status();
    let body = resp.text().await?;

    match status {
        s if s.is_success() => Ok(body),
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
        StatusCode::CONFLICT => Err(GatewayError::AlreadyExists),
        s => Err(GatewayError::Http {
            status: s.as_u16(),
            body: error_message(&body),
        }),
    }
}

/// Prefer the gateway's `{"errors":[{"message":..}]}` text over the raw body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(errors) = json.get("errors").and_then(|v| v.as_array())
    {
        let msgs: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
            .collect();
        if !msgs.is_empty() {
            return msgs.join("; ");
        }
    }
    body.to_string()
}
