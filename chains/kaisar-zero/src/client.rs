//! Resilient HTTP invocation against the Kaisar API.
//!
//! Every task goes through [`ResilientHttpInvoker::invoke`]: one request
//! descriptor, a 412 rule and a success extractor in, a [`TaskOutcome`] out.
//! Status classification is shared by all tasks:
//!
//! | status            | effect                                   |
//! |-------------------|------------------------------------------|
//! | 200               | run the extractor; extractor failure retries |
//! | 401, 403          | stop, authentication failure             |
//! | 412               | per-endpoint: stop as "already done", or retry |
//! | anything else     | retry                                    |
//! | no response       | retry                                    |

use anyhow::Result;
use core_logic::{
    with_retry, Attempt, NetworkError, ProxyResolver, ProxyRoute, RetryPolicy, TaskOutcome,
    TerminalReason,
};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A fully formed request, minus the transport.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub bearer: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>, bearer: impl Into<String>) -> Self {
        Self::new(Method::GET, path, bearer)
    }

    pub fn post(path: impl Into<String>, bearer: impl Into<String>) -> Self {
        Self::new(Method::POST, path, bearer)
    }

    fn new(method: Method, path: impl Into<String>, bearer: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: bearer.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// How HTTP 412 is read for a given endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionRule {
    /// 412 is just another server error.
    Retry,
    /// 412 means the desired state already holds; the message is reported.
    AlreadySatisfied(String),
}

impl PreconditionRule {
    pub fn already_satisfied(message: impl Into<String>) -> Self {
        PreconditionRule::AlreadySatisfied(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Authentication,
    AlreadySatisfied(String),
    Retryable,
}

pub fn classify_status(status: u16, rule: &PreconditionRule) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        401 | 403 => StatusClass::Authentication,
        412 => match rule {
            PreconditionRule::AlreadySatisfied(message) => {
                StatusClass::AlreadySatisfied(message.clone())
            }
            PreconditionRule::Retry => StatusClass::Retryable,
        },
        _ => StatusClass::Retryable,
    }
}

/// `message` from a `{data, message}` envelope.
pub fn response_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string()
}

/// `data` from a `{data, message}` envelope.
pub fn response_data(body: &Value) -> Result<&Value> {
    match body.get("data") {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(anyhow::anyhow!("response has no data")),
    }
}

pub struct ResilientHttpInvoker {
    base_url: String,
    policy: RetryPolicy,
    proxy: Arc<dyn ProxyResolver>,
    /// One HTTP client per route (None = direct) for connection reuse
    clients: RwLock<HashMap<Option<ProxyRoute>, Client>>,
}

impl ResilientHttpInvoker {
    pub fn new(
        base_url: impl Into<String>,
        policy: RetryPolicy,
        proxy: Arc<dyn ProxyResolver>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            policy,
            proxy,
            clients: RwLock::new(HashMap::new()),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Runs `spec` under the retry policy. `extract` turns a 200 JSON body
    /// (or `Value::Null` when the body is not JSON) into the task's payload.
    pub async fn invoke<T, F>(
        &self,
        label: &str,
        spec: &RequestSpec,
        rule: &PreconditionRule,
        extract: F,
    ) -> TaskOutcome<T>
    where
        F: Fn(&Value) -> Result<T>,
    {
        let extract = &extract;
        with_retry(&self.policy, label, |attempt| {
            self.attempt(label, attempt, spec, rule, extract)
        })
        .await
    }

    async fn attempt<T, F>(
        &self,
        label: &str,
        attempt: u32,
        spec: &RequestSpec,
        rule: &PreconditionRule,
        extract: &F,
    ) -> Attempt<T>
    where
        F: Fn(&Value) -> Result<T>,
    {
        if attempt > 1 {
            info!(
                target: "task_result",
                "Retrying {} (attempt {}/{})",
                label,
                attempt,
                self.policy.max_attempts
            );
        }

        let client = match self.client_for_next_route().await {
            Ok(client) => client,
            Err(e) => {
                return Attempt::Retry(NetworkError::Transport {
                    reason: format!("proxy unavailable: {:#}", e),
                })
            }
        };

        let url = self.endpoint(&spec.path);
        let mut request = client
            .request(spec.method.clone(), &url)
            .bearer_auth(&spec.bearer);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry(NetworkError::Transport {
                    reason: e.to_string(),
                })
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => serde_json::from_str::<Value>(&text).unwrap_or(Value::Null),
            Err(e) => {
                return Attempt::Retry(NetworkError::Transport {
                    reason: e.to_string(),
                })
            }
        };
        debug!("{} {} -> {}", spec.method, url, status);

        match classify_status(status, rule) {
            StatusClass::Success => match extract(&body) {
                Ok(value) => Attempt::Done(value),
                Err(e) => Attempt::Retry(NetworkError::InvalidResponse {
                    endpoint: spec.path.clone(),
                    reason: format!("{:#}", e),
                }),
            },
            StatusClass::Authentication => {
                Attempt::Stop(TerminalReason::Authentication { status })
            }
            StatusClass::AlreadySatisfied(message) => {
                Attempt::Stop(TerminalReason::AlreadySatisfied { message })
            }
            StatusClass::Retryable => Attempt::Retry(NetworkError::Server {
                status,
                message: response_message(&body),
            }),
        }
    }

    async fn client_for_next_route(&self) -> Result<Client> {
        let route = self.proxy.resolve()?;

        if let Some(client) = self.clients.read().await.get(&route) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder();
        builder = match &route {
            Some(route) => {
                let mut proxy = reqwest::Proxy::all(route.url())?;
                if let Some((u, p)) = route.credentials() {
                    proxy = proxy.basic_auth(u, p);
                }
                builder.proxy(proxy)
            }
            // The resolver is authoritative; ignore *_PROXY env vars
            None => builder.no_proxy(),
        };
        let client = builder.build()?;

        self.clients
            .write()
            .await
            .entry(route)
            .or_insert_with(|| client.clone());
        Ok(client)
    }
}
