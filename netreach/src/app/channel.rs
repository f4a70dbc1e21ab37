// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::app::errors::AppResult;
use crate::app::services::ReachabilityProvider;

pub const NETWORK_CHANNEL: &str = "netreach/network";
pub const CHECK_NETWORK_CONNECTIVITY: &str = "checkNetworkConnectivity";

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn to_json(&self, method: &str) -> Value {
        match self {
            MethodResponse::Success(result) => json!({
                "status": "success",
                "result": result,
            }),
            MethodResponse::Error { code, message } => json!({
                "status": "error",
                "code": code,
                "message": message,
            }),
            MethodResponse::NotImplemented => json!({
                "status": "not_implemented",
                "method": method,
            }),
        }
    }
}

type Handler = Box<dyn Fn(&MethodCall) -> AppResult<Value> + Send + Sync>;

/// Named registry of method handlers. Calls to unregistered methods get
/// `MethodResponse::NotImplemented`.
pub struct MethodChannel {
    name: String,
    handlers: HashMap<String, Handler>,
}

impl MethodChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `handler` for `method`, replacing any previous one.
    pub fn register<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(&MethodCall) -> AppResult<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(method.into(), Box::new(handler));
    }

    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn invoke(&self, call: &MethodCall) -> MethodResponse {
        let Some(handler) = self.handlers.get(&call.method) else {
            tracing::debug!(channel = %self.name, method = %call.method, "method not implemented");
            return MethodResponse::NotImplemented;
        };
        match handler(call) {
            Ok(value) => MethodResponse::Success(value),
            Err(err) => {
                tracing::warn!(
                    channel = %self.name,
                    method = %call.method,
                    code = err.code(),
                    "method failed: {err}"
                );
                MethodResponse::Error {
                    code: err.code().to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Channel answering `checkNetworkConnectivity` from `provider`.
pub fn network_channel(provider: Arc<dyn ReachabilityProvider>) -> MethodChannel {
    let mut channel = MethodChannel::new(NETWORK_CHANNEL);
    channel.register(CHECK_NETWORK_CONNECTIVITY, move |_call| {
        Ok(Value::Bool(provider.is_internet_reachable()))
    });
    channel
}
