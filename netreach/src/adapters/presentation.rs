// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use serde_json::Value;

use crate::app::channel::MethodResponse;

pub const EXIT_CODE_OK: i32 = 0;
pub const EXIT_CODE_OTHER: i32 = 1;
pub const EXIT_CODE_USAGE: i32 = 2;

/// Text for stdout (if any), text for stderr (if any) and the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: i32,
}

pub fn render(method: &str, response: &MethodResponse, json: bool) -> Rendered {
    let exit_code = match response {
        MethodResponse::Success(_) => EXIT_CODE_OK,
        MethodResponse::Error { .. } => EXIT_CODE_OTHER,
        MethodResponse::NotImplemented => EXIT_CODE_USAGE,
    };
    if json {
        return Rendered {
            stdout: Some(response.to_json(method).to_string()),
            stderr: None,
            exit_code,
        };
    }
    match response {
        MethodResponse::Success(value) => Rendered {
            stdout: Some(format_value(value)),
            stderr: None,
            exit_code,
        },
        MethodResponse::Error { code, message } => Rendered {
            stdout: None,
            stderr: Some(format!("error[{code}]: {message}")),
            exit_code,
        },
        MethodResponse::NotImplemented => Rendered {
            stdout: None,
            stderr: Some(format!("method '{method}' is not implemented")),
            exit_code,
        },
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
