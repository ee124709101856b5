//! Turns raw HTTP exchanges into unwrapped payloads or typed errors.
//!
//! Every payload arrives wrapped as `{"meta": {...}, "response": ...}`; only
//! the `response` part is handed back to callers.

use reqwest::header::{HeaderMap, CONTENT_LOCATION, LOCATION};
use serde_json::{json, Map, Value};

use crate::{Error, Result, STATUS_UNAUTHORIZED};

/// Endpoint whose answer is a redirect to an image rather than JSON.
pub const AVATAR_ENDPOINT: &str = "avatar";

const DEFAULT_ERROR_MESSAGE: &str = "There was an error making your request.";

/// Status, headers and body of a finished exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn read(response: reqwest::blocking::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Statuses treated as success. 301 is let through on purpose.
pub fn is_success(status: u16) -> bool {
    (200..=301).contains(&status)
}

/// Maps one response of `endpoint` to its payload.
///
/// # Errors
///
/// * 401 always yields [`Error::Auth`], whatever the body holds.
/// * Avatar responses without a `Location` header fail.
/// * Undecodable JSON, non-object envelopes and statuses outside
///   `200..=301` fail; 503 surfaces as [`Error::RateLimit`].
pub fn normalize(status: u16, headers: &HeaderMap, body: &[u8], endpoint: &str) -> Result<Value> {
    if status == STATUS_UNAUTHORIZED {
        return Err(Error::from_status(
            format!(
                "Error: {}, Message: {}",
                status,
                String::from_utf8_lossy(body)
            ),
            status,
        ));
    }

    if endpoint == AVATAR_ENDPOINT {
        if let Some(url) = avatar_url(headers) {
            return Ok(json!({ "url": url }));
        }
        if is_success(status) {
            return Err(Error::generic("Unable to get avatar url"));
        }
        let message = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(envelope)) => {
                let payload = envelope.get("response").cloned().unwrap_or(Value::Null);
                error_message(&payload, &envelope)
            }
            _ => None,
        }
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        log::warn!("avatar request failed with {}: {}", status, message);
        return Err(Error::from_status(message, status));
    }

    let content: Value = match serde_json::from_slice(body) {
        Ok(content) => content,
        Err(err) => {
            log::debug!("undecodable body ({}) with status {}", err, status);
            let message = "Unable to parse response, invalid JSON.";
            return Err(if is_success(status) {
                Error::generic(message)
            } else {
                Error::from_status(message, status)
            });
        }
    };

    let envelope = match content {
        Value::Object(envelope) => envelope,
        other => {
            return Err(Error::generic(format!(
                "Unable to parse response, invalid content returned: {}",
                other
            )))
        }
    };

    let payload = envelope
        .get("response")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    if !is_success(status) {
        let message = error_message(&payload, &envelope)
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        log::warn!("request failed with {}: {}", status, message);
        return Err(Error::from_status(message, status));
    }

    Ok(payload)
}

fn avatar_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .or_else(|| headers.get(CONTENT_LOCATION))
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Collects `errors` (joined by spaces) or `error` from the payload, then
/// from the envelope itself, then `meta.msg`.
fn error_message(payload: &Value, envelope: &Map<String, Value>) -> Option<String> {
    payload
        .as_object()
        .and_then(errors_of)
        .or_else(|| errors_of(envelope))
        .or_else(|| {
            envelope
                .get("meta")
                .and_then(|meta| meta.get("msg"))
                .and_then(Value::as_str)
                .filter(|msg| !msg.is_empty())
                .map(str::to_string)
        })
}

fn errors_of(object: &Map<String, Value>) -> Option<String> {
    if let Some(Value::Array(errors)) = object.get("errors") {
        let joined = errors
            .iter()
            .map(render_error)
            .filter(|e| !e.is_empty())
            .collect::<Vec<String>>()
            .join(" ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    match object.get("error") {
        Some(Value::String(error)) if !error.is_empty() => Some(error.clone()),
        _ => None,
    }
}

fn render_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        // the v2 API sends {"title": ..., "code": ..., "detail": ...}
        Value::Object(fields) => fields
            .get("detail")
            .or_else(|| fields.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
