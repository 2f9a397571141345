//! Bridge Client
//!
//! Issues management-object queries over HTTP and validates the JSON
//! envelope the bridge answers with. A usable envelope is an object with
//! a `value` field; anything else is a protocol error.

use crate::error::{GridError, Result};
use crate::query::{QueryOptions, QueryTarget};
use crate::session::SessionCache;
use crate::DEFAULT_CONTEXT;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A validated bridge response envelope
#[derive(Debug, Clone)]
pub struct BridgeResponse {
    url: String,
    envelope: Map<String, Value>,
}

impl BridgeResponse {
    /// Decode and validate a response body received from `url`
    pub fn parse(url: impl Into<String>, body: &str) -> Result<Self> {
        let url = url.into();
        let decoded: Value = match serde_json::from_str(body) {
            Ok(decoded) => decoded,
            Err(source) => return Err(GridError::InvalidJson { url, source }),
        };

        match decoded {
            Value::Object(envelope) if envelope.contains_key("value") => {
                Ok(Self { url, envelope })
            }
            Value::Object(envelope) => Err(GridError::MissingValue {
                url,
                error: envelope
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            _ => Err(GridError::MissingValue { url, error: None }),
        }
    }

    /// The management result
    pub fn value(&self) -> &Value {
        self.envelope.get("value").unwrap_or(&Value::Null)
    }

    pub fn into_value(mut self) -> Value {
        self.envelope.remove("value").unwrap_or(Value::Null)
    }

    /// The bridge's own status field, if it sent one
    pub fn status(&self) -> Option<u64> {
        self.envelope.get("status").and_then(Value::as_u64)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The whole decoded envelope
    pub fn envelope(&self) -> &Map<String, Value> {
        &self.envelope
    }
}

/// Management bridge client
///
/// Cheap to construct; the expensive state (HTTP sessions) lives in the
/// shared [`SessionCache`].
#[derive(Debug, Clone)]
pub struct BridgeClient {
    sessions: Arc<SessionCache>,
    context: String,
}

impl BridgeClient {
    /// Create a client using the default `bridge` context path
    pub fn new(sessions: Arc<SessionCache>) -> Self {
        Self::with_context(sessions, DEFAULT_CONTEXT)
    }

    /// Create a client for a bridge mounted under a different context path
    pub fn with_context(sessions: Arc<SessionCache>, context: &str) -> Self {
        Self {
            sessions,
            context: context.trim_matches('/').to_string(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Query a management object and return the validated envelope.
    ///
    /// Fails with a transport error if the host cannot be reached, and a
    /// protocol error on any status other than 200, a body that is not
    /// JSON, or an envelope without `value`. Nothing is retried.
    #[instrument(skip(self, options), fields(port = options.port, mode = %options.mode))]
    pub async fn query(
        &self,
        host: &str,
        object_path: &str,
        options: &QueryOptions,
    ) -> Result<BridgeResponse> {
        let url = QueryTarget::new(host, object_path, options).url(&self.context);
        let session = self.sessions.get_session(host)?;

        debug!(url = %url, "Querying management bridge");

        let response = match session.client().get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(GridError::Transport { url, source }),
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %url, status = status.as_u16(), "Bridge returned non-200 status");
            return Err(GridError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => return Err(GridError::Transport { url, source }),
        };

        BridgeResponse::parse(url, &body).map_err(|e| {
            warn!(error = %e, "Invalid bridge response");
            e
        })
    }

    /// Read-mode query returning only the `value` field
    pub async fn read_value(&self, host: &str, object_path: &str, port: u16) -> Result<Value> {
        self.query(host, object_path, &QueryOptions::with_port(port))
            .await
            .map(BridgeResponse::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const URL: &str = "http://node1:8778/bridge/read/GemFire:type=Member";

    #[test]
    fn test_parse_valid_envelope() {
        let body = r#"{"request":{"type":"read"},"value":{"MemberCount":5},"status":200}"#;
        let response = BridgeResponse::parse(URL, body).unwrap();

        assert_eq!(response.value()["MemberCount"], 5);
        assert_eq!(response.status(), Some(200));
        assert_eq!(response.url(), URL);
        assert!(response.envelope().contains_key("request"));
    }

    #[test]
    fn test_parse_empty_value_is_success() {
        let response = BridgeResponse::parse(URL, r#"{"value":{}}"#).unwrap();
        assert!(response.value().as_object().unwrap().is_empty());
        assert_eq!(response.status(), None);
    }

    #[test]
    fn test_parse_null_value_is_success() {
        let response = BridgeResponse::parse(URL, r#"{"value":null}"#).unwrap();
        assert!(response.into_value().is_null());
    }

    #[test]
    fn test_parse_missing_value() {
        let body = r#"{"status":404,"error":"javax.management.InstanceNotFoundException : GemFire:type=Member"}"#;
        let err = BridgeResponse::parse(URL, body).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.url(), Some(URL));
        match err {
            GridError::MissingValue { error, .. } => {
                assert!(error.unwrap().starts_with("javax.management.InstanceNotFoundException"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_value_regardless_of_other_fields() {
        let body = r#"{"status":200,"timestamp":1700000000,"request":{"mbean":"x"},"values":{}}"#;
        let err = BridgeResponse::parse(URL, body).unwrap_err();
        assert!(matches!(err, GridError::MissingValue { error: None, .. }));
    }

    #[test]
    fn test_parse_non_object_body() {
        let err = BridgeResponse::parse(URL, "[1, 2, 3]").unwrap_err();
        assert!(matches!(err, GridError::MissingValue { .. }));
        assert!(err.is_protocol());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = BridgeResponse::parse(URL, "<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, GridError::InvalidJson { .. }));
        assert!(err.is_protocol());
    }

    #[test]
    fn test_context_is_trimmed() {
        let client = BridgeClient::with_context(Arc::new(SessionCache::new()), "/jolokia/");
        assert_eq!(client.context(), "jolokia");

        let client = BridgeClient::new(Arc::new(SessionCache::new()));
        assert_eq!(client.context(), "bridge");
    }
}
