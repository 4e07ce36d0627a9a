//! Per-version role API clients.
//!
//! - v7 serves roles under `/_security/role/{name}`.
//! - v6 serves them under `/_xpack/security/role/{name}`.
//! - v5 clients predate role management; every call fails with
//!   [`ProviderError::Unsupported`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use esrole_core::{ApiVersion, JsonText, NOT_FOUND_STATUS, ProviderError, ProviderResult, RoleName};
use esrole_model::{SecurityApplicationPrivileges, SecurityIndicesPermissions, SecurityRole};

use crate::transport::{Method, Request, Response, Transport};

pub const V6_ROLE_PATH: &[&str] = &["_xpack", "security", "role"];
pub const V7_ROLE_PATH: &[&str] = &["_security", "role"];

/// Role entry as the cluster returns it from a get-role call.
#[derive(Debug, Deserialize)]
struct ClusterRole {
    #[serde(default)]
    cluster: Vec<String>,
    #[serde(default)]
    indices: Vec<ClusterIndices>,
    #[serde(default)]
    applications: Vec<SecurityApplicationPrivileges>,
    #[serde(default)]
    run_as: Vec<String>,
    #[serde(default)]
    global: Option<JsonValue>,
    #[serde(default)]
    metadata: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct ClusterIndices {
    names: Vec<String>,
    privileges: Vec<String>,
    #[serde(default)]
    field_security: Option<JsonValue>,
    #[serde(default)]
    query: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured { reason: String },
    Plain(String),
}

/// Shared implementation of the security role endpoints.
#[derive(Clone)]
struct SecurityApi {
    transport: Arc<dyn Transport>,
    version: ApiVersion,
    role_path: &'static [&'static str],
}

impl core::fmt::Debug for SecurityApi {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecurityApi")
            .field("version", &self.version)
            .field("role_path", &self.role_path)
            .finish_non_exhaustive()
    }
}

impl SecurityApi {
    fn request(&self, method: Method, name: &RoleName) -> Request {
        let segments = self
            .role_path
            .iter()
            .map(|s| (*s).to_string())
            .chain(std::iter::once(name.as_str().to_string()));
        Request::new(method, segments)
    }

    fn check(&self, response: Response) -> ProviderResult<Response> {
        if response.is_success() {
            return Ok(response);
        }
        Err(ProviderError::Cluster {
            version: self.version,
            status: response.status,
            reason: error_reason(&response.body),
        })
    }

    fn put_role(&self, name: &RoleName, body: &str) -> ProviderResult<()> {
        let request = self.request(Method::Put, name).with_body(body);
        let result = self.transport.send(&request).and_then(|r| self.check(r));
        if let Err(e) = &result {
            tracing::info!(role = %name, version = %self.version, error = %e, "put role failed");
        }
        result.map(|_| ())
    }

    fn get_role(&self, name: &RoleName) -> ProviderResult<SecurityRole> {
        let response = self.check(self.transport.send(&self.request(Method::Get, name))?)?;

        let mut roles: HashMap<String, ClusterRole> = serde_json::from_str(&response.body)
            .map_err(|e| ProviderError::serialization(format!("get role response: {e}")))?;

        let role = roles.remove(name.as_str()).ok_or_else(|| ProviderError::Cluster {
            version: self.version,
            status: NOT_FOUND_STATUS,
            reason: format!("role [{name}] missing from response"),
        })?;

        Ok(normalize_role(name, role))
    }

    fn delete_role(&self, name: &RoleName) -> ProviderResult<()> {
        let response = self.transport.send(&self.request(Method::Delete, name))?;
        self.check(response).map(|_| ())
    }
}

/// Re-encode the cluster's JSON values as the text form the read document uses.
///
/// The cluster omits `global` for roles without a global restriction but
/// always returns `metadata`, so the two absent cases normalize differently.
fn normalize_role(name: &RoleName, role: ClusterRole) -> SecurityRole {
    SecurityRole {
        name: name.as_str().to_string(),
        cluster: role.cluster,
        indices: role
            .indices
            .into_iter()
            .map(|index| SecurityIndicesPermissions {
                names: index.names,
                privileges: index.privileges,
                field_security: index_json_text(index.field_security.as_ref()),
                query: index_json_text(index.query.as_ref()),
            })
            .collect(),
        applications: role.applications,
        run_as: role.run_as,
        global: match role.global.as_ref() {
            None | Some(JsonValue::Null) => JsonText::blank(),
            Some(value) => JsonText::from_value(value),
        },
        metadata: match role.metadata.as_ref() {
            None | Some(JsonValue::Null) => JsonText::empty_object(),
            Some(value) => JsonText::from_value(value),
        },
    }
}

/// The cluster returns `query` as the string it was given; other values are re-encoded.
fn index_json_text(value: Option<&JsonValue>) -> JsonText {
    match value {
        None | Some(JsonValue::Null) => JsonText::empty_object(),
        Some(JsonValue::String(text)) => JsonText::new(text.as_str()),
        Some(other) => JsonText::from_value(other),
    }
}

fn error_reason(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorDetail::Structured { reason } | ErrorDetail::Plain(reason),
        }) => reason,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Client for clusters speaking the 5.x API.
#[derive(Debug, Clone, Default)]
pub struct V5Client;

impl V5Client {
    pub fn new() -> Self {
        Self
    }

    pub fn put_role(&self, _name: &RoleName, _body: &str) -> ProviderResult<()> {
        Err(ProviderError::Unsupported(ApiVersion::V5))
    }

    pub fn get_role(&self, _name: &RoleName) -> ProviderResult<SecurityRole> {
        Err(ProviderError::Unsupported(ApiVersion::V5))
    }

    pub fn delete_role(&self, _name: &RoleName) -> ProviderResult<()> {
        Err(ProviderError::Unsupported(ApiVersion::V5))
    }
}

macro_rules! security_client {
    ($(#[$doc:meta])* $name:ident, $version:expr, $path:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name(SecurityApi);

        impl $name {
            pub fn new(transport: Arc<dyn Transport>) -> Self {
                Self(SecurityApi {
                    transport,
                    version: $version,
                    role_path: $path,
                })
            }

            pub fn put_role(&self, name: &RoleName, body: &str) -> ProviderResult<()> {
                self.0.put_role(name, body)
            }

            pub fn get_role(&self, name: &RoleName) -> ProviderResult<SecurityRole> {
                self.0.get_role(name)
            }

            pub fn delete_role(&self, name: &RoleName) -> ProviderResult<()> {
                self.0.delete_role(name)
            }
        }
    };
}

security_client!(
    /// Client for clusters speaking the 6.x (X-Pack) API.
    V6Client,
    ApiVersion::V6,
    V6_ROLE_PATH
);

security_client!(
    /// Client for clusters speaking the 7.x API.
    V7Client,
    ApiVersion::V7,
    V7_ROLE_PATH
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn role(name: &str) -> RoleName {
        RoleName::new(name).unwrap()
    }

    fn parse(body: JsonValue) -> ClusterRole {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn missing_global_normalizes_to_blank() {
        let normalized = normalize_role(&role("r"), parse(json!({"cluster": ["monitor"], "metadata": {}})));
        assert_eq!(normalized.global.as_str(), "");
        assert_eq!(normalized.metadata.as_str(), "{}");
    }

    #[test]
    fn empty_global_normalizes_to_empty_object_text() {
        let normalized = normalize_role(&role("r"), parse(json!({"global": {}, "metadata": {}})));
        assert_eq!(normalized.global.as_str(), "{}");
    }

    #[test]
    fn null_global_normalizes_to_blank() {
        let normalized = normalize_role(&role("r"), parse(json!({"global": null})));
        assert_eq!(normalized.global.as_str(), "");
    }

    #[test]
    fn index_query_strings_are_kept_verbatim() {
        let normalized = normalize_role(
            &role("r"),
            parse(json!({
                "indices": [{
                    "names": ["logs"],
                    "privileges": ["read"],
                    "query": "{\"term\": {\"team\": \"ops\"}}",
                    "field_security": {"grant": ["*"], "except": []},
                    "allow_restricted_indices": false
                }]
            })),
        );

        let index = &normalized.indices[0];
        assert_eq!(index.query.as_str(), "{\"term\": {\"team\": \"ops\"}}");
        assert_eq!(index.field_security, JsonText::new(r#"{"except":[],"grant":["*"]}"#));
    }

    #[test]
    fn absent_index_json_defaults_to_empty_object() {
        let normalized = normalize_role(
            &role("r"),
            parse(json!({"indices": [{"names": ["a"], "privileges": ["all"]}]})),
        );
        assert_eq!(normalized.indices[0].query.as_str(), "{}");
        assert_eq!(normalized.indices[0].field_security.as_str(), "{}");
    }

    #[test]
    fn error_reason_prefers_structured_reason() {
        assert_eq!(
            error_reason(r#"{"error":{"type":"security_exception","reason":"action denied"},"status":403}"#),
            "action denied"
        );
        assert_eq!(error_reason(r#"{"error":"no handler found"}"#), "no handler found");
        assert_eq!(error_reason("gateway timeout"), "gateway timeout");
        assert_eq!(error_reason(""), "empty response body");
    }

    #[test]
    fn v5_rejects_every_operation() {
        let client = V5Client::new();
        let name = role("r");
        for err in [
            client.put_role(&name, "{}").unwrap_err(),
            client.get_role(&name).map(|_| ()).unwrap_err(),
            client.delete_role(&name).unwrap_err(),
        ] {
            assert_eq!(err, ProviderError::Unsupported(ApiVersion::V5));
        }
    }
}
