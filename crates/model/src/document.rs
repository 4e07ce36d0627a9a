//! Wire documents exchanged with the cluster's role API.
//!
//! `PutRole*` types are what the write endpoint receives. Empty collections
//! and absent JSON values are skipped during serialization: sending an empty
//! `indices` or `metadata` key would overwrite server-side defaults.
//!
//! `SecurityRole*` types are the normalized read document. The opaque JSON
//! attributes are already text here; the client layer does the re-encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use esrole_core::JsonText;

/// Body of a put-role request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutRoleBody {
    pub cluster: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<PutRoleApplicationPrivileges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<PutRoleIndicesPermissions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run_as: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRoleApplicationPrivileges {
    pub application: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutRoleIndicesPermissions {
    pub names: Vec<String>,
    pub privileges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_security: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<JsonValue>,
}

/// A role as read back from the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRole {
    pub name: String,
    #[serde(default)]
    pub cluster: Vec<String>,
    #[serde(default)]
    pub indices: Vec<SecurityIndicesPermissions>,
    #[serde(default)]
    pub applications: Vec<SecurityApplicationPrivileges>,
    #[serde(default)]
    pub run_as: Vec<String>,
    /// Blank when the cluster did not return a `global` key.
    #[serde(default = "JsonText::blank")]
    pub global: JsonText,
    #[serde(default)]
    pub metadata: JsonText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIndicesPermissions {
    pub names: Vec<String>,
    pub privileges: Vec<String>,
    #[serde(default)]
    pub field_security: JsonText,
    #[serde(default)]
    pub query: JsonText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityApplicationPrivileges {
    pub application: String,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_only_carries_cluster() {
        let body = PutRoleBody::default();
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"cluster": []}));
    }

    #[test]
    fn application_without_privileges_omits_keys() {
        let app = PutRoleApplicationPrivileges {
            application: "kibana-.kibana".to_string(),
            privileges: vec![],
            resources: vec![],
        };
        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            json!({"application": "kibana-.kibana"})
        );
    }

    #[test]
    fn read_document_defaults_missing_global_to_blank() {
        let role: SecurityRole = serde_json::from_str(r#"{"name":"r"}"#).unwrap();
        assert!(role.global.is_blank());
        assert_eq!(role.metadata.as_str(), "{}");
    }
}
