//! Declarative role configuration.
//!
//! This is the attribute model a user writes (and the state the provider
//! keeps after reading the role back). Every optional attribute has a serde
//! default matching the resource schema in [`crate::schema`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use esrole_core::JsonText;

/// Privileges granted on a set of indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPermission {
    pub names: BTreeSet<String>,
    pub privileges: BTreeSet<String>,
    #[serde(default)]
    pub query: JsonText,
    #[serde(default)]
    pub field_security: JsonText,
}

impl IndexPermission {
    pub fn new<N, P>(names: N, privileges: P) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            privileges: privileges.into_iter().map(Into::into).collect(),
            query: JsonText::empty_object(),
            field_security: JsonText::empty_object(),
        }
    }

    pub fn with_query(mut self, query: impl Into<JsonText>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_field_security(mut self, field_security: impl Into<JsonText>) -> Self {
        self.field_security = field_security.into();
        self
    }
}

/// Privileges granted on resources of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPrivileges {
    pub application: String,
    #[serde(default)]
    pub privileges: BTreeSet<String>,
    #[serde(default)]
    pub resources: BTreeSet<String>,
}

impl ApplicationPrivileges {
    pub fn new<P, R>(application: impl Into<String>, privileges: P, resources: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            application: application.into(),
            privileges: privileges.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }
}

/// A role as declared in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub role_name: String,
    #[serde(default)]
    pub indices: Vec<IndexPermission>,
    #[serde(default)]
    pub applications: Vec<ApplicationPrivileges>,
    #[serde(default)]
    pub cluster: BTreeSet<String>,
    #[serde(default)]
    pub global: JsonText,
    #[serde(default)]
    pub run_as: BTreeSet<String>,
    #[serde(default)]
    pub metadata: JsonText,
}

impl RoleConfig {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            ..Self::default()
        }
    }

    pub fn with_cluster<I>(mut self, privileges: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.cluster = privileges.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_index(mut self, index: IndexPermission) -> Self {
        self.indices.push(index);
        self
    }

    pub fn with_application(mut self, application: ApplicationPrivileges) -> Self {
        self.applications.push(application);
        self
    }

    pub fn with_run_as<I>(mut self, users: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.run_as = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_global(mut self, global: impl Into<JsonText>) -> Self {
        self.global = global.into();
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<JsonText>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Replace blank JSON attributes with the schema default (`{}`).
    ///
    /// Serde defaults only cover attributes that are missing; this also
    /// covers ones written as `""`.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        fill_blank(&mut self.global);
        fill_blank(&mut self.metadata);
        for index in &mut self.indices {
            fill_blank(&mut index.query);
            fill_blank(&mut index.field_security);
        }
        self
    }
}

fn fill_blank(text: &mut JsonText) {
    if text.is_blank() {
        *text = JsonText::empty_object();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_schema_defaults() {
        let cfg: RoleConfig = serde_json::from_str(
            r#"{"role_name":"r1","indices":[{"names":["idx1"],"privileges":["read"]}]}"#,
        )
        .unwrap();

        assert_eq!(cfg.role_name, "r1");
        assert_eq!(cfg.indices[0].query.as_str(), "{}");
        assert_eq!(cfg.indices[0].field_security.as_str(), "{}");
        assert_eq!(cfg.metadata.as_str(), "{}");
        assert!(cfg.applications.is_empty());
        assert!(cfg.run_as.is_empty());
    }

    #[test]
    fn with_defaults_fills_blank_json_attributes() {
        let cfg = RoleConfig::new("r")
            .with_global("")
            .with_metadata("  ")
            .with_index(IndexPermission::new(["a"], ["read"]).with_query(""))
            .with_defaults();

        assert_eq!(cfg.global.as_str(), "{}");
        assert_eq!(cfg.metadata.as_str(), "{}");
        assert_eq!(cfg.indices[0].query.as_str(), "{}");
        assert_eq!(cfg.indices[0].field_security.as_str(), "{}");
    }

    #[test]
    fn string_sets_deduplicate() {
        let cfg = RoleConfig::new("r").with_cluster(["monitor", "manage", "monitor"]);
        assert_eq!(cfg.cluster.len(), 2);
        assert_eq!(cfg.cluster.iter().next().map(String::as_str), Some("manage"));
    }

    #[test]
    fn json_attributes_compare_semantically() {
        let a = RoleConfig::new("r").with_metadata(r#"{"team":"ops","tier":1}"#);
        let b = RoleConfig::new("r").with_metadata(r#"{ "tier": 1, "team": "ops" }"#);
        assert_eq!(a, b);
    }
}
