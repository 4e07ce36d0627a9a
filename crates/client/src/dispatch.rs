//! Version dispatch for role operations.
//!
//! The provider is handed one client per configured cluster. Which role API
//! that client speaks is fixed when it is built (from configuration or by
//! probing `GET /`), and every operation is routed with an exhaustive match.
//! Adding or removing a version is therefore a compile-time change.
//!
//! ## Outcomes per variant
//!
//! | variant | put / get / delete |
//! |---------|--------------------|
//! | `V7` | `/_security/role/{name}` |
//! | `V6` | `/_xpack/security/role/{name}` |
//! | `V5` | always `Unsupported(v5)` |
//! | `Unrecognized` | always `UnhandledClientType` |
//!
//! Both failure cases are fatal; nothing here retries.

use std::sync::Arc;

use serde::Deserialize;

use esrole_core::{ApiVersion, ProviderError, ProviderResult, RoleName, parse_major};
use esrole_model::SecurityRole;

use crate::config::ClientConfig;
use crate::http::HttpTransport;
use crate::transport::{Method, Request, Transport};
use crate::versions::{V5Client, V6Client, V7Client};

#[derive(Debug, Clone)]
pub enum ClusterClient {
    V5(V5Client),
    V6(V6Client),
    V7(V7Client),
    /// A handle for a cluster none of the versioned clients speak; the
    /// string describes what was found (e.g. `"elasticsearch 8.11.1"`).
    Unrecognized(String),
}

#[derive(Debug, Deserialize)]
struct RootInfo {
    version: RootVersion,
}

#[derive(Debug, Deserialize)]
struct RootVersion {
    number: String,
}

impl ClusterClient {
    pub fn for_api(version: ApiVersion, transport: Arc<dyn Transport>) -> Self {
        match version {
            ApiVersion::V5 => Self::V5(V5Client::new()),
            ApiVersion::V6 => Self::V6(V6Client::new(transport)),
            ApiVersion::V7 => Self::V7(V7Client::new(transport)),
        }
    }

    /// Select the client for a version string such as `"7"` or `"6.8.23"`.
    ///
    /// Majors without a client produce [`ClusterClient::Unrecognized`];
    /// a string without a numeric major is a configuration error.
    pub fn for_version(version: &str, transport: Arc<dyn Transport>) -> ProviderResult<Self> {
        let major = parse_major(version)?;
        Ok(match ApiVersion::from_major(major) {
            Some(api) => Self::for_api(api, transport),
            None => Self::Unrecognized(format!("elasticsearch {version}")),
        })
    }

    /// Ask the cluster which version it runs and pick the matching client.
    pub fn probe(transport: Arc<dyn Transport>) -> ProviderResult<Self> {
        let response = transport.send(&Request::new(Method::Get, Vec::<String>::new()))?;
        if !response.is_success() {
            return Err(ProviderError::transport(format!(
                "version probe returned status {}",
                response.status
            )));
        }

        let info: RootInfo = serde_json::from_str(&response.body)
            .map_err(|e| ProviderError::serialization(format!("version probe response: {e}")))?;
        tracing::info!(version = %info.version.number, "probed elasticsearch version");

        Self::for_version(&info.version.number, transport)
    }

    /// Build an HTTP-backed client from configuration.
    pub fn connect(config: &ClientConfig) -> ProviderResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        match &config.version {
            Some(version) => Self::for_version(version, transport),
            None => Self::probe(transport),
        }
    }

    pub fn api_version(&self) -> Option<ApiVersion> {
        match self {
            Self::V5(_) => Some(ApiVersion::V5),
            Self::V6(_) => Some(ApiVersion::V6),
            Self::V7(_) => Some(ApiVersion::V7),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn put_role(&self, name: &RoleName, body: &str) -> ProviderResult<()> {
        match self {
            Self::V7(client) => client.put_role(name, body),
            Self::V6(client) => client.put_role(name, body),
            Self::V5(client) => client.put_role(name, body),
            Self::Unrecognized(kind) => Err(ProviderError::unhandled_client(kind.as_str())),
        }
    }

    pub fn get_role(&self, name: &RoleName) -> ProviderResult<SecurityRole> {
        match self {
            Self::V7(client) => client.get_role(name),
            Self::V6(client) => client.get_role(name),
            Self::V5(client) => client.get_role(name),
            Self::Unrecognized(kind) => Err(ProviderError::unhandled_client(kind.as_str())),
        }
    }

    pub fn delete_role(&self, name: &RoleName) -> ProviderResult<()> {
        match self {
            Self::V7(client) => client.delete_role(name),
            Self::V6(client) => client.delete_role(name),
            Self::V5(client) => client.delete_role(name),
            Self::Unrecognized(kind) => Err(ProviderError::unhandled_client(kind.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryCluster;

    fn role(name: &str) -> RoleName {
        RoleName::new(name).unwrap()
    }

    #[test]
    fn probe_selects_client_by_major_version() {
        let cases = [
            ("5.6.16", Some(ApiVersion::V5)),
            ("6.8.23", Some(ApiVersion::V6)),
            ("7.17.0", Some(ApiVersion::V7)),
            ("8.11.1", None),
        ];
        for (version, expected) in cases {
            let cluster = Arc::new(InMemoryCluster::new(version));
            let client = ClusterClient::probe(cluster).unwrap();
            assert_eq!(client.api_version(), expected, "version {version}");
        }
    }

    #[test]
    fn probe_failure_is_reported() {
        let cluster = Arc::new(InMemoryCluster::new("7.17.0"));
        cluster.fail_next(503);
        assert!(matches!(
            ClusterClient::probe(cluster),
            Err(ProviderError::Transport(_))
        ));
    }

    #[test]
    fn unrecognized_client_fails_every_operation() {
        let cluster = Arc::new(InMemoryCluster::new("8.11.1"));
        let client = ClusterClient::for_version("8.11.1", cluster.clone()).unwrap();
        let name = role("r");

        let errors = [
            client.put_role(&name, "{}").unwrap_err(),
            client.get_role(&name).map(|_| ()).unwrap_err(),
            client.delete_role(&name).unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, ProviderError::UnhandledClientType(_)), "{err}");
        }
        assert!(cluster.requests().is_empty());
    }

    #[test]
    fn v6_and_v7_use_their_own_paths() {
        for (version, prefix) in [("6.8.23", "/_xpack/security/role/r"), ("7.17.0", "/_security/role/r")] {
            let cluster = Arc::new(InMemoryCluster::new(version));
            let client = ClusterClient::for_version(version, cluster.clone()).unwrap();
            client.put_role(&role("r"), r#"{"cluster":["monitor"]}"#).unwrap();
            client.get_role(&role("r")).unwrap();
            client.delete_role(&role("r")).unwrap();

            let paths: Vec<String> = cluster.requests().iter().map(Request::path).collect();
            assert_eq!(paths, vec![prefix, prefix, prefix]);
        }
    }

    #[test]
    fn missing_role_is_not_found_for_get_and_delete() {
        let cluster = Arc::new(InMemoryCluster::new("7.17.0"));
        let client = ClusterClient::for_api(ApiVersion::V7, cluster);
        assert!(client.get_role(&role("ghost")).unwrap_err().is_not_found());
        assert!(client.delete_role(&role("ghost")).unwrap_err().is_not_found());
    }

    #[test]
    fn cluster_errors_carry_status_and_reason() {
        let cluster = Arc::new(InMemoryCluster::new("6.8.23"));
        cluster.fail_next(500);
        let client = ClusterClient::for_api(ApiVersion::V6, cluster);
        let err = client.put_role(&role("r"), "{}").unwrap_err();
        assert_eq!(
            err,
            ProviderError::Cluster {
                version: ApiVersion::V6,
                status: 500,
                reason: "injected status 500".to_string(),
            }
        );
    }

    #[test]
    fn garbage_version_is_a_config_error() {
        let cluster = Arc::new(InMemoryCluster::new("7.17.0"));
        assert!(matches!(
            ClusterClient::for_version("latest", cluster),
            Err(ProviderError::Config(_))
        ));
    }
}
