use std::collections::{BTreeMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value as JsonValue, json};

use esrole_core::{ApiVersion, ProviderResult, parse_major};

use crate::transport::{Method, Request, Response, Transport};
use crate::versions::{V6_ROLE_PATH, V7_ROLE_PATH};

/// In-memory stand-in for a cluster's role API.
///
/// Intended for tests/dev. Mimics the parts of the wire behavior the provider
/// depends on:
///
/// - `GET /` reports the configured version.
/// - Roles are served only under the path of the cluster's major version.
/// - Index `query` values are stored and returned as strings.
/// - `metadata` is always returned (default `{}`); `global` only when set.
/// - Missing roles answer 404 on GET and DELETE.
#[derive(Debug)]
pub struct InMemoryCluster {
    version: String,
    roles: RwLock<BTreeMap<String, JsonValue>>,
    requests: RwLock<Vec<Request>>,
    /// Scripted outcomes for upcoming requests; `None` lets one through.
    failures: RwLock<VecDeque<Option<u16>>>,
}

impl InMemoryCluster {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            roles: RwLock::new(BTreeMap::new()),
            requests: RwLock::new(Vec::new()),
            failures: RwLock::new(VecDeque::new()),
        }
    }

    /// Answer the next request with `status` instead of handling it.
    pub fn fail_next(&self, status: u16) {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Some(status));
    }

    /// Let `passes` requests through, then answer the next one with `status`.
    pub fn fail_after(&self, passes: usize, status: u16) {
        let mut failures = self.failures.write().unwrap_or_else(PoisonError::into_inner);
        failures.extend(std::iter::repeat_n(None, passes));
        failures.push_back(Some(status));
    }

    /// Store a role body exactly as given, bypassing request normalization.
    pub fn insert_raw(&self, name: impl Into<String>, body: JsonValue) {
        self.roles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), body);
    }

    /// Stored body of a role.
    pub fn role(&self, name: &str) -> Option<JsonValue> {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn role_path(&self) -> Option<&'static [&'static str]> {
        let major = parse_major(&self.version).ok()?;
        match ApiVersion::from_major(major)? {
            ApiVersion::V5 => None,
            ApiVersion::V6 => Some(V6_ROLE_PATH),
            ApiVersion::V7 => Some(V7_ROLE_PATH),
        }
    }

    /// Role name addressed by the request, if it targets the role API.
    fn addressed_role<'a>(&self, request: &'a Request) -> Option<&'a str> {
        let path = self.role_path()?;
        let (name, prefix) = request.segments.split_last()?;
        (prefix.iter().map(String::as_str).eq(path.iter().copied())).then_some(name.as_str())
    }

    fn handle(&self, request: &Request) -> Response {
        if request.segments.is_empty() && request.method == Method::Get {
            return ok(json!({
                "name": "in-memory",
                "cluster_name": "in-memory",
                "version": { "number": self.version },
                "tagline": "You Know, for Search"
            }));
        }

        let Some(name) = self.addressed_role(request) else {
            return error(400, "invalid_request", format!("no handler found for uri [{}]", request.path()));
        };

        match request.method {
            Method::Put => self.put(name, request.body.as_deref().unwrap_or_default()),
            Method::Get => self.get(name),
            Method::Delete => self.delete(name),
        }
    }

    fn put(&self, name: &str, body: &str) -> Response {
        let mut role = match serde_json::from_str::<JsonValue>(body) {
            Ok(JsonValue::Object(map)) => map,
            Ok(_) => return error(400, "parse_exception", "role body must be an object"),
            Err(e) => return error(400, "parse_exception", e.to_string()),
        };

        if let Some(JsonValue::Array(indices)) = role.get_mut("indices") {
            for index in indices.iter_mut().filter_map(JsonValue::as_object_mut) {
                if let Some(query) = index.get_mut("query") {
                    if !query.is_string() {
                        *query = JsonValue::String(query.to_string());
                    }
                }
            }
        }

        let mut roles = self.roles.write().unwrap_or_else(PoisonError::into_inner);
        let created = roles.insert(name.to_string(), JsonValue::Object(role)).is_none();
        ok(json!({ "role": { "created": created } }))
    }

    fn get(&self, name: &str) -> Response {
        let roles = self.roles.read().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = roles.get(name) else {
            return Response::new(404, "{}");
        };

        let mut rendered = stored.as_object().cloned().unwrap_or_default();
        for key in ["cluster", "indices", "applications", "run_as"] {
            rendered.entry(key).or_insert_with(|| json!([]));
        }
        rendered.entry("metadata").or_insert_with(|| json!({}));
        rendered
            .entry("transient_metadata")
            .or_insert_with(|| json!({ "enabled": true }));

        let mut body = Map::new();
        body.insert(name.to_string(), JsonValue::Object(rendered));
        ok(JsonValue::Object(body))
    }

    fn delete(&self, name: &str) -> Response {
        let removed = self
            .roles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some();
        if removed {
            ok(json!({ "found": true }))
        } else {
            Response::new(404, json!({ "found": false }).to_string())
        }
    }
}

impl Transport for InMemoryCluster {
    fn send(&self, request: &Request) -> ProviderResult<Response> {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let injected = self
            .failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten();
        if let Some(status) = injected {
            return Ok(error(status, "injected_failure", format!("injected status {status}")));
        }

        Ok(self.handle(request))
    }
}

fn ok(body: JsonValue) -> Response {
    Response::new(200, body.to_string())
}

fn error(status: u16, kind: &str, reason: impl Into<String>) -> Response {
    let body = json!({
        "error": { "type": kind, "reason": reason.into() },
        "status": status,
    });
    Response::new(status, body.to_string())
}
