//! Translation between the declarative role and the wire documents.
//!
//! ```text
//! RoleConfig ──build_write_document──▶ PutRoleBody ──encode──▶ JSON text ──▶ PUT
//! RoleConfig ◀──populate_config────── SecurityRole ◀── (client normalizes) ◀── GET
//! ```
//!
//! Both directions are pure. The document is rebuilt from configuration on
//! every write; nothing is cached between calls.

use esrole_core::{JsonText, ProviderError, ProviderResult, RoleName};

use crate::config::{ApplicationPrivileges, IndexPermission, RoleConfig};
use crate::document::{
    PutRoleApplicationPrivileges, PutRoleBody, PutRoleIndicesPermissions, SecurityRole,
};

/// Build the put-role document for a declared role.
///
/// Fails with [`ProviderError::Validation`] when the configuration breaks a
/// schema requirement (blank role name, index block without names or
/// privileges, application block without an application).
pub fn build_write_document(config: &RoleConfig) -> ProviderResult<PutRoleBody> {
    RoleName::new(config.role_name.as_str())?;

    let applications = config
        .applications
        .iter()
        .map(application_to_wire)
        .collect::<ProviderResult<Vec<_>>>()?;

    let indices = config
        .indices
        .iter()
        .map(index_to_wire)
        .collect::<ProviderResult<Vec<_>>>()?;

    Ok(PutRoleBody {
        cluster: config.cluster.iter().cloned().collect(),
        applications,
        indices,
        run_as: config.run_as.iter().cloned().collect(),
        global: top_level_to_wire(&config.global),
        metadata: top_level_to_wire(&config.metadata),
    })
}

/// Encode a put-role document as the JSON request body.
pub fn encode_write_document(body: &PutRoleBody) -> ProviderResult<String> {
    serde_json::to_string(body)
        .map_err(|e| ProviderError::serialization(format!("put role body: {e}")))
}

/// Build and encode in one step.
pub fn build_put_role_body(config: &RoleConfig) -> ProviderResult<String> {
    let body = build_write_document(config)?;
    let encoded = encode_write_document(&body)?;
    tracing::debug!(role = %config.role_name, body = %encoded, "built put role body");
    Ok(encoded)
}

/// Overwrite the declarative fields of `config` from a read document.
///
/// Full replacement, no merge: attributes the cluster did not return end up
/// empty in the configuration.
pub fn populate_config(role: &SecurityRole, config: &mut RoleConfig) {
    if !role.name.is_empty() {
        config.role_name = role.name.clone();
    }
    config.cluster = role.cluster.iter().cloned().collect();
    config.indices = role
        .indices
        .iter()
        .map(|index| IndexPermission {
            names: index.names.iter().cloned().collect(),
            privileges: index.privileges.iter().cloned().collect(),
            query: index.query.clone(),
            field_security: index.field_security.clone(),
        })
        .collect();
    config.applications = role
        .applications
        .iter()
        .map(|app| ApplicationPrivileges {
            application: app.application.clone(),
            privileges: app.privileges.iter().cloned().collect(),
            resources: app.resources.iter().cloned().collect(),
        })
        .collect();
    config.run_as = role.run_as.iter().cloned().collect();
    config.global = role.global.clone();
    config.metadata = role.metadata.clone();
}

/// `global`/`metadata` are skipped when empty; `{}` is the cluster default.
fn top_level_to_wire(text: &JsonText) -> Option<serde_json::Value> {
    if text.is_empty() {
        return None;
    }
    text.to_wire()
}

fn index_to_wire(index: &IndexPermission) -> ProviderResult<PutRoleIndicesPermissions> {
    if index.names.is_empty() {
        return Err(ProviderError::validation("indices: names must not be empty"));
    }
    if index.privileges.is_empty() {
        return Err(ProviderError::validation(format!(
            "indices {:?}: privileges must not be empty",
            index.names
        )));
    }

    Ok(PutRoleIndicesPermissions {
        names: index.names.iter().cloned().collect(),
        privileges: index.privileges.iter().cloned().collect(),
        field_security: index.field_security.to_wire(),
        query: index.query.to_wire(),
    })
}

fn application_to_wire(app: &ApplicationPrivileges) -> ProviderResult<PutRoleApplicationPrivileges> {
    if app.application.trim().is_empty() {
        return Err(ProviderError::validation("applications: application must not be empty"));
    }

    Ok(PutRoleApplicationPrivileges {
        application: app.application.clone(),
        privileges: app.privileges.iter().cloned().collect(),
        resources: app.resources.iter().cloned().collect(),
    })
}
