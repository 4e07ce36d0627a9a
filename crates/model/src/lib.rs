//! `esrole-model`: the role resource's declarative model and wire documents.
//!
//! Pure data and pure functions: this crate never talks to a cluster.

pub mod config;
pub mod diff;
pub mod document;
pub mod schema;
pub mod translate;

pub use config::{ApplicationPrivileges, IndexPermission, RoleConfig};
pub use diff::{AttributeChange, plan_changes, requires_replacement};
pub use document::{
    PutRoleApplicationPrivileges, PutRoleBody, PutRoleIndicesPermissions,
    SecurityApplicationPrivileges, SecurityIndicesPermissions, SecurityRole,
};
pub use schema::{AttributeKind, AttributeSchema, ROLE_ATTRIBUTES};
pub use translate::{
    build_put_role_body, build_write_document, encode_write_document, populate_config,
};
