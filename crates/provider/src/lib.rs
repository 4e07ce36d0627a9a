//! `esrole-provider`: lifecycle of an Elasticsearch security role resource.
//!
//! Composes the schema translator (`esrole-model`) with the version
//! dispatcher (`esrole-client`) into create/read/update/delete operations
//! over host-owned [`ResourceData`].

pub mod diagnostics;
pub mod resource;
pub mod state;

pub use diagnostics::{CollectingDiagnostics, Diagnostic, Diagnostics, Severity, TracingDiagnostics};
pub use resource::{DeletePolicy, RoleResource};
pub use state::{Plan, ResourceData};
