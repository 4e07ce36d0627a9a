//! Lifecycle operations of the role resource.
//!
//! ```text
//!            create                    delete
//!   Absent ─────────▶ Present ─────────────────▶ Absent
//!                      │  ▲  read / update
//!                      └──┘
//!                      │ read → 404
//!                      ▼
//!                    Absent
//! ```
//!
//! Each operation performs at most two sequential calls (write, then read)
//! through the injected [`ClusterClient`]. Conditions the operations recover
//! from are reported to the injected [`Diagnostics`] sink.

use esrole_client::ClusterClient;
use esrole_core::{ProviderResult, RoleName};
use esrole_model::{RoleConfig, build_put_role_body, populate_config};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::state::{Plan, ResourceData};

/// How `delete` treats failures other than not-found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Report the failure and drop the resource from state anyway. This can
    /// hide a role that still exists remotely; kept as the default because
    /// existing state files were written under it.
    #[default]
    BestEffort,
    /// Return the failure and keep the identity until deletion is confirmed.
    Strict,
}

pub struct RoleResource<'a> {
    client: &'a ClusterClient,
    diagnostics: &'a dyn Diagnostics,
    delete_policy: DeletePolicy,
}

impl<'a> RoleResource<'a> {
    pub fn new(client: &'a ClusterClient, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            client,
            diagnostics,
            delete_policy: DeletePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Put the declared role, record its identity, then read it back.
    ///
    /// On any failure before the put succeeds the resource stays absent.
    pub fn create(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let name = self.put(&data.config)?;
        data.set_id(name);
        self.read(data)
    }

    /// Refresh declarative fields from the cluster.
    ///
    /// A role the cluster no longer has clears the identity and is not an
    /// error. An absent resource is left untouched.
    pub fn read(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let Some(name) = data.role_name().cloned() else {
            return Ok(());
        };

        match self.client.get_role(&name) {
            Ok(role) => {
                populate_config(&role, &mut data.config);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("role {name} not found; removing from state"))
                        .with_role(name.as_str()),
                );
                data.clear_id();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Put the declared role again and read it back. Identity is unchanged.
    pub fn update(&self, data: &mut ResourceData) -> ProviderResult<()> {
        self.put(&data.config)?;
        self.read(data)
    }

    /// Delete the role and clear the identity.
    ///
    /// Not-found counts as success. Other failures follow the
    /// [`DeletePolicy`].
    pub fn delete(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let Some(name) = data.role_name().cloned() else {
            return Ok(());
        };

        match self.client.delete_role(&name) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("role {name} not found; resource removed from state"))
                        .with_role(name.as_str()),
                );
            }
            Err(e) => match self.delete_policy {
                DeletePolicy::BestEffort => {
                    self.diagnostics.report(
                        Diagnostic::error(format!(
                            "deleting role {name} failed; removing from state anyway"
                        ))
                        .with_role(name.as_str())
                        .with_detail(e.to_string()),
                    );
                }
                DeletePolicy::Strict => return Err(e),
            },
        }

        data.clear_id();
        Ok(())
    }

    /// Refresh `data` from the cluster, then plan `proposed` against it.
    ///
    /// A role deleted outside the provider plans as [`Plan::Create`].
    pub fn plan(&self, data: &mut ResourceData, proposed: &RoleConfig) -> ProviderResult<Plan> {
        self.read(data)?;
        Ok(data.plan(proposed))
    }

    /// Converge `data` on `proposed`, returning the plan that was carried out.
    ///
    /// `data.config` only takes the proposed fields once the cluster accepted
    /// them, so a failed apply plans the same change again.
    pub fn apply(&self, data: &mut ResourceData, proposed: RoleConfig) -> ProviderResult<Plan> {
        let plan = self.plan(data, &proposed)?;
        match &plan {
            Plan::NoOp => {}
            Plan::Create | Plan::Update(_) => self.put_then_read(data, proposed)?,
            Plan::Replace(_) => {
                self.delete(data)?;
                self.put_then_read(data, proposed)?;
            }
        }
        Ok(plan)
    }

    fn put_then_read(&self, data: &mut ResourceData, proposed: RoleConfig) -> ProviderResult<()> {
        let name = self.put(&proposed)?;
        data.config = proposed;
        data.set_id(name);
        self.read(data)
    }

    fn put(&self, config: &RoleConfig) -> ProviderResult<RoleName> {
        let name = RoleName::new(config.role_name.as_str())?;
        let body = build_put_role_body(config)?;
        self.client.put_role(&name, &body)?;
        Ok(name)
    }
}
