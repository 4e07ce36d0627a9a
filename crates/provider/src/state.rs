//! Resource state owned by the host between lifecycle calls.

use serde::{Deserialize, Serialize};

use esrole_core::RoleName;
use esrole_model::{AttributeChange, RoleConfig, plan_changes, requires_replacement};

/// Identity plus the declarative fields of one role resource.
///
/// `id` is `None` while the resource is absent; after a successful create it
/// holds the role name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RoleName>,
    pub config: RoleConfig,
}

/// What applying a configuration over the current state will do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "changes")]
pub enum Plan {
    Create,
    Update(Vec<AttributeChange>),
    Replace(Vec<AttributeChange>),
    NoOp,
}

impl ResourceData {
    pub fn new(config: RoleConfig) -> Self {
        Self { id: None, config }
    }

    /// State for a role already known to exist remotely (e.g. an import).
    pub fn with_id(id: RoleName, config: RoleConfig) -> Self {
        Self { id: Some(id), config }
    }

    /// External id; empty while the resource is absent.
    pub fn id(&self) -> &str {
        self.id.as_ref().map(RoleName::as_str).unwrap_or_default()
    }

    pub fn role_name(&self) -> Option<&RoleName> {
        self.id.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_id(&mut self, id: RoleName) {
        self.id = Some(id);
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn plan(&self, proposed: &RoleConfig) -> Plan {
        if !self.is_present() {
            return Plan::Create;
        }
        let changes = plan_changes(&self.config, proposed);
        if changes.is_empty() {
            Plan::NoOp
        } else if requires_replacement(&changes) {
            Plan::Replace(changes)
        } else {
            Plan::Update(changes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> RoleName {
        RoleName::new(s).unwrap()
    }

    #[test]
    fn absent_resource_has_empty_id() {
        let data = ResourceData::new(RoleConfig::new("r"));
        assert_eq!(data.id(), "");
        assert!(!data.is_present());
    }

    #[test]
    fn plan_reflects_identity_and_changes() {
        let cfg = RoleConfig::new("r").with_cluster(["monitor"]);
        assert_eq!(ResourceData::new(cfg.clone()).plan(&cfg), Plan::Create);

        let data = ResourceData::with_id(name("r"), cfg.clone());
        assert_eq!(data.plan(&cfg), Plan::NoOp);
        assert!(matches!(data.plan(&cfg.clone().with_cluster(["all"])), Plan::Update(_)));

        let mut renamed = cfg.clone();
        renamed.role_name = "r2".to_string();
        assert!(matches!(data.plan(&renamed), Plan::Replace(_)));
    }

    #[test]
    fn state_round_trips_through_json() {
        let data = ResourceData::with_id(name("r"), RoleConfig::new("r").with_metadata(r#"{"a":1}"#));
        let text = serde_json::to_string(&data).unwrap();
        let back: ResourceData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);

        let absent: ResourceData = serde_json::from_str(r#"{"config":{"role_name":"r"}}"#).unwrap();
        assert!(!absent.is_present());
    }
}
