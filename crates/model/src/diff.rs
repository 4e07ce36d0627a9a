//! Change detection between two declared roles.
//!
//! Sets compare without regard to order, JSON attributes compare as JSON
//! values. An empty plan means applying `proposed` over `prior` is a no-op.

use serde::Serialize;

use crate::config::RoleConfig;
use crate::schema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    pub attribute: &'static str,
    /// The change cannot be applied in place (the role must be recreated).
    pub requires_replacement: bool,
}

/// Attributes that differ between `prior` and `proposed`, in schema order.
pub fn plan_changes(prior: &RoleConfig, proposed: &RoleConfig) -> Vec<AttributeChange> {
    schema::ROLE_ATTRIBUTES
        .iter()
        .filter(|attr| !attribute_unchanged(attr.name, prior, proposed))
        .map(|attr| AttributeChange {
            attribute: attr.name,
            requires_replacement: attr.force_new,
        })
        .collect()
}

pub fn requires_replacement(changes: &[AttributeChange]) -> bool {
    changes.iter().any(|c| c.requires_replacement)
}

fn attribute_unchanged(name: &str, prior: &RoleConfig, proposed: &RoleConfig) -> bool {
    match name {
        "role_name" => prior.role_name == proposed.role_name,
        "indices" => same_members(&prior.indices, &proposed.indices),
        "applications" => same_members(&prior.applications, &proposed.applications),
        "cluster" => prior.cluster == proposed.cluster,
        "global" => prior.global == proposed.global,
        "run_as" => prior.run_as == proposed.run_as,
        "metadata" => prior.metadata == proposed.metadata,
        other => {
            tracing::warn!(attribute = other, "attribute has no comparison; assuming changed");
            false
        }
    }
}

/// Multiset equality for block sets.
fn same_members<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut matched = vec![false; b.len()];
    for item in a {
        let slot = b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !matched[i] && candidate == item);
        match slot {
            Some(i) => matched[i] = true,
            None => return false,
        }
    }
    true
}
