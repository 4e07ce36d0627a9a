//! Attribute schema of the role resource.
//!
//! Describes what a host needs to know about each attribute: its kind,
//! whether it is required, its default, and whether diffs on it are compared
//! as JSON values rather than text.

use serde::Serialize;

use esrole_core::EMPTY_OBJECT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "attributes")]
pub enum AttributeKind {
    String,
    StringSet,
    /// Opaque JSON carried as text.
    JsonText,
    /// Set of nested blocks.
    BlockSet(&'static [AttributeSchema]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    /// Diffs are suppressed when old and new are the same JSON value.
    pub suppress_equivalent_json: bool,
    /// Changing the attribute means a different remote object.
    pub force_new: bool,
}

impl AttributeSchema {
    const fn required(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            suppress_equivalent_json: false,
            force_new: false,
        }
    }

    const fn optional(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            suppress_equivalent_json: false,
            force_new: false,
        }
    }

    const fn json(name: &'static str) -> Self {
        Self {
            name,
            kind: AttributeKind::JsonText,
            required: false,
            default: Some(EMPTY_OBJECT),
            suppress_equivalent_json: true,
            force_new: false,
        }
    }
}

pub const INDEX_ATTRIBUTES: &[AttributeSchema] = &[
    AttributeSchema::required("names", AttributeKind::StringSet),
    AttributeSchema::required("privileges", AttributeKind::StringSet),
    AttributeSchema::json("query"),
    AttributeSchema::json("field_security"),
];

pub const APPLICATION_ATTRIBUTES: &[AttributeSchema] = &[
    AttributeSchema::required("application", AttributeKind::String),
    AttributeSchema::optional("privileges", AttributeKind::StringSet),
    AttributeSchema::optional("resources", AttributeKind::StringSet),
];

pub const ROLE_ATTRIBUTES: &[AttributeSchema] = &[
    AttributeSchema {
        force_new: true,
        ..AttributeSchema::required("role_name", AttributeKind::String)
    },
    AttributeSchema::optional("indices", AttributeKind::BlockSet(INDEX_ATTRIBUTES)),
    AttributeSchema::optional("applications", AttributeKind::BlockSet(APPLICATION_ATTRIBUTES)),
    AttributeSchema::optional("cluster", AttributeKind::StringSet),
    AttributeSchema::json("global"),
    AttributeSchema::optional("run_as", AttributeKind::StringSet),
    AttributeSchema::json("metadata"),
];

/// Look up a top-level role attribute.
pub fn attribute(name: &str) -> Option<&'static AttributeSchema> {
    ROLE_ATTRIBUTES.iter().find(|a| a.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexPermission, RoleConfig};

    #[test]
    fn json_attributes_default_to_empty_object_and_suppress_diffs() {
        for name in ["global", "metadata"] {
            let attr = attribute(name).unwrap();
            assert_eq!(attr.kind, AttributeKind::JsonText);
            assert_eq!(attr.default, Some("{}"));
            assert!(attr.suppress_equivalent_json);
        }

        for attr in INDEX_ATTRIBUTES.iter().filter(|a| a.kind == AttributeKind::JsonText) {
            assert_eq!(attr.default, Some("{}"));
        }
    }

    #[test]
    fn defaults_agree_with_config_defaults() {
        let cfg = RoleConfig::new("r");
        let index = IndexPermission::new(["i"], ["read"]);
        assert_eq!(Some(cfg.metadata.as_str()), attribute("metadata").unwrap().default);
        assert_eq!(Some(cfg.global.as_str()), attribute("global").unwrap().default);
        assert_eq!(Some(index.query.as_str()), INDEX_ATTRIBUTES[2].default);
        assert_eq!(Some(index.field_security.as_str()), INDEX_ATTRIBUTES[3].default);
    }

    #[test]
    fn only_role_name_forces_replacement() {
        let forcing: Vec<_> = ROLE_ATTRIBUTES.iter().filter(|a| a.force_new).map(|a| a.name).collect();
        assert_eq!(forcing, vec!["role_name"]);
    }

    #[test]
    fn schema_serializes_nested_blocks() {
        let value = serde_json::to_value(attribute("indices").unwrap()).unwrap();
        assert_eq!(value["kind"]["type"], "block_set");
        assert_eq!(value["kind"]["attributes"][0]["name"], "names");
    }
}
