//! `esrole-core`: shared primitives for the role provider.
//!
//! No IO here: error model, identifiers and the JSON text value type.

pub mod error;
pub mod json_text;
pub mod role_name;
pub mod version;

pub use error::{NOT_FOUND_STATUS, ProviderError, ProviderResult};
pub use json_text::{EMPTY_OBJECT, JsonText};
pub use role_name::RoleName;
pub use version::{ApiVersion, parse_major};
