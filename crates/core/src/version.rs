//! Client API versions understood by the provider.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Major version of the Elasticsearch client API a handle speaks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V5,
    V6,
    V7,
}

impl ApiVersion {
    pub fn from_major(major: u64) -> Option<Self> {
        match major {
            5 => Some(Self::V5),
            6 => Some(Self::V6),
            7 => Some(Self::V7),
            _ => None,
        }
    }

    pub fn major(&self) -> u64 {
        match self {
            Self::V5 => 5,
            Self::V6 => 6,
            Self::V7 => 7,
        }
    }
}

impl core::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "v{}", self.major())
    }
}

/// Extract the major component of a version string.
///
/// Accepts `"7"`, `"v7"` and full cluster versions such as `"7.10.2"` or
/// `"6.8.23-SNAPSHOT"`.
pub fn parse_major(s: &str) -> Result<u64, ProviderError> {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let major = trimmed.split(['.', '-']).next().unwrap_or_default();

    major
        .parse::<u64>()
        .map_err(|e| ProviderError::config(format!("version '{s}': {e}")))
}

impl FromStr for ApiVersion {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let major = parse_major(s)?;
        Self::from_major(major)
            .ok_or_else(|| ProviderError::unhandled_client(format!("elasticsearch {s}")))
    }
}
