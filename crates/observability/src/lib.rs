//! Process-wide tracing setup shared by the binaries.

/// Initialize tracing with the `info` default filter.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Tracing subscriber configuration.
pub mod tracing;
