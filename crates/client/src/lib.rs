//! `esrole-client`: versioned access to a cluster's security role API.
//!
//! [`Transport`] is the IO seam (HTTP in production, [`InMemoryCluster`] in
//! tests); [`ClusterClient`] routes each role operation to the client for the
//! cluster's API version.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod in_memory;
pub mod transport;
pub mod versions;

pub use config::ClientConfig;
pub use dispatch::ClusterClient;
pub use http::HttpTransport;
pub use in_memory::InMemoryCluster;
pub use transport::{Method, Request, Response, Transport};
pub use versions::{V5Client, V6Client, V7Client};
