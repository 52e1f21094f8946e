//! TestRail REST API client
//!
//! Two layers, composed in a line:
//!
//! - **Transport** ([`transport`], [`retry`], [`error`]): authenticated
//!   requests, retries for transient failures, and a closed error taxonomy.
//! - **Shape normalization** ([`model`], [`payload`]): raw bodies become typed
//!   records with a separate `custom` map for extension fields.
//!
//! [`service::TestRailService`] ties them together, one method per operation.

pub mod error;
pub mod model;
pub mod params;
pub mod payload;
pub mod query;
pub mod retry;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use error::{ErrorKind, TestRailError};
pub use service::TestRailService;
pub use transport::{Credentials, HttpTransport, Transport, TransportConfig};
