//! Redmine REST API client.
//!
//! - `transport.rs` - the `HttpTransport` seam and its `reqwest` implementation
//! - `retry.rs` - exponential backoff retry policy
//! - `redmine.rs` - one method per Redmine resource and verb
//! - `types.rs` - resource shapes returned by Redmine
//! - `error.rs` - client error taxonomy

mod error;
mod redmine;
mod retry;
mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use error::{ClientError, ClientResult, TransportFailure};
pub use redmine::{Query, RedmineClient};
pub use retry::{RetryPolicy, is_transient};
pub use transport::{HttpTransport, RemoteRequest, RemoteResponse, ReqwestTransport};
