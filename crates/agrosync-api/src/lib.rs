// agrosync-api: Async Rust client for the agrosync facility/plot/sensor API

pub mod client;
pub mod error;
pub mod facilities;
pub mod irrigation;
pub mod plots;
pub mod responsibles;
pub mod species;
pub mod thresholds;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::{Error, ErrorKind};
pub use transport::{TlsMode, TransportConfig};
