// cloudtel-api: Async Rust client for the IoT cloud open API

pub mod client;
pub mod devices;
pub mod error;
pub mod logs;
pub mod models;
pub mod sign;
pub mod token;
pub mod transport;

pub use client::CloudClient;
pub use error::Error;
pub use logs::LogQuery;
pub use models::{
    DataPoint, DeclaredValues, DeviceSpecificationResponse, DpValue, LogEntry, SpecEntry,
    TokenGrant,
};
pub use sign::{RequestSigner, SignedHeaders};
pub use transport::TransportConfig;
