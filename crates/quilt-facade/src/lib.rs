//! Operator-facing layer for quilt provisioning.
//!
//! Exposes the provisioning operations as a typed RPC surface for an
//! external message bus to bind, TOML configuration with defaults for
//! every knob, tracing-subscriber setup, and the file-backed sink for
//! the persisted access record. Transport bindings (bus, console) live
//! outside this workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod record_file;
pub mod rpc;

pub use config::FacadeConfig;
pub use error::FacadeError;
pub use record_file::FileRecordSink;
pub use rpc::Facade;
