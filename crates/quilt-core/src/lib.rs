//! Object model for the quilt device-management fabric.
//!
//! This crate defines the structured objects a device publishes into the
//! fabric's object store (identity, access, device), the resource paths
//! used to address them, the typed resource values, and the 16-byte
//! device identifier with its textual wire encoding.

pub mod device_id;
pub mod error;
pub mod path;
pub mod schema;
pub mod status;
pub mod value;

pub use device_id::DeviceId;
pub use error::DeviceIdError;
pub use path::{PathSet, ResourcePath};
pub use schema::{ObjectDef, ObjectId, ResourceDef, ResourceId, ResourceKind};
pub use status::ProvisionStatus;
pub use value::Value;
