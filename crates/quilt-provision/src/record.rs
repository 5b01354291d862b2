//! The persisted access record.
//!
//! After a successful gateway provisioning the save-worthy resources of
//! the identity, access, and device objects are rendered as one
//! `NAME="value"` line each and handed to a [`RecordSink`]. The record
//! is regenerated in full each time; byte values render as
//! space-separated two-digit uppercase hex groups.

use quilt_core::schema::{ACCESS_OBJECT, DEVICE_OBJECT, IDENTITY_OBJECT, SINGLE_INSTANCE};
use quilt_core::{ResourcePath, Value};
use quilt_store::StoreClient;

use crate::error::ProvisionError;

/// A fully rendered access record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct AccessRecord {
    lines: Vec<String>,
}

impl AccessRecord {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The record as file contents, one line per resource.
    pub fn to_contents(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Destination for the rendered record. A failing sink is logged by the
/// caller and never downgrades a successful provisioning.
pub trait RecordSink: Send + Sync {
    fn persist(&self, record: &AccessRecord) -> std::io::Result<()>;
}

/// Sink that drops the record; used in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl RecordSink for DiscardSink {
    fn persist(&self, _record: &AccessRecord) -> std::io::Result<()> {
        Ok(())
    }
}

/// Render one record line.
pub fn render_line(name: &str, value: &Value) -> String {
    match value {
        Value::Text(text) => format!("{name}=\"{text}\""),
        Value::Integer(number) => format!("{name}=\"{number}\""),
        Value::Bytes(bytes) => {
            let mut out = format!("{name}=\"");
            for byte in bytes {
                out.push_str(&format!("{byte:02X} "));
            }
            out.push('"');
            out
        }
    }
}

/// Read every save-worthy resource and render the record.
pub async fn collect_access_record<C: StoreClient>(
    store: &C,
) -> Result<AccessRecord, ProvisionError> {
    let mut lines = Vec::new();
    for object in [&IDENTITY_OBJECT, &ACCESS_OBJECT, &DEVICE_OBJECT] {
        for resource in object.persisted_resources() {
            let path = ResourcePath::resource(object.id, SINGLE_INSTANCE, resource.id);
            let value = store.read(&path).await?;
            lines.push(render_line(resource.name, &value));
        }
    }
    Ok(AccessRecord::new(lines))
}
