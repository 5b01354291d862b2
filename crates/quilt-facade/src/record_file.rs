//! File-backed access-record sink.
//!
//! Writes the record to a `.tmp` sibling and renames it into place so a
//! crash mid-write never leaves a truncated record behind.

use std::path::PathBuf;

use quilt_provision::{AccessRecord, RecordSink};

/// Persists the access record to a flat file, regenerated in full on
/// every successful gateway provisioning.
#[derive(Debug, Clone)]
pub struct FileRecordSink {
    path: PathBuf,
}

impl FileRecordSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl RecordSink for FileRecordSink {
    fn persist(&self, record: &AccessRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, record.to_contents())?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "access record persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("quilt-{}-{name}", std::process::id()))
    }

    #[test]
    fn persists_and_overwrites_atomically() {
        let path = scratch_path("record.cfg");
        let sink = FileRecordSink::new(path.clone());

        let first = AccessRecord::new(vec!["URL=\"https://a\"".into()]);
        sink.persist(&first).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "URL=\"https://a\"\n"
        );

        // Regenerated in full, not appended.
        let second = AccessRecord::new(vec![
            "URL=\"https://b\"".into(),
            "CustomerKey=\"key\"".into(),
        ]);
        sink.persist(&second).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "URL=\"https://b\"\nCustomerKey=\"key\"\n"
        );

        // No temp file left behind.
        assert!(!path.with_extension("tmp").exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = scratch_path("record-dir");
        let path = dir.join("nested").join("record.cfg");
        let sink = FileRecordSink::new(path.clone());

        sink.persist(&AccessRecord::new(vec!["A=\"1\"".into()]))
            .unwrap();
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
