//! JSON artifact I/O.
//!
//! Writes go to a temp file in the target directory that is renamed over the
//! destination, so readers only ever see a complete previous or new document.

use error_common::{DiagnosisError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .map_err(|e| DiagnosisError::artifact(path.display().to_string(), e.to_string()))?;
    Ok(())
}

/// Read a JSON artifact. Any failure is reported as an artifact error naming the path.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| DiagnosisError::artifact(path.display().to_string(), e.to_string()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DiagnosisError::artifact(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        let mut value = BTreeMap::new();
        value.insert("symptoms".to_string(), 131);
        save_json(&value, &path).unwrap();

        let loaded: BTreeMap<String, i32> = load_json(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_overwrite_replaces_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        save_json(&vec![1, 2, 3], &path).unwrap();
        save_json(&vec![4], &path).unwrap();

        let loaded: Vec<i32> = load_json(&path).unwrap();
        assert_eq!(loaded, vec![4]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_file_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_json::<Vec<i32>>(&path).unwrap_err();
        assert!(matches!(err, DiagnosisError::Artifact { .. }));
        assert_eq!(err.code(), "CONFIG_1002");
    }
}
