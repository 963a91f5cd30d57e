//! Change file loading.
//!
//! A change file is a JSON array of [`Change`] values, as produced by a
//! schema differ.

use std::path::Path;

use schemaplan_core::Change;
use tracing::debug;

use crate::error::{Error, Result};

/// Parses a JSON change list.
///
/// # Errors
///
/// Returns an error if `json` is not a valid change list.
pub fn parse_changes(json: &str) -> Result<Vec<Change>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses the change file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid change list.
pub async fn load_changes(path: &Path) -> Result<Vec<Change>> {
    let content = tokio::fs::read_to_string(path).await?;
    let changes = parse_changes(&content).map_err(|e| Error::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), changes = changes.len(), "Loaded change file");
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CHANGES: &str = r#"[
        { "type": "add_schema", "schema": { "name": "app" }, "if_not_exists": true },
        {
            "type": "add_table",
            "table": {
                "name": "users",
                "columns": [
                    { "name": "id", "type": { "integer": { "kind": "int" } }, "nullable": false }
                ],
                "primary_key": { "name": "PRIMARY", "parts": [ { "target": { "column": "id" } } ] }
            }
        }
    ]"#;

    #[test]
    fn test_parse_changes() {
        let changes = parse_changes(CHANGES).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind_name(), "AddSchema");
        let table = changes[1].table().unwrap();
        assert_eq!(table.name, "users");
        assert!(!table.columns[0].nullable);
    }

    #[tokio::test]
    async fn test_load_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CHANGES.as_bytes()).unwrap();

        let changes = load_changes(file.path()).await.unwrap();
        assert_eq!(changes.len(), 2);
    }

    #[tokio::test]
    async fn test_load_invalid_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{ "type": "rename_table" }]"#).unwrap();

        let err = load_changes(file.path()).await.unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_changes(&dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
