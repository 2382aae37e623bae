use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, info};

use crate::error::ManifestError;
use crate::object::ObjectId;

/// Suffix of the per-group manifest files.
const MANIFEST_FILE_SUFFIX: &str = ".k8s.yaml";

/// Objects of one group as they were last applied, keyed by identity.
pub type AppliedState = BTreeMap<ObjectId, Value>;

/// Path of the manifest file holding the objects of `group`.
pub fn manifest_path(manifest_dir: &Path, group: &str) -> PathBuf {
    manifest_dir.join(format!("{group}{MANIFEST_FILE_SUFFIX}"))
}

/// Loads the previously applied objects of `group` from `manifest_dir`.
///
/// A missing manifest file means nothing was applied yet and yields an empty state.
/// An object that appears more than once is rejected, as it would be in a chart.
pub fn load_applied_state(
    manifest_dir: &Path,
    group: &str,
) -> Result<AppliedState, ManifestError> {
    let path = manifest_path(manifest_dir, group);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                group,
                path = %path.display(),
                "no applied manifest found, diffing against an empty state"
            );
            return Ok(AppliedState::new());
        }
        Err(err) => return Err(err.into()),
    };

    parse_applied_state(&content, &path)
}

fn parse_applied_state(content: &str, path: &Path) -> Result<AppliedState, ManifestError> {
    let mut state = AppliedState::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        let id =
            ObjectId::from_value(&value).ok_or_else(|| ManifestError::InvalidAppliedManifest {
                path: path.to_path_buf(),
            })?;
        if state.contains_key(&id) {
            return Err(ManifestError::DuplicateObject(id));
        }
        state.insert(id, value);
    }

    debug!(path = %path.display(), objects = state.len(), "loaded applied manifest");

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();

        let state = load_applied_state(dir.path(), "monitoring").unwrap();

        assert!(state.is_empty());
    }

    #[test]
    fn parses_every_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            manifest_path(dir.path(), "monitoring"),
            "---\nkind: Service\nmetadata:\n  name: a\n  namespace: monitoring\n---\nkind: Deployment\nmetadata:\n  name: a\n  namespace: monitoring\n",
        )
        .unwrap();

        let state = load_applied_state(dir.path(), "monitoring").unwrap();

        assert_eq!(state.len(), 2);
        assert!(state.contains_key(&ObjectId::new(
            "Deployment",
            Some("monitoring".to_string()),
            "a"
        )));
    }

    #[test]
    fn rejects_documents_without_identity() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            manifest_path(dir.path(), "monitoring"),
            "kind: Service\nmetadata: {}\n",
        )
        .unwrap();

        let err = load_applied_state(dir.path(), "monitoring").unwrap_err();

        assert!(matches!(err, ManifestError::InvalidAppliedManifest { .. }));
    }

    #[test]
    fn rejects_objects_applied_twice() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            manifest_path(dir.path(), "monitoring"),
            "---\nkind: Service\nmetadata:\n  name: a\n  namespace: monitoring\n---\nkind: Service\nmetadata:\n  name: a\n  namespace: monitoring\n",
        )
        .unwrap();

        let err = load_applied_state(dir.path(), "monitoring").unwrap_err();

        assert!(matches!(
            err,
            ManifestError::DuplicateObject(id) if id.to_string() == "monitoring/Service/a"
        ));
    }
}
