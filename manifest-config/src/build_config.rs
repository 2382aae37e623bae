use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name of the rendered dependency graph.
pub const DAG_FILENAME: &str = "dag.mermaid";

/// File name of the rendered diff against the previously applied state.
pub const DIFF_FILENAME: &str = "k8s.df";

/// Directory, relative to the build directory, holding the rendered manifests.
pub const MANIFEST_DIRNAME: &str = "manifests";

/// Suffix of the per-service file containing a prebuilt image reference.
const IMAGE_FILE_SUFFIX: &str = "-image";

/// Errors that can occur during build configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid build configuration: `dir` must not be empty")]
    EmptyBuildDir,
}

/// Build-time configuration of the manifest compiler.
///
/// The build directory is both the input location for prebuilt image references and the
/// output location for every compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    /// Base directory for inputs and outputs, set through `BUILD_DIR`.
    #[serde(rename = "dir")]
    pub build_dir: PathBuf,
}

impl BuildConfig {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// Validates the build configuration.
    ///
    /// An empty build directory would resolve every artifact against the current
    /// directory, so it is rejected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.build_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyBuildDir);
        }

        Ok(())
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Path of the file holding the prebuilt image reference for the service `id`.
    pub fn image_file(&self, id: &str) -> PathBuf {
        self.build_dir.join(format!("{id}{IMAGE_FILE_SUFFIX}"))
    }

    pub fn dag_file(&self) -> PathBuf {
        self.build_dir.join(DAG_FILENAME)
    }

    pub fn diff_file(&self) -> PathBuf {
        self.build_dir.join(DIFF_FILENAME)
    }

    /// Directory holding the manifests of the last compilation, which is also the
    /// previously applied state the next compilation diffs against.
    pub fn manifest_dir(&self) -> PathBuf {
        self.build_dir.join(MANIFEST_DIRNAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_artifact_paths_from_build_dir() {
        let config = BuildConfig::new("/tmp/b");

        assert_eq!(
            config.image_file("prom2parquet"),
            PathBuf::from("/tmp/b/prom2parquet-image")
        );
        assert_eq!(config.dag_file(), PathBuf::from("/tmp/b/dag.mermaid"));
        assert_eq!(config.diff_file(), PathBuf::from("/tmp/b/k8s.df"));
        assert_eq!(config.manifest_dir(), PathBuf::from("/tmp/b/manifests"));
    }

    #[test]
    fn empty_build_dir_is_invalid() {
        assert!(matches!(
            BuildConfig::new("").validate(),
            Err(ValidationError::EmptyBuildDir)
        ));
        assert!(BuildConfig::new("/tmp/b").validate().is_ok());
    }
}
