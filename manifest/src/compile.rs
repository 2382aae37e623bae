use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::chart::Chart;
use crate::diff::{GroupDiff, render_diff};
use crate::error::ManifestError;
use crate::graph::render_graph;
use crate::package::AppPackage;
use crate::state::{load_applied_state, manifest_path};

/// Packages to compile, keyed by group. Each group becomes one chart in the namespace of
/// the same name.
pub type PackageGroups = BTreeMap<String, Vec<Box<dyn AppPackage>>>;

/// The artifacts of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledManifests {
    /// Mermaid dependency graph of every compiled object.
    pub graph: String,
    /// Diff of the compiled objects against the previously applied state.
    pub diff: String,
    /// Multi-document YAML manifest of every group.
    pub manifests: BTreeMap<String, String>,
}

impl CompiledManifests {
    /// Writes the manifest of every group to `manifest_dir`, replacing older versions.
    ///
    /// The written files are the applied state the next compilation diffs against.
    pub fn write_manifests(&self, manifest_dir: &Path) -> Result<(), ManifestError> {
        std::fs::create_dir_all(manifest_dir)?;

        for (group, manifest) in &self.manifests {
            let path = manifest_path(manifest_dir, group);
            std::fs::write(&path, manifest)?;
            info!(group, path = %path.display(), "wrote manifest");
        }

        Ok(())
    }
}

/// Compiles every group of packages into a dependency graph, a diff against the state
/// found in `manifest_dir`, and the rendered manifests.
///
/// Nothing is written: callers decide where the artifacts go.
pub fn compile(
    groups: &PackageGroups,
    manifest_dir: &Path,
) -> Result<CompiledManifests, ManifestError> {
    let mut charts = Vec::with_capacity(groups.len());
    let mut diffs = Vec::with_capacity(groups.len());
    let mut manifests = BTreeMap::new();

    for (group, packages) in groups {
        let mut chart = Chart::new(group.as_str());
        for package in packages {
            info!(group, package = package.id(), "compiling package");
            package.compile(&mut chart)?;
        }

        let applied = load_applied_state(manifest_dir, group)?;
        let diff = GroupDiff::compute(group, &chart, &applied)?;
        info!(
            group,
            objects = chart.objects().len(),
            changed = diff.has_changes(),
            "compiled group"
        );

        manifests.insert(group.clone(), chart.to_yaml()?);
        charts.push(chart);
        diffs.push(diff);
    }

    Ok(CompiledManifests {
        graph: render_graph(&charts, &diffs),
        diff: render_diff(&diffs),
        manifests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerBuilder;
    use crate::deployment::DeploymentBuilder;

    struct Echo {
        image: String,
    }

    impl AppPackage for Echo {
        fn id(&self) -> &str {
            "echo"
        }

        fn compile(&self, chart: &mut Chart) -> Result<(), ManifestError> {
            let container = ContainerBuilder::new(self.id(), self.image.as_str(), ["/echo"])
                .with_ports([8080]);

            DeploymentBuilder::new(self.id())
                .with_containers([container])
                .with_service()
                .build(chart)
        }
    }

    fn groups(image: &str) -> PackageGroups {
        let packages: Vec<Box<dyn AppPackage>> = vec![Box::new(Echo {
            image: image.to_string(),
        })];
        BTreeMap::from([("apps".to_string(), packages)])
    }

    #[test]
    fn first_compilation_adds_everything() {
        let dir = tempfile::tempdir().unwrap();

        let compiled = compile(&groups("echo:1"), dir.path()).unwrap();

        assert!(
            compiled
                .diff
                .starts_with("# apps: 2 added, 0 removed, 0 changed, 0 unchanged\n")
        );
        assert!(compiled.graph.contains("subgraph apps"));
        assert!(compiled.manifests["apps"].contains("echo:1"));
    }

    #[test]
    fn recompiling_written_manifests_reports_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        compile(&groups("echo:1"), dir.path())
            .unwrap()
            .write_manifests(dir.path())
            .unwrap();

        let compiled = compile(&groups("echo:1"), dir.path()).unwrap();

        assert_eq!(
            compiled.diff,
            "# apps: 0 added, 0 removed, 0 changed, 2 unchanged\n"
        );
        assert!(!compiled.graph.contains(":::added"));
    }

    #[test]
    fn image_update_changes_the_deployment_only() {
        let dir = tempfile::tempdir().unwrap();
        compile(&groups("echo:1"), dir.path())
            .unwrap()
            .write_manifests(dir.path())
            .unwrap();

        let compiled = compile(&groups("echo:2"), dir.path()).unwrap();

        assert!(
            compiled
                .diff
                .starts_with("# apps: 0 added, 0 removed, 1 changed, 1 unchanged\n")
        );
        assert!(compiled.diff.contains("apps/Deployment/echo: changed\n"));
        let diff_line = |sign: char, image: &str| {
            compiled.diff.lines().any(|line| {
                line.starts_with(sign) && line.contains("image:") && line.contains(image)
            })
        };
        assert!(diff_line('-', "echo:1"));
        assert!(diff_line('+', "echo:2"));
    }
}
