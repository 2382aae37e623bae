use std::collections::BTreeMap;

use manifest::{AppPackage, CompiledManifests, PackageGroups, compile};
use manifest_config::BuildConfig;
use tracing::info;

use crate::app::Prom2Parquet;

/// Group, and namespace, the service is deployed into.
pub const MONITORING_GROUP: &str = "monitoring";

/// Compiles the manifests of the `monitoring` group and writes every artifact into the
/// build directory.
///
/// The dependency graph and the diff are written first, overwriting any previous version,
/// followed by the manifests which become the applied state of the next run.
pub fn compile_manifests_with_config(
    config: &BuildConfig,
) -> anyhow::Result<CompiledManifests> {
    config.validate()?;

    info!(build_dir = %config.build_dir().display(), "compiling manifests");

    let compiled = compile(&package_groups(config)?, &config.manifest_dir())?;

    write_artifacts(config, &compiled)?;

    info!("manifests compiled");

    Ok(compiled)
}

/// Assembles the packages of every group.
pub fn package_groups(config: &BuildConfig) -> anyhow::Result<PackageGroups> {
    let monitoring: Vec<Box<dyn AppPackage>> = vec![Box::new(Prom2Parquet::new(config)?)];

    Ok(BTreeMap::from([(MONITORING_GROUP.to_string(), monitoring)]))
}

fn write_artifacts(config: &BuildConfig, compiled: &CompiledManifests) -> anyhow::Result<()> {
    let dag_path = config.dag_file();
    std::fs::write(&dag_path, &compiled.graph)?;
    info!(path = %dag_path.display(), "wrote dependency graph");

    let diff_path = config.diff_file();
    std::fs::write(&diff_path, &compiled.diff)?;
    info!(path = %diff_path.display(), "wrote diff");

    compiled.write_manifests(&config.manifest_dir())?;

    Ok(())
}
