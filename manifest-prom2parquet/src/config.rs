use manifest_config::{BuildConfig, load_build_config};

/// Loads and validates the [`BuildConfig`] from the process environment.
pub fn load_manifest_config() -> anyhow::Result<BuildConfig> {
    let config = load_build_config()?;
    config.validate()?;

    Ok(config)
}
