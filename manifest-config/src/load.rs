use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::build_config::BuildConfig;

/// Prefix for build environment variables.
///
/// Example: `BUILD_DIR` sets the `dir` field of [`BuildConfig`].
const BUILD_ENV_PREFIX: &str = "BUILD";

/// Separator between environment variable prefix and key segments.
const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested configuration keys in environment variables.
const ENV_SEPARATOR: &str = "__";

/// Loads the [`BuildConfig`] from the process environment.
///
/// `BUILD_DIR` is required. A missing variable is reported as a
/// [`config::ConfigError`] naming the missing field. Callers validate the loaded
/// value with [`BuildConfig::validate`].
pub fn load_build_config() -> Result<BuildConfig, config::ConfigError> {
    load_from_env_source::<BuildConfig>(None)
}

/// Loads the [`BuildConfig`] from an explicit map of environment variables.
///
/// Only keys carrying the `BUILD_` prefix are considered, exactly as with the process
/// environment.
pub fn load_build_config_from(
    vars: HashMap<String, String>,
) -> Result<BuildConfig, config::ConfigError> {
    load_from_env_source::<BuildConfig>(Some(vars))
}

fn load_from_env_source<T>(vars: Option<HashMap<String, String>>) -> Result<T, config::ConfigError>
where
    T: DeserializeOwned,
{
    // Environment variables with a prefix of BUILD and '__' as separator.
    // E.g. `BUILD_DIR=/tmp/b` sets `BuildConfig { build_dir }` to `/tmp/b`.
    let environment_source = config::Environment::with_prefix(BUILD_ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .source(vars);

    let settings = config::Config::builder()
        .add_source(environment_source)
        .build()?;

    settings.try_deserialize::<T>()
}
