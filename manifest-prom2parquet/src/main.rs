use manifest_prom2parquet::config::load_manifest_config;
use manifest_prom2parquet::core::compile_manifests_with_config;
use manifest_telemetry::init_tracing;
use tracing::error;

fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    let config = load_manifest_config()?;

    if let Err(err) = compile_manifests_with_config(&config) {
        error!("an error occurred while compiling manifests: {err}");

        return Err(err);
    }

    Ok(())
}
