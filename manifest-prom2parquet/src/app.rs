use std::io::ErrorKind;
use std::path::Path;

use manifest::{
    AppPackage, Capability, Chart, ContainerBuilder, DeploymentBuilder, EnvBuilder,
    ManifestError, SecretBinding,
};
use manifest_config::BuildConfig;
use tracing::info;

/// Identifier of the service, also the name of its container, deployment and service.
pub const PROM2PARQUET_ID: &str = "prom2parquet";

/// Port of the prometheus remote write endpoint.
pub const SERVER_PORT: i32 = 1234;

/// Image used when no prebuilt image reference is available, e.g. in local runs.
pub const PLACEHOLDER_IMAGE: &str = "PLACEHOLDER";

/// Node label restricting where the service may be scheduled.
pub const NODE_SELECTOR: (&str, &str) = ("type", "kind-worker");

const AWS_DEFAULT_REGION: (&str, &str) = ("AWS_DEFAULT_REGION", "us-east-1");

/// Secret holding the AWS credentials used to upload parquet files.
const AWS_SECRET_NAME: &str = "simkube";

const CONTAINER_ARGS: &[&str] = &[
    "/prom2parquet",
    "--prefix",
    "testing",
    "--clean-local-storage",
    "--remote",
    "aws",
];

/// Binds each AWS credential to its own field of the credentials secret.
pub fn default_secret_bindings() -> Vec<SecretBinding> {
    vec![
        SecretBinding::key("AWS_ACCESS_KEY_ID", AWS_SECRET_NAME, "aws_access_key_id"),
        SecretBinding::key(
            "AWS_SECRET_ACCESS_KEY",
            AWS_SECRET_NAME,
            "aws_secret_access_key",
        ),
    ]
}

/// Injects every field of the credentials secret at once.
pub fn bulk_secret_bindings() -> Vec<SecretBinding> {
    vec![SecretBinding::all_from(AWS_SECRET_NAME)]
}

/// Reads the prebuilt image reference at `path`.
///
/// The content is used as is. A missing file is expected outside of image builds and
/// yields [`PLACEHOLDER_IMAGE`]; any other I/O error is returned.
pub fn resolve_image(path: &Path) -> std::io::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(image) => {
            info!(path = %path.display(), image, "using prebuilt image");
            Ok(image)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no prebuilt image found, using placeholder");
            Ok(PLACEHOLDER_IMAGE.to_string())
        }
        Err(err) => Err(err),
    }
}

/// The prometheus remote write endpoint exporting metrics to parquet files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prom2Parquet {
    image: String,
    deployment: DeploymentBuilder,
}

impl Prom2Parquet {
    /// Assembles the service with the default, per-key, secret bindings.
    pub fn new(config: &BuildConfig) -> std::io::Result<Self> {
        Self::with_secret_bindings(config, default_secret_bindings())
    }

    pub fn with_secret_bindings(
        config: &BuildConfig,
        bindings: Vec<SecretBinding>,
    ) -> std::io::Result<Self> {
        let image = resolve_image(&config.image_file(PROM2PARQUET_ID))?;

        let env = bindings
            .into_iter()
            .fold(EnvBuilder::new([AWS_DEFAULT_REGION]), EnvBuilder::with_binding);

        let args = CONTAINER_ARGS.iter().copied();
        let container = ContainerBuilder::new(PROM2PARQUET_ID, image.as_str(), args)
            .with_env(env)
            .with_ports([SERVER_PORT])
            .with_security_context(Capability::Debug);

        let (selector_key, selector_value) = NODE_SELECTOR;
        let deployment = DeploymentBuilder::new(PROM2PARQUET_ID)
            .with_containers([container])
            .with_service()
            .with_node_selector(selector_key, selector_value);

        Ok(Self { image, deployment })
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn deployment(&self) -> &DeploymentBuilder {
        &self.deployment
    }
}

impl AppPackage for Prom2Parquet {
    fn id(&self) -> &str {
        PROM2PARQUET_ID
    }

    fn compile(&self, chart: &mut Chart) -> Result<(), ManifestError> {
        self.deployment.build(chart)
    }
}
