use crate::chart::Chart;
use crate::error::ManifestError;

/// A deployable application that knows how to describe itself as Kubernetes objects.
///
/// Implementations assemble their configuration up front and register the resulting
/// objects when compiled into a [`Chart`].
pub trait AppPackage {
    /// Stable identifier of the application, also used to name its resources.
    fn id(&self) -> &str;

    /// Registers this application's objects into `chart`.
    fn compile(&self, chart: &mut Chart) -> Result<(), ManifestError>;
}
