use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::{Metadata, Resource};
use serde::Serialize;
use tracing::debug;

use crate::error::ManifestError;
use crate::object::{ApiObject, ObjectId};

/// A namespace-scoped collection of rendered Kubernetes objects.
///
/// Packages register their resources into a chart while it is being compiled. Objects
/// keep their registration order, which is also the order they are written out in.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    namespace: String,
    objects: Vec<ApiObject>,
}

impl Chart {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            objects: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn objects(&self) -> &[ApiObject] {
        &self.objects
    }

    /// Returns the object with the given identity, if registered.
    pub fn get(&self, id: &ObjectId) -> Option<&ApiObject> {
        self.objects.iter().find(|object| &object.id == id)
    }

    /// Renders `object` and registers it with its dependencies.
    ///
    /// Objects without a namespace are placed in the chart's namespace. Returns the id of
    /// the registered object so that dependents can reference it.
    pub fn add<K>(
        &mut self,
        mut object: K,
        depends_on: Vec<ObjectId>,
    ) -> Result<ObjectId, ManifestError>
    where
        K: Resource + Metadata<Ty = ObjectMeta> + Serialize,
    {
        let metadata = object.metadata_mut();
        let Some(name) = metadata.name.clone() else {
            return Err(ManifestError::MissingName {
                kind: K::KIND,
                chart: self.namespace.clone(),
            });
        };
        let namespace = metadata
            .namespace
            .get_or_insert_with(|| self.namespace.clone())
            .clone();

        let id = ObjectId::new(K::KIND, Some(namespace), name);
        if self.get(&id).is_some() {
            return Err(ManifestError::DuplicateObject(id));
        }

        let body = serde_yaml::to_value(&object)?;
        debug!(object = %id, dependencies = depends_on.len(), "registered object in chart");

        self.objects.push(ApiObject {
            id: id.clone(),
            body,
            depends_on,
        });

        Ok(id)
    }

    /// Renders the chart as a multi-document YAML manifest.
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        let mut manifest = String::new();
        for object in &self.objects {
            manifest.push_str("---\n");
            manifest.push_str(&serde_yaml::to_string(&object.body)?);
        }

        Ok(manifest)
    }
}
