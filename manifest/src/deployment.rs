use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::info;

use crate::chart::Chart;
use crate::container::ContainerBuilder;
use crate::error::ManifestError;
use crate::object::ObjectId;

/// Label selecting the pods of an app.
pub const APP_LABEL_KEY: &str = "app.kubernetes.io/name";

/// Kind of the objects referenced by secret bindings.
const SECRET_KIND: &str = "Secret";

const TCP_PROTOCOL: &str = "TCP";

/// Describes a deployment, and optionally the service exposing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentBuilder {
    app_label: String,
    containers: Vec<ContainerBuilder>,
    with_service: bool,
    node_selector: BTreeMap<String, String>,
}

impl DeploymentBuilder {
    pub fn new(app_label: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            containers: Vec::new(),
            with_service: false,
            node_selector: BTreeMap::new(),
        }
    }

    pub fn with_containers(
        mut self,
        containers: impl IntoIterator<Item = ContainerBuilder>,
    ) -> Self {
        self.containers.extend(containers);
        self
    }

    /// Exposes every container port through a `ClusterIP` service named after the app.
    pub fn with_service(mut self) -> Self {
        self.with_service = true;
        self
    }

    /// Restricts scheduling to nodes carrying the label `key=value`.
    pub fn with_node_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_selector.insert(key.into(), value.into());
        self
    }

    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    pub fn containers(&self) -> &[ContainerBuilder] {
        &self.containers
    }

    pub fn has_service(&self) -> bool {
        self.with_service
    }

    pub fn node_selector(&self) -> &BTreeMap<String, String> {
        &self.node_selector
    }

    fn labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(APP_LABEL_KEY.to_string(), self.app_label.clone())])
    }

    fn metadata(&self, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.app_label.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(self.labels()),
            ..ObjectMeta::default()
        }
    }

    /// Materializes the [`Deployment`] for the given namespace.
    pub fn deployment(&self, namespace: &str) -> Deployment {
        let labels = self.labels();

        Deployment {
            metadata: self.metadata(namespace),
            spec: Some(DeploymentSpec {
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..LabelSelector::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..ObjectMeta::default()
                    }),
                    spec: Some(PodSpec {
                        containers: self.containers.iter().map(ContainerBuilder::build).collect(),
                        node_selector: (!self.node_selector.is_empty())
                            .then(|| self.node_selector.clone()),
                        ..PodSpec::default()
                    }),
                },
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        }
    }

    /// Materializes the [`Service`] for the given namespace, if one was requested.
    pub fn service(&self, namespace: &str) -> Option<Service> {
        if !self.with_service {
            return None;
        }

        let ports = self
            .containers
            .iter()
            .flat_map(|container| container.ports().iter().copied())
            .map(|port| ServicePort {
                name: Some(format!("port-{port}")),
                port,
                target_port: Some(IntOrString::Int(port)),
                protocol: Some(TCP_PROTOCOL.to_string()),
                ..ServicePort::default()
            })
            .collect::<Vec<_>>();

        Some(Service {
            metadata: self.metadata(namespace),
            spec: Some(ServiceSpec {
                selector: Some(self.labels()),
                ports: (!ports.is_empty()).then_some(ports),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        })
    }

    /// Registers the deployment, and its service if requested, into `chart`.
    ///
    /// The deployment depends on every secret its containers read from; the service
    /// depends on the deployment.
    pub fn build(&self, chart: &mut Chart) -> Result<(), ManifestError> {
        let namespace = chart.namespace().to_string();

        let mut secrets: Vec<ObjectId> = Vec::new();
        for env in self.containers.iter().filter_map(ContainerBuilder::env) {
            for secret_name in env.secret_names() {
                let id = ObjectId::new(SECRET_KIND, Some(namespace.clone()), secret_name);
                if !secrets.contains(&id) {
                    secrets.push(id);
                }
            }
        }

        let deployment_id = chart.add(self.deployment(&namespace), secrets)?;
        info!(deployment = %deployment_id, "compiled deployment");

        if let Some(service) = self.service(&namespace) {
            let service_id = chart.add(service, vec![deployment_id])?;
            info!(service = %service_id, "compiled service");
        }

        Ok(())
    }
}
