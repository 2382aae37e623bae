use k8s_openapi::api::core::v1::{Capabilities, Container, ContainerPort, SecurityContext};

use crate::env::EnvBuilder;

/// Linux capability granted to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Capability {
    /// Lets debuggers attach to processes in the container.
    Debug,
}

impl Capability {
    /// Kernel capability name as understood by the container runtime.
    pub fn as_kernel_capability(&self) -> &'static str {
        match self {
            Capability::Debug => "SYS_PTRACE",
        }
    }
}

/// Describes a single container of a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerBuilder {
    name: String,
    image: String,
    args: Vec<String>,
    env: Option<EnvBuilder>,
    ports: Vec<i32>,
    capabilities: Vec<Capability>,
}

impl ContainerBuilder {
    pub fn new<I, S>(name: impl Into<String>, image: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            image: image.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: None,
            ports: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_env(mut self, env: EnvBuilder) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_ports(mut self, ports: impl IntoIterator<Item = i32>) -> Self {
        self.ports.extend(ports);
        self
    }

    pub fn with_security_context(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> Option<&EnvBuilder> {
        self.env.as_ref()
    }

    pub fn ports(&self) -> &[i32] {
        &self.ports
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn build(&self) -> Container {
        let env = self.env.as_ref().map(EnvBuilder::build).unwrap_or_default();

        let ports = self
            .ports
            .iter()
            .map(|port| ContainerPort {
                container_port: *port,
                ..ContainerPort::default()
            })
            .collect::<Vec<_>>();

        let security_context = (!self.capabilities.is_empty()).then(|| SecurityContext {
            capabilities: Some(Capabilities {
                add: Some(
                    self.capabilities
                        .iter()
                        .map(|capability| capability.as_kernel_capability().to_string())
                        .collect(),
                ),
                ..Capabilities::default()
            }),
            ..SecurityContext::default()
        });

        Container {
            name: self.name.clone(),
            image: Some(self.image.clone()),
            args: non_empty(self.args.clone()),
            env: non_empty(env.vars),
            env_from: non_empty(env.from),
            ports: non_empty(ports),
            security_context,
            ..Container::default()
        }
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sets_image_args_and_ports() {
        let container = ContainerBuilder::new("app", "registry.example/app:1", ["/app", "--flag"])
            .with_ports([1234])
            .build();

        assert_eq!(container.name, "app");
        assert_eq!(container.image.as_deref(), Some("registry.example/app:1"));
        assert_eq!(
            container.args,
            Some(vec!["/app".to_string(), "--flag".to_string()])
        );
        let ports = container.ports.unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].container_port, 1234);
        assert!(container.security_context.is_none());
        assert!(container.env.is_none());
    }

    #[test]
    fn debug_capability_adds_sys_ptrace_once() {
        let container = ContainerBuilder::new("app", "image", Vec::<String>::new())
            .with_security_context(Capability::Debug)
            .with_security_context(Capability::Debug)
            .build();

        let added = container
            .security_context
            .and_then(|context| context.capabilities)
            .and_then(|capabilities| capabilities.add)
            .unwrap();
        assert_eq!(added, vec!["SYS_PTRACE".to_string()]);
        assert!(container.args.is_none());
    }

    #[test]
    fn env_is_materialized_into_container() {
        let env = EnvBuilder::new([("REGION", "us-east-1")]).with_secrets_from("creds");

        let container = ContainerBuilder::new("app", "image", ["/app"])
            .with_env(env)
            .build();

        assert_eq!(container.env.unwrap()[0].name, "REGION");
        assert_eq!(container.env_from.unwrap().len(), 1);
    }
}
