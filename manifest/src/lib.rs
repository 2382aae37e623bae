//! Declarative Kubernetes manifest compilation.
//!
//! Applications implement [`AppPackage`] and describe themselves with the builders in
//! this crate ([`EnvBuilder`], [`ContainerBuilder`], [`DeploymentBuilder`]). [`compile`]
//! registers every package of every group into a namespace-scoped [`Chart`] and renders
//! three artifacts:
//!
//! - a mermaid dependency graph of the compiled objects,
//! - a unified diff against the manifests of the previous compilation,
//! - the manifests themselves, one multi-document YAML file per group.
//!
//! Nothing here talks to a cluster; applying the manifests is left to other tools.

mod chart;
mod compile;
mod container;
mod deployment;
mod diff;
mod env;
mod error;
mod graph;
mod object;
mod package;
mod state;

pub use chart::*;
pub use compile::*;
pub use container::*;
pub use deployment::*;
pub use diff::*;
pub use env::*;
pub use error::*;
pub use graph::*;
pub use object::*;
pub use package::*;
pub use state::*;
