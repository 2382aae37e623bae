//! Kubernetes manifests of the prom2parquet service.
//!
//! [`app::Prom2Parquet`] describes the service deployment, [`core`] compiles it into the
//! `monitoring` group and writes the resulting artifacts to the build directory.

pub mod app;
pub mod config;
pub mod core;
