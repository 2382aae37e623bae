//! Configuration management for the manifest tools.
//!
//! Provides runtime environment detection and loading of the build configuration
//! (the `BUILD_DIR` the compiler reads inputs from and writes artifacts to).

mod build_config;
mod environment;
mod load;

pub use build_config::*;
pub use environment::*;
pub use load::*;
