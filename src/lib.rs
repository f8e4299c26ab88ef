//! Hello Project - a greeting CLI with layered configuration and plugins

pub mod config;
pub mod error;
pub mod plugins;
pub mod utils;

pub use config::{ConfigResolver, OutputFormat, Settings};
pub use error::{HelloError, Result};
pub use plugins::{Plugin, PluginContext, PluginRegistry, PluginResult};
