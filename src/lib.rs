pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::GitHubClient;
pub use config::{grace::GraceHours, Settings};
pub use crate::core::{classifier::Classifier, reaper::Reaper};
pub use utils::error::{GateError, Result};
