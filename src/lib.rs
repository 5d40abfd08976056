pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::toml_config::TomlConfig;

pub use crate::core::{engine::SwapEngine, pipeline::SwapPipeline};
pub use crate::domain::model::{CashFlow, QuarterlyRate, RateObservation, SwapContract, SwapReport};
pub use crate::utils::error::{Result, SwapError};
