pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod utils;

pub use config::cli::JsonFileStore;
#[cfg(feature = "cli")]
pub use config::{CalculationKind, CliConfig};
pub use config::toml_config::PolicyConfig;

pub use core::{
    engine::GradeEngine,
    session::{CgpaCalculator, SgpaCalculator},
};
pub use domain::policy::GradePolicy;
pub use export::Transcript;
pub use utils::error::{GradeError, Result};
