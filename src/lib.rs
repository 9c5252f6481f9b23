pub mod config;
pub mod core;
pub mod domain;
pub mod output;
pub mod rules;
pub mod sheet;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::{CliConfig, EtaCheckConfig};

pub use config::profile_config::{ForwarderProfile, ProfileConfig};
pub use core::eta_pipeline::{EtaCheckPipeline, EtaSettings, EtaSources};
pub use core::etl::{CheckEngine, RunOutcome};
pub use core::shipment_pipeline::{ShipmentCheckPipeline, ShipmentSources};
pub use utils::error::{CheckError, Result};
