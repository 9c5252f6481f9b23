pub mod cli;
pub mod profile_config;

#[cfg(feature = "cli")]
use crate::config::profile_config::{ForwarderProfile, ProfileConfig, MAX_ETA_TOLERANCE_DAYS};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{CheckError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "shipcheck")]
#[command(about = "Reconcile a forwarder shipment report against the import doc by PO")]
pub struct CliConfig {
    /// Forwarder shipment report (Excel A)
    #[arg(long)]
    pub report: String,

    /// Import document (Excel B)
    #[arg(long)]
    pub import_doc: String,

    #[arg(long, value_enum, default_value = "dhl")]
    pub profile: ForwarderProfile,

    /// TOML profile; takes precedence over --profile
    #[arg(long)]
    pub profile_file: Option<String>,

    #[arg(long, help = "Report sheet to read instead of the first one")]
    pub report_sheet: Option<String>,

    #[arg(long, help = "Import doc sheet to read instead of the newest MM.YYYY one")]
    pub import_sheet: Option<String>,

    /// Reference date for the ETA look-back window (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',')]
    pub format: Vec<String>,

    #[arg(long, help = "Pack the reports into one zip archive")]
    pub bundle: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_profile(&self) -> Result<ProfileConfig> {
        match &self.profile_file {
            Some(path) => {
                tracing::info!("📄 Loading profile from {}", path);
                ProfileConfig::from_file(path)
            }
            None => Ok(self.profile.config()),
        }
    }

    /// Fills output settings the command line left unset from the profile's `[load]` section.
    pub fn apply_profile_defaults(&mut self, profile: &ProfileConfig) {
        if self.format.is_empty() {
            self.format = profile
                .load
                .output_formats
                .clone()
                .unwrap_or_else(|| vec!["csv".to_string()]);
        }
        if !self.bundle {
            self.bundle = profile.load.bundle.unwrap_or(false);
        }
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.format
    }

    fn bundle(&self) -> bool {
        self.bundle
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(today)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_input_file("report", &self.report)?;
        validation::validate_input_file("import_doc", &self.import_doc)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("format", &self.format)?;

        if let Some(path) = &self.profile_file {
            validation::validate_path("profile_file", path)?;
            if !std::path::Path::new(path).is_file() {
                return Err(CheckError::InvalidConfigValueError {
                    field: "profile_file".to_string(),
                    value: path.clone(),
                    reason: "File does not exist".to_string(),
                });
            }
        }
        for (field, sheet) in [("report_sheet", &self.report_sheet), ("import_sheet", &self.import_sheet)] {
            if let Some(name) = sheet {
                validation::validate_non_empty_string(field, name)?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "eta-check")]
#[command(about = "Compare ERP arrival dates with the import doc across every sheet")]
pub struct EtaCheckConfig {
    /// ERP export with `No.` and `Arrival Date` columns
    #[arg(long)]
    pub erp: String,

    #[arg(long)]
    pub import_doc: String,

    #[arg(long, default_value = "0", help = "Days of difference still treated as a match (0-60)")]
    pub tolerance_days: i64,

    #[arg(long, help = "Also accept 'ETA Dates'/'ETA Date' as the arrival column")]
    pub accept_eta_dates: bool,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub format: Vec<String>,

    #[arg(long)]
    pub bundle: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long)]
    pub monitor: bool,

    #[arg(long)]
    pub log_json: bool,

    #[arg(long, help = "Load and validate both files without writing reports")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for EtaCheckConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.format
    }

    fn bundle(&self) -> bool {
        self.bundle
    }

    fn as_of(&self) -> NaiveDate {
        today()
    }
}

#[cfg(feature = "cli")]
impl Validate for EtaCheckConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_input_file("erp", &self.erp)?;
        validation::validate_input_file("import_doc", &self.import_doc)?;
        validation::validate_range("tolerance_days", self.tolerance_days, 0, MAX_ETA_TOLERANCE_DAYS)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("format", &self.format)?;
        Ok(())
    }
}
