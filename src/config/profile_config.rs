use crate::domain::model::Field;
use crate::rules::compare::{CompareSettings, DiffPolicy};
use crate::rules::container::ContainerRule;
use crate::rules::po::PoRule;
use crate::sheet::columns::{ImportKeywords, ReportColumns};
use crate::sheet::header::{HeaderFallback, KeywordMatch};
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const MAX_ETA_TOLERANCE_DAYS: i64 = 60;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Built-in forwarder profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ForwarderProfile {
    #[default]
    Dhl,
    Burnard,
    Tristar,
}

impl ForwarderProfile {
    pub fn config(&self) -> ProfileConfig {
        match self {
            ForwarderProfile::Dhl => ProfileConfig::dhl(),
            ForwarderProfile::Burnard => ProfileConfig::burnard(),
            ForwarderProfile::Tristar => ProfileConfig::tristar(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub profile: ProfileInfo,
    pub report: ReportSection,
    #[serde(default)]
    pub import_doc: ImportDocSection,
    #[serde(default)]
    pub compare: CompareSection,
    #[serde(default)]
    pub load: LoadSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub header_keywords: Vec<String>,
    #[serde(default)]
    pub header_match: KeywordMatch,
    #[serde(default)]
    pub header_fallback: HeaderFallback,
    #[serde(default = "exact_match")]
    pub column_match: KeywordMatch,
    #[serde(default)]
    pub po_rule: PoRule,
    #[serde(default)]
    pub day_first: bool,
    #[serde(default)]
    pub eta_lookback_days: Option<i64>,
    pub columns: ReportColumns,
}

fn exact_match() -> KeywordMatch {
    KeywordMatch::Exact
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportDocSection {
    pub po_rule: PoRule,
    pub header_keywords: Vec<String>,
    pub header_match: KeywordMatch,
    pub header_fallback: HeaderFallback,
    pub day_first: bool,
    pub keywords: ImportKeywords,
}

impl Default for ImportDocSection {
    fn default() -> Self {
        Self {
            po_rule: PoRule::Lenient,
            header_keywords: vec!["bc po".to_string()],
            header_match: KeywordMatch::Contains,
            header_fallback: HeaderFallback::FirstRow,
            day_first: false,
            keywords: ImportKeywords::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSection {
    pub fields: Vec<Field>,
    pub container_rule: ContainerRule,
    pub diff_policy: DiffPolicy,
    pub eta_tolerance_days: i64,
}

impl Default for CompareSection {
    fn default() -> Self {
        Self {
            fields: Field::ALL.to_vec(),
            container_rule: ContainerRule::PresenceOnly,
            diff_policy: DiffPolicy::CoreFirst,
            eta_tolerance_days: 0,
        }
    }
}

impl CompareSection {
    pub fn settings(&self) -> CompareSettings {
        CompareSettings {
            container_rule: self.container_rule,
            policy: self.diff_policy,
            eta_tolerance_days: self.eta_tolerance_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadSection {
    pub output_formats: Option<Vec<String>>,
    pub bundle: Option<bool>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl ProfileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CheckError::ConfigError {
            message: format!("Cannot read profile {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn compares(&self, field: Field) -> bool {
        self.compare.fields.contains(&field)
    }

    pub fn dhl() -> Self {
        Self {
            profile: ProfileInfo {
                name: "dhl".to_string(),
                description: Some("DHL ECLY shipment level report".to_string()),
            },
            report: ReportSection {
                header_keywords: strings(&["All References", "Supplier Name"]),
                header_match: KeywordMatch::Contains,
                header_fallback: HeaderFallback::Error,
                column_match: KeywordMatch::Exact,
                po_rule: PoRule::Lenient,
                day_first: false,
                eta_lookback_days: Some(3),
                columns: ReportColumns {
                    po: "All References".to_string(),
                    eta: "Estimated Arrival".to_string(),
                    vessel: "Vessel Name (Last Leg)".to_string(),
                    voyage: "Voyage/Flight Number (Last Leg)".to_string(),
                    container: "Container Number".to_string(),
                    container_type: Some("Container Type".to_string()),
                    supplier: Some("Supplier Name".to_string()),
                },
            },
            import_doc: ImportDocSection::default(),
            compare: CompareSection::default(),
            load: LoadSection::default(),
        }
    }

    pub fn burnard() -> Self {
        Self {
            profile: ProfileInfo {
                name: "burnard".to_string(),
                description: Some("Burnard shipment report".to_string()),
            },
            report: ReportSection {
                header_keywords: strings(&["Order #", "Supplier"]),
                header_match: KeywordMatch::Exact,
                header_fallback: HeaderFallback::Error,
                column_match: KeywordMatch::Exact,
                po_rule: PoRule::Plain,
                day_first: false,
                eta_lookback_days: None,
                columns: order_columns(),
            },
            import_doc: ImportDocSection {
                po_rule: PoRule::Plain,
                ..Default::default()
            },
            compare: CompareSection {
                fields: vec![Field::Eta, Field::Container, Field::ArrivalVessel],
                container_rule: ContainerRule::MatchNumber,
                ..Default::default()
            },
            load: LoadSection::default(),
        }
    }

    pub fn tristar() -> Self {
        Self {
            profile: ProfileInfo {
                name: "tristar".to_string(),
                description: Some("TRI-STAR shipment report".to_string()),
            },
            report: ReportSection {
                header_keywords: strings(&["Order #", "Supplier"]),
                header_match: KeywordMatch::Contains,
                header_fallback: HeaderFallback::FirstRow,
                column_match: KeywordMatch::Contains,
                po_rule: PoRule::OrderPrefix,
                day_first: false,
                eta_lookback_days: None,
                columns: order_columns(),
            },
            import_doc: ImportDocSection {
                po_rule: PoRule::OrderPrefix,
                ..Default::default()
            },
            compare: CompareSection {
                fields: vec![Field::Eta, Field::Container],
                container_rule: ContainerRule::MatchNumberAndType,
                diff_policy: DiffPolicy::Independent,
                eta_tolerance_days: 0,
            },
            load: LoadSection::default(),
        }
    }
}

fn order_columns() -> ReportColumns {
    ReportColumns {
        po: "Order #".to_string(),
        eta: "ETA".to_string(),
        vessel: "Arrival Vessel".to_string(),
        voyage: "Arrival Voyage".to_string(),
        container: "Container".to_string(),
        container_type: None,
        supplier: Some("Supplier".to_string()),
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables stay as written.
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

impl Validate for ProfileConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("profile.name", &self.profile.name)?;
        validation::validate_non_empty_list("report.header_keywords", &self.report.header_keywords)?;
        validation::validate_non_empty_string("report.columns.po", &self.report.columns.po)?;
        validation::validate_non_empty_string("report.columns.eta", &self.report.columns.eta)?;

        let columns = &self.report.columns;
        for (field, key, name) in [
            (Field::ArrivalVessel, "report.columns.vessel", &columns.vessel),
            (Field::ArrivalVoyage, "report.columns.voyage", &columns.voyage),
            (Field::Container, "report.columns.container", &columns.container),
        ] {
            if self.compares(field) && name.trim().is_empty() {
                return Err(CheckError::MissingConfigError { field: key.to_string() });
            }
        }

        if let Some(days) = self.report.eta_lookback_days {
            validation::validate_range("report.eta_lookback_days", days, 0, 365)?;
        }

        validation::validate_non_empty_list("import_doc.header_keywords", &self.import_doc.header_keywords)?;
        let keywords = &self.import_doc.keywords;
        validation::validate_non_empty_list("import_doc.keywords.bc_po", &keywords.bc_po)?;
        validation::validate_non_empty_list("import_doc.keywords.eta", &keywords.eta)?;
        if self.compares(Field::ArrivalVessel) {
            validation::validate_non_empty_list("import_doc.keywords.vessel", &keywords.vessel)?;
        }
        if self.compares(Field::ArrivalVoyage) {
            validation::validate_non_empty_list("import_doc.keywords.voyage", &keywords.voyage)?;
        }

        if self.compare.fields.is_empty() {
            return Err(CheckError::ConfigValidationError {
                field: "compare.fields".to_string(),
                message: "At least one field must be compared".to_string(),
            });
        }
        validation::validate_range(
            "compare.eta_tolerance_days",
            self.compare.eta_tolerance_days,
            0,
            MAX_ETA_TOLERANCE_DAYS,
        )?;

        if let Some(formats) = &self.load.output_formats {
            validation::validate_output_formats("load.output_formats", formats)?;
        }
        Ok(())
    }
}
