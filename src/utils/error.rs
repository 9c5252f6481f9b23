use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Workbook could not be read: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unsupported file format '{extension}' for {path}")]
    UnsupportedFormat { path: String, extension: String },

    #[error("{source_name} contains no sheets")]
    EmptyWorkbook { source_name: String },

    #[error("Sheet '{sheet}' not found in {source_name}")]
    SheetNotFound { source_name: String, sheet: String },

    #[error("Could not detect header row in {source_name}; expected keywords {keywords:?}")]
    HeaderNotFound {
        source_name: String,
        keywords: Vec<String>,
    },

    #[error("Missing required columns in {source_name}: {columns:?}")]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("No usable sheet in {source_name}: {message}")]
    NoUsableSheets {
        source_name: String,
        message: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CheckError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckError::WorkbookError(_)
            | CheckError::CsvError(_)
            | CheckError::UnsupportedFormat { .. }
            | CheckError::EmptyWorkbook { .. }
            | CheckError::SheetNotFound { .. }
            | CheckError::HeaderNotFound { .. }
            | CheckError::MissingColumns { .. }
            | CheckError::NoUsableSheets { .. } => ErrorCategory::Input,
            CheckError::TomlError(_)
            | CheckError::ConfigError { .. }
            | CheckError::ConfigValidationError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CheckError::SerializationError(_) | CheckError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            CheckError::IoError(_) | CheckError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CheckError::EmptyWorkbook { .. } | CheckError::NoUsableSheets { .. } => {
                ErrorSeverity::Medium
            }
            CheckError::IoError(_) | CheckError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckError::HeaderNotFound { source_name, keywords } => format!(
                "Could not find the header row in {}. Looked for: {}",
                source_name,
                keywords.join(", ")
            ),
            CheckError::MissingColumns { source_name, columns } => format!(
                "{} is missing required columns: {}",
                source_name,
                columns.join(", ")
            ),
            CheckError::UnsupportedFormat { path, .. } => {
                format!("{} is not a spreadsheet this tool can read", path)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => match self {
                CheckError::HeaderNotFound { .. } | CheckError::MissingColumns { .. } => {
                    "Check that the right file was uploaded for each side, or use a profile whose column names match this month's sheet"
                }
                CheckError::SheetNotFound { .. } => "List the workbook's sheets and pass an existing name",
                _ => "Re-export the spreadsheet as .xlsx or .csv and try again",
            },
            ErrorCategory::Configuration => "Fix the command-line arguments or the profile file",
            ErrorCategory::Processing => "Re-run with --verbose to see which rows caused the failure",
            ErrorCategory::System => "Check file permissions and free disk space for the output path",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
