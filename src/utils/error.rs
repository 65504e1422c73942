use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Total credit hours are zero, nothing to average")]
    DivisionByZero,

    #[error("Validation error: {message}")]
    ValidationError { message: String, rows: Vec<usize> },

    #[error("Row {index} is locked")]
    RowLocked { index: usize },

    #[error("Row {index} does not exist (collection has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("'{operation}' is not available in {mode} mode")]
    ModeMismatch { operation: String, mode: String },

    #[error("No calculated result available")]
    NotCalculated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Calculation,
    Input,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GradeError {
    pub fn validation(message: impl Into<String>, rows: Vec<usize>) -> Self {
        Self::ValidationError {
            message: message.into(),
            rows,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Io,
            Self::CsvError(_) => ErrorCategory::Export,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::DivisionByZero | Self::ValidationError { .. } | Self::NotCalculated => {
                ErrorCategory::Calculation
            }
            Self::RowLocked { .. } | Self::RowOutOfRange { .. } | Self::ModeMismatch { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RowLocked { .. } | Self::RowOutOfRange { .. } | Self::ModeMismatch { .. } => {
                ErrorSeverity::Low
            }
            Self::DivisionByZero | Self::ValidationError { .. } | Self::NotCalculated => {
                ErrorSeverity::Medium
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::CsvError(_) => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("Could not read or write a file: {}", e),
            Self::SerializationError(_) => "The saved session could not be read".to_string(),
            Self::CsvError(_) => "The grade sheet could not be written".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::ConfigValidationError { field, message } => {
                format!("Setting '{}' could not be parsed: {}", field, message)
            }
            Self::DivisionByZero => "Enter at least one row with credit hours".to_string(),
            Self::ValidationError { message, .. } => message.clone(),
            Self::RowLocked { index } => {
                format!("Row {} is locked, unlock it before editing", index + 1)
            }
            Self::RowOutOfRange { index, .. } => format!("Row {} does not exist", index + 1),
            Self::ModeMismatch { operation, mode } => {
                format!("Cannot {} while in {} mode", operation, mode)
            }
            Self::NotCalculated => "Calculate the result before exporting".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the path exists and is writable",
            Self::SerializationError(_) => "Delete or repair the session file and start over",
            Self::CsvError(_) => "Check the export directory and try again",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => {
                "Review the policy file against the documented defaults"
            }
            Self::DivisionByZero => "Add a subject or semester with credit hours",
            Self::ValidationError { .. } => {
                "Fix the highlighted rows: marks 0-100, credits within the allowed range"
            }
            Self::RowLocked { .. } => "Unlock the row first",
            Self::RowOutOfRange { .. } => "Pick an existing row",
            Self::ModeMismatch { .. } => "Switch the CGPA mode first",
            Self::NotCalculated => "Run the calculation, then export",
        }
    }
}

pub type Result<T> = std::result::Result<T, GradeError>;
