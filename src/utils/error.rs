use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Rate source returned HTTP {status} for {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Rate data error: {message}")]
    DataError { message: String },

    #[error("Start date {date} is not a selectable quarter start")]
    StartDateError { date: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SwapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SwapError::ApiError(_) | SwapError::HttpStatusError { .. } => ErrorCategory::Network,
            SwapError::CsvError(_)
            | SwapError::DataError { .. }
            | SwapError::StartDateError { .. }
            | SwapError::SerializationError(_) => ErrorCategory::Data,
            SwapError::ConfigValidationError { .. } | SwapError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SwapError::IoError(_) | SwapError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SwapError::ApiError(_) | SwapError::HttpStatusError { .. } => {
                "Check the rate source URL and your network connection, then retry".to_string()
            }
            SwapError::CsvError(_) | SwapError::DataError { .. } => {
                "Make sure the rate file has 'Date' (dd.mm.yyyy), '3M' and '6M' columns"
                    .to_string()
            }
            SwapError::StartDateError { .. } => {
                "Run with --list-start-dates to see the quarter starts available for this data"
                    .to_string()
            }
            SwapError::ConfigValidationError { field, .. }
            | SwapError::InvalidConfigValueError { field, .. } => {
                format!("Review the value of '{}' in the configuration", field)
            }
            SwapError::IoError(_) | SwapError::ZipError(_) => {
                "Check file paths and write permissions for the output directory".to_string()
            }
            SwapError::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download rate data: {}", self),
            ErrorCategory::Data => format!("Rate data problem: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度對應的程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;
