use thiserror::Error;

/// Reporting API 回傳的暫時性錯誤狀態碼
pub const TRANSIENT_STATUS: u16 = 503;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Transient server error (HTTP {status}): {message}")]
    TransientServerError { status: u16, message: String },

    #[error("Analytics request failed{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    FatalRequestError { status: Option<u16>, message: String },

    #[error("HTTP transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Configuration,
    Data,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalyticsError {
    /// 依狀態碼分類 HTTP 錯誤：503 可重試，其餘皆為致命
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == TRANSIENT_STATUS {
            AnalyticsError::TransientServerError { status, message }
        } else {
            AnalyticsError::FatalRequestError {
                status: Some(status),
                message,
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AnalyticsError::TransientServerError { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AnalyticsError::TransientServerError { status, .. } => Some(*status),
            AnalyticsError::FatalRequestError { status, .. } => *status,
            AnalyticsError::TransportError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalyticsError::AuthenticationError { .. } => ErrorCategory::Authentication,
            AnalyticsError::TransientServerError { .. }
            | AnalyticsError::FatalRequestError { .. }
            | AnalyticsError::TransportError(_) => ErrorCategory::Network,
            AnalyticsError::ConfigError { .. }
            | AnalyticsError::MissingConfigError { .. }
            | AnalyticsError::InvalidConfigValueError { .. }
            | AnalyticsError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AnalyticsError::CsvError(_)
            | AnalyticsError::SerializationError(_)
            | AnalyticsError::ProcessingError { .. }
            | AnalyticsError::ValidationError { .. } => ErrorCategory::Data,
            AnalyticsError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network if self.is_transient() => ErrorSeverity::Medium,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Authentication
            | ErrorCategory::Configuration
            | ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Authentication => {
                "Check the service account email and private key, and that the account can read the profile"
            }
            ErrorCategory::Network if self.status() == Some(TRANSIENT_STATUS) => {
                "The analytics service is temporarily unavailable; run the report again later"
            }
            ErrorCategory::Network => {
                "Check the API endpoint, profile id and network connectivity"
            }
            ErrorCategory::Configuration => "Fix the configuration file and try again",
            ErrorCategory::Data => {
                "The analytics response or lookup file has unexpected content; inspect it with --verbose"
            }
            ErrorCategory::Io => "Check that the paths exist and are writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Authentication => format!("Could not authenticate with analytics: {}", self),
            ErrorCategory::Network => format!("Fetching pageviews failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Could not process analytics data: {}", self),
            ErrorCategory::Io => format!("File operation failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
