use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{method} {url} returned HTTP {status}: {body}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed payload: {message}")]
    PayloadError { message: String },
}

impl GateError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            GateError::ConfigError { .. }
                | GateError::MissingConfigError { .. }
                | GateError::InvalidConfigValueError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GateError::ApiError(_) => "Could not reach the GitHub API".to_string(),
            GateError::HttpStatus { status, url, .. } => match status {
                401 => "GitHub rejected the token (401 Unauthorized)".to_string(),
                403 => format!("GitHub refused access to {} (403 Forbidden)", url),
                404 => format!("GitHub resource not found: {}", url),
                _ => format!("GitHub returned HTTP {} for {}", status, url),
            },
            GateError::IoError(e) => format!("File access failed: {}", e),
            GateError::SerializationError(e) => format!("Unexpected response shape: {}", e),
            GateError::ConfigError { message } => format!("Configuration problem: {}", message),
            GateError::MissingConfigError { field } => format!("{} is not set", field),
            GateError::InvalidConfigValueError { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
            GateError::PayloadError { message } => format!("Event payload problem: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GateError::ApiError(_) => "Check network access and the --api-url setting",
            GateError::HttpStatus { status: 401, .. } => "Provide a valid token via GITHUB_TOKEN",
            GateError::HttpStatus { status: 403, .. } => {
                "Grant the token pull-requests:write and issues:write permissions"
            }
            GateError::HttpStatus { .. } => "Re-run later; the next run picks up where this one stopped",
            GateError::IoError(_) => "Verify the file path exists and is readable",
            GateError::SerializationError(_) | GateError::PayloadError { .. } => {
                "Make sure the payload is a pull_request event"
            }
            GateError::ConfigError { .. }
            | GateError::MissingConfigError { .. }
            | GateError::InvalidConfigValueError { .. } => {
                "Review the flags, environment variables and config file"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
