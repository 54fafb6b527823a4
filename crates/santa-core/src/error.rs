//! Error types for santa

use thiserror::Error;

/// Result type alias using santa's Error
pub type Result<T> = std::result::Result<T, Error>;

/// santa error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E100-E199)
    #[error("Malformed participant list: {0}")]
    MalformedInput(String),

    #[error("Participant '{0}' appears more than once. Names must be unique.")]
    DuplicateParticipant(String),

    #[error("Participant '{participant}' excludes '{reference}', who is not in the list.")]
    UnknownParticipantReference {
        participant: String,
        reference: String,
    },

    #[error("Message template error: {0}")]
    TemplateError(String),

    // Draw errors (E200-E299)
    #[error("No valid assignment found: {0}")]
    ConstraintUnsatisfiable(String),

    // Delivery errors (E300-E399)
    #[error("Could not notify '{participant}': {reason}")]
    DeliveryFailure { participant: String, reason: String },

    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    // Config errors (E400-E499)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "E100",
            Self::DuplicateParticipant(_) => "E101",
            Self::UnknownParticipantReference { .. } => "E102",
            Self::TemplateError(_) => "E103",
            Self::ConstraintUnsatisfiable(_) => "E200",
            Self::DeliveryFailure { .. } => "E300",
            Self::NetworkError(_) => "E301",
            Self::ConfigError(_) => "E400",
            Self::Io(_) => "E900",
        }
    }

    /// Stage of a run this error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MalformedInput(_)
            | Self::DuplicateParticipant(_)
            | Self::UnknownParticipantReference { .. }
            | Self::TemplateError(_) => "load",
            Self::ConstraintUnsatisfiable(_) => "draw",
            Self::DeliveryFailure { .. } | Self::NetworkError(_) => "notify",
            Self::ConfigError(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MalformedInput(_) => Some(
                r#"Expected a JSON array like [{"name": "X", "not_allowed": ["Y"], "email": "x@y.com"}]"#
                    .to_string(),
            ),
            Self::DuplicateParticipant(name) => {
                Some(format!("Give each '{}' a distinguishing name", name))
            }
            Self::UnknownParticipantReference { reference, .. } => Some(format!(
                "Add '{}' to the list or remove it from the exclusions",
                reference
            )),
            Self::ConstraintUnsatisfiable(_) => {
                Some("Remove some exclusions or add more participants".to_string())
            }
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::ConfigError(_) => Some("Check the [mail] section of config.toml".to_string()),
            _ => None,
        }
    }
}
