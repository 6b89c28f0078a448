//! Error types for the onboarding wizard.

use rust_decimal::Decimal;

/// Top-level error type for the wizard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the wizard's HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Server rejected {endpoint} ({status}): {message}")]
    Rejected {
        endpoint: String,
        status: u16,
        /// The `msg` field from the error payload, empty when absent.
        message: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// The message to surface to the user: the server-provided `msg` when
    /// the payload carried one, otherwise the per-action fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Client-side validation failures. These block a submission before any
/// network call is made and are never stored as the session error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Phone number must be exactly 10 digits")]
    InvalidPhone,

    #[error("OTP must be exactly 6 digits")]
    IncompleteOtp,

    #[error("City is required")]
    MissingCity,

    #[error("Location has not been set; use device location or enter coordinates")]
    LocationUnset,

    #[error("Minimum budget {min} cannot be greater than maximum budget {max}")]
    BudgetRange { min: Decimal, max: Decimal },

    #[error("Selling price {selling_price} cannot be greater than MRP {mrp}")]
    PriceAboveMrp { mrp: Decimal, selling_price: Decimal },

    #[error("Expiry date is required for FMCG products")]
    MissingExpiry,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("A base plan must be selected")]
    MissingBasePlan,

    #[error("No address has been created for this session")]
    AddressNotCreated,

    #[error("No ad has been created for this session")]
    AdNotCreated,
}

/// Media upload errors. Each affects only the slot it occurred on.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to get upload signature: {0}")]
    Signature(String),

    #[error("Upload failed: {0}")]
    Transfer(String),

    #[error("Unsupported file type for this slot: {name}")]
    UnsupportedType { name: String },

    #[error("File is {size} bytes, over the {limit} byte limit for this slot")]
    TooLarge { size: u64, limit: u64 },

    #[error("Image slot index {0} is out of range (0..3)")]
    SlotOutOfRange(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bulk import errors. A failed import never mutates session state.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Import document must be a JSON object")]
    NotAnObject,
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
