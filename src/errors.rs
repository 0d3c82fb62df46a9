/*!
 * Error types for the nexus-translator application.
 *
 * This module contains custom error types for the provider seam, the
 * translation store, the bulk driver and local input validation,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The response parsed but did not carry a `translated_content` object
    #[error("Response violates the output schema: {0}")]
    SchemaViolation(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised by the translation store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the given id or key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A record with the same translation key already exists
    #[error("Duplicate translation key: {0}")]
    DuplicateKey(String),

    /// Refused to persist a translation into the source language
    #[error("Target language '{0}' is the source language")]
    SourceLanguageTarget(String),

    /// Stored content could not be decoded
    #[error("Invalid stored content: {0}")]
    InvalidContent(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}

// Typed store errors raised inside database closures survive the anyhow round trip
impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<StoreError>() {
            Ok(store_error) => store_error,
            Err(other) => Self::Database(format!("{:#}", other)),
        }
    }
}

/// Errors that prevent a bulk run from starting
#[derive(Error, Debug)]
pub enum DriverError {
    /// This process already has a run in progress
    #[error("A bulk translation run is already in progress")]
    AlreadyRunning,

    /// Another run holds the store lease
    #[error("Bulk run lease is held by {holder} until {expires_at}")]
    LeaseHeld {
        /// Lease holder id
        holder: String,
        /// Lease expiry timestamp (RFC 3339)
        expires_at: String,
    },

    /// The initial snapshot or lease bookkeeping failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors for user-supplied content, caught before anything reaches the store
#[derive(Error, Debug)]
pub enum InputError {
    /// Input is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Input is valid JSON but not an object
    #[error("Content must be a JSON object")]
    NotAnObject,

    /// A value is neither a string, a string array nor a nested object
    #[error("Unsupported value at '{path}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending value
        path: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Translation key could not be built or parsed
    #[error("Invalid translation key: {0}")]
    InvalidKey(String),
}

/// Errors that can occur while translating a single section
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error while persisting the translation
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The unit cannot be addressed by a translation key
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error starting a run
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Rejected user input
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
