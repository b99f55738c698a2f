use thiserror::Error;

use ifstats_bridge_framework::BridgeError;

/// Result type alias using [`PollError`].
pub type Result<T> = std::result::Result<T, PollError>;

/// Errors raised while polling one device.
#[derive(Debug, Error)]
pub enum PollError {
    /// A field expected to be numeric did not parse.
    #[error("Malformed value for {field}: {value:?}")]
    MalformedValue { field: String, value: String },

    /// An OID string could not be parsed.
    #[error("Invalid OID '{0}'")]
    InvalidOid(String),

    /// The SNMP session could not be opened.
    #[error("SNMP session to {host} failed: {message}")]
    Session { host: String, message: String },

    /// A walk request failed.
    #[error("SNMP walk of {subtree} failed: {message}")]
    Walk { subtree: String, message: String },

    /// A request received no response in time.
    #[error("SNMP request to {host} timed out")]
    Timeout { host: String },

    /// Handing results to the broker failed.
    #[error(transparent)]
    Publish(#[from] BridgeError),
}

impl PollError {
    /// Create a malformed value error.
    pub fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedValue {
            field: field.into(),
            value: value.into(),
        }
    }
}
