use crate::domain::order::OrderId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Provider transport error: {0}")]
    TransportError(String),
    #[error("Provider responded with HTTP {status}")]
    ProviderStatus { status: u16 },
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("Malformed merchant payment reference: {0}")]
    MalformedReference(String),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Order store error: {0}")]
    StoreError(String),
    #[error("Encryption error: {0}")]
    EncryptionError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        // Query strings carry customer data, keep them out of the message.
        let err = err.without_url();
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::ProviderStatus {
                status: status.as_u16(),
            }
        } else {
            Self::TransportError(err.to_string())
        }
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

impl GatewayError {
    /// True for failures of the remote provider call itself, as opposed to
    /// local validation, configuration, or correlation problems.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportError(_) | Self::ProviderStatus { .. } | Self::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
