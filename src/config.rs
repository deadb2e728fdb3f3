use crate::error::{GatewayError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable prefix, e.g. `WONDERFUL_MERCHANT_KEY`.
pub const ENV_PREFIX: &str = "WONDERFUL";

/// The merchant token issued by Wonderful Payments.
///
/// Used both as the API bearer token and as the payload encryption key. The
/// value is only reachable through `expose`, and `Debug` is redacted.
#[derive(Clone)]
pub struct MerchantCredential(SecretString);

impl MerchantCredential {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value: String = value.into();
        if value.trim().is_empty() {
            return Err(GatewayError::ConfigurationError(
                "merchant key is not configured".to_string(),
            ));
        }
        Ok(Self(SecretString::from(value)))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for MerchantCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MerchantCredential([REDACTED])")
    }
}

fn default_currency() -> String {
    "GBP".to_string()
}

fn default_plugin_id() -> String {
    "wonderful_payments_gateway".to_string()
}

fn default_integration_version() -> String {
    "0.6.0".to_string()
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

/// Settings as they appear in the config file and environment.
#[derive(Deserialize)]
struct RawSettings {
    merchant_key: String,
    endpoint: String,
    hosted_ui: String,
    site_url: String,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default = "default_plugin_id")]
    plugin_id: String,
    #[serde(default = "default_integration_version")]
    integration_version: String,
    #[serde(default)]
    plain_permalinks: bool,
    #[serde(default = "default_verify_tls")]
    verify_tls: bool,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub merchant_key: MerchantCredential,
    /// Base URL of the provider API, e.g. `https://api.example`.
    pub endpoint: Url,
    /// Base URL of the provider's hosted payment pages.
    pub hosted_ui: Url,
    /// The merchant's storefront URL, sent as `woo_url`.
    pub site_url: Url,
    /// Settlement currency. All payloads carry this code.
    pub currency: String,
    pub plugin_id: String,
    pub integration_version: String,
    /// Whether the storefront uses plain (query-string) permalinks.
    pub plain_permalinks: bool,
    /// Only ever disable this against a controlled test provider.
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl GatewaySettings {
    /// Settings with defaults for everything but the required values.
    pub fn new(
        merchant_key: MerchantCredential,
        endpoint: Url,
        hosted_ui: Url,
        site_url: Url,
    ) -> Self {
        Self {
            merchant_key,
            endpoint,
            hosted_ui,
            site_url,
            currency: default_currency(),
            plugin_id: default_plugin_id(),
            integration_version: default_integration_version(),
            plain_permalinks: false,
            verify_tls: default_verify_tls(),
            timeout: Duration::from_secs(default_timeout_secs()),
        }
    }

    /// Loads settings from an optional TOML file, overridden by `WONDERFUL_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let raw: RawSettings = builder
            // No `try_parsing`: a numeric-looking merchant key must stay a string.
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        Self::try_from(raw)
    }

    /// The `source` tag sent with every payload.
    pub fn source_tag(&self) -> String {
        format!("woocommerce_{}", self.integration_version)
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| {
        GatewayError::ConfigurationError(format!("{field} is not a valid URL: {e}"))
    })?;
    if url.cannot_be_a_base() {
        return Err(GatewayError::ConfigurationError(format!(
            "{field} must be an absolute http(s) URL"
        )));
    }
    Ok(url)
}

impl TryFrom<RawSettings> for GatewaySettings {
    type Error = GatewayError;

    fn try_from(raw: RawSettings) -> Result<Self> {
        if raw.currency.len() != 3 || !raw.currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(GatewayError::ConfigurationError(format!(
                "currency must be an ISO 4217 code, got {:?}",
                raw.currency
            )));
        }
        if raw.timeout_secs == 0 {
            return Err(GatewayError::ConfigurationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            merchant_key: MerchantCredential::new(raw.merchant_key)?,
            endpoint: parse_url("endpoint", &raw.endpoint)?,
            hosted_ui: parse_url("hosted_ui", &raw.hosted_ui)?,
            site_url: parse_url("site_url", &raw.site_url)?,
            currency: raw.currency,
            plugin_id: raw.plugin_id,
            integration_version: raw.integration_version,
            plain_permalinks: raw.plain_permalinks,
            verify_tls: raw.verify_tls,
            timeout: Duration::from_secs(raw.timeout_secs),
        })
    }
}
