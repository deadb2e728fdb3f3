use crate::domain::order::OrderId;
use crate::error::{GatewayError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount in integer minor currency units (pence for GBP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Converts a major-unit total into minor units, rounding half away from zero.
    pub fn from_major(total: Decimal) -> Result<Self> {
        if total.is_sign_negative() && !total.is_zero() {
            return Err(GatewayError::ValidationError(
                "Order total must not be negative".to_string(),
            ));
        }
        total
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or_else(|| {
                GatewayError::ValidationError("Order total is out of range".to_string())
            })
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// The record handed to the provider for one checkout attempt.
///
/// Built once per `process_payment` call, encrypted into the redirect and sent
/// as query parameters to the reference endpoint, then dropped. Field names
/// are the provider's wire names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequestPayload {
    pub amount: MinorUnits,
    #[serde(rename = "clientBrowserAgent")]
    pub client_browser_agent: String,
    #[serde(rename = "clientIpAddress")]
    pub client_ip_address: String,
    pub consented_at: String,
    pub currency: String,
    pub customer_email_address: String,
    pub is_plain_permalink: bool,
    pub merchant_payment_reference: String,
    pub order_id: OrderId,
    pub plugin_id: String,
    pub selected_aspsp: String,
    pub source: String,
    pub woo_url: String,
}

impl PaymentRequestPayload {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| GatewayError::EncryptionError(format!("payload serialization: {e}")))
    }

    /// Query-string form of the payload, with booleans as `1`/`0` the way the
    /// provider's form decoder expects them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("amount", self.amount.value().to_string()),
            ("clientBrowserAgent", self.client_browser_agent.clone()),
            ("clientIpAddress", self.client_ip_address.clone()),
            ("consented_at", self.consented_at.clone()),
            ("currency", self.currency.clone()),
            ("customer_email_address", self.customer_email_address.clone()),
            (
                "is_plain_permalink",
                if self.is_plain_permalink { "1" } else { "0" }.to_string(),
            ),
            (
                "merchant_payment_reference",
                self.merchant_payment_reference.clone(),
            ),
            ("order_id", self.order_id.to_string()),
            ("plugin_id", self.plugin_id.clone()),
            ("selected_aspsp", self.selected_aspsp.clone()),
            ("source", self.source.clone()),
            ("woo_url", self.woo_url.clone()),
        ]
    }
}

/// The opaque reference issued by the provider's `/v2/ref` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRef(String);

impl ProviderRef {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(GatewayError::MalformedResponse(
                "provider returned an empty ref".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The provider's identifier for a payment, as delivered on callbacks.
///
/// Restricted to `[A-Za-z0-9_-]` because it is interpolated into the status
/// lookup path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WonderfulPaymentId(String);

impl WonderfulPaymentId {
    pub fn new(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(GatewayError::ValidationError(
                "wonderfulPaymentId is empty".to_string(),
            ));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(GatewayError::ValidationError(
                "wonderfulPaymentId contains invalid characters".to_string(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WonderfulPaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment status as reported by the provider. Untrusted input.
///
/// Values this crate does not know are kept verbatim in `Unknown` so new
/// provider states never fail deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ProviderPaymentStatus {
    Completed,
    Accepted,
    Pending,
    Rejected,
    Cancelled,
    Errored,
    Expired,
    Unknown(String),
}

impl From<String> for ProviderPaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "completed" => Self::Completed,
            "accepted" => Self::Accepted,
            "pending" => Self::Pending,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            "errored" => Self::Errored,
            "expired" => Self::Expired,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for ProviderPaymentStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl ProviderPaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Accepted => "accepted",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Errored => "errored",
            Self::Expired => "expired",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ProviderPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `GET /v2/woo/{wonderfulPaymentId}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentStatusReport {
    #[serde(rename = "paymentReference")]
    pub payment_reference: String,
    #[serde(rename = "wonderfulPaymentsId")]
    pub wonderful_payments_id: String,
    pub status: ProviderPaymentStatus,
    #[serde(rename = "selectedAspsp", default)]
    pub selected_aspsp: Option<String>,
}
