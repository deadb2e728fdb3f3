//! HTTP client for the Wonderful Payments API.

use crate::config::GatewaySettings;
use crate::domain::bank::{Bank, SupportedBanks};
use crate::domain::payment::{
    PaymentRequestPayload, PaymentStatusReport, ProviderRef, WonderfulPaymentId,
};
use crate::domain::ports::ProviderApi;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

#[derive(Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    reference: String,
}

/// `ProviderApi` over HTTPS, authenticated with the merchant key as a bearer
/// token on every request.
#[derive(Clone)]
pub struct WonderfulClient {
    client: Client,
    endpoint: Url,
}

impl WonderfulClient {
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            settings.merchant_key.expose()
        ))
        .map_err(|_| {
            GatewayError::ConfigurationError(
                "merchant key contains characters not allowed in a header".to_string(),
            )
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if !settings.verify_tls {
            warn!("TLS certificate verification is disabled for the provider API");
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|e| GatewayError::ConfigurationError(format!("http client: {e}")))?;

        Ok(Self::with_client(client, settings.endpoint.clone()))
    }

    /// Uses a preconfigured client. The client must already carry the
    /// `Authorization` header.
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::ConfigurationError(format!(
                    "endpoint {} cannot take a path",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            // The body may echo customer data; only the status is logged.
            error!(operation, status = status.as_u16(), "Wonderful Payments API error");
            return Err(GatewayError::ProviderStatus {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ProviderApi for WonderfulClient {
    async fn create_reference(&self, payload: &PaymentRequestPayload) -> Result<ProviderRef> {
        let url = self.url(&["v2", "ref"])?;
        debug!(order_id = %payload.order_id, "Requesting payment reference");

        let response = self
            .client
            .get(url)
            .query(&payload.query_pairs())
            .send()
            .await?;
        let body: RefResponse = Self::read_json("create_reference", response).await?;
        ProviderRef::new(body.reference)
    }

    async fn payment_status(&self, payment_id: &WonderfulPaymentId) -> Result<PaymentStatusReport> {
        let url = self.url(&["v2", "woo", payment_id.as_str()])?;
        debug!(wonderful_payment_id = %payment_id, "Fetching payment status");

        let response = self.client.get(url).send().await?;
        Self::read_json("payment_status", response).await
    }

    async fn supported_banks(&self) -> Result<Vec<Bank>> {
        let url = self.url(&["v2", "supported-banks"])?;

        let response = self.client.get(url).send().await?;
        let body: SupportedBanks = Self::read_json("supported_banks", response).await?;
        Ok(body.data)
    }
}
