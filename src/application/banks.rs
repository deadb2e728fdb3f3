use super::checkout::INITIATION_FAILED_NOTICE;
use super::gateway::PaymentGateway;
use crate::domain::bank::Bank;
use crate::domain::ports::NoticeSeverity;
use crate::error::{GatewayError, Result};
use tracing::{debug, error};

pub const CONNECT_FAILED_NOTICE: &str =
    "Unable to connect to Wonderful Payments, please try again or select another payment method.";

impl PaymentGateway {
    /// All banks the provider supports, fetched once per gateway.
    ///
    /// Failures are not cached; the next call asks the provider again.
    pub async fn supported_banks(&self) -> Result<Vec<Bank>> {
        if let Some(banks) = self.banks.read().await.as_ref() {
            return Ok(banks.clone());
        }

        // Held across the fetch so concurrent callers wait for one request.
        let mut cache = self.banks.write().await;
        if let Some(banks) = cache.as_ref() {
            return Ok(banks.clone());
        }

        debug!("Fetching supported banks");
        match self.provider.supported_banks().await {
            Ok(banks) => {
                *cache = Some(banks.clone());
                Ok(banks)
            }
            Err(e) => {
                let notice = match &e {
                    GatewayError::TransportError(_) => {
                        error!(error = %e, "Unable to connect to Wonderful Payments");
                        CONNECT_FAILED_NOTICE
                    }
                    _ => {
                        error!(error = %e, "Unable to load supported banks");
                        INITIATION_FAILED_NOTICE
                    }
                };
                self.notices.add_notice(notice, NoticeSeverity::Error).await;
                Err(e)
            }
        }
    }

    /// Banks the payer can pick right now (those reported `online`).
    pub async fn selectable_banks(&self) -> Result<Vec<Bank>> {
        Ok(self
            .supported_banks()
            .await?
            .into_iter()
            .filter(Bank::is_selectable)
            .collect())
    }
}
