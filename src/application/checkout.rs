use super::gateway::PaymentGateway;
use super::redirect::resolve_redirect;
use crate::crypto;
use crate::domain::order::{Order, OrderId};
use crate::domain::payment::{MinorUnits, PaymentRequestPayload};
use crate::domain::ports::NoticeSeverity;
use crate::domain::reference::MerchantPaymentReference;
use crate::error::{GatewayError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, error, info};
use url::Url;

pub const SELECT_BANK_NOTICE: &str = "Select your bank from the list provided";
pub const INITIATION_FAILED_NOTICE: &str = "Unable to initiate Wonderful Payments checkout, please try again or select another payment method.";

/// Where to send the payer after a successful `process_payment`.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectOutcome {
    pub redirect_url: Url,
    pub merchant_payment_reference: String,
}

impl PaymentGateway {
    /// Starts a payment for `order_id` with the bank the payer picked.
    ///
    /// Makes exactly one call to the provider (to obtain a `ref`) and never
    /// retries it. Any failure leaves a payer notice and returns the error;
    /// nothing is persisted locally.
    pub async fn process_payment(
        &self,
        order_id: OrderId,
        selected_bank: Option<&str>,
    ) -> Result<RedirectOutcome> {
        debug!(%order_id, "process_payment");

        let Some(bank) = selected_bank.map(str::trim).filter(|b| !b.is_empty()) else {
            self.notices
                .add_notice(SELECT_BANK_NOTICE, NoticeSeverity::Error)
                .await;
            return Err(GatewayError::ValidationError(
                "no bank selected".to_string(),
            ));
        };

        match self.initiate(order_id, bank).await {
            Ok(outcome) => {
                info!(
                    %order_id,
                    reference = %outcome.merchant_payment_reference,
                    bank,
                    "Redirecting payer to Wonderful Payments"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(%order_id, error = %e, "Unable to initiate Wonderful Payments checkout");
                self.notices
                    .add_notice(INITIATION_FAILED_NOTICE, NoticeSeverity::Error)
                    .await;
                Err(e)
            }
        }
    }

    async fn initiate(&self, order_id: OrderId, bank: &str) -> Result<RedirectOutcome> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(GatewayError::OrderNotFound(order_id))?;

        let reference = MerchantPaymentReference::generate(order.id);
        let payload = self.build_payload(&order, bank, &reference, Utc::now())?;

        // Local failures must surface before the provider creates a reference.
        let encrypted =
            crypto::encrypt(payload.to_json()?.as_bytes(), &self.settings.merchant_key)?;
        let provider_ref = self.provider.create_reference(&payload).await?;

        let redirect_url = resolve_redirect(&self.settings.hosted_ui, &encrypted, &provider_ref)?;

        Ok(RedirectOutcome {
            redirect_url,
            merchant_payment_reference: reference.to_string(),
        })
    }

    pub(crate) fn build_payload(
        &self,
        order: &Order,
        bank: &str,
        reference: &MerchantPaymentReference,
        consented_at: DateTime<Utc>,
    ) -> Result<PaymentRequestPayload> {
        if order.customer_ip.is_none() || order.customer_user_agent.is_none() {
            debug!(
                order_id = %order.id,
                has_ip = order.customer_ip.is_some(),
                has_user_agent = order.customer_user_agent.is_some(),
                "Order lacks client details, sending them empty"
            );
        }

        Ok(PaymentRequestPayload {
            amount: MinorUnits::from_major(order.total)?,
            client_browser_agent: order.customer_user_agent.clone().unwrap_or_default(),
            client_ip_address: order.customer_ip.clone().unwrap_or_default(),
            consented_at: consented_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            currency: self.settings.currency.clone(),
            customer_email_address: order.billing_email.clone(),
            is_plain_permalink: self.settings.plain_permalinks,
            merchant_payment_reference: reference.to_string(),
            order_id: order.id,
            plugin_id: self.settings.plugin_id.clone(),
            selected_aspsp: bank.to_string(),
            source: self.settings.source_tag(),
            woo_url: self.settings.site_url.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GatewaySettings, MerchantCredential};
    use crate::infrastructure::in_memory::{InMemoryNoticeSink, InMemoryOrderStore};
    use crate::infrastructure::http::WonderfulClient;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn gateway() -> PaymentGateway {
        let settings = GatewaySettings::new(
            MerchantCredential::new("merchant-token").unwrap(),
            Url::parse("https://api.provider.test").unwrap(),
            Url::parse("https://pay.provider.test").unwrap(),
            Url::parse("https://shop.example/").unwrap(),
        );
        let provider = WonderfulClient::new(&settings).unwrap();
        PaymentGateway::new(
            settings,
            Box::new(InMemoryOrderStore::new()),
            Box::new(provider),
            Box::new(InMemoryNoticeSink::new()),
        )
    }

    fn order() -> Order {
        let mut order = Order::new(
            OrderId(1042),
            dec!(19.99),
            "payer@example.com",
            Url::parse("https://shop.example/checkout/order-received/1042").unwrap(),
            Url::parse("https://shop.example/checkout/order-pay/1042").unwrap(),
        );
        order.customer_ip = Some("203.0.113.9".to_string());
        order.customer_user_agent = Some("Mozilla/5.0".to_string());
        order
    }

    #[test]
    fn test_build_payload() {
        let gateway = gateway();
        let reference = MerchantPaymentReference::parse("WOO-AB12CD-1042").unwrap();
        let consented_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        let payload = gateway
            .build_payload(&order(), "natwest", &reference, consented_at)
            .unwrap();

        assert_eq!(payload.amount.value(), 1999);
        assert_eq!(payload.currency, "GBP");
        assert_eq!(payload.client_ip_address, "203.0.113.9");
        assert_eq!(payload.client_browser_agent, "Mozilla/5.0");
        assert_eq!(payload.consented_at, "2024-03-01T12:30:00+00:00");
        assert_eq!(payload.merchant_payment_reference, "WOO-AB12CD-1042");
        assert_eq!(payload.order_id, OrderId(1042));
        assert_eq!(payload.selected_aspsp, "natwest");
        assert_eq!(payload.source, "woocommerce_0.6.0");
        assert_eq!(payload.plugin_id, "wonderful_payments_gateway");
        assert_eq!(payload.woo_url, "https://shop.example");
    }

    #[test]
    fn test_payload_wire_names() {
        let gateway = gateway();
        let reference = MerchantPaymentReference::parse("WOO-AB12CD-1042").unwrap();
        let payload = gateway
            .build_payload(&order(), "natwest", &reference, Utc::now())
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["amount"], 1999);
        assert_eq!(json["clientIpAddress"], "203.0.113.9");
        assert_eq!(json["clientBrowserAgent"], "Mozilla/5.0");
        assert_eq!(json["order_id"], 1042);
        assert_eq!(json["is_plain_permalink"], false);
        assert_eq!(json.as_object().unwrap().len(), 13);

        let query = payload.query_pairs();
        assert!(query.contains(&("is_plain_permalink", "0".to_string())));
        assert!(query.contains(&("amount", "1999".to_string())));
        assert_eq!(query.len(), 13);
    }

    #[test]
    fn test_missing_client_details_stay_on_the_wire() {
        let gateway = gateway();
        let mut order = order();
        order.customer_ip = None;
        order.customer_user_agent = None;
        let reference = MerchantPaymentReference::generate(order.id);

        let payload = gateway
            .build_payload(&order, "natwest", &reference, Utc::now())
            .unwrap();

        assert_eq!(payload.client_ip_address, "");
        assert_eq!(payload.client_browser_agent, "");
        let query = payload.query_pairs();
        assert!(query.contains(&("clientIpAddress", String::new())));
        assert!(query.contains(&("clientBrowserAgent", String::new())));
        assert_eq!(query.len(), 13);
    }

    #[test]
    fn test_negative_total_rejected() {
        let gateway = gateway();
        let mut order = order();
        order.total = dec!(-5);
        let reference = MerchantPaymentReference::generate(order.id);

        assert!(matches!(
            gateway.build_payload(&order, "natwest", &reference, Utc::now()),
            Err(GatewayError::ValidationError(_))
        ));
    }
}
