use super::gateway::{CallbackResponse, PaymentGateway};
use super::transition::{OrderAction, RedirectTarget, Transition};
use crate::domain::order::OrderId;
use crate::domain::payment::{PaymentStatusReport, WonderfulPaymentId};
use crate::domain::reference::order_id_from_reference;
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Deserialize)]
struct WebhookQuery {
    #[serde(rename = "wonderfulPaymentId")]
    wonderful_payment_id: Option<String>,
}

/// A status callback from the provider.
///
/// Only the payment identifier is read from the request; the status itself is
/// always fetched from the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRequest {
    pub payment_id: WonderfulPaymentId,
}

impl WebhookRequest {
    pub fn new(payment_id: WonderfulPaymentId) -> Self {
        Self { payment_id }
    }

    /// Parses the callback's query string (without the leading `?`).
    pub fn from_query(query: &str) -> Result<Self> {
        let query: WebhookQuery = serde_urlencoded::from_str(query)
            .map_err(|e| GatewayError::ValidationError(format!("invalid webhook query: {e}")))?;
        let raw = query.wonderful_payment_id.ok_or_else(|| {
            GatewayError::ValidationError("missing wonderfulPaymentId".to_string())
        })?;
        Ok(Self::new(WonderfulPaymentId::new(&raw)?))
    }
}

/// The provider's view of a payment, correlated with an order.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPreview {
    pub order_id: OrderId,
    pub report: PaymentStatusReport,
    pub transition: Transition,
}

impl PaymentGateway {
    /// Handles the provider's status callback.
    ///
    /// Every failure ends in [`CallbackResponse::Error`] without touching the
    /// order beyond what already happened; the provider is expected to retry.
    pub async fn webhook(&self, query: &str) -> CallbackResponse {
        debug!("webhook fired");

        let request = match WebhookRequest::from_query(query) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting webhook");
                return CallbackResponse::Error;
            }
        };

        match self.reconcile(&request).await {
            Ok(url) => CallbackResponse::Redirect(url),
            Err(e) => {
                error!(
                    wonderful_payment_id = %request.payment_id,
                    error = %e,
                    "Webhook processing aborted"
                );
                CallbackResponse::Error
            }
        }
    }

    /// Fetches the authoritative status for a payment and works out which
    /// order it belongs to and what would happen to it. Changes nothing.
    pub async fn preview_status(&self, payment_id: &WonderfulPaymentId) -> Result<StatusPreview> {
        let report = self.provider.payment_status(payment_id).await?;
        if report.wonderful_payments_id != payment_id.as_str() {
            warn!(
                requested = %payment_id,
                reported = %report.wonderful_payments_id,
                "Provider reported a different payment id"
            );
        }

        let order_id = order_id_from_reference(&report.payment_reference)?;
        let transition = Transition::for_status(&report.status);
        Ok(StatusPreview {
            order_id,
            report,
            transition,
        })
    }

    /// Fetches the authoritative status for the payment, finds its order and
    /// applies one transition. Returns where to send the payer.
    ///
    /// Safe to call repeatedly for the same payment: each call adds one audit
    /// note, and the store absorbs repeated transitions.
    pub async fn reconcile(&self, request: &WebhookRequest) -> Result<Url> {
        let StatusPreview {
            order_id,
            report,
            transition,
        } = self.preview_status(&request.payment_id).await?;

        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(GatewayError::OrderNotFound(order_id))?;

        self.orders
            .add_note(
                order_id,
                &format!(
                    "Payment Update. Wonderful Payments ID: {}, Status: {}",
                    report.wonderful_payments_id, report.status
                ),
            )
            .await?;

        let mut notice = transition.notice;
        let mut redirect = transition.redirect;
        match &transition.action {
            OrderAction::CompletePayment if order.status.is_paid() => {
                debug!(%order_id, "Order already paid, completion skipped");
            }
            OrderAction::CompletePayment => {
                self.orders
                    .add_note(
                        order_id,
                        &format!(
                            "Payment Success. Order reference: {}, Customer Bank: {}",
                            report.payment_reference,
                            report.selected_aspsp.as_deref().unwrap_or("unknown")
                        ),
                    )
                    .await?;
                self.orders
                    .mark_payment_complete(order_id, &report.payment_reference)
                    .await?;
            }
            OrderAction::SetStatus { status, reason } => {
                if !self.orders.update_status(order_id, *status, reason).await? {
                    warn!(
                        %order_id,
                        current = %order.status,
                        target = %status,
                        "Order store rejected status transition"
                    );
                    // The snapshot may predate a concurrent completion.
                    let paid = self
                        .orders
                        .get(order_id)
                        .await?
                        .is_some_and(|current| current.status.is_paid());
                    if paid {
                        notice = None;
                        redirect = RedirectTarget::ReturnPage;
                    }
                }
            }
        }

        if let Some(notice) = notice {
            self.notices.add_notice(notice.message, notice.severity).await;
        }

        info!(
            %order_id,
            wonderful_payment_id = %request.payment_id,
            status = %report.status,
            target = %transition.target_status(),
            "Payment status reconciled"
        );

        Ok(match redirect {
            RedirectTarget::ReturnPage => order.return_url,
            RedirectTarget::CheckoutPayment => order.checkout_payment_url,
        })
    }
}
