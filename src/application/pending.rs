use super::gateway::{CallbackResponse, PaymentGateway};
use crate::domain::order::{OrderId, OrderStatus};
use crate::domain::payment::WonderfulPaymentId;
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use tracing::{debug, error, warn};

#[derive(Deserialize)]
struct PendingQuery {
    #[serde(rename = "wonderfulPaymentId")]
    wonderful_payment_id: Option<String>,
    order_id: Option<String>,
}

/// The provider's "payment created" callback. Neither field is verified
/// against the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub payment_id: WonderfulPaymentId,
    pub order_id: OrderId,
}

impl PendingRequest {
    pub fn from_query(query: &str) -> Result<Self> {
        let query: PendingQuery = serde_urlencoded::from_str(query)
            .map_err(|e| GatewayError::ValidationError(format!("invalid pending query: {e}")))?;

        let (Some(payment_id), Some(order_id)) = (query.wonderful_payment_id, query.order_id)
        else {
            return Err(GatewayError::ValidationError(
                "wonderfulPaymentId and order_id are required".to_string(),
            ));
        };
        let order_id = order_id
            .trim()
            .parse::<OrderId>()
            .map_err(|_| GatewayError::ValidationError(format!("invalid order_id {order_id:?}")))?;

        Ok(Self {
            payment_id: WonderfulPaymentId::new(&payment_id)?,
            order_id,
        })
    }
}

impl PaymentGateway {
    /// Handles the provider's "payment created" callback. Best effort.
    pub async fn payment_pending(&self, query: &str) -> CallbackResponse {
        debug!("payment_pending fired");

        let request = match PendingRequest::from_query(query) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting pending notification");
                return CallbackResponse::Error;
            }
        };

        match self.mark_pending(&request).await {
            Ok(()) => CallbackResponse::Acknowledged,
            Err(e) => {
                error!(
                    order_id = %request.order_id,
                    wonderful_payment_id = %request.payment_id,
                    error = %e,
                    "Pending notification failed"
                );
                CallbackResponse::Error
            }
        }
    }

    /// Moves the order to `pending` and notes the provider payment id.
    ///
    /// A refused transition is logged and swallowed.
    pub async fn mark_pending(&self, request: &PendingRequest) -> Result<()> {
        let order_id = request.order_id;
        if self.orders.get(order_id).await?.is_none() {
            return Err(GatewayError::OrderNotFound(order_id));
        }

        if self
            .orders
            .update_status(order_id, OrderStatus::Pending, "")
            .await?
        {
            self.orders
                .add_note(
                    order_id,
                    &format!("Payment Created - Wonderful Payments ID:{}", request.payment_id),
                )
                .await?;
        } else {
            error!(%order_id, "Order status update failed");
        }
        Ok(())
    }
}
