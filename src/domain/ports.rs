use super::bank::Bank;
use super::order::{Order, OrderId, OrderStatus};
use super::payment::{PaymentRequestPayload, PaymentStatusReport, ProviderRef, WonderfulPaymentId};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// The storefront's order records.
///
/// Implementations own and serialize access to orders; the gateway never
/// assumes exclusive access and may call any method more than once for the
/// same order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;
    async fn add_note(&self, order_id: OrderId, note: &str) -> Result<()>;
    /// Returns `false` when the store refuses the transition.
    async fn update_status(&self, order_id: OrderId, status: OrderStatus, reason: &str)
    -> Result<bool>;
    async fn mark_payment_complete(&self, order_id: OrderId, reference: &str) -> Result<()>;
}

/// The Wonderful Payments HTTP API.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    async fn create_reference(&self, payload: &PaymentRequestPayload) -> Result<ProviderRef>;
    async fn payment_status(&self, payment_id: &WonderfulPaymentId) -> Result<PaymentStatusReport>;
    async fn supported_banks(&self) -> Result<Vec<Bank>>;
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Error,
    Notice,
    Success,
}

/// Payer-visible flash messages.
#[async_trait]
pub trait NoticeSink: Send + Sync {
    async fn add_notice(&self, message: &str, severity: NoticeSeverity);
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type ProviderApiBox = Box<dyn ProviderApi>;
pub type NoticeSinkBox = Box<dyn NoticeSink>;
