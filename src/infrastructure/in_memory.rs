use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{NoticeSeverity, NoticeSink, OrderStore};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order store.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` so clones share the same
/// orders. Stands in for the storefront in tests and the CLI.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn add_note(&self, order_id: OrderId, note: &str) -> Result<()> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        order.add_note(note);
        Ok(())
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        reason: &str,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        Ok(order.transition(status, reason))
    }

    async fn mark_payment_complete(&self, order_id: OrderId, reference: &str) -> Result<()> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(GatewayError::OrderNotFound(order_id))?;
        order.complete_payment(reference);
        Ok(())
    }
}

/// Collects payer notices in memory, in the order they were added.
#[derive(Default, Clone)]
pub struct InMemoryNoticeSink {
    notices: Arc<RwLock<Vec<(String, NoticeSeverity)>>>,
}

impl InMemoryNoticeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notices(&self) -> Vec<(String, NoticeSeverity)> {
        self.notices.read().await.clone()
    }

    /// Returns and clears the collected notices, the way a flash session does.
    pub async fn take(&self) -> Vec<(String, NoticeSeverity)> {
        std::mem::take(&mut *self.notices.write().await)
    }
}

#[async_trait]
impl NoticeSink for InMemoryNoticeSink {
    async fn add_notice(&self, message: &str, severity: NoticeSeverity) {
        self.notices.write().await.push((message.to_string(), severity));
    }
}
