#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;
use wonderful_gateway::application::gateway::PaymentGateway;
use wonderful_gateway::config::{GatewaySettings, MerchantCredential};
use wonderful_gateway::domain::bank::{Bank, BankStatus};
use wonderful_gateway::domain::order::{Order, OrderId, OrderStatus};
use wonderful_gateway::domain::payment::{
    PaymentRequestPayload, PaymentStatusReport, ProviderPaymentStatus, ProviderRef,
    WonderfulPaymentId,
};
use wonderful_gateway::domain::ports::{OrderStore, ProviderApi};
use wonderful_gateway::error::{GatewayError, Result};
use wonderful_gateway::infrastructure::in_memory::{InMemoryNoticeSink, InMemoryOrderStore};

pub const MERCHANT_KEY: &str = "merchant-token-0123456789";
pub const RETURN_URL: &str = "https://shop.example/checkout/order-received/1042";
pub const CHECKOUT_PAYMENT_URL: &str = "https://shop.example/checkout/order-pay/1042";

pub fn settings(endpoint: &str) -> GatewaySettings {
    GatewaySettings::new(
        MerchantCredential::new(MERCHANT_KEY).unwrap(),
        Url::parse(endpoint).unwrap(),
        Url::parse("https://pay.provider.test").unwrap(),
        Url::parse("https://shop.example/").unwrap(),
    )
}

/// Order 1042 for 19.99, awaiting payment.
pub fn order_1042() -> Order {
    let mut order = Order::new(
        OrderId(1042),
        dec!(19.99),
        "payer@example.com",
        Url::parse(RETURN_URL).unwrap(),
        Url::parse(CHECKOUT_PAYMENT_URL).unwrap(),
    );
    order.customer_ip = Some("203.0.113.9".to_string());
    order.customer_user_agent = Some("Mozilla/5.0 (X11; Linux x86_64)".to_string());
    order
}

pub fn bank(id: &str, status: BankStatus) -> Bank {
    Bank {
        bank_id: id.to_string(),
        bank_name: id.to_uppercase(),
        bank_logo: None,
        status,
    }
}

pub fn report(reference: &str, payment_id: &str, status: &str) -> PaymentStatusReport {
    PaymentStatusReport {
        payment_reference: reference.to_string(),
        wonderful_payments_id: payment_id.to_string(),
        status: ProviderPaymentStatus::from(status),
        selected_aspsp: Some("natwest".to_string()),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Transport,
    Status(u16),
}

impl Failure {
    fn error(self) -> GatewayError {
        match self {
            Self::Transport => GatewayError::TransportError("connection refused".to_string()),
            Self::Status(status) => GatewayError::ProviderStatus { status },
        }
    }
}

#[derive(Default)]
struct FakeState {
    reference: Option<String>,
    report: Option<PaymentStatusReport>,
    banks: Vec<Bank>,
    failure: Option<Failure>,
    payloads: Vec<PaymentRequestPayload>,
    status_requests: Vec<String>,
    bank_calls: usize,
}

/// Scripted provider. Clones share state, so a test keeps one handle after
/// boxing another into the gateway.
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(self, reference: &str) -> Self {
        self.state.lock().unwrap().reference = Some(reference.to_string());
        self
    }

    pub fn with_report(self, report: PaymentStatusReport) -> Self {
        self.state.lock().unwrap().report = Some(report);
        self
    }

    pub fn with_banks(self, banks: Vec<Bank>) -> Self {
        self.state.lock().unwrap().banks = banks;
        self
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        self.state.lock().unwrap().failure = failure;
    }

    pub fn payloads(&self) -> Vec<PaymentRequestPayload> {
        self.state.lock().unwrap().payloads.clone()
    }

    pub fn status_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().status_requests.clone()
    }

    pub fn bank_calls(&self) -> usize {
        self.state.lock().unwrap().bank_calls
    }
}

#[async_trait]
impl ProviderApi for FakeProvider {
    async fn create_reference(&self, payload: &PaymentRequestPayload) -> Result<ProviderRef> {
        let mut state = self.state.lock().unwrap();
        state.payloads.push(payload.clone());
        if let Some(failure) = state.failure {
            return Err(failure.error());
        }
        ProviderRef::new(state.reference.clone().unwrap_or_default())
    }

    async fn payment_status(&self, payment_id: &WonderfulPaymentId) -> Result<PaymentStatusReport> {
        let mut state = self.state.lock().unwrap();
        state.status_requests.push(payment_id.to_string());
        if let Some(failure) = state.failure {
            return Err(failure.error());
        }
        state
            .report
            .clone()
            .ok_or_else(|| GatewayError::ProviderStatus { status: 404 })
    }

    async fn supported_banks(&self) -> Result<Vec<Bank>> {
        let mut state = self.state.lock().unwrap();
        state.bank_calls += 1;
        if let Some(failure) = state.failure {
            return Err(failure.error());
        }
        Ok(state.banks.clone())
    }
}

/// Order store that counts lookups before delegating to the in-memory store.
#[derive(Clone, Default)]
pub struct CountingOrderStore {
    inner: InMemoryOrderStore,
    lookups: Arc<AtomicUsize>,
}

impl CountingOrderStore {
    pub async fn insert(&self, order: Order) {
        self.inner.insert(order).await;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub async fn order(&self, order_id: OrderId) -> Order {
        self.inner.get(order_id).await.unwrap().unwrap()
    }
}

#[async_trait]
impl OrderStore for CountingOrderStore {
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get(order_id).await
    }

    async fn add_note(&self, order_id: OrderId, note: &str) -> Result<()> {
        self.inner.add_note(order_id, note).await
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        reason: &str,
    ) -> Result<bool> {
        self.inner.update_status(order_id, status, reason).await
    }

    async fn mark_payment_complete(&self, order_id: OrderId, reference: &str) -> Result<()> {
        self.inner.mark_payment_complete(order_id, reference).await
    }
}

/// A gateway wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub gateway: PaymentGateway,
    pub orders: CountingOrderStore,
    pub provider: FakeProvider,
    pub notices: InMemoryNoticeSink,
}

pub async fn harness(provider: FakeProvider) -> Harness {
    let orders = CountingOrderStore::default();
    orders.insert(order_1042()).await;
    let notices = InMemoryNoticeSink::new();

    let gateway = PaymentGateway::new(
        settings("https://api.provider.test"),
        Box::new(orders.clone()),
        Box::new(provider.clone()),
        Box::new(notices.clone()),
    );

    Harness {
        gateway,
        orders,
        provider,
        notices,
    }
}
