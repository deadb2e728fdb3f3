use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Identifier of a storefront order.
///
/// This is the value embedded as the last segment of a merchant payment
/// reference, so it must round-trip through its decimal string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Awaiting payment.
    Pending,
    /// Payment reported but not confirmed; needs manual review.
    OnHold,
    Failed,
    /// Paid. Terminal.
    Processing,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::OnHold => "on-hold",
            Self::Failed => "failed",
            Self::Processing => "processing",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status change recorded against an order, with the reason given by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub reason: String,
}

/// Snapshot of a storefront order as seen by the gateway.
///
/// The storefront owns the authoritative record; the gateway only reads these
/// fields and asks the store to mutate the order through the `OrderStore` port.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub total: Decimal,
    pub billing_email: String,
    pub customer_ip: Option<String>,
    pub customer_user_agent: Option<String>,
    pub status: OrderStatus,
    /// Append-only audit log.
    pub notes: Vec<String>,
    pub history: Vec<StatusChange>,
    /// External reference recorded when the payment completed.
    pub transaction_reference: Option<String>,
    /// The thank-you page shown after a successful payment.
    pub return_url: Url,
    /// The page where the payer can retry paying for this order.
    pub checkout_payment_url: Url,
}

impl Order {
    pub fn new(
        id: OrderId,
        total: Decimal,
        billing_email: impl Into<String>,
        return_url: Url,
        checkout_payment_url: Url,
    ) -> Self {
        Self {
            id,
            total,
            billing_email: billing_email.into(),
            customer_ip: None,
            customer_user_agent: None,
            status: OrderStatus::Pending,
            notes: Vec::new(),
            history: Vec::new(),
            transaction_reference: None,
            return_url,
            checkout_payment_url,
        }
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Moves the order to `target`.
    ///
    /// Returns `false` when the transition is not allowed. A paid order cannot
    /// leave `Processing`; re-applying the current status is accepted and
    /// leaves the order untouched.
    pub fn transition(&mut self, target: OrderStatus, reason: &str) -> bool {
        if self.status == target {
            return true;
        }
        if self.status.is_paid() {
            return false;
        }
        self.history.push(StatusChange {
            from: self.status,
            to: target,
            reason: reason.to_string(),
        });
        self.status = target;
        true
    }

    /// Marks the order paid with the given external reference.
    ///
    /// Completing an already paid order is a no-op, so the first reference wins.
    pub fn complete_payment(&mut self, reference: &str) {
        if self.status.is_paid() {
            return;
        }
        self.transaction_reference = Some(reference.to_string());
        self.transition(OrderStatus::Processing, "Payment complete");
    }
}
