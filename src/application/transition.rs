//! Maps a provider payment status onto exactly one order transition.

use crate::domain::order::OrderStatus;
use crate::domain::payment::ProviderPaymentStatus;
use crate::domain::ports::NoticeSeverity;

pub const ON_HOLD_REASON: &str = "Payment has been processed but has not been confirmed. Please manually check payment status before order processing.";

#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Record the payment as complete against the merchant payment reference.
    CompletePayment,
    SetStatus { status: OrderStatus, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The order's thank-you page.
    ReturnPage,
    /// Back to checkout so the payer can try again.
    CheckoutPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayerNotice {
    pub message: &'static str,
    pub severity: NoticeSeverity,
}

impl PayerNotice {
    const fn error(message: &'static str) -> Self {
        Self {
            message,
            severity: NoticeSeverity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub action: OrderAction,
    pub notice: Option<PayerNotice>,
    pub redirect: RedirectTarget,
}

impl Transition {
    pub fn for_status(status: &ProviderPaymentStatus) -> Self {
        use ProviderPaymentStatus::*;

        match status {
            Completed => Self {
                action: OrderAction::CompletePayment,
                notice: None,
                redirect: RedirectTarget::ReturnPage,
            },
            Accepted | Pending => Self {
                action: OrderAction::SetStatus {
                    status: OrderStatus::OnHold,
                    reason: ON_HOLD_REASON.to_string(),
                },
                notice: None,
                redirect: RedirectTarget::ReturnPage,
            },
            Rejected => Self::failed(
                "Payment was rejected at the bank",
                PayerNotice::error(
                    "Your payment was rejected by your bank, you have not been charged. Please try again.",
                ),
            ),
            Cancelled => Self::failed(
                "Payment was cancelled by the customer",
                PayerNotice {
                    message: "Your payment was cancelled.",
                    severity: NoticeSeverity::Notice,
                },
            ),
            Errored => Self::failed(
                "Payment error during checkout",
                PayerNotice::error("Your payment errored during checkout, please try again."),
            ),
            Expired => Self::failed(
                "Payment expired",
                PayerNotice::error(
                    "Your payment was not completed in time, you have not been charged. Please try again.",
                ),
            ),
            Unknown(raw) => Self::failed(
                &format!("Payment error: unknown payment state {raw}"),
                PayerNotice::error("An unexpected error occurred while processing your payment."),
            ),
        }
    }

    fn failed(reason: &str, notice: PayerNotice) -> Self {
        Self {
            action: OrderAction::SetStatus {
                status: OrderStatus::Failed,
                reason: reason.to_string(),
            },
            notice: Some(notice),
            redirect: RedirectTarget::CheckoutPayment,
        }
    }

    /// The order status this transition leads to.
    pub fn target_status(&self) -> OrderStatus {
        match &self.action {
            OrderAction::CompletePayment => OrderStatus::Processing,
            OrderAction::SetStatus { status, .. } => *status,
        }
    }
}
