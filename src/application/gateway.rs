use crate::config::GatewaySettings;
use crate::domain::bank::Bank;
use crate::domain::ports::{NoticeSinkBox, OrderStoreBox, ProviderApiBox};
use tokio::sync::RwLock;
use url::Url;

/// The main entry point of the checkout integration.
///
/// `PaymentGateway` owns the ports to the storefront (orders and payer
/// notices) and to the provider API. Each public operation handles one
/// independent request against one order:
///
/// * [`process_payment`](Self::process_payment) builds the provider redirect at checkout.
/// * [`webhook`](Self::webhook) reconciles an order with the provider's payment status.
/// * [`payment_pending`](Self::payment_pending) marks an order as awaiting payment.
/// * [`supported_banks`](Self::supported_banks) lists the banks a payer can pick.
pub struct PaymentGateway {
    pub(crate) settings: GatewaySettings,
    pub(crate) orders: OrderStoreBox,
    pub(crate) provider: ProviderApiBox,
    pub(crate) notices: NoticeSinkBox,
    pub(crate) banks: RwLock<Option<Vec<Bank>>>,
}

impl PaymentGateway {
    /// Creates a new `PaymentGateway`.
    ///
    /// # Arguments
    ///
    /// * `settings` - Merchant credential, provider URLs and payload constants.
    /// * `orders` - The storefront's order store.
    /// * `provider` - Client for the Wonderful Payments API.
    /// * `notices` - Where payer-visible messages go.
    pub fn new(
        settings: GatewaySettings,
        orders: OrderStoreBox,
        provider: ProviderApiBox,
        notices: NoticeSinkBox,
    ) -> Self {
        Self {
            settings,
            orders,
            provider,
            notices,
            banks: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }
}

/// What the storefront should send back for a provider callback.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackResponse {
    /// Send the payer's browser to this URL.
    Redirect(Url),
    /// Processed; nothing to show.
    Acknowledged,
    /// Rejected or aborted. Details are only in the log.
    Error,
}

impl CallbackResponse {
    /// Response body for non-redirect outcomes.
    pub fn body(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Redirect(_) | Self::Acknowledged => "",
        }
    }
}
