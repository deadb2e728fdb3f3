use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BankStatus {
    Online,
    /// Reachable but the provider reports degraded service.
    Issues,
    Offline,
    #[serde(other)]
    Unknown,
}

impl BankStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Issues => "issues",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }
}

/// A bank (ASPSP) the payer can choose at checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Bank {
    pub bank_id: String,
    pub bank_name: String,
    #[serde(default)]
    pub bank_logo: Option<String>,
    pub status: BankStatus,
}

impl Bank {
    pub fn is_selectable(&self) -> bool {
        self.status == BankStatus::Online
    }
}

/// Response of `GET /v2/supported-banks`.
#[derive(Debug, Deserialize)]
pub struct SupportedBanks {
    pub data: Vec<Bank>,
}
