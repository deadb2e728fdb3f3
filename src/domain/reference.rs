use crate::domain::order::OrderId;
use crate::error::{GatewayError, Result};
use rand::Rng;
use std::fmt;

const PREFIX: &str = "WOO";
const NONCE_LEN: usize = 6;
const NONCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The merchant payment reference sent to the provider: `WOO-<nonce>-<order id>`.
///
/// The provider echoes this value back on every status lookup, and the trailing
/// order id segment is the only thing that ties a webhook to a local order.
/// The six character nonce only makes references unique and hard to guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantPaymentReference {
    nonce: String,
    order_id: OrderId,
}

impl MerchantPaymentReference {
    /// Generates a fresh reference for `order_id` using the thread-local CSPRNG.
    pub fn generate(order_id: OrderId) -> Self {
        let mut rng = rand::thread_rng();
        let nonce = (0..NONCE_LEN)
            .map(|_| char::from(NONCE_CHARSET[rng.gen_range(0..NONCE_CHARSET.len())]))
            .collect();
        Self { nonce, order_id }
    }

    /// Parses a reference returned by the provider.
    pub fn parse(reference: &str) -> Result<Self> {
        let malformed = || GatewayError::MalformedReference(reference.to_string());

        let mut segments = reference.split('-');
        let (Some(prefix), Some(nonce), Some(order), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(malformed());
        };

        if prefix != PREFIX
            || nonce.len() != NONCE_LEN
            || !nonce
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            || order.is_empty()
            || !order.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let order_id = order.parse::<OrderId>().map_err(|_| malformed())?;

        Ok(Self {
            nonce: nonce.to_string(),
            order_id,
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }
}

impl fmt::Display for MerchantPaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}-{}-{}", self.nonce, self.order_id)
    }
}

/// Extracts the order id a provider payment reference points at.
pub fn order_id_from_reference(reference: &str) -> Result<OrderId> {
    MerchantPaymentReference::parse(reference).map(|r| r.order_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(reference: &str, order: &str) -> bool {
        let parts: Vec<&str> = reference.split('-').collect();
        parts.len() == 3
            && parts[0] == "WOO"
            && parts[1].len() == 6
            && parts[1]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            && parts[2] == order
    }

    #[test]
    fn test_generated_reference_format() {
        for id in [1, 1042, u64::MAX] {
            let reference = MerchantPaymentReference::generate(OrderId(id)).to_string();
            assert!(is_well_formed(&reference, &id.to_string()), "{reference}");
        }
    }

    #[test]
    fn test_generated_reference_round_trips_order_id() {
        let reference = MerchantPaymentReference::generate(OrderId(1042));
        let parsed = MerchantPaymentReference::parse(&reference.to_string()).unwrap();
        assert_eq!(parsed, reference);
        assert_eq!(parsed.order_id(), OrderId(1042));
    }

    #[test]
    fn test_references_are_not_repeated() {
        let a = MerchantPaymentReference::generate(OrderId(1)).to_string();
        let b = MerchantPaymentReference::generate(OrderId(1)).to_string();
        let c = MerchantPaymentReference::generate(OrderId(1)).to_string();
        assert!(a != b || b != c);
    }

    #[test]
    fn test_order_id_from_reference() {
        assert_eq!(order_id_from_reference("WOO-AB12CD-1042").unwrap(), OrderId(1042));
    }

    #[test]
    fn test_malformed_references() {
        for bad in [
            "",
            "WOO",
            "WOO-AB12CD",
            "WOO-AB12CD-",
            "WOO-AB12CD-abc",
            "WOO-AB12CD-1042-7",
            "XYZ-AB12CD-1042",
            "WOO-ab12cd-1042",
            "WOO-AB12C-1042",
            "WOO-AB12CD--1042",
            "WOO-AB12CD-+1042",
        ] {
            assert!(
                matches!(
                    order_id_from_reference(bad),
                    Err(GatewayError::MalformedReference(_))
                ),
                "accepted {bad:?}"
            );
        }
    }
}
