use crate::crypto::EncryptedPayload;
use crate::domain::payment::ProviderRef;
use crate::error::{GatewayError, Result};
use url::Url;

pub const REDIRECT_PATH: &str = "woo-redirect";

/// Builds `{hosted_ui}/woo-redirect?payload=<payload>&ref=<ref>`.
///
/// Both values are form-urlencoded, so base64 `+`, `/` and `=` survive the trip.
pub fn resolve_redirect(
    hosted_ui: &Url,
    payload: &EncryptedPayload,
    provider_ref: &ProviderRef,
) -> Result<Url> {
    let mut url = hosted_ui.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| {
            GatewayError::ConfigurationError("hosted UI URL cannot carry a path".to_string())
        })?
        .pop_if_empty()
        .push(REDIRECT_PATH);
    url.query_pairs_mut()
        .append_pair("payload", payload.as_str())
        .append_pair("ref", provider_ref.as_str());
    Ok(url)
}
