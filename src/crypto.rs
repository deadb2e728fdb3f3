//! Symmetric encryption of outbound payment payloads.
//!
//! The provider decrypts with OpenSSL's `aes-256-cbc` using the merchant key
//! as-is: key bytes are zero-padded or truncated to 32 bytes, and the
//! ciphertext travels in OpenSSL's default base64 text form. The transport
//! token is `base64(base64(ciphertext) || "::" || iv)`.

use crate::config::MerchantCredential;
use crate::error::{GatewayError, Result};
use aes::Aes256;
use base64::{Engine, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::RngCore;
use rand::rngs::OsRng;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

pub const IV_LEN: usize = 16;
pub const SEPARATOR: &[u8] = b"::";
const KEY_LEN: usize = 32;
const BLOCK_LEN: usize = 16;

/// An encrypted payload ready to be placed in the redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload(String);

impl EncryptedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Encrypts `plaintext` with the merchant key under a fresh random IV.
pub fn encrypt(plaintext: &[u8], key: &MerchantCredential) -> Result<EncryptedPayload> {
    encrypt_with_key(plaintext, key.expose().as_bytes())
}

fn encrypt_with_key(plaintext: &[u8], key_bytes: &[u8]) -> Result<EncryptedPayload> {
    if key_bytes.is_empty() {
        return Err(GatewayError::ConfigurationError(
            "merchant key is empty".to_string(),
        ));
    }

    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| GatewayError::EncryptionError(format!("IV generation failed: {e}")))?;

    encrypt_with_iv(plaintext, key_bytes, iv)
}

fn encrypt_with_iv(
    plaintext: &[u8],
    key_bytes: &[u8],
    iv: [u8; IV_LEN],
) -> Result<EncryptedPayload> {
    let mut key = [0u8; KEY_LEN];
    let copy_len = key_bytes.len().min(KEY_LEN);
    key[..copy_len].copy_from_slice(&key_bytes[..copy_len]);

    let encryptor = Aes256CbcEnc::new(&key.into(), &iv.into());

    let mut buffer = vec![0u8; plaintext.len() + BLOCK_LEN];
    buffer[..plaintext.len()].copy_from_slice(plaintext);
    let ciphertext = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
        .map_err(|_| {
            GatewayError::EncryptionError("AES-256-CBC encryption failed".to_string())
        })?;

    let mut token = STANDARD.encode(ciphertext).into_bytes();
    token.extend_from_slice(SEPARATOR);
    token.extend_from_slice(&iv);

    Ok(EncryptedPayload(STANDARD.encode(token)))
}
