// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed OAuth `state` parameter.
//!
//! The state carries a per-login nonce that is also set as a cookie on the
//! browser starting the flow, so a callback is only accepted from the same
//! browser. Format before base64url: `nonce|timestamp_ms_hex|hmac_hex`.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a login attempt may take between redirect and callback.
pub const STATE_MAX_AGE_SECS: i64 = 10 * 60;

/// Generate a fresh random nonce (hex).
pub fn new_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build the signed state for a login attempt started at `issued_at_ms`.
pub fn sign_state(nonce: &str, issued_at_ms: i64, secret: &[u8]) -> Result<String, AppError> {
    let payload = format!("{}|{:x}", nonce, issued_at_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the signature and age of a state parameter and return its nonce.
pub fn verify_state(state: &str, secret: &[u8], now_ms: i64) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }
    let (nonce, timestamp_hex, signature_hex) = (parts[0], parts[1], parts[2]);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", nonce, timestamp_hex).as_bytes());
    let signature = hex::decode(signature_hex).ok()?;
    if mac.verify_slice(&signature).is_err() {
        tracing::warn!("OAuth state signature mismatch");
        return None;
    }

    let issued_at_ms = i64::from_str_radix(timestamp_hex, 16).ok()?;
    let age_ms = now_ms - issued_at_ms;
    if !(0..=STATE_MAX_AGE_SECS * 1000).contains(&age_ms) {
        tracing::warn!(age_ms, "OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}
