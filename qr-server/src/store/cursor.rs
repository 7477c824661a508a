//! Pagination cursor codec
//!
//! Wraps the store-native continuation key in a URL-safe text token:
//! `base64(json(key))`. The token is opaque to clients — it round-trips
//! through decode/encode verbatim and is never constructed anywhere else.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::{ContinuationKey, StoreError, StoreResult};

/// Render a continuation key as an opaque `next_token` value.
pub fn encode(key: &ContinuationKey) -> StoreResult<String> {
    let bytes = serde_json::to_vec(key).map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Recover the continuation key from a client-supplied token.
pub fn decode(token: &str) -> StoreResult<ContinuationKey> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|_| StoreError::BadContinuation)?;
    serde_json::from_slice(&bytes).map_err(|_| StoreError::BadContinuation)
}

/// Decode an optional `next_token` request field.
pub fn decode_optional(token: Option<&str>) -> StoreResult<Option<ContinuationKey>> {
    token.map(decode).transpose()
}
