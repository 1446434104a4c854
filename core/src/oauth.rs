//! Two-legged OAuth 1.0 request signing (HMAC-SHA1).
//!
//! Only the consumer key and secret take part; no resource-owner token is
//! held, so the signing key is `encode(secret) + "&"`.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::hmac;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::params::{percent_encode, ParamPairs};

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Per-request nonce and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub nonce: String,
    pub timestamp: u64,
}

impl Stamp {
    /// Random nonce, current Unix time.
    pub fn fresh() -> Result<Self> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Signing(format!("system clock before Unix epoch: {e}")))?
            .as_secs();
        Ok(Self {
            nonce: Uuid::new_v4().simple().to_string(),
            timestamp,
        })
    }

    pub fn fixed(nonce: impl Into<String>, timestamp: u64) -> Self {
        Self {
            nonce: nonce.into(),
            timestamp,
        }
    }
}

/// Signs requests with one consumer key/secret pair.
#[derive(Clone)]
pub struct Signer {
    consumer_key: String,
    key: hmac::Key,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        let signing_key = format!("{}&", percent_encode(consumer_secret));
        Self {
            consumer_key: consumer_key.to_string(),
            key: hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes()),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Build the `Authorization` header value for one request.
    ///
    /// `base_url` is scheme, host and path without a query string; `params`
    /// are every query and form pair that will be transmitted.
    pub fn authorization(
        &self,
        method: HttpMethod,
        base_url: &str,
        params: &ParamPairs,
        stamp: &Stamp,
    ) -> String {
        let protocol = self.protocol_params(stamp);
        let base = signature_base_string(method, base_url, protocol.iter().chain(params.iter()));
        let signature = STANDARD.encode(hmac::sign(&self.key, base.as_bytes()).as_ref());

        let fields: Vec<String> = protocol
            .iter()
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }

    fn protocol_params(&self, stamp: &Stamp) -> ParamPairs {
        let mut protocol = ParamPairs::new();
        protocol.push("oauth_consumer_key", self.consumer_key.as_str());
        protocol.push("oauth_nonce", stamp.nonce.as_str());
        protocol.push("oauth_signature_method", SIGNATURE_METHOD);
        protocol.push("oauth_timestamp", stamp.timestamp.to_string());
        protocol.push("oauth_version", OAUTH_VERSION);
        protocol
    }
}

/// `METHOD&encode(url)&encode(sorted, encoded params)`.
pub fn signature_base_string<'a>(
    method: HttpMethod,
    base_url: &str,
    params: impl Iterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut encoded: Vec<(String, String)> = params
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(base_url),
        percent_encode(&normalized)
    )
}
