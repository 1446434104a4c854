//! Server-side check of two-legged OAuth 1.0 (HMAC-SHA1) signatures.
//!
//! The signature base string is rebuilt from what actually arrived: the
//! `Host` header and raw path, the decoded query string, the decoded form
//! body and the `oauth_*` header fields.

use axum::http::{header, request::Parts};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use ring::hmac;

const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The consumer credentials the server accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl Credentials {
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
        }
    }

    fn key(&self) -> hmac::Key {
        let signing_key = format!("{}&", encode(&self.consumer_secret));
        hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes())
    }
}

fn encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

pub fn base_string(method: &str, base_url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> =
        params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();
    let normalized: Vec<String> = encoded.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base_url),
        encode(&normalized.join("&"))
    )
}

/// Build an `Authorization` header the way a well-behaved client would.
/// Used by tests that talk to the router directly.
pub fn authorization_header(
    credentials: &Credentials,
    method: &str,
    base_url: &str,
    params: &[(String, String)],
    nonce: &str,
    timestamp: u64,
) -> String {
    let mut oauth = vec![
        ("oauth_consumer_key".to_string(), credentials.consumer_key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];
    let mut all = oauth.clone();
    all.extend(params.iter().cloned());
    let base = base_string(method, base_url, &all);
    let signature = STANDARD.encode(hmac::sign(&credentials.key(), base.as_bytes()).as_ref());
    oauth.push(("oauth_signature".to_string(), signature));
    let fields: Vec<String> = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect();
    format!("OAuth {}", fields.join(", "))
}

/// Split `OAuth k="v", k2="v2"` into decoded pairs.
pub fn parse_authorization(value: &str) -> Result<Vec<(String, String)>, String> {
    let rest = value
        .strip_prefix("OAuth ")
        .ok_or_else(|| "Authorization scheme is not OAuth".to_string())?;
    rest.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| -> Result<(String, String), String> {
            let (k, v) = field
                .split_once('=')
                .ok_or_else(|| format!("malformed OAuth field: {field}"))?;
            let v = v.trim_matches('"');
            let decode = |s: &str| {
                percent_decode_str(s)
                    .decode_utf8()
                    .map(|c| c.into_owned())
                    .map_err(|e| format!("bad escape in {field}: {e}"))
            };
            Ok((decode(k)?, decode(v)?))
        })
        .collect()
}

/// Check that the request carried a valid signature for `credentials`.
pub fn verify(parts: &Parts, body: &[u8], credentials: &Credentials) -> Result<(), String> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| "missing Authorization header".to_string())?;
    let oauth = parse_authorization(header_value)?;
    let field = |name: &str| {
        oauth
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| format!("missing {name}"))
    };

    if field("oauth_consumer_key")? != credentials.consumer_key {
        return Err("unknown consumer key".to_string());
    }
    if field("oauth_signature_method")? != "HMAC-SHA1" {
        return Err("unsupported signature method".to_string());
    }
    let provided = STANDARD
        .decode(field("oauth_signature")?)
        .map_err(|e| format!("signature is not base64: {e}"))?;

    let mut params: Vec<(String, String)> = oauth
        .iter()
        .filter(|(k, _)| k != "oauth_signature" && k != "realm")
        .cloned()
        .collect();
    if let Some(query) = parts.uri.query() {
        params.extend(url::form_urlencoded::parse(query.as_bytes()).into_owned());
    }
    let is_form = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        params.extend(url::form_urlencoded::parse(body).into_owned());
    }

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let base_url = format!("http://{}{}", host.to_ascii_lowercase(), parts.uri.path());
    let base = base_string(parts.method.as_str(), &base_url, &params);

    hmac::verify(&credentials.key(), base.as_bytes(), &provided)
        .map_err(|_| format!("signature mismatch for base string {base}"))
}
