//! Parameter encoding.
//!
//! A parameter record is any `Serialize` struct (or map). Optional fields opt
//! out of the output with `#[serde(skip_serializing_if = "is_default")]` (or
//! `Option::is_none`); fields without that attribute are required and always
//! emitted, even when they hold their empty value. A required `Option` field
//! left as `None` is an encoding error.
//!
//! Flattening rules:
//! - booleans become `1` / `0`, numbers their decimal form;
//! - nested maps become `prefix[key]` pairs;
//! - sequences become repeated `prefix[]` pairs;
//! - a required empty sequence or map is sent as `name=` with no value.
//!
//! Pairs are ordered by key. Values are escaped with the RFC 3986 unreserved
//! set, the same set the request signer uses, so the bytes that are signed
//! and the bytes that are sent always agree.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Everything except `A-Z a-z 0-9 - . _ ~` is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode `input` with the RFC 3986 unreserved set.
///
/// Also used for caller-supplied path segments: folder names such as
/// `Sent Items` or `INBOX/Receipts` must stay one segment, and `/` is not
/// in the unreserved set.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

/// `skip_serializing_if` predicate for "include only if non-default" fields.
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// An ordered sequence of unescaped key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamPairs {
    pairs: Vec<(String, String)>,
}

impl ParamPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn extend(&mut self, other: ParamPairs) {
        self.pairs.extend(other.pairs);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// `k1=v1&k2=v2`, escaped, in stored order.
    pub fn to_encoded_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamPairs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = ParamPairs::new();
        for (k, v) in iter {
            pairs.push(k, v);
        }
        pairs
    }
}

/// Encode a parameter record into ordered pairs.
///
/// `()` and `None` records encode to an empty set.
pub fn encode<P: Serialize + ?Sized>(params: &P) -> Result<ParamPairs> {
    let value = serde_json::to_value(params).map_err(|e| Error::Encoding(e.to_string()))?;
    let mut out = Vec::new();
    match value {
        Value::Null => {}
        Value::Object(fields) => {
            for (name, field) in fields {
                flatten(name, field, &mut out)?;
            }
        }
        other => {
            return Err(Error::Encoding(format!(
                "parameter record must be a struct or map, got {other}"
            )))
        }
    }
    // Stable: flattened `prefix[]` entries keep their sequence order.
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(ParamPairs { pairs: out })
}

fn flatten(name: String, value: Value, out: &mut Vec<(String, String)>) -> Result<()> {
    match value {
        Value::Null => {
            return Err(Error::Encoding(format!(
                "required parameter `{name}` is missing"
            )))
        }
        Value::Bool(b) => out.push((name, if b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((name, n.to_string())),
        Value::String(s) => out.push((name, s)),
        // An empty collection still has to show up when the field is required.
        Value::Array(items) if items.is_empty() => out.push((name, String::new())),
        Value::Object(fields) if fields.is_empty() => out.push((name, String::new())),
        Value::Array(items) => {
            for item in items {
                flatten(format!("{name}[]"), item, out)?;
            }
        }
        Value::Object(fields) => {
            for (key, field) in fields {
                flatten(format!("{name}[{key}]"), field, out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Serialize, Default)]
    struct MessageQuery {
        #[serde(skip_serializing_if = "is_default")]
        delimiter: String,
        #[serde(skip_serializing_if = "is_default")]
        include_body: bool,
        #[serde(skip_serializing_if = "is_default")]
        limit: u32,
        new_folder_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source_type: Option<String>,
    }

    #[derive(Serialize)]
    struct Required {
        email: Option<String>,
    }

    #[derive(Serialize)]
    struct Webhook {
        callback_url: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        extra: BTreeMap<String, String>,
    }

    #[test]
    fn optional_empty_fields_are_omitted() {
        let pairs = encode(&MessageQuery::default()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("new_folder_id"), Some(""));
    }

    #[test]
    fn set_fields_are_emitted_in_key_order() {
        let query = MessageQuery {
            delimiter: "/".to_string(),
            include_body: true,
            limit: 20,
            new_folder_id: "Archive".to_string(),
            source_type: Some("IMAP".to_string()),
        };
        let pairs = encode(&query).unwrap();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["delimiter", "include_body", "limit", "new_folder_id", "source_type"]
        );
        assert_eq!(pairs.get("include_body"), Some("1"));
        assert_eq!(pairs.get("limit"), Some("20"));
    }

    #[test]
    fn encoding_is_deterministic() {
        let query = MessageQuery {
            delimiter: ".".to_string(),
            limit: 3,
            ..Default::default()
        };
        assert_eq!(encode(&query).unwrap(), encode(&query).unwrap());
        assert_eq!(
            encode(&query).unwrap().to_encoded_string(),
            encode(&query).unwrap().to_encoded_string()
        );
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = encode(&Required { email: None }).unwrap_err();
        assert!(matches!(err, Error::Encoding(msg) if msg.contains("email")));
    }

    #[test]
    fn unit_encodes_to_nothing() {
        assert!(encode(&()).unwrap().is_empty());
        assert!(encode(&None::<MessageQuery>).unwrap().is_empty());
    }

    #[test]
    fn scalar_record_is_rejected() {
        assert!(matches!(encode(&42).unwrap_err(), Error::Encoding(_)));
    }

    #[test]
    fn maps_flatten_with_bracketed_keys() {
        let mut extra = BTreeMap::new();
        extra.insert("b".to_string(), "2".to_string());
        extra.insert("a".to_string(), "1".to_string());
        let pairs = encode(&Webhook {
            callback_url: "https://example.com/hook".to_string(),
            extra,
        })
        .unwrap();
        let collected: Vec<(&str, &str)> = pairs.iter().collect();
        assert_eq!(
            collected,
            [
                ("callback_url", "https://example.com/hook"),
                ("extra[a]", "1"),
                ("extra[b]", "2"),
            ]
        );
    }

    #[test]
    fn sequences_repeat_their_key_in_order() {
        let mut record = BTreeMap::new();
        record.insert("ids", vec!["z", "a"]);
        let pairs = encode(&record).unwrap();
        let collected: Vec<(&str, &str)> = pairs.iter().collect();
        assert_eq!(collected, [("ids[]", "z"), ("ids[]", "a")]);
    }

    #[test]
    fn encoded_string_escapes_reserved_characters() {
        let pairs: ParamPairs = [("q", "a b&c=d"), ("name", "~ok_-.")].into_iter().collect();
        assert_eq!(pairs.to_encoded_string(), "q=a%20b%26c%3Dd&name=~ok_-.");
    }

    #[test]
    fn path_segments_escape_slashes() {
        assert_eq!(percent_encode("INBOX/Sent Items"), "INBOX%2FSent%20Items");
        assert_eq!(percent_encode("<abc@mail>"), "%3Cabc%40mail%3E");
    }

    #[test]
    fn required_empty_collections_are_emitted() {
        #[derive(Serialize)]
        struct Batch {
            extra: BTreeMap<String, String>,
            ids: Vec<String>,
            name: String,
        }
        let pairs = encode(&Batch {
            extra: BTreeMap::new(),
            ids: Vec::new(),
            name: String::new(),
        })
        .unwrap();
        let collected: Vec<(&str, &str)> = pairs.iter().collect();
        assert_eq!(collected, [("extra", ""), ("ids", ""), ("name", "")]);
    }

    #[test]
    fn optional_empty_collections_are_omitted() {
        let pairs = encode(&Webhook {
            callback_url: "https://example.com/hook".to_string(),
            extra: BTreeMap::new(),
        })
        .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("extra"), None);
    }
}
