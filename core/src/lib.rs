//! Blocking client for the Context.IO email REST API.
//!
//! # Overview
//! Endpoint bindings in [`api`] describe calls as [`LogicalRequest`] values.
//! [`Client::perform`] encodes their parameter records, signs the request
//! with two-legged OAuth 1.0, sends it with a bounded timeout, classifies
//! the status and decodes the JSON body into the caller's type.
//!
//! # Design
//! - `Client` is immutable after construction and safe to share between
//!   threads; every per-call value (nonce, timestamp, encoded pairs) is
//!   request-local.
//! - The pipeline stays split into `prepare` (encode + sign, no I/O),
//!   `execute` (one HTTP attempt) and `parse` (classify + decode), so the
//!   pure parts are testable without a server.
//! - No retries. Callers compose retries or existence checks on top of the
//!   returned `Error`, which keeps status and body for non-2xx answers.

pub mod api;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod oauth;
pub mod observer;
pub mod params;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use config::{Config, DEFAULT_TIMEOUT, LITE_HOST, TEST_TIMEOUT, V2_HOST};
pub use decode::LooseMap;
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, LogicalRequest};
pub use oauth::{Signer, Stamp};
pub use observer::{LogEntry, MemoryObserver, Observer, TracingObserver};
pub use params::ParamPairs;
