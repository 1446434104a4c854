//! The client façade every endpoint binding goes through.
//!
//! # Design
//! `Client` holds only immutable state (credentials, base URL, timeout,
//! observer) behind a `Transport`, so one instance can be cloned or shared
//! across threads without locking. Every call is independent: nonce,
//! timestamp and encoded parameters are request-local.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Config, DEFAULT_TIMEOUT, LITE_HOST, TEST_TIMEOUT, V2_HOST};
use crate::decode::decode;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse, LogicalRequest};
use crate::oauth::{Signer, Stamp};
use crate::observer::Observer;
use crate::transport::{check_status, Transport};

/// Blocking, thread-safe client for the Context.IO REST API.
#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
}

impl Client {
    /// Client for the Lite API with the default timeout.
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        Self::builder(consumer_key, consumer_secret).build()
    }

    /// Client for the 2.0 API with the default timeout.
    pub fn v2(consumer_key: &str, consumer_secret: &str) -> Self {
        Self::builder(consumer_key, consumer_secret)
            .base_url(V2_HOST)
            .build()
    }

    /// Client pointed at a local stand-in server, with a short timeout.
    pub fn for_test_server(consumer_key: &str, consumer_secret: &str, base_url: &str) -> Self {
        Self::builder(consumer_key, consumer_secret)
            .base_url(base_url)
            .timeout(TEST_TIMEOUT)
            .build()
    }

    pub fn from_config(config: &Config) -> Self {
        Self::builder(&config.consumer_key, &config.consumer_secret)
            .base_url(&config.base_url)
            .timeout(config.timeout)
            .build()
    }

    pub fn builder(consumer_key: &str, consumer_secret: &str) -> ClientBuilder {
        ClientBuilder {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            base_url: LITE_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            observer: None,
            fixed_stamp: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Encode and sign a request without sending it.
    pub fn prepare<Q: Serialize, F: Serialize>(
        &self,
        request: &LogicalRequest<Q, F>,
    ) -> Result<HttpRequest> {
        self.transport.prepare(request)
    }

    /// Send a prepared request; the status is not interpreted.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(request)
    }

    /// Classify a raw response and decode its body into `T`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T> {
        let response = check_status(response)?;
        decode(&response.body)
    }

    /// Perform one logical request and decode the answer into `T`.
    pub fn perform<T, Q, F>(&self, request: LogicalRequest<Q, F>) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize,
        F: Serialize,
    {
        let response = self.transport.send(&request)?;
        decode(&response.body)
    }
}

/// Builder for `Client`.
pub struct ClientBuilder {
    consumer_key: String,
    consumer_secret: String,
    base_url: String,
    timeout: Duration,
    observer: Option<Arc<dyn Observer>>,
    fixed_stamp: Option<Stamp>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Sign every request with this nonce and timestamp. Only useful for
    /// reproducible signatures in tests; a real server rejects replays.
    pub fn fixed_stamp(mut self, stamp: Stamp) -> Self {
        self.fixed_stamp = Some(stamp);
        self
    }

    pub fn build(self) -> Client {
        let signer = Signer::new(&self.consumer_key, &self.consumer_secret);
        Client {
            transport: Transport::new(
                &self.base_url,
                self.timeout,
                signer,
                self.observer,
                self.fixed_stamp,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn constructors_pick_host_and_timeout() {
        let lite = Client::new("K", "S");
        assert_eq!(lite.base_url(), LITE_HOST);
        assert_eq!(lite.timeout(), DEFAULT_TIMEOUT);

        let v2 = Client::v2("K", "S");
        assert_eq!(v2.base_url(), V2_HOST);

        let test = Client::for_test_server("K", "S", "http://test.local/");
        assert_eq!(test.base_url(), "http://test.local");
        assert_eq!(test.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn from_config_uses_every_field() {
        let config = Config {
            consumer_key: "K".to_string(),
            consumer_secret: "S".to_string(),
            base_url: "http://test.local".to_string(),
            timeout: Duration::from_secs(9),
        };
        let client = Client::from_config(&config);
        assert_eq!(client.base_url(), "http://test.local");
        assert_eq!(client.timeout(), Duration::from_secs(9));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Client>();
    }

    #[test]
    fn parse_decodes_success_bodies() {
        let client = Client::new("K", "S");
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"[{"type":"GMAIL"}]"#.to_string(),
        };
        let value: Vec<serde_json::Value> = client.parse(response).unwrap();
        assert_eq!(value[0]["type"], "GMAIL");
    }

    #[test]
    fn parse_reports_status_before_decoding() {
        let client = Client::new("K", "S");
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = client.parse::<serde_json::Value>(response).unwrap_err();
        assert!(matches!(err, Error::Status { status: 500, .. }));
    }
}
