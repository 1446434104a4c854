//! Request encoding, signing and the single HTTP round-trip.
//!
//! # Design
//! `Transport` owns everything a call needs that is fixed per client: the
//! base URL, timeout, signer, optional observer and a `ureq` agent. It keeps
//! the build/execute split explicit: `prepare` turns a `LogicalRequest` into
//! a signed `HttpRequest` without I/O, `execute` performs exactly one
//! network attempt, and `check_status` classifies the answer. No retries
//! happen here.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, LogicalRequest};
use crate::oauth::{Signer, Stamp};
use crate::observer::{LogEntry, Observer};
use crate::params::{self, ParamPairs};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone)]
pub struct Transport {
    base_url: String,
    timeout: Duration,
    signer: Signer,
    observer: Option<Arc<dyn Observer>>,
    fixed_stamp: Option<Stamp>,
    agent: ureq::Agent,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("signer", &self.signer)
            .field("observer", &self.observer.is_some())
            .field("fixed_stamp", &self.fixed_stamp)
            .finish()
    }
}

impl Transport {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        signer: Signer,
        observer: Option<Arc<dyn Observer>>,
        fixed_stamp: Option<Stamp>,
    ) -> Self {
        // Status codes are classified by `check_status`, not by ureq.
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            signer,
            observer,
            fixed_stamp,
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Encode and sign `request` with a fresh stamp, or the pinned one.
    pub fn prepare<Q: Serialize, F: Serialize>(
        &self,
        request: &LogicalRequest<Q, F>,
    ) -> Result<HttpRequest> {
        let stamp = match &self.fixed_stamp {
            Some(stamp) => stamp.clone(),
            None => Stamp::fresh()?,
        };
        self.prepare_with(request, &stamp)
    }

    /// Encode and sign `request` with an explicit nonce and timestamp.
    pub fn prepare_with<Q: Serialize, F: Serialize>(
        &self,
        request: &LogicalRequest<Q, F>,
        stamp: &Stamp,
    ) -> Result<HttpRequest> {
        let base_url = self.resolve(&request.path);
        let mut query = match &request.query {
            Some(query) => params::encode(query)?,
            None => ParamPairs::new(),
        };
        let form = match &request.form {
            Some(form) => params::encode(form)?,
            None => ParamPairs::new(),
        };

        let mut signed = query.clone();
        signed.extend(form.clone());

        let mut headers = Vec::new();
        let body = if request.method.carries_form_body() {
            if form.is_empty() {
                None
            } else {
                headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                Some(form.to_encoded_string())
            }
        } else {
            // GET and DELETE have no body; form pairs ride in the query.
            query.extend(form);
            None
        };

        let authorization = self
            .signer
            .authorization(request.method, &base_url, &signed, stamp);
        headers.insert(0, ("Authorization".to_string(), authorization));
        headers.push(("Accept".to_string(), "application/json".to_string()));

        let url = if query.is_empty() {
            base_url
        } else {
            format!("{base_url}?{}", query.to_encoded_string())
        };

        Ok(HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// One HTTP exchange. Any status is returned as data; only connection
    /// problems and timeouts are errors here.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        self.notify(LogEntry::Request {
            method: request.method,
            url: request.url.clone(),
            body: request.body.clone(),
        });

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&request.url), &request.headers).call(),
            HttpMethod::Delete => {
                with_headers(self.agent.delete(&request.url), &request.headers).call()
            }
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&request.url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(&request.url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "request failed");
            transport_error(e)
        })?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(transport_error)?;

        debug!(method = %request.method, url = %request.url, status, "received response");
        self.notify(LogEntry::Response {
            method: request.method,
            url: request.url.clone(),
            status,
            body: body.clone(),
        });

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Prepare, execute and classify.
    pub fn send<Q: Serialize, F: Serialize>(
        &self,
        request: &LogicalRequest<Q, F>,
    ) -> Result<HttpResponse> {
        let prepared = self.prepare(request)?;
        check_status(self.execute(&prepared)?)
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn notify(&self, entry: LogEntry) {
        if let Some(observer) = &self.observer {
            observer.log(&entry);
        }
    }
}

/// 2xx passes through; anything else becomes `Error::Status`.
pub fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(Error::Status {
        status: response.status,
        body: response.body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn transport_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Timeout(_) => Error::Timeout,
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => Error::Timeout,
        other => Error::Transport(other.to_string()),
    }
}
