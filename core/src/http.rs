//! HTTP request and response types.
//!
//! # Design
//! `LogicalRequest` is what endpoint bindings describe: a method, an already
//! interpolated path and optional parameter records. `HttpRequest` is the
//! encoded and signed form that goes over the wire, and `HttpResponse` is the
//! raw answer before classification. Both wire types are plain data so the
//! encode/sign step can be tested without touching the network.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether form parameters travel in the request body for this method.
    pub fn carries_form_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API call before encoding, signing and transport.
///
/// `Q` and `F` are the query and form parameter records; `()` means "none".
#[derive(Debug, Clone)]
pub struct LogicalRequest<Q = (), F = ()> {
    pub method: HttpMethod,
    /// Resource path with every path parameter already escaped, e.g.
    /// `/users/u1/email_accounts/acct/folders/Inbox`.
    pub path: String,
    pub query: Option<Q>,
    pub form: Option<F>,
}

impl LogicalRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            form: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }
}

impl<Q, F> LogicalRequest<Q, F> {
    pub fn with_query<Q2>(self, query: Q2) -> LogicalRequest<Q2, F> {
        LogicalRequest {
            method: self.method,
            path: self.path,
            query: Some(query),
            form: self.form,
        }
    }

    pub fn with_form<F2>(self, form: F2) -> LogicalRequest<Q, F2> {
        LogicalRequest {
            method: self.method,
            path: self.path,
            query: self.query,
            form: Some(form),
        }
    }
}

/// A fully encoded and signed request.
///
/// `url` includes the query string. `body` is set only for methods that
/// carry a form body and only when there are form pairs to send.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A raw HTTP response, before status classification and decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
