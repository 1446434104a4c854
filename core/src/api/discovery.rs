//! IMAP settings discovery (2.0 API; use a client built with `Client::v2`).

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::LogicalRequest;

/// Both fields are required.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryParams {
    pub source_type: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryResponse {
    pub email: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    pub resource_url: String,
    pub documentation: Vec<serde_json::Value>,
    pub found: bool,
    pub imap: DiscoveryImap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryImap {
    pub server: String,
    pub username: String,
    pub use_ssl: bool,
    pub oauth: bool,
    pub port: u16,
}

impl Client {
    pub fn get_discovery(&self, params: &DiscoveryParams) -> Result<DiscoveryResponse> {
        self.perform(LogicalRequest::get("/discovery").with_query(params))
    }
}
