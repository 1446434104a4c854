//! OAuth provider registrations (Lite API).

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::http::LogicalRequest;
use crate::params::percent_encode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthProvider {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub provider_consumer_key: String,
    pub provider_consumer_secret: String,
    pub resource_url: String,
}

/// Form values for registering a provider. All fields are required.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOAuthProviderParams {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub provider_consumer_key: String,
    pub provider_consumer_secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateOAuthProviderResponse {
    pub success: bool,
    pub provider_consumer_key: String,
    pub resource_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeleteOAuthProviderResponse {
    pub success: bool,
}

impl Client {
    pub fn get_oauth_providers(&self) -> Result<Vec<OAuthProvider>> {
        self.perform(LogicalRequest::get("/oauth_providers"))
    }

    pub fn get_oauth_provider(&self, key: &str) -> Result<OAuthProvider> {
        self.perform(LogicalRequest::get(format!(
            "/oauth_providers/{}",
            percent_encode(key)
        )))
    }

    pub fn create_oauth_provider(
        &self,
        params: &CreateOAuthProviderParams,
    ) -> Result<CreateOAuthProviderResponse> {
        self.perform(LogicalRequest::post("/oauth_providers").with_form(params))
    }

    pub fn delete_oauth_provider(&self, key: &str) -> Result<DeleteOAuthProviderResponse> {
        self.perform(LogicalRequest::delete(format!(
            "/oauth_providers/{}",
            percent_encode(key)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::params::encode;

    #[test]
    fn provider_type_maps_to_type_field() {
        let providers: Vec<OAuthProvider> =
            decode(r#"[{"type":"GMAIL","provider_consumer_key":"x"}]"#).unwrap();
        assert_eq!(providers[0].provider_type, "GMAIL");
        assert_eq!(providers[0].provider_consumer_key, "x");
        assert_eq!(providers[0].resource_url, "");
    }

    #[test]
    fn create_params_are_all_required() {
        let params = CreateOAuthProviderParams {
            provider_type: "GMAIL_OAUTH2".to_string(),
            provider_consumer_key: "id".to_string(),
            provider_consumer_secret: String::new(),
        };
        let pairs = encode(&params).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get("type"), Some("GMAIL_OAUTH2"));
        assert_eq!(pairs.get("provider_consumer_secret"), Some(""));
    }
}
