//! Confluence REST API client.
//!
//! Blocking HTTP client for Confluence Cloud, Server and Data Center with
//! basic (email + API token) or bearer (personal access token) authentication.

mod pages;
mod search;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use relay_config::{ApiVersion, ConfluenceConfig};
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::Agent;

use crate::error::ConfluenceError;

/// Unreserved characters (A-Z a-z 0-9 - . _ ~) stay as they are.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query or path component.
pub(crate) fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ENCODE_SET).to_string()
}

/// Request authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Cloud: account email and API token.
    Basic { email: String, api_token: String },
    /// Server/Data Center personal access token.
    Bearer { token: String },
}

impl Auth {
    /// Pick the authentication scheme from configuration.
    ///
    /// A bearer token wins over email + API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Config`] if neither scheme is configured.
    pub fn from_config(config: &ConfluenceConfig) -> Result<Self, ConfluenceError> {
        if let Some(token) = config.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Self::Bearer {
                token: token.to_owned(),
            });
        }
        match (config.email.as_deref(), config.api_token.as_deref()) {
            (Some(email), Some(api_token)) if !email.is_empty() && !api_token.is_empty() => {
                Ok(Self::Basic {
                    email: email.to_owned(),
                    api_token: api_token.to_owned(),
                })
            }
            _ => Err(ConfluenceError::Config(
                "confluence requires bearer_token or both email and api_token".to_owned(),
            )),
        }
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Basic { email, api_token } => {
                format!("Basic {}", STANDARD.encode(format!("{email}:{api_token}")))
            }
            Self::Bearer { token } => format!("Bearer {token}"),
        }
    }
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth: Auth,
    api_version: ApiVersion,
}

impl ConfluenceClient {
    /// Create a client.
    ///
    /// `base_url` includes the context path (`/wiki` on Cloud); a trailing
    /// slash is ignored.
    #[must_use]
    pub fn new(base_url: &str, auth: Auth, api_version: ApiVersion, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth,
            api_version,
        }
    }

    /// Create a client from the `[confluence]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Config`] if no credentials are configured.
    pub fn from_config(config: &ConfluenceConfig) -> Result<Self, ConfluenceError> {
        let auth = Auth::from_config(config)?;
        Ok(Self::new(
            &config.base_url,
            auth,
            config.api_version,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// API generation used for page fetches.
    #[must_use]
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    fn api_v2_url(&self) -> String {
        format!("{}/api/v2", self.base_url)
    }

    /// GET `url` and decode the JSON response.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        debug!("GET {}", url);

        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth.header_value())
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body_reader.read_json()?)
    }
}
