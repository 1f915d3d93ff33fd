// u-Control cloud HTTP client
//
// Wraps `reqwest::Client` with the fixed production hosts, URL
// construction, and response parsing. The endpoint surfaces (token auth,
// account listing, command dispatch) are implemented as inherent methods
// via separate files to keep this module focused on transport mechanics.

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;

/// Production host for authentication and account endpoints.
pub const AUTH_HOST: &str = "https://ucontrol-api.bft-automation.com";

/// Production host for the command dispatcher.
pub const DISPATCH_HOST: &str = "https://ucontrol-dispatcher.bft-automation.com";

/// Longest body excerpt carried inside an [`Error::Api`].
const BODY_EXCERPT_LEN: usize = 200;

/// Raw HTTP client for the BFT u-Control cloud.
///
/// Holds the two fixed API hosts (auth + dispatcher), the shared
/// `reqwest::Client`, and the retry policy applied to every retried
/// request. All methods return parsed payloads -- HTTP status handling
/// and JSON decoding happen here, not in callers.
pub struct CloudClient {
    http: reqwest::Client,
    auth_base: Url,
    dispatch_base: Url,
    retry: RetryPolicy,
}

impl CloudClient {
    /// Create a client against the production hosts.
    pub fn new(transport: &TransportConfig, retry: RetryPolicy) -> Result<Self, Error> {
        let auth_base = Url::parse(AUTH_HOST).map_err(Error::InvalidUrl)?;
        let dispatch_base = Url::parse(DISPATCH_HOST).map_err(Error::InvalidUrl)?;
        Self::with_base_urls(auth_base, dispatch_base, transport, retry)
    }

    /// Create a client against explicit base URLs.
    ///
    /// The production hosts are not configurable at the API level; this
    /// constructor exists so tests can point the client at a mock server.
    pub fn with_base_urls(
        auth_base: Url,
        dispatch_base: Url,
        transport: &TransportConfig,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            auth_base,
            dispatch_base,
            retry,
        })
    }

    /// The underlying HTTP client.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The retry policy applied to retried requests.
    pub(crate) fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `POST {auth}/oauth/token`
    pub(crate) fn oauth_token_url(&self) -> Result<Url, Error> {
        self.auth_base.join("/oauth/token").map_err(Error::InvalidUrl)
    }

    /// `GET {auth}/api/v1/users/?access_token={token}`
    pub(crate) fn users_url(&self, token: &str) -> Result<Url, Error> {
        let mut url = self
            .auth_base
            .join("/api/v1/users/")
            .map_err(Error::InvalidUrl)?;
        url.query_pairs_mut().append_pair("access_token", token);
        Ok(url)
    }

    /// `DELETE {auth}/v1/access_tokens/{token}`
    pub(crate) fn revoke_url(&self, token: &str) -> Result<Url, Error> {
        self.auth_base
            .join(&format!("/v1/access_tokens/{token}"))
            .map_err(Error::InvalidUrl)
    }

    /// `GET {dispatch}/automations/{device_id}/execute/{action}`
    pub(crate) fn execute_url(&self, device_id: &str, action: &str) -> Result<Url, Error> {
        self.dispatch_base
            .join(&format!("/automations/{device_id}/execute/{action}"))
            .map_err(Error::InvalidUrl)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Check the HTTP status and decode the JSON body.
    ///
    /// Non-2xx becomes [`Error::Api`] with a body excerpt; a 2xx body
    /// that fails to decode becomes [`Error::Deserialization`] with the
    /// full body attached for debugging.
    pub(crate) async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Truncate a response body for inclusion in error messages.
fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_LEN {
        trimmed.to_owned()
    } else {
        let mut end = BODY_EXCERPT_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}
