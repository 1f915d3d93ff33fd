// Token authentication
//
// OAuth-style password-grant token exchange against the auth host, plus
// best-effort token revocation. The OAuth client id/secret are fixed by
// the upstream protocol and embedded here.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::CloudClient;
use crate::error::Error;
use crate::retry;

/// Fixed OAuth client credentials required by the token endpoint.
const OAUTH_CLIENT_ID: &str = "particle";
const OAUTH_CLIENT_SECRET: &str = "particle";

/// How to authenticate with the cloud.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Exchange username/password for a token at startup. The obtained
    /// token is revoked again at teardown.
    Password {
        username: String,
        password: SecretString,
    },
    /// Use a pre-issued token. Never revoked by this client.
    Token(SecretString),
}

/// A bearer token for the dispatch and account endpoints.
///
/// Wraps the secret so it never appears in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            secret: SecretString::from(token.into()),
            expires_in,
        }
    }

    /// The raw token value, for URLs and bearer headers.
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Token lifetime in seconds, as reported by the token endpoint.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }
}

impl From<SecretString> for AccessToken {
    fn from(secret: SecretString) -> Self {
        Self {
            secret,
            expires_in: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl CloudClient {
    /// Exchange username/password for a bearer token.
    ///
    /// `POST {auth}/oauth/token` with basic auth and a password-grant
    /// form body. Timeouts and request failures (including HTTP error
    /// statuses) are retried; a response that parses but lacks the
    /// `access_token` field fails fast -- retrying cannot fix bad
    /// credentials being answered with a tokenless payload.
    pub async fn acquire_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AccessToken, Error> {
        let url = self.oauth_token_url()?;

        self.retry()
            .run("token request", retry::lookup_classification, || {
                let url = url.clone();
                async move {
                debug!("requesting access token");
                let resp = self
                    .http()
                    .post(url)
                    .basic_auth(OAUTH_CLIENT_ID, Some(OAUTH_CLIENT_SECRET))
                    .form(&[
                        ("grant_type", "password"),
                        ("username", username),
                        ("password", password.expose_secret()),
                    ])
                    .send()
                    .await
                    .map_err(Error::Transport)?;

                let token: TokenResponse = Self::parse_json(resp).await?;
                let Some(access_token) = token.access_token else {
                    return Err(Error::Authentication {
                        message: "token response did not include an access token".into(),
                    });
                };

                info!("access token acquired");
                Ok(AccessToken::new(access_token, token.expires_in))
                }
            })
            .await
    }

    /// Delete an access token.
    ///
    /// `DELETE {auth}/v1/access_tokens/{token}` with the device
    /// username/password as basic auth. Single attempt -- callers treat
    /// failure as non-fatal and only log it.
    pub async fn revoke_token(
        &self,
        token: &AccessToken,
        username: &str,
        password: &SecretString,
    ) -> Result<(), Error> {
        let url = self.revoke_url(token.expose())?;
        debug!("revoking access token");

        let resp = self
            .http()
            .delete(url)
            .basic_auth(username, Some(password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("access token revoked");
        Ok(())
    }
}
