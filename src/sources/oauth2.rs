use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::service::{CredentialsConfig, UpstreamConfig};
use crate::error::ExchangeError;
use crate::observability::metrics::get_metrics;
use crate::token::codec::decode;
use crate::token::Token;
use crate::utils::constants::{GRANT_AUTHORIZATION_CODE, GRANT_REFRESH_TOKEN};

/// Runs OAuth2 grants against the upstream token endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    client: Client,
    token_url: String,
    credentials: CredentialsConfig,
}

impl TokenExchanger {
    pub fn new(client: Client, upstream: &UpstreamConfig, credentials: CredentialsConfig) -> Self {
        Self {
            client,
            token_url: upstream.token_url(),
            credentials,
        }
    }

    /// `authorization_code` grant.
    pub async fn exchange_auth_code(&self, code: &str) -> Result<Token, ExchangeError> {
        let client_credentials = self.credentials.client()?;
        let redirect_uri = self.credentials.redirect_uri()?;

        let form = [
            ("code", code),
            ("grant_type", GRANT_AUTHORIZATION_CODE),
            ("client_id", client_credentials.client_id.as_str()),
            ("client_secret", client_credentials.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        self.grant(GRANT_AUTHORIZATION_CODE, &form, None).await
    }

    /// `refresh_token` grant. Returns a new token; when the upstream does not
    /// rotate the refresh token, the one from `token` is carried forward.
    pub async fn refresh(&self, token: &Token) -> Result<Token, ExchangeError> {
        let client_credentials = self.credentials.client()?;

        let form = [
            ("refresh_token", token.refresh_token.as_str()),
            ("grant_type", GRANT_REFRESH_TOKEN),
            ("client_id", client_credentials.client_id.as_str()),
            ("client_secret", client_credentials.client_secret.as_str()),
        ];
        self.grant(GRANT_REFRESH_TOKEN, &form, Some(token.refresh_token.as_str()))
            .await
    }

    async fn grant(
        &self,
        grant: &'static str,
        form: &[(&str, &str)],
        fallback_refresh: Option<&str>,
    ) -> Result<Token, ExchangeError> {
        let metrics = get_metrics().await;
        metrics.grant_requests.with_label_values(&[grant]).inc();

        self.post_grant(grant, form, fallback_refresh)
            .await
            .inspect(|_| info!(grant, "grant exchange succeeded"))
            .inspect_err(|e| {
                warn!(grant, error = %e, "grant exchange failed");
                metrics
                    .grant_failures
                    .with_label_values(&[grant, e.reason()])
                    .inc();
            })
    }

    async fn post_grant(
        &self,
        grant: &'static str,
        form: &[(&str, &str)],
        fallback_refresh: Option<&str>,
    ) -> Result<Token, ExchangeError> {
        let response = self.client.post(&self.token_url).form(form).send().await?;
        let status = response.status();
        debug!(grant, %status, "token endpoint responded");

        // the body decides: an `error` field or missing access token is a rejection
        let body = response.text().await?;
        Ok(decode(&body, fallback_refresh)?)
    }
}
