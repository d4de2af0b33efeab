//! Request orchestration.
//!
//! Every call works on its own decoded Token; nothing is kept between requests.
//! The caller stores whatever token comes back and sends it on the next call.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::service::ServiceConfig;
use crate::error::{BrokerError, ExchangeError, InputError};
use crate::sources::{ResourceAggregator, ResourceRequest, TokenExchanger, RESOURCES};
use crate::token::codec;
use crate::token::Token;

/// Body of a successful resource call: payload plus the token to keep.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceResponse {
    pub result: Value,
    pub token: Value,
}

#[derive(Debug, Clone)]
pub struct Broker {
    exchanger: TokenExchanger,
    aggregator: ResourceAggregator,
}

impl Broker {
    pub fn new(exchanger: TokenExchanger, aggregator: ResourceAggregator) -> Self {
        Self {
            exchanger,
            aggregator,
        }
    }

    /// Both collaborators share `client`.
    pub fn from_config(config: &ServiceConfig, client: Client) -> Self {
        let exchanger = TokenExchanger::new(
            client.clone(),
            &config.upstream,
            config.credentials.clone(),
        );
        let aggregator = ResourceAggregator::new(client, config.upstream.clone());
        Self::new(exchanger, aggregator)
    }

    /// Trade an authorization code for an encoded token. The body is the code,
    /// forwarded to the token endpoint as sent.
    pub async fn authorize(&self, code: &str) -> Result<Value, BrokerError> {
        if code.is_empty() {
            return Err(InputError::MissingCode.into());
        }

        let token = self
            .exchanger
            .exchange_auth_code(code)
            .await
            .map_err(|e| configuration_or(e, BrokerError::InvalidCode))?;

        info!("authorization code exchanged");
        Ok(codec::to_value(&token))
    }

    /// Fetch `resource` (a key from the routing table, or `all`) with the
    /// caller's token, refreshing it first when it is about to expire.
    pub async fn resource(
        &self,
        resource: Option<&str>,
        token: Option<&str>,
    ) -> Result<ResourceResponse, BrokerError> {
        // `?resource=&token=` counts as absent
        let resource = resource
            .filter(|key| !key.is_empty())
            .ok_or(InputError::MissingQuery("resource"))?;
        let blob = token
            .filter(|blob| !blob.is_empty())
            .ok_or(InputError::MissingQuery("token"))?;
        let request = ResourceRequest::parse(resource)?;

        let token = codec::decode(blob, None).map_err(BrokerError::InvalidToken)?;
        let token = self.ensure_fresh(token).await?;

        let result = match request {
            ResourceRequest::One(resource) => {
                self.aggregator
                    .fetch_one(resource, &token.access_token)
                    .await
            }
            ResourceRequest::All => self
                .aggregator
                .fetch_all(&token, &RESOURCES)
                .await
                .map(Value::Object),
        }
        .map_err(BrokerError::Unauthorized)?;

        debug!(resource, "resource request served");
        Ok(ResourceResponse {
            result,
            token: codec::to_value(&token),
        })
    }

    /// Terminated tokens are dead; expired ones are swapped for a refreshed value.
    async fn ensure_fresh(&self, token: Token) -> Result<Token, BrokerError> {
        if token.terminated() {
            warn!("token past termination");
            return Err(BrokerError::Terminated);
        }
        if !token.expired() {
            return Ok(token);
        }

        info!("token expired, refreshing");
        self.exchanger
            .refresh(&token)
            .await
            .map_err(|e| configuration_or(e, BrokerError::InvalidRefresh))
    }
}

fn configuration_or(error: ExchangeError, otherwise: fn(ExchangeError) -> BrokerError) -> BrokerError {
    match error {
        ExchangeError::MissingCredential(_) => BrokerError::Configuration(error),
        error => otherwise(error),
    }
}
