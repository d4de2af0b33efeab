//! Upstream resource fetching.
//!
//! `RESOURCES` is the whole routing table: short key -> path under `/api/`.

use futures::future::try_join_all;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::service::UpstreamConfig;
use crate::error::{FetchError, InputError};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::token::Token;
use crate::utils::constants::RESOURCE_ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub key: &'static str,
    pub path: &'static str,
}

pub const RESOURCES: [Resource; 5] = [
    Resource { key: "announcements", path: "dailynews/list.json" },
    Resource { key: "calendar", path: "diarycalendar/events.json" },
    Resource { key: "dailytimetable", path: "timetable/daytimetable.json" },
    Resource { key: "timetable", path: "timetable/timetable.json" },
    Resource { key: "userinfo", path: "details/userinfo.json" },
];

pub fn lookup(key: &str) -> Option<Resource> {
    RESOURCES.iter().copied().find(|resource| resource.key == key)
}

/// What the caller asked for: one mapped resource, or every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRequest {
    One(Resource),
    All,
}

impl ResourceRequest {
    pub fn parse(key: &str) -> Result<Self, InputError> {
        if key == RESOURCE_ALL {
            return Ok(ResourceRequest::All);
        }
        lookup(key)
            .map(ResourceRequest::One)
            .ok_or_else(|| InputError::UnknownResource(key.to_owned()))
    }
}

/// Bearer-authenticated GETs against the upstream API.
#[derive(Debug, Clone)]
pub struct ResourceAggregator {
    client: Client,
    upstream: UpstreamConfig,
}

impl ResourceAggregator {
    pub fn new(client: Client, upstream: UpstreamConfig) -> Self {
        Self { client, upstream }
    }

    pub async fn fetch_one(&self, resource: Resource, access_token: &str) -> Result<Value, FetchError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics
            .resource_fetch_requests
            .with_label_values(&[resource.key])
            .inc();

        let result = self.get(resource, access_token).await;

        metrics
            .resource_fetch_duration
            .with_label_values(&[resource.key])
            .observe(start.elapsed().as_secs_f64());
        result.inspect_err(|e| {
            warn!(resource = resource.key, error = %e, "resource fetch failed");
            metrics
                .resource_fetch_failures
                .with_label_values(&[resource.key, e.reason()])
                .inc();
        })
    }

    /// Fetch every resource in `resources` concurrently.
    ///
    /// All or nothing: the first failure drops the outstanding fetches and is
    /// returned, no partial map is ever produced.
    pub async fn fetch_all(
        &self,
        token: &Token,
        resources: &[Resource],
    ) -> Result<Map<String, Value>, FetchError> {
        let access_token = token.access_token.as_str();
        let fetches = resources.iter().map(|resource| async move {
            self.fetch_one(*resource, access_token)
                .await
                .map(|payload| (resource.key.to_owned(), payload))
        });

        let fetched = try_join_all(fetches).await?;
        info!("fetched {} resources", fetched.len());
        Ok(fetched.into_iter().collect())
    }

    async fn get(&self, resource: Resource, access_token: &str) -> Result<Value, FetchError> {
        let url = self.upstream.api_url(resource.path);
        debug!(resource = resource.key, "fetching {}", url);

        let transport = |source| FetchError::Transport {
            resource: resource.key,
            source,
        };
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource: resource.key,
                status,
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| FetchError::InvalidBody {
            resource: resource.key,
            source,
        })
    }
}
