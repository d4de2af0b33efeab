//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks server bind settings, logging level, upstream URL and timeout,
//!   credential variable names

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::service::{CredentialsConfig, ServiceConfig, UpstreamConfig};
use crate::config::settings::SettingsConfig;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_upstream(&cfg.upstream, &mut errors);
    validate_credentials(&cfg.credentials, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host is empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }
    if let Some(logging) = &settings.logging {
        if let Err(e) = EnvFilter::try_new(&logging.level) {
            errors.push(format!("settings.logging.level '{}' is invalid: {}", logging.level, e));
        }
    }
    if !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }
}

fn validate_upstream(upstream: &UpstreamConfig, errors: &mut Vec<String>) {
    match reqwest::Url::parse(&upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "upstream.base_url scheme '{}' is not http(s)",
            url.scheme()
        )),
        Err(e) => errors.push(format!("upstream.base_url '{}' is invalid: {}", upstream.base_url, e)),
    }
    if upstream.timeout_ms == 0 {
        errors.push("upstream.timeout_ms must be > 0".to_string());
    }
}

fn validate_credentials(credentials: &CredentialsConfig, errors: &mut Vec<String>) {
    for (field, name) in [
        ("client_id_env", &credentials.client_id_env),
        ("client_secret_env", &credentials.client_secret_env),
        ("redirect_uri_env", &credentials.redirect_uri_env),
    ] {
        if name.trim().is_empty() {
            errors.push(format!("credentials.{} is empty", field));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_service_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn all_issues_are_reported_together() {
        let mut cfg = ServiceConfig::default();
        cfg.settings.server.port = "http".into();
        cfg.upstream.base_url = "ftp://student.sbhs.net.au".into();
        cfg.upstream.timeout_ms = 0;
        cfg.credentials.client_secret_env = " ".into();

        let errors = validate_service_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 4, "{:?}", errors);
    }
}
