//! Shared constants and invariants

use chrono::Duration;

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://student.sbhs.net.au";

/// A token is treated as expired/terminated this long before the real deadline,
/// so it cannot lapse while resources are being fetched with it.
pub const VALIDITY_MARGIN_MINUTES: i64 = 5;

/// Lifetimes applied when the upstream omits `expiry` / `termination`.
pub const DEFAULT_ACCESS_LIFETIME_HOURS: i64 = 1;
pub const DEFAULT_REFRESH_LIFETIME_DAYS: i64 = 90;

// Grant kinds sent to the upstream token endpoint
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

// Sentinel resource key requesting every mapped resource
pub const RESOURCE_ALL: &str = "all";

pub fn validity_margin() -> Duration {
    Duration::minutes(VALIDITY_MARGIN_MINUTES)
}

pub fn default_access_lifetime() -> Duration {
    Duration::hours(DEFAULT_ACCESS_LIFETIME_HOURS)
}

pub fn default_refresh_lifetime() -> Duration {
    Duration::days(DEFAULT_REFRESH_LIFETIME_DAYS)
}
