use chrono::{DateTime, Utc};

use crate::helpers::time::now;
use crate::utils::constants::validity_margin;

/// Credential state handed back and forth with the caller.
///
/// A value is owned by exactly one request; refreshing produces a new `Token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    /// when `access_token` stops being usable
    pub expiry: DateTime<Utc>,
    /// when `refresh_token` stops being usable, no refresh after this
    pub termination: DateTime<Utc>,
}

impl Token {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expiry: DateTime<Utc>,
        termination: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expiry,
            termination,
        }
    }

    /// Check if the access token expires within the validity margin
    pub fn expired(&self) -> bool {
        self.expired_at(now())
    }

    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        now + validity_margin() > self.expiry
    }

    /// Check if the refresh token terminates within the validity margin
    pub fn terminated(&self) -> bool {
        self.terminated_at(now())
    }

    pub fn terminated_at(&self, now: DateTime<Utc>) -> bool {
        now + validity_margin() > self.termination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expiry: DateTime<Utc>, termination: DateTime<Utc>) -> Token {
        Token::new("AT".into(), "RT".into(), expiry, termination)
    }

    #[test]
    fn expiry_inside_margin_counts_as_expired() {
        let now = Utc::now();
        let far = now + Duration::days(30);

        assert!(token(now + Duration::minutes(4), far).expired_at(now));
        assert!(!token(now + Duration::minutes(6), far).expired_at(now));
        assert!(token(now - Duration::minutes(1), far).expired_at(now));
    }

    #[test]
    fn termination_margin_is_independent_of_expiry() {
        let now = Utc::now();

        // fresh access token, refresh token about to die
        let dying = token(now + Duration::hours(1), now + Duration::minutes(4));
        assert!(dying.terminated_at(now));
        assert!(!dying.expired_at(now));

        // stale access token, refresh token still good
        let stale = token(now + Duration::minutes(2), now + Duration::minutes(6));
        assert!(!stale.terminated_at(now));
        assert!(stale.expired_at(now));
    }

    #[test]
    fn predicates_follow_wall_clock() {
        let now = Utc::now();
        let live = token(now + Duration::hours(1), now + Duration::days(90));
        assert!(!live.expired());
        assert!(!live.terminated());
    }
}
