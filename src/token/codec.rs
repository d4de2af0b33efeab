//! Token <-> JSON blob.
//!
//! The same decoder reads both the caller's stored blob and the upstream grant
//! response, so it tolerates the terse upstream shape (no lifecycle fields,
//! sometimes no refresh token) and rejects anything carrying an `error`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::DecodeError;
use crate::helpers::time::now;
use crate::token::token::Token;
use crate::utils::constants::{default_access_lifetime, default_refresh_lifetime};

static ERROR_FIELD: &str = "error";
static ACCESS_TOKEN_FIELD: &str = "access_token";
static REFRESH_TOKEN_FIELD: &str = "refresh_token";
static EXPIRY_FIELD: &str = "expiry";
static TERMINATION_FIELD: &str = "termination";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const NAIVE_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Decode a token blob.
///
/// `fallback_refresh` stands in for a missing `refresh_token`; without it a
/// missing refresh token is a decode failure.
pub fn decode(blob: &str, fallback_refresh: Option<&str>) -> Result<Token, DecodeError> {
    decode_at(blob, fallback_refresh, now())
}

/// Same as [`decode`], with defaults for missing lifecycle fields computed from `now`.
pub fn decode_at(
    blob: &str,
    fallback_refresh: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Token, DecodeError> {
    let root: Value = serde_json::from_str(blob)?;
    let root = root.as_object().ok_or(DecodeError::NotAnObject)?;

    if let Some(error) = root.get(ERROR_FIELD) {
        let message = error
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        return Err(DecodeError::Upstream(message));
    }

    let access_token = string_field(root, ACCESS_TOKEN_FIELD)?
        .ok_or(DecodeError::MissingField(ACCESS_TOKEN_FIELD))?;

    let refresh_token = match string_field(root, REFRESH_TOKEN_FIELD)? {
        Some(value) => value,
        None => fallback_refresh
            .map(str::to_owned)
            .ok_or(DecodeError::MissingField(REFRESH_TOKEN_FIELD))?,
    };

    let expiry = match string_field(root, EXPIRY_FIELD)? {
        Some(value) => parse_timestamp(EXPIRY_FIELD, &value)?,
        None => {
            debug!("expiry absent, defaulting");
            now + default_access_lifetime()
        }
    };

    let termination = match string_field(root, TERMINATION_FIELD)? {
        Some(value) => parse_timestamp(TERMINATION_FIELD, &value)?,
        None => {
            debug!("termination absent, defaulting");
            now + default_refresh_lifetime()
        }
    };

    Ok(Token::new(access_token, refresh_token, expiry, termination))
}

/// The token as the JSON object handed to the caller. All four fields are always present.
pub fn to_value(token: &Token) -> Value {
    json!({
        ACCESS_TOKEN_FIELD: token.access_token,
        REFRESH_TOKEN_FIELD: token.refresh_token,
        EXPIRY_FIELD: format_timestamp(&token.expiry),
        TERMINATION_FIELD: format_timestamp(&token.termination),
    })
}

pub fn encode(token: &Token) -> String {
    to_value(token).to_string()
}

/// UTC, seven fractional digits (100ns ticks), no offset.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    let ticks = (value.timestamp_subsec_nanos() / 100).min(9_999_999);
    format!("{}.{:07}", value.format(TIMESTAMP_FORMAT), ticks)
}

/// Accepts RFC3339 with an offset, or a naive timestamp taken as UTC.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, DecodeError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, NAIVE_PARSE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| DecodeError::InvalidField {
            field,
            reason: e.to_string(),
        })
}

fn string_field(root: &Map<String, Value>, field: &'static str) -> Result<Option<String>, DecodeError> {
    match root.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.to_owned())),
        Some(other) => Err(DecodeError::InvalidField {
            field,
            reason: format!("expected string, got {}", other),
        }),
    }
}
