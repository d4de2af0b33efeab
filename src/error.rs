//! Error taxonomy for the broker.
//!
//! Each upstream collaborator has its own error type; `BrokerError` is what the
//! HTTP layer sees and maps to a status code.

use thiserror::Error;

/// The token blob (or upstream grant response) could not be turned into a Token.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("token is not a JSON object")]
    NotAnObject,

    #[error("upstream reported an error: {0}")]
    Upstream(String),

    #[error("field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A grant exchange against the upstream token endpoint failed.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("grant rejected: {0}")]
    Rejected(#[from] DecodeError),

    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("environment variable '{0}' is not set")]
    MissingCredential(String),
}

impl ExchangeError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ExchangeError::Rejected(_) => "rejected",
            ExchangeError::Transport(_) => "transport",
            ExchangeError::MissingCredential(_) => "configuration",
        }
    }
}

/// An upstream resource call did not produce a usable payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource '{resource}' returned {status}")]
    Status {
        resource: &'static str,
        status: http::StatusCode,
    },

    #[error("resource '{resource}' unreachable: {source}")]
    Transport {
        resource: &'static str,
        source: reqwest::Error,
    },

    #[error("resource '{resource}' returned a non-JSON body: {source}")]
    InvalidBody {
        resource: &'static str,
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Status { .. } => "status",
            FetchError::Transport { .. } => "transport",
            FetchError::InvalidBody { .. } => "invalid_body",
        }
    }
}

/// Caller supplied an incomplete or unusable request. Raised before any upstream call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Body must contain code")]
    MissingCode,

    #[error("Query must contain {0}")]
    MissingQuery(&'static str),

    #[error("Resource specified is not valid")]
    UnknownResource(String),
}

/// Caller-facing outcome of a broker operation.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Invalid token")]
    InvalidToken(#[source] DecodeError),

    #[error("Invalid code")]
    InvalidCode(#[source] ExchangeError),

    #[error("Token is terminated")]
    Terminated,

    #[error("Invalid refresh code in token")]
    InvalidRefresh(#[source] ExchangeError),

    #[error("Unauthorized")]
    Unauthorized(#[source] FetchError),

    #[error("Broker is misconfigured")]
    Configuration(#[source] ExchangeError),
}

impl BrokerError {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            BrokerError::Input(_)
            | BrokerError::InvalidToken(_)
            | BrokerError::InvalidCode(_)
            | BrokerError::InvalidRefresh(_) => StatusCode::BAD_REQUEST,
            BrokerError::Terminated => StatusCode::UNPROCESSABLE_ENTITY,
            BrokerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BrokerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn caller_facing_statuses() {
        assert_eq!(BrokerError::from(InputError::MissingCode).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BrokerError::InvalidToken(DecodeError::MissingField("access_token")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(BrokerError::Terminated.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            BrokerError::Unauthorized(FetchError::Status {
                resource: "userinfo",
                status: StatusCode::FORBIDDEN,
            })
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BrokerError::Configuration(ExchangeError::MissingCredential("SECRET".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn input_errors_read_as_plain_messages() {
        assert_eq!(InputError::MissingQuery("token").to_string(), "Query must contain token");
        assert_eq!(
            BrokerError::from(InputError::UnknownResource("nonsense".into())).to_string(),
            "Resource specified is not valid"
        );
    }
}
