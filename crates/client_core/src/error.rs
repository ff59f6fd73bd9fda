use reqwest::StatusCode;
use shared::{error::ProtocolError, protocol::Endpoint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        detail: Option<String>,
    },
    #[error(transparent)]
    Malformed(#[from] ProtocolError),
}

impl FetchError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}
