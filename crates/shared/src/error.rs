use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::Endpoint;

/// Error body the backend sends alongside a 5xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed response from {endpoint}: {source}")]
    Json {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed response from {endpoint}: record {index}: {reason}")]
    InvalidRecord {
        endpoint: Endpoint,
        index: usize,
        reason: String,
    },
    #[error("malformed response from {endpoint}: unsupported geometry type {kind}")]
    UnsupportedGeometry {
        endpoint: Endpoint,
        kind: &'static str,
    },
    #[error("malformed response from {endpoint}: {reason}")]
    InvalidGeometry {
        endpoint: Endpoint,
        reason: String,
    },
}

impl ProtocolError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Json { endpoint, .. }
            | Self::InvalidRecord { endpoint, .. }
            | Self::UnsupportedGeometry { endpoint, .. }
            | Self::InvalidGeometry { endpoint, .. } => *endpoint,
        }
    }

    pub(crate) fn invalid_record(endpoint: Endpoint, index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            endpoint,
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            endpoint: Endpoint::Boundaries,
            reason: reason.into(),
        }
    }
}
