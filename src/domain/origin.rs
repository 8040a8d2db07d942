//! HTTP Origin Wrapper
//!
//! Wraps a storage endpoint hostname as an origin the distribution can
//! fetch from. Website-mode buckets only speak plain HTTP, which is why
//! the original topology pins `HttpOnly` here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainName;

/// Protocol the distribution uses when contacting the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginProtocolPolicy {
    HttpOnly,
    HttpsOnly,
    MatchViewer,
}

impl OriginProtocolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpOnly => "http_only",
            Self::HttpsOnly => "https_only",
            Self::MatchViewer => "match_viewer",
        }
    }
}

impl fmt::Display for OriginProtocolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin node: target endpoint plus protocol policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    endpoint: DomainName,
    protocol_policy: OriginProtocolPolicy,
}

impl Origin {
    /// Wrap an endpoint as an origin; pure, no validation beyond the
    /// already-validated endpoint
    pub fn new(endpoint: DomainName, protocol_policy: OriginProtocolPolicy) -> Self {
        Self {
            endpoint,
            protocol_policy,
        }
    }

    pub fn endpoint(&self) -> &DomainName {
        &self.endpoint
    }

    pub fn protocol_policy(&self) -> OriginProtocolPolicy {
        self.protocol_policy
    }
}
