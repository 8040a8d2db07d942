//! Delivery Tier Domain Models
//!
//! Value objects and resource nodes for the static-asset delivery
//! topology, each validated on construction:
//!
//! - [`DomainName`] - RFC 1123 validated domain names
//! - [`Bucket`] - object storage nodes (versioned-private or redirect-website)
//! - [`CertificateRef`] / [`HostedZoneRef`] - imported, read-only identities
//! - [`ResponseHeaderPolicy`] / [`CachePolicy`] - CDN policy nodes
//! - [`Origin`] - HTTP origin wrapper around a storage endpoint
//! - [`Distribution`] - the CDN distribution composing the rest
//!
//! All types are plain immutable values; nothing here talks to a cloud
//! account. Construction failures surface as [`ConfigError`] or
//! [`ImportError`] before any reconciliation can be attempted.

pub mod bucket;
pub mod distribution;
pub mod domain_name;
pub mod import;
pub mod origin;
pub mod policy;

pub use bucket::{
    Bucket, BucketMode, EncryptionMode, PublicAccessBlock, RedirectProtocol, RetentionPolicy,
    WebsiteRedirect,
};
pub use distribution::{
    AllowedMethods, BehaviorConfig, CachedMethods, DefaultBehavior, Distribution,
    DistributionSettings, HttpVersion, MinimumProtocolVersion, PriceClass, ViewerProtocolPolicy,
};
pub use domain_name::{DomainName, DomainNameError};
pub use import::{CertificateRef, HostedZoneRef, ImportError};
pub use origin::{Origin, OriginProtocolPolicy};
pub use policy::{
    CachePolicy, CachePolicyConfig, CorsPolicyConfig, ForwardingBehavior, ResponseHeaderPolicy,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Configuration error
///
/// Malformed or missing required configuration, raised synchronously at
/// construction time and never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Stack identity cannot be empty")]
    EmptyStackId,

    #[error("Logical id cannot be empty")]
    EmptyLogicalId,

    #[error("Redirect target is required for a redirect-website bucket")]
    RedirectTargetRequired,

    #[error("A versioned-private bucket cannot carry a website redirect")]
    RedirectTargetForbidden,

    #[error("Wildcard allowed origin cannot be combined with allow-credentials")]
    WildcardOriginWithCredentials,

    #[error("CORS policy must allow at least one origin")]
    EmptyAllowOrigins,

    #[error("TTLs must satisfy min <= default <= max (min={min}s, default={default}s, max={max}s)")]
    TtlOrdering { min: u64, default: u64, max: u64 },

    #[error("Allow-list forwarding behavior for {field} requires at least one key")]
    EmptyAllowList { field: &'static str },

    #[error("Distribution requires at least one domain name")]
    EmptyDomainSet,

    #[error("Domain {domain} is not covered by the certificate's subject names")]
    DomainNotCovered { domain: String },

    #[error("Invalid domain name: {0}")]
    DomainName(#[from] DomainNameError),
}

/// Identity of a synthesized stack
///
/// Names the unit of declared infrastructure that is synthesized and
/// reconciled together. Seeds every deterministic derived name, so two
/// stacks with different identities never collide on policy names or
/// node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(String);

impl StackId {
    /// Create a stack identity
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ConfigError::EmptyStackId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for StackId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
