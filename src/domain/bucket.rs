//! Object Storage Bucket Nodes
//!
//! Two bucket shapes exist in this topology: a versioned, private
//! bucket for image assets and an unversioned bucket configured as an
//! HTTP redirect website origin. Both are long-lived and survive stack
//! teardown; every constructor path pins [`RetentionPolicy::Retain`]
//! and provider-managed encryption, so destructive teardown is
//! unrepresentable from configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ConfigError, DomainName};

/// Bucket provisioning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketMode {
    /// Versioned, private asset storage
    VersionedPrivate,
    /// Website-configured bucket redirecting every request
    RedirectWebsite,
}

impl BucketMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VersionedPrivate => "versioned_private",
            Self::RedirectWebsite => "redirect_website",
        }
    }
}

impl fmt::Display for BucketMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server-side encryption mode
///
/// `Unencrypted` exists so the reconciliation contract can describe
/// drift on imported buckets; no constructor here produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMode {
    /// Provider-managed keys (SSE-S3 equivalent)
    ProviderManaged,
    /// No server-side encryption
    Unencrypted,
}

/// What reconciliation does with a resource removed from the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep the live resource, orphaning it from the stack
    Retain,
    /// Destroy the live resource
    Destroy,
}

/// Protocol used by a website redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectProtocol {
    Http,
    Https,
}

/// Public access block settings, four independent switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    pub const fn new(
        block_public_acls: bool,
        ignore_public_acls: bool,
        block_public_policy: bool,
        restrict_public_buckets: bool,
    ) -> Self {
        Self {
            block_public_acls,
            ignore_public_acls,
            block_public_policy,
            restrict_public_buckets,
        }
    }

    /// All four switches on
    pub const fn block_all() -> Self {
        Self::new(true, true, true, true)
    }
}

impl Default for PublicAccessBlock {
    fn default() -> Self {
        Self::block_all()
    }
}

/// Website redirect target: hostname plus protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteRedirect {
    pub host_name: DomainName,
    pub protocol: RedirectProtocol,
}

impl WebsiteRedirect {
    pub fn new(host_name: DomainName, protocol: RedirectProtocol) -> Self {
        Self { host_name, protocol }
    }
}

/// Object storage bucket node
///
/// Fields are private; the only way to obtain a `Bucket` is through the
/// mode constructors, which keep the invariants:
///
/// - retention is always `Retain`
/// - encryption is always provider-managed
/// - versioning is set exactly when the mode is versioned-private
/// - a redirect target is present exactly when the mode is redirect-website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    logical_id: String,
    mode: BucketMode,
    versioned: bool,
    encryption: EncryptionMode,
    public_access: PublicAccessBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    website_redirect: Option<WebsiteRedirect>,
    retention: RetentionPolicy,
}

impl Bucket {
    /// Create a versioned, private asset bucket
    pub fn versioned_private(
        logical_id: impl Into<String>,
        public_access: PublicAccessBlock,
    ) -> Result<Self, ConfigError> {
        let logical_id = Self::checked_id(logical_id)?;

        Ok(Self {
            logical_id,
            mode: BucketMode::VersionedPrivate,
            versioned: true,
            encryption: EncryptionMode::ProviderManaged,
            public_access,
            website_redirect: None,
            retention: RetentionPolicy::Retain,
        })
    }

    /// Create a redirect-website bucket
    ///
    /// The redirect target is mandatory for this mode.
    pub fn redirect_website(
        logical_id: impl Into<String>,
        redirect: WebsiteRedirect,
    ) -> Result<Self, ConfigError> {
        let logical_id = Self::checked_id(logical_id)?;

        Ok(Self {
            logical_id,
            mode: BucketMode::RedirectWebsite,
            versioned: false,
            encryption: EncryptionMode::ProviderManaged,
            public_access: PublicAccessBlock::block_all(),
            website_redirect: Some(redirect),
            retention: RetentionPolicy::Retain,
        })
    }

    /// Create a bucket from a mode and optional redirect target
    ///
    /// Redirect-website mode without a target is a configuration error,
    /// as is a target supplied for versioned-private mode.
    pub fn from_mode(
        logical_id: impl Into<String>,
        mode: BucketMode,
        redirect: Option<WebsiteRedirect>,
    ) -> Result<Self, ConfigError> {
        match (mode, redirect) {
            (BucketMode::VersionedPrivate, None) => {
                Self::versioned_private(logical_id, PublicAccessBlock::block_all())
            }
            (BucketMode::VersionedPrivate, Some(_)) => Err(ConfigError::RedirectTargetForbidden),
            (BucketMode::RedirectWebsite, Some(redirect)) => {
                Self::redirect_website(logical_id, redirect)
            }
            (BucketMode::RedirectWebsite, None) => Err(ConfigError::RedirectTargetRequired),
        }
    }

    fn checked_id(logical_id: impl Into<String>) -> Result<String, ConfigError> {
        let logical_id = logical_id.into();
        if logical_id.is_empty() {
            return Err(ConfigError::EmptyLogicalId);
        }
        Ok(logical_id)
    }

    /// Override the public access block on a versioned-private bucket
    ///
    /// The assets bucket in the original topology blocks ACLs but not
    /// bucket policies, so the switches stay independently settable.
    pub fn with_public_access(mut self, public_access: PublicAccessBlock) -> Self {
        self.public_access = public_access;
        self
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn mode(&self) -> BucketMode {
        self.mode
    }

    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    pub fn encryption(&self) -> EncryptionMode {
        self.encryption
    }

    pub fn public_access(&self) -> &PublicAccessBlock {
        &self.public_access
    }

    pub fn website_redirect(&self) -> Option<&WebsiteRedirect> {
        self.website_redirect.as_ref()
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }
}
