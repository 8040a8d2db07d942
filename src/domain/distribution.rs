//! CDN Distribution Assembly
//!
//! The root node of the topology: composes the imported certificate,
//! the origin and both policies into a single edge configuration bound
//! to the public domain names. Changing this node has the widest blast
//! radius of the graph, so assembly validates what it can locally and
//! keeps everything else append-mostly.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CachePolicy, CertificateRef, ConfigError, DomainName, Origin, ResponseHeaderPolicy};

/// HTTP methods the distribution accepts from viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedMethods {
    GetHead,
    GetHeadOptions,
    All,
}

/// HTTP methods whose responses are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedMethods {
    GetHead,
    GetHeadOptions,
}

/// How viewer protocol mismatches are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerProtocolPolicy {
    AllowAll,
    RedirectToHttps,
    HttpsOnly,
}

/// HTTP version negotiated at the edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    Http1_1,
    Http2,
    Http2And3,
}

/// Edge location price class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceClass {
    PriceClass100,
    PriceClass200,
    PriceClassAll,
}

/// Minimum TLS protocol version for viewer connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumProtocolVersion {
    TlsV1,
    TlsV1_1_2016,
    TlsV1_2_2019,
    TlsV1_2_2021,
}

impl MinimumProtocolVersion {
    /// Provider-side policy identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TlsV1 => "TLSv1",
            Self::TlsV1_1_2016 => "TLSv1.1_2016",
            Self::TlsV1_2_2019 => "TLSv1.2_2019",
            Self::TlsV1_2_2021 => "TLSv1.2_2021",
        }
    }
}

impl fmt::Display for MinimumProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-behavior switches supplied by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    pub allowed_methods: AllowedMethods,
    pub cached_methods: CachedMethods,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub compress: bool,
}

impl Default for BehaviorConfig {
    /// Static-site defaults from the original topology
    fn default() -> Self {
        Self {
            allowed_methods: AllowedMethods::GetHeadOptions,
            cached_methods: CachedMethods::GetHead,
            viewer_protocol_policy: ViewerProtocolPolicy::AllowAll,
            compress: false,
        }
    }
}

/// Distribution-wide switches supplied by configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSettings {
    pub enabled: bool,
    pub enable_ipv6: bool,
    pub http_version: HttpVersion,
    pub price_class: PriceClass,
    pub minimum_protocol_version: MinimumProtocolVersion,
    /// Left empty by the original topology
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    /// Left empty by the original topology
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_root_object: Option<String>,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_ipv6: true,
            http_version: HttpVersion::Http2,
            price_class: PriceClass::PriceClassAll,
            minimum_protocol_version: MinimumProtocolVersion::TlsV1_1_2016,
            comment: None,
            default_root_object: None,
        }
    }
}

/// The default cache behavior of the distribution
///
/// Policies are referenced by their stack-derived names; the dependency
/// edges live on the graph node, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBehavior {
    origin: Origin,
    allowed_methods: AllowedMethods,
    cached_methods: CachedMethods,
    viewer_protocol_policy: ViewerProtocolPolicy,
    compress: bool,
    cache_policy_name: String,
    response_headers_policy_name: String,
}

impl DefaultBehavior {
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn allowed_methods(&self) -> AllowedMethods {
        self.allowed_methods
    }

    pub fn cached_methods(&self) -> CachedMethods {
        self.cached_methods
    }

    pub fn viewer_protocol_policy(&self) -> ViewerProtocolPolicy {
        self.viewer_protocol_policy
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn cache_policy_name(&self) -> &str {
        &self.cache_policy_name
    }

    pub fn response_headers_policy_name(&self) -> &str {
        &self.response_headers_policy_name
    }
}

/// CDN distribution node, the terminal output of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    domains: Vec<DomainName>,
    certificate_arn: String,
    default_behavior: DefaultBehavior,
    enabled: bool,
    enable_ipv6: bool,
    http_version: HttpVersion,
    price_class: PriceClass,
    minimum_protocol_version: MinimumProtocolVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_root_object: Option<String>,
}

impl Distribution {
    /// Assemble the distribution from its composed parts
    ///
    /// # Invariants
    /// - The domain set must be non-empty
    /// - When the certificate carries subject names, every domain must
    ///   be covered; otherwise coverage is deferred to the provider
    pub fn assemble(
        domains: Vec<DomainName>,
        certificate: &CertificateRef,
        origin: Origin,
        cache_policy: &CachePolicy,
        response_headers: &ResponseHeaderPolicy,
        behavior: BehaviorConfig,
        settings: DistributionSettings,
    ) -> Result<Self, ConfigError> {
        if domains.is_empty() {
            return Err(ConfigError::EmptyDomainSet);
        }

        for domain in &domains {
            if !certificate.covers(domain) {
                return Err(ConfigError::DomainNotCovered {
                    domain: domain.as_str().to_string(),
                });
            }
        }

        Ok(Self {
            domains,
            certificate_arn: certificate.arn().to_string(),
            default_behavior: DefaultBehavior {
                origin,
                allowed_methods: behavior.allowed_methods,
                cached_methods: behavior.cached_methods,
                viewer_protocol_policy: behavior.viewer_protocol_policy,
                compress: behavior.compress,
                cache_policy_name: cache_policy.name().to_string(),
                response_headers_policy_name: response_headers.name().to_string(),
            },
            enabled: settings.enabled,
            enable_ipv6: settings.enable_ipv6,
            http_version: settings.http_version,
            price_class: settings.price_class,
            minimum_protocol_version: settings.minimum_protocol_version,
            comment: settings.comment,
            default_root_object: settings.default_root_object,
        })
    }

    pub fn domains(&self) -> &[DomainName] {
        &self.domains
    }

    pub fn certificate_arn(&self) -> &str {
        &self.certificate_arn
    }

    pub fn default_behavior(&self) -> &DefaultBehavior {
        &self.default_behavior
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ipv6_enabled(&self) -> bool {
        self.enable_ipv6
    }

    pub fn http_version(&self) -> HttpVersion {
        self.http_version
    }

    pub fn price_class(&self) -> PriceClass {
        self.price_class
    }

    pub fn minimum_protocol_version(&self) -> MinimumProtocolVersion {
        self.minimum_protocol_version
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn default_root_object(&self) -> Option<&str> {
        self.default_root_object.as_deref()
    }
}
