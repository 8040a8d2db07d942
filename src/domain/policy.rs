//! CDN Policy Composition
//!
//! Two independent, pure policy builders: a CORS response-header policy
//! and a cache-key policy. Both are deterministic functions from
//! configuration to policy value, and both derive their account-unique
//! names from the stack identity so that repeated synthesis upserts the
//! same policy instead of creating duplicates.

use serde::{Deserialize, Serialize};

use super::{ConfigError, StackId};

/// Wildcard marker accepted in CORS origin lists
pub const WILDCARD: &str = "*";

/// CORS response-header policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsPolicyConfig {
    pub allow_origins: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_credentials: bool,
    pub expose_headers: Vec<String>,
    pub origin_override: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl CorsPolicyConfig {
    /// Allow-all configuration without credentials
    ///
    /// Matches the posture of the original topology: every origin,
    /// header and method permitted, credentials off, preflight covered.
    pub fn allow_all() -> Self {
        Self {
            allow_origins: vec![WILDCARD.to_string()],
            allow_headers: vec![WILDCARD.to_string()],
            allow_methods: ["GET", "HEAD", "PUT", "POST", "PATCH", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            allow_credentials: false,
            expose_headers: vec![WILDCARD.to_string()],
            origin_override: false,
            comment: None,
        }
    }
}

/// Response-header policy node
///
/// # Invariants
/// - Name is derived from the stack identity (idempotent upsert)
/// - Wildcard origin with allow-credentials is rejected; the CDN
///   provider refuses that combination, so it never leaves this crate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeaderPolicy {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    allow_origins: Vec<String>,
    allow_headers: Vec<String>,
    allow_methods: Vec<String>,
    allow_credentials: bool,
    expose_headers: Vec<String>,
    origin_override: bool,
}

impl ResponseHeaderPolicy {
    /// Build a response-header policy from configuration
    ///
    /// Pure and deterministic: the same stack identity and config
    /// always produce the same policy value.
    pub fn from_config(stack: &StackId, config: CorsPolicyConfig) -> Result<Self, ConfigError> {
        if config.allow_origins.is_empty() {
            return Err(ConfigError::EmptyAllowOrigins);
        }

        if config.allow_credentials && config.allow_origins.iter().any(|o| o == WILDCARD) {
            return Err(ConfigError::WildcardOriginWithCredentials);
        }

        Ok(Self {
            name: format!("{}-response-headers", stack),
            comment: config.comment,
            allow_origins: config.allow_origins,
            allow_headers: config.allow_headers,
            allow_methods: config.allow_methods,
            allow_credentials: config.allow_credentials,
            expose_headers: config.expose_headers,
            origin_override: config.origin_override,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn allow_origins(&self) -> &[String] {
        &self.allow_origins
    }

    pub fn allow_headers(&self) -> &[String] {
        &self.allow_headers
    }

    pub fn allow_methods(&self) -> &[String] {
        &self.allow_methods
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    pub fn expose_headers(&self) -> &[String] {
        &self.expose_headers
    }

    pub fn origin_override(&self) -> bool {
        self.origin_override
    }
}

/// Forwarding behavior for cookies, headers or query strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardingBehavior {
    /// Forward nothing into the cache key
    None,
    /// Forward only the named keys
    AllowList(Vec<String>),
    /// Forward everything
    All,
}

impl ForwardingBehavior {
    /// Allow-list constructor from anything iterable
    pub fn allow_list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowList(keys.into_iter().map(Into::into).collect())
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        match self {
            Self::AllowList(keys) if keys.is_empty() => Err(ConfigError::EmptyAllowList { field }),
            _ => Ok(()),
        }
    }
}

/// Cache-key policy configuration
///
/// TTLs are whole seconds; nodes carry no clock-derived values so that
/// re-synthesis stays structurally idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicyConfig {
    pub cookie_behavior: ForwardingBehavior,
    pub header_behavior: ForwardingBehavior,
    pub query_string_behavior: ForwardingBehavior,
    pub min_ttl_secs: u64,
    pub default_ttl_secs: u64,
    pub max_ttl_secs: u64,
    pub enable_gzip: bool,
    pub enable_brotli: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

/// Cache-key policy node
///
/// # Invariants
/// - Name is derived from the stack identity (idempotent upsert)
/// - min ≤ default ≤ max TTL
/// - Allow-list behaviors carry at least one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    cookie_behavior: ForwardingBehavior,
    header_behavior: ForwardingBehavior,
    query_string_behavior: ForwardingBehavior,
    min_ttl_secs: u64,
    default_ttl_secs: u64,
    max_ttl_secs: u64,
    enable_gzip: bool,
    enable_brotli: bool,
}

impl CachePolicy {
    /// Build a cache policy from configuration
    ///
    /// Pure and deterministic, like
    /// [`ResponseHeaderPolicy::from_config`].
    pub fn from_config(stack: &StackId, config: CachePolicyConfig) -> Result<Self, ConfigError> {
        if !(config.min_ttl_secs <= config.default_ttl_secs
            && config.default_ttl_secs <= config.max_ttl_secs)
        {
            return Err(ConfigError::TtlOrdering {
                min: config.min_ttl_secs,
                default: config.default_ttl_secs,
                max: config.max_ttl_secs,
            });
        }

        config.cookie_behavior.validate("cookies")?;
        config.header_behavior.validate("headers")?;
        config.query_string_behavior.validate("query_strings")?;

        Ok(Self {
            name: format!("{}-cache", stack),
            comment: config.comment,
            cookie_behavior: config.cookie_behavior,
            header_behavior: config.header_behavior,
            query_string_behavior: config.query_string_behavior,
            min_ttl_secs: config.min_ttl_secs,
            default_ttl_secs: config.default_ttl_secs,
            max_ttl_secs: config.max_ttl_secs,
            enable_gzip: config.enable_gzip,
            enable_brotli: config.enable_brotli,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn cookie_behavior(&self) -> &ForwardingBehavior {
        &self.cookie_behavior
    }

    pub fn header_behavior(&self) -> &ForwardingBehavior {
        &self.header_behavior
    }

    pub fn query_string_behavior(&self) -> &ForwardingBehavior {
        &self.query_string_behavior
    }

    pub fn min_ttl_secs(&self) -> u64 {
        self.min_ttl_secs
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    pub fn max_ttl_secs(&self) -> u64 {
        self.max_ttl_secs
    }

    pub fn enable_gzip(&self) -> bool {
        self.enable_gzip
    }

    pub fn enable_brotli(&self) -> bool {
        self.enable_brotli
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_SECS: u64 = 86_400;

    fn stack() -> StackId {
        StackId::new("delivery-test").unwrap()
    }

    fn cache_config() -> CachePolicyConfig {
        CachePolicyConfig {
            cookie_behavior: ForwardingBehavior::None,
            header_behavior: ForwardingBehavior::None,
            query_string_behavior: ForwardingBehavior::allow_list(["nope"]),
            min_ttl_secs: 0,
            default_ttl_secs: DAY_SECS,
            max_ttl_secs: 365 * DAY_SECS,
            enable_gzip: false,
            enable_brotli: false,
            comment: None,
        }
    }

    #[test]
    fn test_cors_policy_name_is_stack_derived() {
        let policy =
            ResponseHeaderPolicy::from_config(&stack(), CorsPolicyConfig::allow_all()).unwrap();
        assert_eq!(policy.name(), "delivery-test-response-headers");
    }

    #[test]
    fn test_cors_wildcard_with_credentials_rejected() {
        let config = CorsPolicyConfig {
            allow_credentials: true,
            ..CorsPolicyConfig::allow_all()
        };

        let err = ResponseHeaderPolicy::from_config(&stack(), config).unwrap_err();
        assert_eq!(err, ConfigError::WildcardOriginWithCredentials);
    }

    #[test]
    fn test_cors_credentials_allowed_with_named_origins() {
        let config = CorsPolicyConfig {
            allow_origins: vec!["https://app.example.com".to_string()],
            allow_credentials: true,
            ..CorsPolicyConfig::allow_all()
        };

        let policy = ResponseHeaderPolicy::from_config(&stack(), config).unwrap();
        assert!(policy.allow_credentials());
    }

    #[test]
    fn test_cors_empty_origins_rejected() {
        let config = CorsPolicyConfig {
            allow_origins: Vec::new(),
            ..CorsPolicyConfig::allow_all()
        };

        let err = ResponseHeaderPolicy::from_config(&stack(), config).unwrap_err();
        assert_eq!(err, ConfigError::EmptyAllowOrigins);
    }

    #[test]
    fn test_cache_policy_preserves_fields() {
        let policy = CachePolicy::from_config(&stack(), cache_config()).unwrap();

        assert_eq!(policy.name(), "delivery-test-cache");
        assert_eq!(
            policy.query_string_behavior(),
            &ForwardingBehavior::allow_list(["nope"])
        );
        assert_eq!(policy.min_ttl_secs(), 0);
        assert_eq!(policy.default_ttl_secs(), DAY_SECS);
        assert_eq!(policy.max_ttl_secs(), 365 * DAY_SECS);
        assert!(!policy.enable_gzip());
        assert!(!policy.enable_brotli());
    }

    #[test]
    fn test_ttl_ordering_enforced() {
        let config = CachePolicyConfig {
            min_ttl_secs: 100,
            default_ttl_secs: 50,
            ..cache_config()
        };

        let err = CachePolicy::from_config(&stack(), config).unwrap_err();
        assert!(matches!(err, ConfigError::TtlOrdering { .. }));

        let config = CachePolicyConfig {
            default_ttl_secs: 2 * 365 * DAY_SECS,
            ..cache_config()
        };
        assert!(CachePolicy::from_config(&stack(), config).is_err());
    }

    #[test]
    fn test_empty_allow_list_rejected() {
        let config = CachePolicyConfig {
            query_string_behavior: ForwardingBehavior::AllowList(Vec::new()),
            ..cache_config()
        };

        let err = CachePolicy::from_config(&stack(), config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyAllowList {
                field: "query_strings"
            }
        );

        let config = CachePolicyConfig {
            cookie_behavior: ForwardingBehavior::AllowList(Vec::new()),
            ..cache_config()
        };
        assert_eq!(
            CachePolicy::from_config(&stack(), config).unwrap_err(),
            ConfigError::EmptyAllowList { field: "cookies" }
        );
    }

    #[test]
    fn test_builders_are_deterministic() {
        let a = CachePolicy::from_config(&stack(), cache_config()).unwrap();
        let b = CachePolicy::from_config(&stack(), cache_config()).unwrap();
        assert_eq!(a, b);

        let c =
            ResponseHeaderPolicy::from_config(&stack(), CorsPolicyConfig::allow_all()).unwrap();
        let d =
            ResponseHeaderPolicy::from_config(&stack(), CorsPolicyConfig::allow_all()).unwrap();
        assert_eq!(c, d);
    }
}
