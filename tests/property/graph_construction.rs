//! Property-Based Tests for Graph Construction
//!
//! Verifies the guarantees re-synthesis depends on: determinism over
//! arbitrary valid configurations, and rejection of every invalid
//! CORS, TTL and allow-list combination.

use proptest::prelude::*;

use edge_stack::domain::{
    CachePolicy, CachePolicyConfig, ConfigError, CorsPolicyConfig, ForwardingBehavior,
    ResponseHeaderPolicy, RetentionPolicy, StackId,
};
use edge_stack::graph::{NodeKind, ResourceSpec};
use edge_stack::stack::StackConfig;
use edge_stack::synthesize;

const CERT_ARN: &str =
    "arn:aws:acm:us-east-1:911448592982:certificate/b08418e0-443b-408d-9094-ba6e716ede2b";

// ============================================================================
// Strategies
// ============================================================================

/// Lowercase DNS label
fn label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,14}"
}

/// Two-label domain name
fn domain() -> impl Strategy<Value = String> {
    (label(), label()).prop_map(|(a, b)| format!("{a}.{b}"))
}

fn stack_id() -> impl Strategy<Value = StackId> {
    "[a-z][a-z0-9-]{0,20}".prop_map(|s| StackId::new(s).unwrap())
}

/// Ordered TTL triple: min <= default <= max
fn ordered_ttls() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..1_000_000, 0u64..1_000_000, 0u64..1_000_000).prop_map(|(a, b, c)| {
        let mut ttls = [a, b, c];
        ttls.sort_unstable();
        (ttls[0], ttls[1], ttls[2])
    })
}

fn forwarding_behavior() -> impl Strategy<Value = ForwardingBehavior> {
    prop_oneof![
        Just(ForwardingBehavior::None),
        Just(ForwardingBehavior::All),
        prop::collection::vec(label(), 1..4).prop_map(ForwardingBehavior::AllowList),
    ]
}

fn valid_cache_config() -> impl Strategy<Value = CachePolicyConfig> {
    (
        forwarding_behavior(),
        forwarding_behavior(),
        forwarding_behavior(),
        ordered_ttls(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(cookies, headers, queries, (min, default, max), gzip, brotli)| CachePolicyConfig {
                cookie_behavior: cookies,
                header_behavior: headers,
                query_string_behavior: queries,
                min_ttl_secs: min,
                default_ttl_secs: default,
                max_ttl_secs: max,
                enable_gzip: gzip,
                enable_brotli: brotli,
                comment: None,
            },
        )
}

fn valid_stack_config() -> impl Strategy<Value = StackConfig> {
    (
        stack_id(),
        domain(),
        domain(),
        domain(),
        prop::collection::vec(domain(), 1..4),
        valid_cache_config(),
    )
        .prop_map(|(stack, zone, redirect, endpoint, domains, cache)| {
            StackConfig::static_site(
                stack,
                CERT_ARN,
                "ZDMYNHE4G4KLW",
                zone,
                domains,
                redirect,
                endpoint,
                cache,
            )
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: synthesis is deterministic
    ///
    /// Identical configuration must produce a structurally identical
    /// graph, which is what makes re-synthesis safe to run repeatedly.
    #[test]
    fn prop_synthesis_is_deterministic(config in valid_stack_config()) {
        let first = synthesize(&config).unwrap();
        let second = synthesize(&config).unwrap();

        prop_assert_eq!(first, second);
    }

    /// Property: every produced bucket retains on deletion
    ///
    /// No valid configuration may reach a destructive retention policy.
    #[test]
    fn prop_buckets_always_retain(config in valid_stack_config()) {
        let graph = synthesize(&config).unwrap();

        for node in graph.nodes() {
            if let NodeKind::Owned(ResourceSpec::Bucket(bucket)) = node.kind() {
                prop_assert_eq!(bucket.retention(), RetentionPolicy::Retain);
            }
        }
    }

    /// Property: imported nodes are excluded from deletion candidates
    #[test]
    fn prop_imports_never_deletable(config in valid_stack_config()) {
        let graph = synthesize(&config).unwrap();

        for node in graph.deletion_candidates() {
            prop_assert!(!node.kind().is_imported());
        }
    }

    /// Property: output is topologically ordered
    ///
    /// Every dependency appears strictly before its dependent.
    #[test]
    fn prop_output_is_topologically_ordered(config in valid_stack_config()) {
        let graph = synthesize(&config).unwrap();

        for (position, node) in graph.nodes().iter().enumerate() {
            for dep in node.depends_on() {
                let dep_position = graph
                    .nodes()
                    .iter()
                    .position(|candidate| candidate.id() == *dep);
                prop_assert!(matches!(dep_position, Some(p) if p < position));
            }
        }
    }

    /// Property: credentials with a wildcard origin always fail
    #[test]
    fn prop_wildcard_credentials_rejected(
        stack in stack_id(),
        extra_origins in prop::collection::vec(domain(), 0..3),
    ) {
        let mut origins: Vec<String> =
            extra_origins.into_iter().map(|d| format!("https://{d}")).collect();
        origins.push("*".to_string());

        let config = CorsPolicyConfig {
            allow_origins: origins,
            allow_credentials: true,
            ..CorsPolicyConfig::allow_all()
        };

        let err = ResponseHeaderPolicy::from_config(&stack, config).unwrap_err();
        prop_assert_eq!(err, ConfigError::WildcardOriginWithCredentials);
    }

    /// Property: TTL ordering violations always fail
    #[test]
    fn prop_ttl_violations_rejected(
        stack in stack_id(),
        base in valid_cache_config(),
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
        c in 0u64..1_000_000,
    ) {
        prop_assume!(!(a <= b && b <= c));

        let config = CachePolicyConfig {
            min_ttl_secs: a,
            default_ttl_secs: b,
            max_ttl_secs: c,
            ..base
        };

        let err = CachePolicy::from_config(&stack, config).unwrap_err();
        prop_assert!(
            matches!(err, ConfigError::TtlOrdering { .. }),
            "expected TtlOrdering error, got {:?}",
            err
        );
    }

    /// Property: empty allow-lists always fail, whichever field carries them
    #[test]
    fn prop_empty_allow_lists_rejected(
        stack in stack_id(),
        base in valid_cache_config(),
        which in 0usize..3,
    ) {
        let empty = ForwardingBehavior::AllowList(Vec::new());
        let mut config = base;
        match which {
            0 => config.cookie_behavior = empty,
            1 => config.header_behavior = empty,
            _ => config.query_string_behavior = empty,
        }

        let err = CachePolicy::from_config(&stack, config).unwrap_err();
        prop_assert!(
            matches!(err, ConfigError::EmptyAllowList { .. }),
            "expected EmptyAllowList error, got {:?}",
            err
        );
    }

    /// Property: policy names depend only on the stack identity
    #[test]
    fn prop_policy_names_stack_derived(
        stack in stack_id(),
        cache in valid_cache_config(),
    ) {
        let policy = CachePolicy::from_config(&stack, cache).unwrap();
        prop_assert_eq!(policy.name(), format!("{stack}-cache"));

        let headers =
            ResponseHeaderPolicy::from_config(&stack, CorsPolicyConfig::allow_all()).unwrap();
        prop_assert_eq!(headers.name(), format!("{stack}-response-headers"));
    }
}
