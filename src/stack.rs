//! Stack Synthesis
//!
//! The single synthesis pass: a static [`StackConfig`] goes in, an
//! immutable [`ResourceGraph`] comes out. Leaves first (buckets,
//! imported identities, policies), then the origin, then the
//! distribution root, so every node's dependencies exist before the
//! node references them. No I/O, no clocks; two runs over the same
//! config produce structurally identical graphs.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    BehaviorConfig, Bucket, CachePolicy, CachePolicyConfig, CertificateRef, CorsPolicyConfig,
    Distribution, DistributionSettings, DomainName, HostedZoneRef, Origin, OriginProtocolPolicy,
    PublicAccessBlock, RedirectProtocol, ResponseHeaderPolicy, StackId, WebsiteRedirect,
};
use crate::errors::SynthesisResult;
use crate::graph::{GraphBuilder, ImportedSpec, ResourceGraph, ResourceSpec};

/// Logical id of the imported certificate node
pub const CERTIFICATE_ID: &str = "certificate";
/// Logical id of the imported hosted zone node
pub const HOSTED_ZONE_ID: &str = "hosted-zone";
/// Logical id of the response-header policy node
pub const RESPONSE_HEADERS_ID: &str = "response-headers-policy";
/// Logical id of the cache policy node
pub const CACHE_POLICY_ID: &str = "cache-policy";
/// Logical id of the origin node
pub const ORIGIN_ID: &str = "origin";
/// Logical id of the distribution node
pub const DISTRIBUTION_ID: &str = "distribution";

/// Static configuration for one delivery stack
///
/// Plain input data: identifiers and domain names arrive as raw strings
/// and are validated during [`synthesize`], so a config can be
/// deserialized from anywhere before any invariant is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Stack identity; seeds node ids and policy names
    pub stack: StackId,

    /// Logical id of the versioned asset bucket
    pub assets_bucket_id: String,
    /// Public access switches for the asset bucket
    pub assets_public_access: PublicAccessBlock,

    /// Logical id of the redirect-website bucket
    pub website_bucket_id: String,
    /// Redirect target hostname for the website bucket
    pub redirect_host: String,
    /// Redirect protocol for the website bucket
    pub redirect_protocol: RedirectProtocol,

    /// ARN of the pre-existing TLS certificate
    pub certificate_arn: String,
    /// Known certificate subject names; empty defers coverage checks
    #[serde(default)]
    pub certificate_subject_names: Vec<String>,

    /// Id of the pre-existing hosted zone
    pub hosted_zone_id: String,
    /// Apex name of the hosted zone
    pub hosted_zone_name: String,

    /// Public domain names the distribution serves
    pub domains: Vec<String>,

    /// CORS response-header policy parameters
    pub cors: CorsPolicyConfig,
    /// Cache-key policy parameters
    pub cache: CachePolicyConfig,

    /// Storage website endpoint the origin wraps
    pub origin_endpoint: String,
    /// Protocol the distribution uses toward the origin
    pub origin_protocol: OriginProtocolPolicy,

    /// Default behavior switches
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// Distribution-wide switches
    #[serde(default)]
    pub settings: DistributionSettings,
}

impl StackConfig {
    /// Configuration for a redirect-fronted static site
    ///
    /// Fills the fixed topology defaults: website origin over plain
    /// HTTP, allow-all CORS without credentials, query-string-keyed
    /// cache, HTTP/2 with IPv6 at every edge location.
    pub fn static_site(
        stack: StackId,
        certificate_arn: impl Into<String>,
        hosted_zone_id: impl Into<String>,
        hosted_zone_name: impl Into<String>,
        domains: Vec<String>,
        redirect_host: impl Into<String>,
        origin_endpoint: impl Into<String>,
        cache: CachePolicyConfig,
    ) -> Self {
        Self {
            stack,
            assets_bucket_id: "assets-bucket".to_string(),
            assets_public_access: PublicAccessBlock::new(true, true, false, false),
            website_bucket_id: "website-bucket".to_string(),
            redirect_host: redirect_host.into(),
            redirect_protocol: RedirectProtocol::Https,
            certificate_arn: certificate_arn.into(),
            certificate_subject_names: Vec::new(),
            hosted_zone_id: hosted_zone_id.into(),
            hosted_zone_name: hosted_zone_name.into(),
            domains,
            cors: CorsPolicyConfig::allow_all(),
            cache,
            origin_endpoint: origin_endpoint.into(),
            origin_protocol: OriginProtocolPolicy::HttpOnly,
            behavior: BehaviorConfig::default(),
            settings: DistributionSettings::default(),
        }
    }
}

/// Synthesize the resource graph for a stack configuration
///
/// Construction order follows the dependency DAG: storage and imported
/// leaves, the two policies, the origin wrapping the website bucket,
/// and finally the distribution composing certificate, origin and both
/// policies. Any invariant violation aborts the pass before a graph is
/// produced.
pub fn synthesize(config: &StackConfig) -> SynthesisResult<ResourceGraph> {
    debug!(stack = %config.stack, "starting synthesis pass");

    let mut builder = GraphBuilder::new(config.stack.clone());

    // Storage leaves
    let assets = Bucket::versioned_private(&config.assets_bucket_id, config.assets_public_access)?;
    builder.add_owned(&config.assets_bucket_id, ResourceSpec::Bucket(assets), &[])?;

    let redirect = WebsiteRedirect::new(
        DomainName::new(&config.redirect_host).map_err(crate::domain::ConfigError::from)?,
        config.redirect_protocol,
    );
    let website = Bucket::redirect_website(&config.website_bucket_id, redirect)?;
    let website_node =
        builder.add_owned(&config.website_bucket_id, ResourceSpec::Bucket(website), &[])?;

    // Imported identity leaves
    let certificate = CertificateRef::from_arn(&config.certificate_arn)?
        .with_subject_names(config.certificate_subject_names.iter().cloned());
    let certificate_node = builder.add_imported(
        CERTIFICATE_ID,
        ImportedSpec::Certificate(certificate.clone()),
        &[],
    )?;

    let zone = HostedZoneRef::new(&config.hosted_zone_id, &config.hosted_zone_name)?;
    builder.add_imported(HOSTED_ZONE_ID, ImportedSpec::HostedZone(zone), &[])?;

    // Policy leaves
    let response_headers = ResponseHeaderPolicy::from_config(&config.stack, config.cors.clone())?;
    let response_headers_node = builder.add_owned(
        RESPONSE_HEADERS_ID,
        ResourceSpec::ResponseHeaders(response_headers.clone()),
        &[],
    )?;

    let cache_policy = CachePolicy::from_config(&config.stack, config.cache.clone())?;
    let cache_node = builder.add_owned(
        CACHE_POLICY_ID,
        ResourceSpec::Cache(cache_policy.clone()),
        &[],
    )?;

    // Origin wraps the website bucket's endpoint
    let endpoint =
        DomainName::new(&config.origin_endpoint).map_err(crate::domain::ConfigError::from)?;
    let origin = Origin::new(endpoint, config.origin_protocol);
    let origin_node = builder.add_owned(
        ORIGIN_ID,
        ResourceSpec::Origin(origin.clone()),
        &[website_node],
    )?;

    // Distribution root
    let domains = config
        .domains
        .iter()
        .map(DomainName::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(crate::domain::ConfigError::from)?;
    let distribution = Distribution::assemble(
        domains,
        &certificate,
        origin,
        &cache_policy,
        &response_headers,
        config.behavior,
        config.settings.clone(),
    )?;
    builder.add_owned(
        DISTRIBUTION_ID,
        ResourceSpec::Distribution(distribution),
        &[certificate_node, origin_node, cache_node, response_headers_node],
    )?;

    let graph = builder.build()?;
    info!(stack = %config.stack, nodes = graph.len(), "synthesis complete");
    Ok(graph)
}
