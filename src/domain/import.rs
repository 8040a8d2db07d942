//! Imported Resource References
//!
//! Read-only references to resources that already exist in the target
//! account: the TLS certificate the distribution binds and the DNS
//! hosted zone for the delegated domain. Identifiers are validated
//! locally at construction time; no network lookup happens here.
//! Reconciliation must never delete or modify resources reached through
//! these references (see [`crate::graph::NodeKind::Imported`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{DomainName, DomainNameError};

/// Import resolution error
///
/// Raised synchronously when an external identifier fails local format
/// validation. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Malformed certificate ARN: {0}")]
    MalformedCertificateArn(String),

    #[error("ARN does not reference a certificate: service is {0}")]
    NotACertificate(String),

    #[error("Certificate is in region {found}, the edge network requires {required}")]
    WrongCertificateRegion { found: String, required: String },

    #[error("Malformed hosted zone id: {0}")]
    MalformedZoneId(String),

    #[error("Invalid zone name: {0}")]
    InvalidZoneName(#[from] DomainNameError),
}

/// Reference to a pre-existing TLS certificate
///
/// The edge network serves globally and only accepts certificates
/// provisioned in one specific region, regardless of where the rest of
/// the stack lives. The ARN is parsed and checked locally; the
/// certificate itself is never fetched.
///
/// Subject names are optional metadata. When present they enable a
/// local coverage check during distribution assembly; when absent the
/// check is deferred to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRef {
    arn: String,
    region: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    subject_names: Vec<String>,
}

impl CertificateRef {
    /// Region the edge network requires certificates to live in
    pub const REQUIRED_REGION: &'static str = "us-east-1";

    /// Service component expected in the ARN
    const CERTIFICATE_SERVICE: &'static str = "acm";

    /// Resolve a certificate reference from its ARN
    ///
    /// Expected shape:
    /// `arn:<partition>:acm:<region>:<account>:certificate/<id>`
    ///
    /// # Invariants
    /// - Six colon-separated components with the `arn` prefix
    /// - Service must be the certificate service
    /// - Region must be [`Self::REQUIRED_REGION`]
    /// - Account must be numeric, resource must be `certificate/<id>`
    pub fn from_arn(arn: impl Into<String>) -> Result<Self, ImportError> {
        let arn = arn.into();
        let parts: Vec<&str> = arn.splitn(6, ':').collect();

        if parts.len() != 6 || parts[0] != "arn" || parts[1].is_empty() {
            return Err(ImportError::MalformedCertificateArn(arn));
        }

        let (service, region, account, resource) = (parts[2], parts[3], parts[4], parts[5]);

        if service != Self::CERTIFICATE_SERVICE {
            return Err(ImportError::NotACertificate(service.to_string()));
        }

        if region != Self::REQUIRED_REGION {
            return Err(ImportError::WrongCertificateRegion {
                found: region.to_string(),
                required: Self::REQUIRED_REGION.to_string(),
            });
        }

        if account.is_empty() || !account.chars().all(|c| c.is_ascii_digit()) {
            return Err(ImportError::MalformedCertificateArn(arn));
        }

        match resource.strip_prefix("certificate/") {
            Some(id) if !id.is_empty() => {}
            _ => return Err(ImportError::MalformedCertificateArn(arn)),
        }

        let region = region.to_string();
        Ok(Self {
            arn,
            region,
            subject_names: Vec::new(),
        })
    }

    /// Attach known subject names for local coverage checks
    ///
    /// Patterns are exact names or a single leading wildcard label
    /// (`*.example.com`).
    pub fn with_subject_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.subject_names = names.into_iter().collect();
        self
    }

    /// The full ARN of the referenced certificate
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// The region the certificate lives in
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Known subject names, empty when not supplied
    pub fn subject_names(&self) -> &[String] {
        &self.subject_names
    }

    /// Whether the certificate's known subjects cover a domain
    ///
    /// Returns `true` when no subject names were supplied; coverage is
    /// then the provider's problem at reconciliation time. A wildcard
    /// subject covers exactly one extra label.
    pub fn covers(&self, domain: &DomainName) -> bool {
        if self.subject_names.is_empty() {
            return true;
        }

        self.subject_names.iter().any(|subject| {
            if let Some(suffix) = subject.strip_prefix("*.") {
                domain.parent() == Some(suffix)
            } else {
                subject == domain.as_str()
            }
        })
    }
}

impl fmt::Display for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arn)
    }
}

/// Reference to a pre-existing DNS hosted zone
///
/// Currently no node in the produced graph depends on the zone; it is
/// imported so future DNS record nodes can attach to it without
/// reshaping the graph. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZoneRef {
    zone_id: String,
    zone_name: DomainName,
}

impl HostedZoneRef {
    /// Minimum length of a zone id after the `Z` prefix
    const MIN_ID_SUFFIX: usize = 8;

    /// Resolve a hosted zone reference from its id and zone name
    ///
    /// Zone ids start with `Z` followed by at least eight uppercase
    /// alphanumeric characters.
    pub fn new(zone_id: impl Into<String>, zone_name: impl Into<String>) -> Result<Self, ImportError> {
        let zone_id = zone_id.into();

        let valid = zone_id
            .strip_prefix('Z')
            .map(|rest| {
                rest.len() >= Self::MIN_ID_SUFFIX
                    && rest.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            })
            .unwrap_or(false);

        if !valid {
            return Err(ImportError::MalformedZoneId(zone_id));
        }

        let zone_name = DomainName::new(zone_name)?;

        Ok(Self { zone_id, zone_name })
    }

    /// The external zone id
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// The zone's apex domain name
    pub fn zone_name(&self) -> &DomainName {
        &self.zone_name
    }
}

impl fmt::Display for HostedZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.zone_id, self.zone_name)
    }
}
