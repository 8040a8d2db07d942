//! Domain Name Value Object with DNS Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Domain name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("Domain name is empty")]
    Empty,

    #[error("Domain name exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in domain name: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("Top-level label cannot be all numeric: {0}")]
    NumericLabel(String),
}

/// Fully qualified domain name value object
///
/// Represents a valid DNS name following RFC 1123 with invariants:
/// - Total length ≤ 253 characters
/// - Each label ≤ 63 characters
/// - Labels contain only alphanumeric and hyphens
/// - Labels cannot start or end with hyphens
/// - The top-level label cannot be all numeric
///
/// Wildcard names are deliberately not representable here; certificate
/// subject patterns keep their own matching rules (see
/// [`crate::domain::import::CertificateRef`]).
///
/// # Examples
///
/// ```rust
/// use edge_stack::domain::DomainName;
///
/// let apex = DomainName::new("dnd5eapi.co").unwrap();
/// let www = DomainName::new("www.example.com").unwrap();
///
/// assert!(DomainName::new("").is_err());
/// assert!(DomainName::new("-invalid.com").is_err());
/// assert!(DomainName::new("*.example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    /// Maximum total length for a FQDN (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Create a new domain name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, DomainNameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(DomainNameError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(DomainNameError::TooLong(name.len()));
        }

        for label in name.split('.') {
            Self::validate_label(label)?;
        }

        // All-numeric TLDs are rejected so names cannot be confused
        // with raw addresses.
        if let Some(tld) = name.rsplit('.').next() {
            if tld.chars().all(|c| c.is_ascii_digit()) {
                return Err(DomainNameError::NumericLabel(tld.to_string()));
            }
        }

        Ok(Self(name))
    }

    fn validate_label(label: &str) -> Result<(), DomainNameError> {
        if label.is_empty() {
            return Err(DomainNameError::Empty);
        }

        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(DomainNameError::LabelTooLong(label.to_string()));
        }

        for ch in label.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '-' {
                return Err(DomainNameError::InvalidCharacter(ch));
            }
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainNameError::InvalidLabelFormat(label.to_string()));
        }

        Ok(())
    }

    /// Get the domain name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the parent zone (everything after the first label)
    pub fn parent(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, parent)| parent)
    }

    /// Convert to lowercase (canonical form)
    pub fn to_lowercase(&self) -> Self {
        Self(self.0.to_lowercase())
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
