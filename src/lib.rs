//! Declarative resource graph for a static-asset and CDN delivery tier
//!
//! This crate declares the cloud topology behind a public API's static
//! assets: object storage for images, a redirect-only website bucket, a
//! CDN distribution bound to a custom domain and TLS certificate, and
//! the cache and response-header policies the distribution composes.
//!
//! The output of [`stack::synthesize`] is an immutable, topologically
//! ordered [`graph::ResourceGraph`] meant for an external
//! reconciliation engine; this crate never talks to a cloud account.
//! All validation happens locally and synchronously at construction
//! time.

pub mod domain;
pub mod errors;
pub mod graph;
pub mod stack;

// Re-export commonly used types
pub use domain::{ConfigError, DomainName, ImportError, StackId};
pub use errors::{SynthesisError, SynthesisResult};
pub use graph::{GraphBuilder, Node, NodeId, NodeKind, ResourceGraph};
pub use stack::{synthesize, StackConfig};
