//! Resource Graph Construction
//!
//! An explicit graph-builder replaces ambient registration: callers add
//! nodes, each with an explicit dependency list, and `build()` returns
//! an immutable, topologically ordered [`ResourceGraph`] or rejects the
//! input. Node identity is a v5 UUID derived from the stack identity
//! and the node's logical id, so re-synthesizing the same stack yields
//! byte-identical ids.
//!
//! Owned and imported resources are distinct variants of [`NodeKind`];
//! a reconciliation engine consuming the graph can statically refuse to
//! delete or mutate anything imported.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    Bucket, CachePolicy, CertificateRef, Distribution, HostedZoneRef, Origin,
    ResponseHeaderPolicy, StackId,
};

/// Errors raised while assembling or sealing the graph
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    #[error("Node {from} depends on unknown node {to}")]
    UnknownDependency { from: String, to: NodeId },

    #[error("Dependency cycle involving: {}", .0.join(", "))]
    CycleDetected(Vec<String>),
}

/// Deterministic node identity
///
/// Derived from stack identity and logical id with a name-based UUID,
/// never from a clock or a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub(crate) fn derive(stack: &StackId, logical_id: &str) -> Self {
        let name = format!("{}/{}", stack, logical_id);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of a node this stack owns and reconciliation may create,
/// update or (retention permitting) delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSpec {
    Bucket(Bucket),
    ResponseHeaders(ResponseHeaderPolicy),
    Cache(CachePolicy),
    Origin(Origin),
    Distribution(Distribution),
}

impl ResourceSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bucket(_) => "bucket",
            Self::ResponseHeaders(_) => "response_headers_policy",
            Self::Cache(_) => "cache_policy",
            Self::Origin(_) => "origin",
            Self::Distribution(_) => "distribution",
        }
    }
}

/// Payload of a read-only reference to a pre-existing resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportedSpec {
    Certificate(CertificateRef),
    HostedZone(HostedZoneRef),
}

impl ImportedSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Certificate(_) => "certificate",
            Self::HostedZone(_) => "hosted_zone",
        }
    }
}

/// Ownership-tagged node payload
///
/// `Imported` nodes must never be deletion or mutation candidates; the
/// tag makes that refusal checkable without inspecting payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Owned(ResourceSpec),
    Imported(ImportedSpec),
}

impl NodeKind {
    pub fn is_imported(&self) -> bool {
        matches!(self, Self::Imported(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Owned(spec) => spec.kind_name(),
            Self::Imported(spec) => spec.kind_name(),
        }
    }
}

/// A single node of the resource graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    logical_id: String,
    kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    depends_on: Vec<NodeId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn depends_on(&self) -> &[NodeId] {
        &self.depends_on
    }
}

/// Accumulates nodes and seals them into a [`ResourceGraph`]
///
/// Nodes are exclusively owned by the single synthesis pass that
/// creates them; the builder is consumed by `build()`.
#[derive(Debug)]
pub struct GraphBuilder {
    stack: StackId,
    nodes: Vec<Node>,
    seen: HashSet<String>,
}

impl GraphBuilder {
    pub fn new(stack: StackId) -> Self {
        Self {
            stack,
            nodes: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Add an owned resource node, returning its id for dependents
    pub fn add_owned(
        &mut self,
        logical_id: impl Into<String>,
        spec: ResourceSpec,
        depends_on: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        self.add_node(logical_id.into(), NodeKind::Owned(spec), depends_on)
    }

    /// Add an imported, read-only reference node
    pub fn add_imported(
        &mut self,
        logical_id: impl Into<String>,
        spec: ImportedSpec,
        depends_on: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        self.add_node(logical_id.into(), NodeKind::Imported(spec), depends_on)
    }

    fn add_node(
        &mut self,
        logical_id: String,
        kind: NodeKind,
        depends_on: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        if !self.seen.insert(logical_id.clone()) {
            return Err(GraphError::DuplicateLogicalId(logical_id));
        }

        let id = NodeId::derive(&self.stack, &logical_id);
        debug!(
            node = %logical_id,
            kind = kind.kind_name(),
            dependencies = depends_on.len(),
            "added graph node"
        );

        self.nodes.push(Node {
            id,
            logical_id,
            kind,
            depends_on: depends_on.to_vec(),
        });

        Ok(id)
    }

    /// Seal the graph: verify every edge, order nodes topologically,
    /// reject cycles
    ///
    /// Ordering is Kahn's algorithm with ties broken by insertion
    /// order, so the output is deterministic for a given input.
    pub fn build(self) -> Result<ResourceGraph, GraphError> {
        let known: HashMap<NodeId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();

        for node in &self.nodes {
            for dep in &node.depends_on {
                if !known.contains_key(dep) {
                    return Err(GraphError::UnknownDependency {
                        from: node.logical_id.clone(),
                        to: *dep,
                    });
                }
            }
        }

        let mut indegree: Vec<usize> = self.nodes.iter().map(|n| n.depends_on.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for dep in &node.depends_on {
                dependents[known[dep]].push(idx);
            }
        }

        let mut order: Vec<usize> = Vec::with_capacity(self.nodes.len());
        let mut ready: Vec<usize> = (0..self.nodes.len()).filter(|&i| indegree[i] == 0).collect();

        while let Some(idx) = ready.first().copied() {
            ready.remove(0);
            order.push(idx);
            for &dependent in &dependents[idx] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    // Keep ready sorted by insertion index for stable output
                    let pos = ready.partition_point(|&i| i < dependent);
                    ready.insert(pos, dependent);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck: Vec<String> = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(idx, _)| !order.contains(idx))
                .map(|(_, node)| node.logical_id.clone())
                .collect();
            return Err(GraphError::CycleDetected(stuck));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut by_index: Vec<Option<Node>> = self.nodes.into_iter().map(Some).collect();
        for idx in order {
            if let Some(node) = by_index[idx].take() {
                nodes.push(node);
            }
        }

        info!(stack = %self.stack, nodes = nodes.len(), "sealed resource graph");

        Ok(ResourceGraph {
            stack: self.stack,
            nodes,
        })
    }
}

/// Immutable, topologically ordered resource graph
///
/// The terminal output of synthesis, handed to the reconciliation
/// engine as-is. Dependencies of a node always precede it in
/// [`ResourceGraph::nodes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    stack: StackId,
    nodes: Vec<Node>,
}

impl ResourceGraph {
    pub fn stack(&self) -> &StackId {
        &self.stack
    }

    /// Nodes in dependency order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn get_by_logical_id(&self, logical_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.logical_id == logical_id)
    }

    /// Nodes reconciliation may consider for deletion
    ///
    /// Imported nodes are excluded unconditionally; owned nodes still
    /// carry their own retention policies on top of this.
    pub fn deletion_candidates(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| !node.kind.is_imported())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainName, Origin, OriginProtocolPolicy, PublicAccessBlock};

    fn stack() -> StackId {
        StackId::new("graph-test").unwrap()
    }

    fn bucket_spec(id: &str) -> ResourceSpec {
        ResourceSpec::Bucket(
            Bucket::versioned_private(id, PublicAccessBlock::block_all()).unwrap(),
        )
    }

    fn origin_spec() -> ResourceSpec {
        ResourceSpec::Origin(Origin::new(
            DomainName::new("bucket.s3-website.example.com").unwrap(),
            OriginProtocolPolicy::HttpOnly,
        ))
    }

    #[test]
    fn test_node_ids_are_deterministic() {
        let a = NodeId::derive(&stack(), "assets");
        let b = NodeId::derive(&stack(), "assets");
        assert_eq!(a, b);

        let other_stack = StackId::new("other").unwrap();
        assert_ne!(a, NodeId::derive(&other_stack, "assets"));
        assert_ne!(a, NodeId::derive(&stack(), "website"));
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut builder = GraphBuilder::new(stack());
        builder.add_owned("assets", bucket_spec("assets"), &[]).unwrap();

        let err = builder.add_owned("assets", bucket_spec("assets"), &[]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateLogicalId("assets".to_string()));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut builder = GraphBuilder::new(stack());
        let ghost = NodeId::derive(&stack(), "ghost");
        builder.add_owned("origin", origin_spec(), &[ghost]).unwrap();

        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::UnknownDependency { .. }));
    }

    #[test]
    fn test_topological_order() {
        let mut builder = GraphBuilder::new(stack());
        // Insert out of dependency order on purpose: the dependency is
        // declared against a derived id before the node itself exists.
        let bucket_id = NodeId::derive(&stack(), "website");
        builder.add_owned("origin", origin_spec(), &[bucket_id]).unwrap();
        builder.add_owned("website", bucket_spec("website"), &[]).unwrap();

        let graph = builder.build().unwrap();
        let order: Vec<&str> = graph.nodes().iter().map(Node::logical_id).collect();
        assert_eq!(order, vec!["website", "origin"]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut builder = GraphBuilder::new(stack());
        let a = NodeId::derive(&stack(), "a");
        let b = NodeId::derive(&stack(), "b");
        builder.add_owned("a", bucket_spec("a"), &[b]).unwrap();
        builder.add_owned("b", bucket_spec("b"), &[a]).unwrap();

        let err = builder.build().unwrap_err();
        match err {
            GraphError::CycleDetected(ids) => {
                assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_imported_nodes_never_deletion_candidates() {
        let mut builder = GraphBuilder::new(stack());
        builder.add_owned("assets", bucket_spec("assets"), &[]).unwrap();
        builder
            .add_imported(
                "zone",
                ImportedSpec::HostedZone(
                    HostedZoneRef::new("ZDMYNHE4G4KLW", "dnd5eapi.co").unwrap(),
                ),
                &[],
            )
            .unwrap();

        let graph = builder.build().unwrap();
        let candidates = graph.deletion_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].logical_id(), "assets");
        assert!(graph.get_by_logical_id("zone").unwrap().kind().is_imported());
    }

    #[test]
    fn test_lookup_by_id() {
        let mut builder = GraphBuilder::new(stack());
        let id = builder.add_owned("assets", bucket_spec("assets"), &[]).unwrap();

        let graph = builder.build().unwrap();
        assert_eq!(graph.get(id).unwrap().logical_id(), "assets");
        assert!(graph.get(NodeId::derive(&stack(), "missing")).is_none());
    }
}
