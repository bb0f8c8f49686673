//! Raw graph to simplified graph reduction.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::dedup::DeduplicationFilter;
use crate::xsd::{EdgeKind, NodeId, NodeKind, RawGraph};

use super::GraphError;

/// A data-bearing element or attribute as it appears in instance documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplifiedNode {
    pub name: String,
    pub kind: NodeKind,
    pub is_list: bool,
}

/// Deduplicated semantic view of the schema.
///
/// Node ids are the ids of the raw nodes they were materialized from. A raw
/// node is materialized at most once; later encounters only add an edge, so
/// recursive types show up as edges back to an earlier node.
#[derive(Debug, Clone)]
pub struct SimplifiedGraph {
    root: NodeId,
    nodes: HashMap<NodeId, SimplifiedNode>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl SimplifiedGraph {
    fn new(root: NodeId, node: SimplifiedNode) -> Self {
        Self {
            root,
            nodes: HashMap::from([(root, node)]),
            children: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_name(&self) -> &str {
        self.nodes.get(&self.root).map(|n| n.name.as_str()).unwrap_or_default()
    }

    pub fn node(&self, id: NodeId) -> Option<&SimplifiedNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Children in schema order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|n| n.name == name))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, id: NodeId, node: SimplifiedNode) {
        self.nodes.insert(id, node);
    }

    /// Add `parent -> child` unless the parent already has a child with that name.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        let Some(name) = self.nodes.get(&child).map(|n| n.name.clone()) else {
            return;
        };
        if self.child_by_name(parent, &name).is_some() {
            return;
        }
        self.children.entry(parent).or_default().push(child);
    }
}

/// Reduce `raw` to the simplified graph rooted at `root`.
///
/// Refs are dereferenced, abstract nodes are skipped except along
/// substitution-group edges, and type/group/extension nodes are walked through
/// transparently. Placeholders (referenced but never defined) are never expanded.
pub fn simplify(raw: &RawGraph, root: NodeId) -> Result<SimplifiedGraph, GraphError> {
    let root_node = raw.node(root).ok_or(GraphError::UnknownRoot { id: root })?;
    let name = root_node
        .name
        .clone()
        .filter(|_| root_node.kind.is_data_bearing())
        .ok_or_else(|| GraphError::InvalidRoot {
            id: root,
            kind: root_node.kind.as_str().to_string(),
        })?;

    let mut simplifier = Simplifier {
        raw,
        graph: SimplifiedGraph::new(
            root,
            SimplifiedNode {
                name,
                kind: root_node.kind,
                is_list: false,
            },
        ),
        visited: DeduplicationFilter::new(),
    };
    simplifier.walk(root, root);

    let graph = simplifier.graph;
    debug!(nodes = graph.len(), root = graph.root_name(), "Simplified schema graph");
    Ok(graph)
}

struct Simplifier<'a> {
    raw: &'a RawGraph,
    graph: SimplifiedGraph,
    /// (raw node, simplified parent) pairs already walked in this traversal
    visited: DeduplicationFilter<(NodeId, NodeId)>,
}

impl Simplifier<'_> {
    fn walk(&mut self, node: NodeId, parent: NodeId) {
        if !self.visited.should_process((node, parent)) {
            return;
        }

        let raw = self.raw;
        let is_abstract = raw.node(node).is_some_and(|n| n.is_abstract);

        for edge in raw.edges(node) {
            let target = edge.target;

            if self.graph.contains(target) {
                self.graph.link(parent, target);
                continue;
            }
            if is_abstract && edge.kind != EdgeKind::SubstitutionGroup {
                continue;
            }
            let Some(target_node) = raw.node(target) else {
                continue;
            };
            if target_node.reference.is_some() {
                self.walk(target, parent);
                continue;
            }

            if target_node.kind.is_data_bearing() && !target_node.is_abstract {
                if let Some(name) = &target_node.name {
                    if self.graph.child_by_name(parent, name).is_none() {
                        self.graph.insert(
                            target,
                            SimplifiedNode {
                                name: name.clone(),
                                kind: target_node.kind,
                                is_list: edge.is_list,
                            },
                        );
                        self.graph.link(parent, target);
                        self.walk(target, target);
                    }
                }
            }

            if target_node.kind != NodeKind::Element || target_node.is_abstract {
                self.walk(target, parent);
            }
        }
    }
}
