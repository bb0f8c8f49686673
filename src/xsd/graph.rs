//! Arena-backed raw schema graph.
//!
//! Every syntactic occurrence in the schema corpus gets its own slot in the
//! arena. Top-level constructs are additionally registered under their name so
//! that `type`, `ref`, `base` and `substitutionGroup` attributes can point at
//! them; inline constructs are only reachable through containment edges.
//!
//! A name that is referenced but never defined keeps an empty slot (a
//! placeholder). Placeholders carry edges but no node data.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

/// Handle into the raw graph arena.
pub type NodeId = usize;

/// XSD construct a raw node was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Element,
    Attribute,
    ComplexType,
    SimpleType,
    Group,
    AttributeGroup,
    Extension,
    Enumeration,
    MinInclusive,
    MaxInclusive,
    List,
    Any,
    /// An inline `<element ref="..."/>`
    #[serde(rename = "ref_element")]
    RefElement,
}

impl NodeKind {
    /// Map an XSD local tag name to a node kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "element" => Self::Element,
            "attribute" => Self::Attribute,
            "complexType" => Self::ComplexType,
            "simpleType" => Self::SimpleType,
            "group" => Self::Group,
            "attributeGroup" => Self::AttributeGroup,
            "extension" => Self::Extension,
            "enumeration" => Self::Enumeration,
            "minInclusive" => Self::MinInclusive,
            "maxInclusive" => Self::MaxInclusive,
            "list" => Self::List,
            "any" => Self::Any,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Attribute => "attribute",
            Self::ComplexType => "complexType",
            Self::SimpleType => "simpleType",
            Self::Group => "group",
            Self::AttributeGroup => "attributeGroup",
            Self::Extension => "extension",
            Self::Enumeration => "enumeration",
            Self::MinInclusive => "minInclusive",
            Self::MaxInclusive => "maxInclusive",
            Self::List => "list",
            Self::Any => "any",
            Self::RefElement => "ref_element",
        }
    }

    /// Kinds that can show up as a tag or attribute in instance documents.
    pub fn is_data_bearing(&self) -> bool {
        matches!(self, Self::Element | Self::Attribute | Self::RefElement)
    }
}

/// How an edge connects two raw nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Containment: the target is syntactically inside the source.
    None,
    Type,
    Ref,
    SubstitutionGroup,
    Base,
}

/// Node data for a defined arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub is_abstract: bool,
    pub reference: Option<String>,
    pub item_type: Option<String>,
    pub value: Option<String>,
}

impl RawNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            content_type: None,
            is_abstract: false,
            reference: None,
            item_type: None,
            value: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdge {
    pub target: NodeId,
    pub kind: EdgeKind,
    pub is_list: bool,
}

/// The compiled, immutable XSD graph.
#[derive(Debug, Default, Clone)]
pub struct RawGraph {
    nodes: Vec<Option<RawNode>>,
    edges: Vec<Vec<RawEdge>>,
    names: HashMap<String, NodeId>,
}

impl RawGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot registered under `name`, creating a placeholder if needed.
    pub fn named(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = self.push(None);
        self.names.insert(name.to_string(), id);
        id
    }

    /// Slot registered under `name`, if the name was ever mentioned.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Attach node data to the slot registered under `name`.
    ///
    /// Redefinition replaces the node data but keeps every edge collected so far.
    pub fn define(&mut self, name: &str, node: RawNode) -> NodeId {
        let id = self.named(name);
        self.nodes[id] = Some(node);
        id
    }

    /// Allocate a fresh slot for an inline construct.
    pub fn add_anonymous(&mut self, node: RawNode) -> NodeId {
        self.push(Some(node))
    }

    /// Add an edge, or update the attributes of the existing edge for this pair.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, kind: EdgeKind, is_list: bool) {
        let edges = &mut self.edges[source];
        match edges.iter_mut().find(|edge| edge.target == target) {
            Some(edge) => {
                edge.kind = kind;
                edge.is_list = is_list;
            }
            None => edges.push(RawEdge { target, kind, is_list }),
        }
    }

    /// Node data, or `None` for placeholders and out-of-range ids.
    pub fn node(&self, id: NodeId) -> Option<&RawNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    pub fn edges(&self, id: NodeId) -> &[RawEdge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Number of slots reachable from `root` (including `root` itself).
    pub fn reachable_from(&self, root: NodeId) -> usize {
        if !self.contains(root) {
            return 0;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([root]);
        seen[root] = true;
        let mut count = 0;

        while let Some(id) = queue.pop_front() {
            count += 1;
            for edge in self.edges(id) {
                if !seen[edge.target] {
                    seen[edge.target] = true;
                    queue.push_back(edge.target);
                }
            }
        }
        count
    }

    fn push(&mut self, node: Option<RawNode>) -> NodeId {
        self.nodes.push(node);
        self.edges.push(Vec::new());
        self.nodes.len() - 1
    }
}
