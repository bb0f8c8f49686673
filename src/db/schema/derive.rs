//! Simplified graph to relational tables.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::dedup::DeduplicationFilter;
use crate::graph::{SimplifiedGraph, SimplifiedNode};
use crate::xsd::{NodeId, NodeKind};

use super::definition::{Column, ColumnKind, TableSchema};
use super::SchemaError;

/// Derive one table per entity reachable from `root`.
///
/// Children of an entity become columns unless they are entities themselves;
/// every child is also descended into so that entities nested inside plain
/// wrapper elements (`StopPlace > quays > Quay`) are found.
pub fn derive(
    graph: &SimplifiedGraph,
    root: NodeId,
    entities: &HashSet<String>,
) -> Result<BTreeMap<String, TableSchema>, SchemaError> {
    if !graph.contains(root) {
        return Err(SchemaError::UnknownRoot { id: root });
    }

    let mut deriver = Deriver {
        graph,
        entities,
        visited: DeduplicationFilter::new(),
        tables: BTreeMap::new(),
    };
    deriver.visit(root, None);

    debug!(tables = deriver.tables.len(), "Derived table schemas");
    Ok(deriver.tables)
}

/// Column kind for a child of an entity node.
///
/// Element grandchildren make the column object-valued. A list-flagged child
/// with only attribute children holds a list of text values. A child without
/// any children is always scalar, even when flagged as a list, since it can
/// only carry a single text or ref value.
pub fn column_kind(graph: &SimplifiedGraph, id: NodeId, node: &SimplifiedNode) -> ColumnKind {
    let grandchildren = graph.children(id);
    let has_element = grandchildren
        .iter()
        .any(|g| graph.node(*g).is_some_and(|n| n.kind == NodeKind::Element));

    match (has_element, node.is_list) {
        (true, true) => ColumnKind::ArrayObject,
        (true, false) => ColumnKind::Object,
        (false, true) if !grandchildren.is_empty() => ColumnKind::ArrayScalar,
        _ => ColumnKind::Scalar,
    }
}

struct Deriver<'a> {
    graph: &'a SimplifiedGraph,
    entities: &'a HashSet<String>,
    visited: DeduplicationFilter<NodeId>,
    tables: BTreeMap<String, TableSchema>,
}

impl<'a> Deriver<'a> {
    fn visit(&mut self, id: NodeId, parent: Option<&'a str>) {
        if !self.visited.should_process(id) {
            return;
        }
        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            return;
        };

        if !self.entities.contains(&node.name) {
            for &child in graph.children(id) {
                self.visit(child, parent);
            }
            return;
        }

        let entity = node.name.as_str();
        let mut table = TableSchema::new(entity, parent);
        for &child in graph.children(id) {
            self.visit(child, Some(entity));

            let Some(child_node) = graph.node(child) else {
                continue;
            };
            if self.entities.contains(&child_node.name) {
                continue;
            }
            let kind = column_kind(graph, child, child_node);
            table.push_column(Column::new(&child_node.name, kind));
        }
        table.push_standard_columns();

        self.tables.entry(entity.to_string()).or_insert(table);
    }
}
