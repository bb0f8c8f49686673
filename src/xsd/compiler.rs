//! XSD corpus to raw graph compiler.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::graph::{EdgeKind, NodeId, NodeKind, RawGraph, RawNode};
use super::XsdError;

/// Compile the root schema file followed by every `*.xsd` below `scan_roots`.
pub fn compile(root_file: &Path, scan_roots: &[PathBuf]) -> Result<RawGraph, XsdError> {
    let mut compiler = SchemaCompiler::new();
    compiler.add_file(root_file)?;
    for dir in scan_roots {
        compiler.add_directory(dir)?;
    }
    let graph = compiler.finish();
    info!(nodes = graph.len(), edges = graph.edge_count(), "Compiled schema graph");
    Ok(graph)
}

/// Type attributes in the XML Schema namespace never become graph nodes.
fn is_builtin(type_name: &str) -> bool {
    type_name.starts_with("xsd:") || type_name.starts_with("xs:")
}

/// Incremental compiler; files can be added one at a time.
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    graph: RawGraph,
    processed: HashSet<PathBuf>,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a single schema file. Returns `false` if the file was already compiled.
    pub fn add_file(&mut self, path: &Path) -> Result<bool, XsdError> {
        let read_failed = |e: std::io::Error| XsdError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let canonical = path.canonicalize().map_err(read_failed)?;
        if !self.processed.insert(canonical) {
            debug!(path = %path.display(), "Schema file already compiled, skipping");
            return Ok(false);
        }

        let content = fs::read_to_string(path).map_err(read_failed)?;
        self.compile_text(&content, &path.display().to_string())?;
        Ok(true)
    }

    /// Compile every `*.xsd` file below `dir`, in file-name order.
    ///
    /// A missing directory is logged and contributes nothing.
    pub fn add_directory(&mut self, dir: &Path) -> Result<usize, XsdError> {
        if !dir.is_dir() {
            warn!(path = %dir.display(), "Schema directory not found, skipping");
            return Ok(0);
        }

        let mut added = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| XsdError::WalkFailed {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
            let is_xsd = entry.path().extension().is_some_and(|ext| ext == "xsd");
            if entry.file_type().is_file() && is_xsd && self.add_file(entry.path())? {
                added += 1;
            }
        }
        debug!(path = %dir.display(), files = added, "Compiled schema directory");
        Ok(added)
    }

    /// Compile schema text that does not live on disk.
    pub fn add_str(&mut self, content: &str, source: &str) -> Result<(), XsdError> {
        self.compile_text(content, source)
    }

    pub fn finish(self) -> RawGraph {
        self.graph
    }

    fn compile_text(&mut self, content: &str, source: &str) -> Result<(), XsdError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = Document::parse_with_options(content, options).map_err(|e| {
            XsdError::ParseFailed {
                path: source.to_string(),
                message: e.to_string(),
            }
        })?;
        self.process_file(doc.root_element());
        Ok(())
    }

    fn process_file(&mut self, schema: Node) {
        for child in schema.children().filter(Node::is_element) {
            let tag = child.tag_name().name();
            match tag {
                "element" => self.process_top_level_element(child),
                "complexType" | "group" | "simpleType" | "attributeGroup" => {
                    let (Some(name), Some(kind)) = (child.attribute("name"), NodeKind::from_tag(tag))
                    else {
                        continue;
                    };
                    let id = self.graph.define(name, RawNode::new(kind).with_name(name));
                    self.process_node(child, id, false);
                }
                // import, include, annotation, top-level attribute and anything unknown
                _ => {}
            }
        }
    }

    fn process_top_level_element(&mut self, element: Node) {
        let Some(name) = element.attribute("name") else {
            return;
        };
        let mut node = RawNode::new(NodeKind::Element).with_name(name);
        node.content_type = element.attribute("type").map(str::to_string);
        node.is_abstract = element.attribute("abstract") == Some("true");
        let is_abstract = node.is_abstract;
        let content_type = node.content_type.clone();

        let id = self.graph.define(name, node);

        if !is_abstract {
            if let Some(type_name) = content_type.as_deref().filter(|t| !is_builtin(t)) {
                let type_id = self.graph.named(type_name);
                self.graph.add_edge(id, type_id, EdgeKind::Type, false);
            }
            self.process_node(element, id, false);
        }

        if let Some(head) = element.attribute("substitutionGroup") {
            let head_id = self.graph.named(head);
            self.graph.add_edge(head_id, id, EdgeKind::SubstitutionGroup, false);
        }
    }

    fn process_node(&mut self, node: Node, parent: NodeId, is_list: bool) {
        for child in node.children().filter(Node::is_element) {
            let tag = child.tag_name().name();
            match tag {
                "sequence" => self.process_node(child, parent, true),
                "choice" | "all" | "complexType" | "complexContent" | "simpleContent"
                | "restriction" => self.process_node(child, parent, is_list),
                "element" | "group" | "attribute" => {
                    self.process_member(child, tag, parent, is_list)
                }
                "extension" => {
                    let id = self.contained(RawNode::new(NodeKind::Extension), parent, is_list);
                    if let Some(base) = child.attribute("base").filter(|b| !is_builtin(b)) {
                        let base_id = self.graph.named(base);
                        self.graph.add_edge(id, base_id, EdgeKind::Base, false);
                    }
                    self.process_node(child, id, false);
                }
                "enumeration" | "minInclusive" | "maxInclusive" => {
                    if let Some(kind) = NodeKind::from_tag(tag) {
                        let mut facet = RawNode::new(kind);
                        facet.value = child.attribute("value").map(str::to_string);
                        self.contained(facet, parent, is_list);
                    }
                }
                "attributeGroup" => {
                    let mut group = RawNode::new(NodeKind::AttributeGroup);
                    group.reference = child.attribute("ref").map(str::to_string);
                    let reference = group.reference.clone();
                    let id = self.contained(group, parent, is_list);
                    if let Some(reference) = reference {
                        let target = self.graph.named(&reference);
                        self.graph.add_edge(id, target, EdgeKind::Ref, false);
                    }
                }
                "simpleType" | "any" => {
                    if let Some(kind) = NodeKind::from_tag(tag) {
                        let id = self.contained(RawNode::new(kind), parent, is_list);
                        self.process_node(child, id, false);
                    }
                }
                "list" => {
                    let mut list = RawNode::new(NodeKind::List);
                    list.item_type = child.attribute("itemType").map(str::to_string);
                    let item_type = list.item_type.clone();
                    let id = self.contained(list, parent, is_list);
                    match item_type.filter(|t| !is_builtin(t)) {
                        Some(item_type) => {
                            let target = self.graph.named(&item_type);
                            self.graph.add_edge(id, target, EdgeKind::None, is_list);
                        }
                        None => self.process_node(child, id, false),
                    }
                }
                // annotation, pattern, length facets, unique/key/keyref
                _ => {}
            }
        }
    }

    /// Inline `element`, `group` or `attribute`.
    fn process_member(&mut self, child: Node, tag: &str, parent: NodeId, is_list: bool) {
        let reference = child.attribute("ref").map(str::to_string);
        let kind = match (tag, &reference) {
            ("element", Some(_)) => NodeKind::RefElement,
            _ => match NodeKind::from_tag(tag) {
                Some(kind) => kind,
                None => return,
            },
        };

        let mut member = RawNode::new(kind);
        member.name = child.attribute("name").map(str::to_string);
        member.content_type = child.attribute("type").map(str::to_string);
        member.is_abstract = child.attribute("abstract") == Some("true");
        member.reference = reference.clone();
        let is_abstract = member.is_abstract;
        let content_type = member.content_type.clone();

        let id = self.contained(member, parent, is_list);

        if !is_abstract {
            if let Some(type_name) = content_type.as_deref().filter(|t| !is_builtin(t)) {
                let type_id = self.graph.named(type_name);
                self.graph.add_edge(id, type_id, EdgeKind::Type, false);
            }
            if let Some(reference) = &reference {
                let target = self.graph.named(reference);
                self.graph.add_edge(id, target, EdgeKind::Ref, false);
            }
            self.process_node(child, id, false);
        }

        if let Some(head) = child.attribute("substitutionGroup") {
            let head_id = self.graph.named(head);
            self.graph.add_edge(head_id, id, EdgeKind::SubstitutionGroup, is_list);
        }
    }

    /// Allocate an inline node and link it to its container.
    fn contained(&mut self, node: RawNode, parent: NodeId, is_list: bool) -> NodeId {
        let id = self.graph.add_anonymous(node);
        self.graph.add_edge(parent, id, EdgeKind::None, is_list);
        id
    }
}
