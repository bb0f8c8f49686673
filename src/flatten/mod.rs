//! Schema-guided flattening of NeTEx instance documents into table rows.
//!
//! The walk follows the simplified graph alongside the document: an entity
//! element becomes a row, its non-entity children become columns, and entities
//! found one level below a wrapper element become rows of their own linked
//! through `parent_id`. Anything the graph does not know about is dropped and
//! reported as a [`Diagnostic`].

pub mod diagnostic;
pub mod geometry;
pub mod projection;
pub mod row;

pub use diagnostic::Diagnostic;
pub use geometry::{Coord, Geometry, GeometryError};
pub use row::{Row, Value};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::schema::{
    ColumnKind, TableSchema, ATTRIBUTES_COLUMN, GEOM_COLUMN, ID_COLUMN, PARENT_ID_COLUMN,
};
use crate::graph::SimplifiedGraph;
use crate::utils::camel_to_snake;
use crate::xsd::NodeId;

use geometry::is_geometry_tag;

const CENTROID_TAG: &str = "Centroid";

/// Flattening error types
#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("Failed to read document '{path}': {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse document '{source_name}': {message}")]
    ParseFailed { source_name: String, message: String },

    #[error("Document root is '{found}', expected '{expected}'")]
    RootMismatch { expected: String, found: String },
}

/// Rows per entity plus the diagnostics raised while producing them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlattenResult {
    pub rows: BTreeMap<String, Vec<Row>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FlattenResult {
    /// Empty result with a row list for every table.
    pub fn for_tables(tables: &BTreeMap<String, TableSchema>) -> Self {
        Self {
            rows: tables.keys().map(|k| (k.clone(), Vec::new())).collect(),
            diagnostics: Vec::new(),
        }
    }

    pub fn merge(&mut self, other: FlattenResult) {
        for (entity, rows) in other.rows {
            self.rows.entry(entity).or_default().extend(rows);
        }
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn rows_for(&self, entity: &str) -> &[Row] {
        self.rows.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

/// Flatten a parsed document whose root element is `root`.
pub fn flatten(
    root: Node,
    graph: &SimplifiedGraph,
    tables: &BTreeMap<String, TableSchema>,
) -> Result<FlattenResult, FlattenError> {
    let found = root.tag_name().name();
    if found != graph.root_name() {
        return Err(FlattenError::RootMismatch {
            expected: graph.root_name().to_string(),
            found: found.to_string(),
        });
    }

    let mut flattener = Flattener {
        graph,
        tables,
        result: FlattenResult::for_tables(tables),
    };
    flattener.entity(root, graph.root(), None);

    debug!(
        rows = flattener.result.row_count(),
        diagnostics = flattener.result.diagnostics.len(),
        "Flattened document"
    );
    Ok(flattener.result)
}

/// Parse and flatten document text. `source_name` only labels errors.
pub fn flatten_str(
    text: &str,
    source_name: &str,
    graph: &SimplifiedGraph,
    tables: &BTreeMap<String, TableSchema>,
) -> Result<FlattenResult, FlattenError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document =
        Document::parse_with_options(text, options).map_err(|e| FlattenError::ParseFailed {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
    flatten(document.root_element(), graph, tables)
}

pub fn flatten_file(
    path: &Path,
    graph: &SimplifiedGraph,
    tables: &BTreeMap<String, TableSchema>,
) -> Result<FlattenResult, FlattenError> {
    let text = fs::read_to_string(path).map_err(|e| FlattenError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    flatten_str(&text, &path.display().to_string(), graph, tables)
}

fn local<'a, 'input>(node: Node<'a, 'input>) -> &'a str {
    node.tag_name().name()
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn has_element_children(node: Node) -> bool {
    node.children().any(|n| n.is_element())
}

/// `ref` attribute of a `*Ref` element.
fn ref_value<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    if local(node).ends_with("Ref") {
        node.attribute("ref")
    } else {
        None
    }
}

fn leaf_value(node: Node) -> Value {
    match ref_value(node) {
        Some(r) => Value::text(r),
        None => Value::from(node.text()),
    }
}

/// Text of an element whose column holds JSON. Layout whitespace alone is no value.
fn structured_leaf(node: Node) -> Value {
    match leaf_value(node) {
        Value::Text(text) if text.trim().is_empty() => Value::Null,
        value => value,
    }
}

/// Empty lists and objects holding only nulls are stored as NULL.
fn prune(value: Value) -> Value {
    let empty = match &value {
        Value::List(items) => items.is_empty(),
        Value::Object(_) => !value.has_values(),
        _ => false,
    };
    if empty { Value::Null } else { value }
}

struct Flattener<'g> {
    graph: &'g SimplifiedGraph,
    tables: &'g BTreeMap<String, TableSchema>,
    result: FlattenResult,
}

impl<'g> Flattener<'g> {
    fn is_entity(&self, tag: &str) -> bool {
        self.tables.contains_key(tag)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.result.diagnostics.push(diagnostic);
    }

    fn report_gaps(&mut self, node: Node, position: NodeId) {
        for child in elements(node) {
            let tag = local(child);
            if self.graph.child_by_name(position, tag).is_none() && !is_geometry_tag(tag) {
                self.report(Diagnostic::SchemaGap {
                    parent: local(node).to_string(),
                    tag: tag.to_string(),
                });
            }
        }
    }

    /// Flatten an entity element into a row, recursing into nested entities first.
    ///
    /// An element without a table only carries entities further down; it is
    /// walked for them and produces no row.
    fn entity(&mut self, node: Node, position: NodeId, parent_id: Option<&str>) {
        let graph = self.graph;
        let tables = self.tables;
        let tag = local(node);
        let Some(table) = tables.get(tag) else {
            self.descend(node, position, parent_id);
            return;
        };
        let id = node
            .attribute(ID_COLUMN)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.report_gaps(node, position);

        let mut row = Row::new();
        let mut geom = None;

        for &child in graph.children(position) {
            let Some(child_node) = graph.node(child) else {
                continue;
            };
            let name = child_node.name.as_str();
            let occurrences: Vec<Node> = elements(node).filter(|n| local(*n) == name).collect();
            let Some(&first) = occurrences.first() else {
                continue;
            };

            if self.is_entity(name) {
                for occurrence in occurrences {
                    self.entity(occurrence, child, Some(&id));
                }
                continue;
            }
            if self.nested_entities(&occurrences, child, &id) {
                continue;
            }
            if name == CENTROID_TAG {
                if let Some(point) = self.centroid(first) {
                    geom = Some(point);
                }
                continue;
            }

            let Some(column) = table.column_for_source(name) else {
                self.report(Diagnostic::SchemaGap {
                    parent: tag.to_string(),
                    tag: name.to_string(),
                });
                continue;
            };

            let value = match column.kind {
                ColumnKind::ArrayScalar => {
                    prune(Value::List(occurrences.iter().map(|n| leaf_value(*n)).collect()))
                }
                _ if has_element_children(first) => {
                    let (value, found) = if child_node.is_list {
                        self.list(first, child)
                    } else {
                        self.object(first, child)
                    };
                    if found.is_some() {
                        geom = found;
                    }
                    prune(value)
                }
                ColumnKind::Object | ColumnKind::ArrayObject => structured_leaf(first),
                _ => leaf_value(first),
            };
            row.insert(column.name.clone(), value);
        }

        if let Some(shape) = elements(node).find(|n| is_geometry_tag(local(*n))) {
            if let Some(g) = self.geometry(shape) {
                geom = Some(g);
            }
        }

        let attributes = node
            .attributes()
            .filter(|a| !(a.namespace().is_none() && a.name() == ID_COLUMN))
            .map(|a| (a.name().to_string(), Value::text(a.value())))
            .collect();

        row.insert(ID_COLUMN, Value::Text(id));
        row.insert(ATTRIBUTES_COLUMN, Value::Object(attributes));
        row.insert(GEOM_COLUMN, geom.map_or(Value::Null, Value::Geometry));
        if let (Some(parent_id), false) = (parent_id, table.is_root()) {
            row.insert(PARENT_ID_COLUMN, Value::text(parent_id));
        }

        self.result.rows.entry(tag.to_string()).or_default().push(row);
    }

    /// Walk a node that is not an entity down to the entities below it,
    /// handing them `parent_id` unchanged.
    fn descend(&mut self, node: Node, position: NodeId, parent_id: Option<&str>) {
        self.report_gaps(node, position);
        for child in elements(node) {
            let Some(child_position) = self.graph.child_by_name(position, local(child)) else {
                continue;
            };
            if self.is_entity(local(child)) {
                self.entity(child, child_position, parent_id);
            } else {
                self.descend(child, child_position, parent_id);
            }
        }
    }

    /// Rows for entities one level below a wrapper child. Returns whether any were found.
    fn nested_entities(&mut self, occurrences: &[Node], position: NodeId, parent_id: &str) -> bool {
        let mut found = false;
        for &occurrence in occurrences {
            for grandchild in elements(occurrence) {
                let tag = local(grandchild);
                if !self.is_entity(tag) {
                    continue;
                }
                found = true;
                match self.graph.child_by_name(position, tag) {
                    Some(entity_position) => self.entity(grandchild, entity_position, Some(parent_id)),
                    None => self.report(Diagnostic::SchemaGap {
                        parent: local(occurrence).to_string(),
                        tag: tag.to_string(),
                    }),
                }
            }
        }
        found
    }

    fn object(&mut self, node: Node, position: NodeId) -> (Value, Option<Geometry>) {
        if let Some(shape) = elements(node).find(|n| is_geometry_tag(local(*n))) {
            return (Value::Object(BTreeMap::new()), self.geometry(shape));
        }
        self.report_gaps(node, position);

        let graph = self.graph;
        let mut object = BTreeMap::new();
        let mut geom = None;
        for &child in graph.children(position) {
            let Some(child_node) = graph.node(child) else {
                continue;
            };
            let Some(first) = elements(node).find(|n| local(*n) == child_node.name) else {
                continue;
            };
            let value = if has_element_children(first) {
                let (value, found) = if child_node.is_list {
                    self.list(first, child)
                } else {
                    self.object(first, child)
                };
                geom = geom.or(found);
                value
            } else {
                leaf_value(first)
            };
            object.insert(camel_to_snake(&child_node.name), value);
        }
        (Value::Object(object), geom)
    }

    /// One item per child element: `{tag: object}` for structured children,
    /// the ref value for `*Ref` children, `{tag: text}` otherwise.
    fn list(&mut self, node: Node, position: NodeId) -> (Value, Option<Geometry>) {
        let mut items = Vec::new();
        for child in elements(node) {
            let tag = local(child);
            if is_geometry_tag(tag) {
                return (Value::List(Vec::new()), self.geometry(child));
            }
            let Some(child_position) = self.graph.child_by_name(position, tag) else {
                self.report(Diagnostic::SchemaGap {
                    parent: local(node).to_string(),
                    tag: tag.to_string(),
                });
                continue;
            };

            let key = camel_to_snake(tag);
            if has_element_children(child) {
                let (value, found) = self.object(child, child_position);
                if found.is_some() {
                    return (Value::List(Vec::new()), found);
                }
                items.push(Value::Object(BTreeMap::from([(key, value)])));
            } else if let Some(r) = ref_value(child) {
                items.push(Value::text(r));
            } else {
                items.push(Value::Object(BTreeMap::from([(key, Value::from(child.text()))])));
            }
        }
        (Value::List(items), None)
    }

    /// Point from `Longitude`/`Latitude` below a `Centroid`, else from a GML point.
    fn centroid(&mut self, node: Node) -> Option<Geometry> {
        let ordinate = |name: &str| {
            node.descendants()
                .find(|n| n.is_element() && local(*n) == name)
                .and_then(|n| n.text())
                .map(str::trim)
        };

        let (longitude, latitude) = match (ordinate("Longitude"), ordinate("Latitude")) {
            (Some(longitude), Some(latitude)) => (longitude, latitude),
            _ => {
                if let Some(point) = node
                    .descendants()
                    .find(|n| n.is_element() && local(*n) == "Point")
                {
                    return self.geometry(point);
                }
                self.report(Diagnostic::MalformedGeometry {
                    tag: CENTROID_TAG.to_string(),
                    message: "missing Longitude or Latitude".to_string(),
                });
                return None;
            }
        };

        match (longitude.parse::<f64>(), latitude.parse::<f64>()) {
            (Ok(x), Ok(y)) => Some(Geometry::Point(Coord { x, y })),
            _ => {
                self.report(Diagnostic::MalformedGeometry {
                    tag: CENTROID_TAG.to_string(),
                    message: format!("invalid coordinates '{}' '{}'", longitude, latitude),
                });
                None
            }
        }
    }

    fn geometry(&mut self, node: Node) -> Option<Geometry> {
        let tag = local(node).to_string();
        match geometry::extract(node) {
            Ok(g) => Some(g),
            Err(GeometryError::Oversized { size, .. }) => {
                self.report(Diagnostic::OversizedGeometry { tag, size });
                None
            }
            Err(GeometryError::UnsupportedCrs { srs_name }) => {
                self.report(Diagnostic::UnsupportedCrs { tag, srs_name });
                None
            }
            Err(e) => {
                self.report(Diagnostic::MalformedGeometry {
                    tag,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::test_utils::{fixture_simplified_graph, fixture_tables};
    use rstest::{fixture, rstest};
    use std::collections::HashSet;

    #[fixture]
    fn result() -> FlattenResult {
        let graph = fixture_simplified_graph();
        let tables = fixture_tables();
        flatten_str(fixtures::STOP_PLACES, "stop_places.xml", &graph, &tables).unwrap()
    }

    fn flatten_doc(xml: &str) -> FlattenResult {
        let graph = fixture_simplified_graph();
        let tables = fixture_tables();
        flatten_str(xml, "inline", &graph, &tables).unwrap()
    }

    fn text(row: &Row, column: &str) -> Option<String> {
        row.get(column).and_then(Value::as_text).map(str::to_string)
    }

    #[rstest]
    fn test_every_entity_has_a_row_list(result: FlattenResult) {
        let entities: Vec<_> = result.rows.keys().map(String::as_str).collect();
        assert_eq!(entities, vec!["PublicationDelivery", "Quay", "SiteFrame", "StopPlace", "TariffZone"]);
        assert_eq!(result.row_count(), 6);
    }

    #[rstest]
    fn test_stop_place_with_two_quays(result: FlattenResult) {
        let stop_places = result.rows_for("StopPlace");
        assert_eq!(stop_places.len(), 1);
        let stop_place = &stop_places[0];
        assert_eq!(stop_place.id(), Some("NSR:StopPlace:1"));
        assert_eq!(text(stop_place, "name").as_deref(), Some("Central"));

        let quays = result.rows_for("Quay");
        assert_eq!(quays.len(), 2);
        for quay in quays {
            assert_eq!(quay.parent_id(), Some("NSR:StopPlace:1"));
        }
        assert_eq!(text(&quays[0], "public_code").as_deref(), Some("A"));
        assert!(quays[1].get("public_code").is_none());
        // The wrapper holding entities is not stored as a column.
        assert!(stop_place.get("quays").is_none());
    }

    #[rstest]
    fn test_centroid_becomes_point(result: FlattenResult) {
        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(stop_place.geometry().map(Geometry::to_wkt).as_deref(), Some("POINT(10.5 60.1)"));
        assert!(stop_place.get("centroid").is_none());
    }

    #[rstest]
    fn test_unknown_child_is_reported(result: FlattenResult) {
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::SchemaGap {
                parent: "StopPlace".to_string(),
                tag: "Foo".to_string(),
            }]
        );
        let stop_place = &result.rows_for("StopPlace")[0];
        assert!(stop_place.get("foo").is_none());
        assert!(stop_place.get("name").is_some());
    }

    #[rstest]
    fn test_list_of_objects(result: FlattenResult) {
        let stop_place = &result.rows_for("StopPlace")[0];
        let json = serde_json::to_value(stop_place.get("key_list").unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"key_value": {"key": "owner", "value": "O'Brien & Co"}},
                {"key_value": {"key": "zone", "value": "1"}}
            ])
        );
    }

    #[rstest]
    fn test_ref_values(result: FlattenResult) {
        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(
            stop_place.get("topographic_place_ref"),
            Some(&Value::List(vec![Value::text("NSR:TopographicPlace:9")]))
        );
    }

    #[rstest]
    fn test_attributes_exclude_id(result: FlattenResult) {
        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(
            stop_place.get("attributes"),
            Some(&Value::Object(BTreeMap::from([("version".to_string(), Value::text("3"))])))
        );
    }

    #[rstest]
    fn test_direct_polygon_child(result: FlattenResult) {
        let zone = &result.rows_for("TariffZone")[0];
        assert_eq!(
            zone.geometry().map(Geometry::to_wkt).as_deref(),
            Some("POLYGON((10 60, 10.1 60, 10.1 60.1, 10 60))")
        );
        assert_eq!(zone.parent_id(), Some("NSR:SiteFrame:1"));
    }

    #[rstest]
    fn test_row_linkage(result: FlattenResult) {
        let root = &result.rows_for("PublicationDelivery")[0];
        assert!(root.parent_id().is_none());
        assert!(root.get("parent_id").is_none());
        let root_id = root.id().unwrap();
        assert!(Uuid::parse_str(root_id).is_ok());

        let site_frame = &result.rows_for("SiteFrame")[0];
        assert_eq!(site_frame.parent_id(), Some(root_id));
        assert_eq!(result.rows_for("StopPlace")[0].parent_id(), Some("NSR:SiteFrame:1"));
    }

    #[rstest]
    fn test_root_scalar_and_empty_wrapper(result: FlattenResult) {
        let root = &result.rows_for("PublicationDelivery")[0];
        assert_eq!(text(root, "publication_timestamp").as_deref(), Some("2022-05-07T10:00:00"));
        assert!(root.get("data_objects").is_none());
    }

    #[rstest]
    fn test_scalar_text_is_verbatim_and_absent_text_is_null() {
        let result = flatten_doc(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><stopPlaces>
            <StopPlace id="S"><Name>  padded  </Name><ParentSite><Name/></ParentSite></StopPlace>
            </stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#,
        );
        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(text(stop_place, "name").as_deref(), Some("  padded  "));
        let parent_site = serde_json::to_value(stop_place.get("parent_site").unwrap()).unwrap();
        assert_eq!(parent_site, serde_json::json!([{"name": null}]));
    }

    #[rstest]
    fn test_missing_id_gets_uuid() {
        let result = flatten_doc(
            "<PublicationDelivery><dataObjects><SiteFrame><tariffZones>\
             <TariffZone><Name>Z</Name></TariffZone>\
             </tariffZones></SiteFrame></dataObjects></PublicationDelivery>",
        );
        let site_frame_id = result.rows_for("SiteFrame")[0].id().unwrap().to_string();
        assert!(Uuid::parse_str(&site_frame_id).is_ok());
        assert_eq!(result.rows_for("TariffZone")[0].parent_id(), Some(site_frame_id.as_str()));
    }

    #[rstest]
    fn test_unsupported_crs_leaves_geometry_null() {
        let result = flatten_doc(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><tariffZones>
            <TariffZone id="Z"><Name>Z</Name>
            <Polygon srsName="urn:example:local"><exterior><LinearRing><posList>0 0 1 0 1 1 0 0</posList></LinearRing></exterior></Polygon>
            </TariffZone></tariffZones></SiteFrame></dataObjects></PublicationDelivery>"#,
        );
        let zone = &result.rows_for("TariffZone")[0];
        assert_eq!(zone.get("geom"), Some(&Value::Null));
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::UnsupportedCrs {
                tag: "Polygon".to_string(),
                srs_name: "urn:example:local".to_string(),
            }]
        );
    }

    #[rstest]
    fn test_projected_polygon_is_reprojected_to_wgs84() {
        const RADIUS: f64 = 6_378_137.0;
        let ring = [(10.0, 60.0), (10.1, 60.0), (10.1, 60.1), (10.0, 60.0)];
        let pos_list: Vec<String> = ring
            .iter()
            .map(|(lon, lat): &(f64, f64)| {
                let x = RADIUS * lon.to_radians();
                let y = RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
                format!("{} {}", x, y)
            })
            .collect();
        let result = flatten_doc(&format!(
            r#"<PublicationDelivery xmlns:gml="http://www.opengis.net/gml/3.2"><dataObjects><SiteFrame id="F"><tariffZones>
            <TariffZone id="Z"><Name>Z</Name>
            <gml:Polygon srsName="EPSG:3857"><gml:exterior><gml:LinearRing><gml:posList>{}</gml:posList></gml:LinearRing></gml:exterior></gml:Polygon>
            </TariffZone></tariffZones></SiteFrame></dataObjects></PublicationDelivery>"#,
            pos_list.join(" ")
        ));

        assert!(result.diagnostics.is_empty());
        let geometry = result.rows_for("TariffZone")[0].geometry().unwrap();
        let coords: Vec<&Coord> = geometry.coords().collect();
        assert_eq!(coords.len(), ring.len());
        for (actual, (lon, lat)) in coords.iter().zip(ring) {
            assert!((actual.x - lon).abs() < 1e-6, "longitude {} vs {}", actual.x, lon);
            assert!((actual.y - lat).abs() < 1e-6, "latitude {} vs {}", actual.y, lat);
        }
    }

    #[rstest]
    fn test_geometry_inside_nested_object_becomes_row_geometry() {
        let result = flatten_doc(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><stopPlaces>
            <StopPlace id="S"><Name>S</Name>
            <ParentSite><Centroid><Location>
            <LineString srsName="EPSG:32632"><posList>500000 0 500000 0</posList></LineString>
            </Location></Centroid></ParentSite>
            </StopPlace></stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#,
        );

        assert!(result.diagnostics.is_empty());
        let stop_place = &result.rows_for("StopPlace")[0];
        // The wrapper only held the shape, so nothing is left for its column.
        assert_eq!(stop_place.get("parent_site"), Some(&Value::Null));
        match stop_place.geometry() {
            Some(Geometry::LineString(coords)) => {
                assert_eq!(coords.len(), 2);
                assert!((coords[0].x - 9.0).abs() < 1e-6);
                assert!(coords[0].y.abs() < 1e-6);
            }
            other => panic!("expected line string, got {:?}", other),
        }
    }

    #[rstest]
    #[case::in_list_item("<keyList><KeyValue><Key>k</Key><LineString><posList>1 2 3 4</posList></LineString></KeyValue></keyList>")]
    #[case::direct_list_child("<keyList><LineString><posList>1 2 3 4</posList></LineString><KeyValue><Key>k</Key></KeyValue></keyList>")]
    fn test_geometry_in_list_stops_the_list(#[case] key_list: &str) {
        let result = flatten_doc(&format!(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><stopPlaces>
            <StopPlace id="S"><Name>S</Name>{}</StopPlace>
            </stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#,
            key_list
        ));

        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(stop_place.get("key_list"), Some(&Value::Null));
        assert_eq!(
            stop_place.geometry().map(Geometry::to_wkt).as_deref(),
            Some("LINESTRING(1 2, 3 4)")
        );
    }

    #[rstest]
    fn test_later_shape_replaces_centroid() {
        let result = flatten_doc(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><stopPlaces>
            <StopPlace id="S"><Name>S</Name>
            <Centroid><Location><Longitude>10.5</Longitude><Latitude>60.1</Latitude></Location></Centroid>
            <keyList><KeyValue><LineString><posList>1 2 3 4</posList></LineString></KeyValue></keyList>
            </StopPlace></stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#,
        );
        // Schema order puts Centroid before keyList, so the later shape replaces it.
        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(
            stop_place.geometry().map(Geometry::to_wkt).as_deref(),
            Some("LINESTRING(1 2, 3 4)")
        );
    }

    #[rstest]
    #[case::blank("<ParentSite>\n          </ParentSite>")]
    #[case::self_closing("<ParentSite/>")]
    fn test_empty_structured_child_is_null(#[case] parent_site: &str) {
        let result = flatten_doc(&format!(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><stopPlaces>
            <StopPlace id="S"><Name>S</Name>{}</StopPlace>
            </stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#,
            parent_site
        ));
        let stop_place = &result.rows_for("StopPlace")[0];
        assert_eq!(stop_place.get("parent_site"), Some(&Value::Null));
    }

    #[rstest]
    fn test_root_outside_entity_set() {
        let graph = fixture_simplified_graph();
        let entities: HashSet<String> = ["SiteFrame", "StopPlace", "Quay", "TariffZone"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let tables = crate::db::schema::derive(&graph, graph.root(), &entities).unwrap();
        let result = flatten_str(fixtures::STOP_PLACES, "stop_places.xml", &graph, &tables).unwrap();

        assert!(!result.rows.contains_key("PublicationDelivery"));
        assert_eq!(result.row_count(), 5);

        // Known root children are not gaps; only the unknown Foo is.
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::SchemaGap {
                parent: "StopPlace".to_string(),
                tag: "Foo".to_string(),
            }]
        );

        assert!(tables["SiteFrame"].is_root());
        let site_frame = &result.rows_for("SiteFrame")[0];
        assert!(site_frame.get(PARENT_ID_COLUMN).is_none());
        assert_eq!(result.rows_for("StopPlace")[0].parent_id(), Some("NSR:SiteFrame:1"));
        assert_eq!(result.rows_for("TariffZone")[0].parent_id(), Some("NSR:SiteFrame:1"));

        // Every emitted column exists in the table the row is inserted into.
        for (entity, rows) in &result.rows {
            let table = &tables[entity];
            for row in rows {
                for column in row.columns() {
                    assert!(table.column(column).is_some(), "{}.{} has no column", entity, column);
                }
            }
        }
        let batches = crate::db::encode_batches(&tables["SiteFrame"], result.rows_for("SiteFrame"), 1000).unwrap();
        assert!(!batches[0].columns.iter().any(|c| c == PARENT_ID_COLUMN));
    }

    #[rstest]
    fn test_malformed_centroid_is_reported() {
        let result = flatten_doc(
            r#"<PublicationDelivery><dataObjects><SiteFrame id="F"><stopPlaces>
            <StopPlace id="S"><Centroid><Location><Longitude>east</Longitude><Latitude>1</Latitude></Location></Centroid></StopPlace>
            </stopPlaces></SiteFrame></dataObjects></PublicationDelivery>"#,
        );
        assert!(result.rows_for("StopPlace")[0].geometry().is_none());
        assert!(matches!(
            result.diagnostics.as_slice(),
            [Diagnostic::MalformedGeometry { tag, .. }] if tag == "Centroid"
        ));
    }

    #[rstest]
    fn test_root_mismatch() {
        let graph = fixture_simplified_graph();
        let tables = fixture_tables();
        let err = flatten_str("<SiteFrame/>", "inline", &graph, &tables).unwrap_err();
        assert!(matches!(err, FlattenError::RootMismatch { ref found, .. } if found == "SiteFrame"));
    }

    #[rstest]
    fn test_parse_error() {
        let graph = fixture_simplified_graph();
        let tables = fixture_tables();
        let err = flatten_str("<PublicationDelivery>", "broken.xml", &graph, &tables).unwrap_err();
        assert!(matches!(err, FlattenError::ParseFailed { ref source_name, .. } if source_name == "broken.xml"));
    }

    #[rstest]
    fn test_read_error() {
        let graph = fixture_simplified_graph();
        let tables = fixture_tables();
        let err = flatten_file(Path::new("/nonexistent/doc.xml"), &graph, &tables).unwrap_err();
        assert!(matches!(err, FlattenError::ReadFailed { .. }));
    }

    #[rstest]
    fn test_merge(result: FlattenResult) {
        let mut merged = result.clone();
        merged.merge(result);
        assert_eq!(merged.rows_for("Quay").len(), 4);
        assert_eq!(merged.diagnostics.len(), 2);
    }
}
