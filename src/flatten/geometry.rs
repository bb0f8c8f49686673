//! GML geometry extraction and normalization to EPSG:4326.
//!
//! Elements are matched by local name so that `gml:Polygon`, `Polygon` in the
//! default namespace and any other prefix bound to the GML namespace all parse
//! the same way.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;
use thiserror::Error;

use super::projection::Projection;

/// Geometry markup beyond this many characters is skipped.
pub const MAX_GEOMETRY_SIZE: usize = 5_000_000;

/// Tags that carry a geometry when they appear as a direct child.
pub const GEOMETRY_TAGS: &[&str] = &["LineString", "Polygon"];

const DEFAULT_SRID: u32 = 4326;

static TRAILING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*$").expect("valid regex"));

pub fn is_geometry_tag(tag: &str) -> bool {
    GEOMETRY_TAGS.contains(&tag)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("geometry markup is {size} characters, limit is {limit}")]
    Oversized { size: usize, limit: usize },

    #[error("unsupported coordinate reference system '{srs_name}'")]
    UnsupportedCrs { srs_name: String },

    #[error("cannot reproject from '{srs_name}': {message}")]
    Reprojection { srs_name: String, message: String },

    #[error("unsupported geometry type '{tag}'")]
    UnsupportedType { tag: String },

    #[error("no coordinates found in '{tag}'")]
    MissingCoordinates { tag: String },

    #[error("invalid coordinate value '{value}'")]
    InvalidNumber { value: String },

    #[error("{count} ordinates do not split into points of dimension {dimension}")]
    DimensionMismatch { count: usize, dimension: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

/// Geometry in x = longitude, y = latitude order once normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring first, then interior rings.
    Polygon(Vec<Vec<Coord>>),
}

impl Geometry {
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord> + '_> {
        match self {
            Geometry::Point(c) => Box::new(std::iter::once(c)),
            Geometry::LineString(cs) => Box::new(cs.iter()),
            Geometry::Polygon(rings) => Box::new(rings.iter().flatten()),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.coords().all(|c| c.x.is_finite() && c.y.is_finite())
    }

    pub fn coords_mut(&mut self) -> Box<dyn Iterator<Item = &mut Coord> + '_> {
        match self {
            Geometry::Point(c) => Box::new(std::iter::once(c)),
            Geometry::LineString(cs) => Box::new(cs.iter_mut()),
            Geometry::Polygon(rings) => Box::new(rings.iter_mut().flatten()),
        }
    }

    /// Well-known text, e.g. `POINT(10.5 60.1)`.
    pub fn to_wkt(&self) -> String {
        let mut wkt = String::new();
        match self {
            Geometry::Point(c) => {
                let _ = write!(wkt, "POINT({} {})", c.x, c.y);
            }
            Geometry::LineString(cs) => {
                wkt.push_str("LINESTRING");
                push_coord_list(&mut wkt, cs);
            }
            Geometry::Polygon(rings) => {
                wkt.push_str("POLYGON(");
                for (i, ring) in rings.iter().enumerate() {
                    if i > 0 {
                        wkt.push_str(", ");
                    }
                    push_coord_list(&mut wkt, ring);
                }
                wkt.push(')');
            }
        }
        wkt
    }
}

fn push_coord_list(wkt: &mut String, coords: &[Coord]) {
    wkt.push('(');
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            wkt.push_str(", ");
        }
        let _ = write!(wkt, "{} {}", c.x, c.y);
    }
    wkt.push(')');
}

/// Normalized CRS identifier of a geometry element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrsName {
    /// `EPSG:<code>` form, or the raw name when no code could be found
    pub qualified: String,
    pub srid: Option<u32>,
}

impl SrsName {
    /// Resolve a raw `srsName` attribute. Missing means EPSG:4326.
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::epsg(DEFAULT_SRID);
        };
        if raw.contains("CRS84") {
            return Self::epsg(DEFAULT_SRID);
        }
        match TRAILING_CODE
            .captures(raw)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            Some(code) => Self::epsg(code),
            None => Self {
                qualified: raw.to_string(),
                srid: None,
            },
        }
    }

    fn epsg(code: u32) -> Self {
        Self {
            qualified: format!("EPSG:{}", code),
            srid: Some(code),
        }
    }
}

/// `srsName` on the element itself, else on the first descendant carrying one.
pub fn find_srs_name<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.descendants().find_map(|n| n.attribute("srsName"))
}

/// Extract a geometry element and reproject it to EPSG:4326.
pub fn extract(node: Node) -> Result<Geometry, GeometryError> {
    let size = node.range().len();
    if size > MAX_GEOMETRY_SIZE {
        return Err(GeometryError::Oversized {
            size,
            limit: MAX_GEOMETRY_SIZE,
        });
    }

    let srs = SrsName::resolve(find_srs_name(node));
    let projection = srs
        .srid
        .and_then(Projection::for_srid)
        .ok_or_else(|| GeometryError::UnsupportedCrs {
            srs_name: srs.qualified.clone(),
        })?;

    let mut geometry = parse_gml(node)?;
    projection
        .to_wgs84(&mut geometry)
        .map_err(|e| GeometryError::Reprojection {
            srs_name: srs.qualified,
            message: e.to_string(),
        })?;
    Ok(geometry)
}

/// Parse a GML `Point`, `LineString` or `Polygon` without reprojection.
pub fn parse_gml(node: Node) -> Result<Geometry, GeometryError> {
    let tag = node.tag_name().name();
    match tag {
        "Point" => {
            let coords = coordinates(node)?;
            coords
                .first()
                .copied()
                .map(Geometry::Point)
                .ok_or_else(|| missing(node))
        }
        "LineString" => Ok(Geometry::LineString(coordinates(node)?)),
        "Polygon" => {
            let mut rings = Vec::new();
            for boundary in node.children().filter(Node::is_element) {
                let is_ring_holder = matches!(
                    boundary.tag_name().name(),
                    "exterior" | "interior" | "outerBoundaryIs" | "innerBoundaryIs"
                );
                if !is_ring_holder {
                    continue;
                }
                let ring = boundary
                    .children()
                    .find(|n| n.is_element() && n.tag_name().name() == "LinearRing")
                    .ok_or_else(|| missing(boundary))?;
                rings.push(coordinates(ring)?);
            }
            if rings.is_empty() {
                return Err(missing(node));
            }
            Ok(Geometry::Polygon(rings))
        }
        _ => Err(GeometryError::UnsupportedType {
            tag: tag.to_string(),
        }),
    }
}

fn missing(node: Node) -> GeometryError {
    GeometryError::MissingCoordinates {
        tag: node.tag_name().name().to_string(),
    }
}

/// Coordinates of a `Point`, `LineString` or `LinearRing` element.
fn coordinates(node: Node) -> Result<Vec<Coord>, GeometryError> {
    let mut coords = Vec::new();
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "posList" => {
                let dimension = srs_dimension(child);
                let text = child.text().unwrap_or_default();
                let values = parse_numbers(text.split_whitespace())?;
                if dimension < 2 || values.len() % dimension != 0 {
                    return Err(GeometryError::DimensionMismatch {
                        count: values.len(),
                        dimension,
                    });
                }
                coords.extend(values.chunks(dimension).map(|p| Coord { x: p[0], y: p[1] }));
            }
            "pos" => {
                let text = child.text().unwrap_or_default();
                let values = parse_numbers(text.split_whitespace())?;
                if values.len() < 2 {
                    return Err(GeometryError::DimensionMismatch {
                        count: values.len(),
                        dimension: 2,
                    });
                }
                coords.push(Coord {
                    x: values[0],
                    y: values[1],
                });
            }
            "coordinates" => {
                let text = child.text().unwrap_or_default();
                for tuple in text.split_whitespace() {
                    let values = parse_numbers(tuple.split(','))?;
                    if values.len() < 2 {
                        return Err(GeometryError::DimensionMismatch {
                            count: values.len(),
                            dimension: 2,
                        });
                    }
                    coords.push(Coord {
                        x: values[0],
                        y: values[1],
                    });
                }
            }
            _ => {}
        }
    }

    if coords.is_empty() {
        return Err(missing(node));
    }
    Ok(coords)
}

/// `srsDimension` on the element or its nearest ancestor, default 2.
fn srs_dimension(node: Node) -> usize {
    node.ancestors()
        .find_map(|n| n.attribute("srsDimension"))
        .and_then(|d| d.trim().parse().ok())
        .unwrap_or(2)
}

fn parse_numbers<'s>(parts: impl Iterator<Item = &'s str>) -> Result<Vec<f64>, GeometryError> {
    parts
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<f64>().map_err(|_| GeometryError::InvalidNumber {
                value: p.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const GML_NS: &str = r#"xmlns:gml="http://www.opengis.net/gml/3.2""#;

    fn with_doc<T>(xml: &str, f: impl FnOnce(Node) -> T) -> T {
        let doc = roxmltree::Document::parse(xml).unwrap();
        f(doc.root_element())
    }

    #[rstest]
    fn test_polygon_pos_list() {
        let xml = format!(
            r#"<gml:Polygon {} srsName="EPSG:4326"><gml:exterior><gml:LinearRing>
            <gml:posList>10.0 60.0 10.1 60.0 10.1 60.1 10.0 60.0</gml:posList>
            </gml:LinearRing></gml:exterior></gml:Polygon>"#,
            GML_NS
        );
        let geometry = with_doc(&xml, |n| extract(n).unwrap());
        assert_eq!(
            geometry.to_wkt(),
            "POLYGON((10 60, 10.1 60, 10.1 60.1, 10 60))"
        );
    }

    #[rstest]
    fn test_polygon_with_interior_ring() {
        let xml = format!(
            r#"<gml:Polygon {}>
            <gml:exterior><gml:LinearRing><gml:posList>0 0 4 0 4 4 0 0</gml:posList></gml:LinearRing></gml:exterior>
            <gml:interior><gml:LinearRing><gml:posList>1 1 2 1 2 2 1 1</gml:posList></gml:LinearRing></gml:interior>
            </gml:Polygon>"#,
            GML_NS
        );
        let geometry = with_doc(&xml, |n| parse_gml(n).unwrap());
        match geometry {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[1][0], Coord { x: 1.0, y: 1.0 });
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[rstest]
    fn test_line_string_three_dimensional_pos_list() {
        let xml = format!(
            r#"<gml:LineString {} srsDimension="3"><gml:posList>1 2 100 3 4 101</gml:posList></gml:LineString>"#,
            GML_NS
        );
        let geometry = with_doc(&xml, |n| parse_gml(n).unwrap());
        assert_eq!(geometry.to_wkt(), "LINESTRING(1 2, 3 4)");
    }

    #[rstest]
    fn test_line_string_pos_sequence_without_prefix() {
        let xml = "<LineString><pos>1 2</pos><pos>3 4</pos></LineString>";
        let geometry = with_doc(xml, |n| extract(n).unwrap());
        assert_eq!(geometry.to_wkt(), "LINESTRING(1 2, 3 4)");
    }

    #[rstest]
    fn test_gml2_coordinates() {
        let xml = "<LineString><coordinates>1,2 3,4</coordinates></LineString>";
        let geometry = with_doc(xml, |n| parse_gml(n).unwrap());
        assert_eq!(geometry, Geometry::LineString(vec![Coord { x: 1.0, y: 2.0 }, Coord { x: 3.0, y: 4.0 }]));
    }

    #[rstest]
    fn test_point_wkt() {
        let xml = "<Point><pos>10.5 60.1</pos></Point>";
        let geometry = with_doc(xml, |n| extract(n).unwrap());
        assert_eq!(geometry.to_wkt(), "POINT(10.5 60.1)");
    }

    #[rstest]
    fn test_utm_is_reprojected() {
        let xml = r#"<LineString srsName="EPSG:32632"><posList>500000 0 500000 0</posList></LineString>"#;
        let geometry = with_doc(xml, |n| extract(n).unwrap());
        let first = *geometry.coords().next().unwrap();
        assert!((first.x - 9.0).abs() < 1e-6);
        assert!(first.y.abs() < 1e-6);
    }

    #[rstest]
    fn test_national_grid_is_reprojected() {
        let xml = r#"<LineString srsName="urn:ogc:def:crs:EPSG::28992"><posList>155000 463000 155000 463000</posList></LineString>"#;
        let geometry = with_doc(xml, |n| extract(n).unwrap());
        let first = *geometry.coords().next().unwrap();
        assert!((first.x - 5.3872).abs() < 1e-3, "longitude was {}", first.x);
        assert!((first.y - 52.1552).abs() < 1e-3, "latitude was {}", first.y);
    }

    #[rstest]
    #[case("EPSG:70000")]
    #[case("urn:example:local")]
    fn test_unsupported_crs(#[case] srs_name: &str) {
        let xml = format!(
            r#"<LineString srsName="{}"><posList>1 2 3 4</posList></LineString>"#,
            srs_name
        );
        let err = with_doc(&xml, |n| extract(n).unwrap_err());
        assert_eq!(
            err,
            GeometryError::UnsupportedCrs {
                srs_name: srs_name.to_string()
            }
        );
    }

    #[rstest]
    fn test_oversized_geometry() {
        let ordinates = "1 2 ".repeat(MAX_GEOMETRY_SIZE / 4 + 1);
        let xml = format!("<LineString><posList>{}</posList></LineString>", ordinates);
        let err = with_doc(&xml, |n| extract(n).unwrap_err());
        assert!(matches!(err, GeometryError::Oversized { .. }));
    }

    #[rstest]
    #[case("<LineString><posList>1 2 3</posList></LineString>")]
    #[case("<LineString><posList>1 x 3 4</posList></LineString>")]
    #[case("<LineString></LineString>")]
    #[case("<Polygon></Polygon>")]
    #[case("<Curve><posList>1 2 3 4</posList></Curve>")]
    fn test_malformed_geometry(#[case] xml: &str) {
        assert!(with_doc(xml, |n| parse_gml(n).is_err()));
    }

    #[rstest]
    #[case(None, "EPSG:4326", Some(4326))]
    #[case(Some("EPSG:25833"), "EPSG:25833", Some(25833))]
    #[case(Some("25833"), "EPSG:25833", Some(25833))]
    #[case(Some("urn:ogc:def:crs:EPSG::3857"), "EPSG:3857", Some(3857))]
    #[case(Some("http://www.opengis.net/def/crs/EPSG/0/32633"), "EPSG:32633", Some(32633))]
    #[case(Some("urn:ogc:def:crs:OGC:1.3:CRS84"), "EPSG:4326", Some(4326))]
    #[case(Some("local"), "local", None)]
    fn test_srs_name_resolution(
        #[case] raw: Option<&str>,
        #[case] qualified: &str,
        #[case] srid: Option<u32>,
    ) {
        let srs = SrsName::resolve(raw);
        assert_eq!(srs.qualified, qualified);
        assert_eq!(srs.srid, srid);
    }

    #[rstest]
    fn test_srs_name_found_on_descendant() {
        let xml = r#"<Polygon><exterior><LinearRing srsName="EPSG:3857"><posList>0 0 1 1 0 0</posList></LinearRing></exterior></Polygon>"#;
        let srs_name = with_doc(xml, |n| find_srs_name(n).map(str::to_string));
        assert_eq!(srs_name.as_deref(), Some("EPSG:3857"));
    }

    #[rstest]
    fn test_non_finite_geometry() {
        let geometry = Geometry::Point(Coord { x: f64::NAN, y: 1.0 });
        assert!(!geometry.is_finite());
        assert!(Geometry::Point(Coord { x: 0.0, y: 1.0 }).is_finite());
    }
}
