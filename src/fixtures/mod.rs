//! Test fixtures for schema and flattening tests.
//!
//! A miniature NeTEx-shaped corpus, loaded at compile time with `include_str!`.
//!
//! ## Available Fixtures
//!
//! - [`PUBLICATION_SCHEMA`] - Root schema file with `PublicationDelivery` and the abstract `Frame_` head
//! - [`SITE_SCHEMA`] - `SiteFrame`, `StopPlace`, `Quay`, `TariffZone` and their types
//! - [`STOP_PLACES`] - Instance document exercising entities, objects, refs and geometry
//! - [`ENTITIES`] - Entity set matching the corpus

/// Root schema file (`PublicationDelivery`).
pub const PUBLICATION_SCHEMA: &str = include_str!("publication.xsd");

/// Schema file placed under the scanned `netex_part_1` folder.
///
/// Contains a recursive type (`ParentSite` of `StopPlace_Type`) and a
/// substitution group member (`SiteFrame` for `Frame_`).
pub const SITE_SCHEMA: &str = include_str!("netex_part_1/netex_site.xsd");

/// Instance document.
///
/// Contains:
/// - 1 SiteFrame with 1 StopPlace ("Central", centroid 10.5/60.1) and 1 TariffZone (GML polygon)
/// - 2 Quays under the StopPlace
/// - an unknown `Foo` element
pub const STOP_PLACES: &str = include_str!("stop_places.xml");

pub const ROOT_FILE: &str = "publication.xsd";
pub const ROOT_ELEMENT: &str = "PublicationDelivery";
pub const FOLDERS: &[&str] = &["netex_part_1"];

pub const ENTITIES: &[&str] = &[
    "PublicationDelivery",
    "SiteFrame",
    "StopPlace",
    "Quay",
    "TariffZone",
];
