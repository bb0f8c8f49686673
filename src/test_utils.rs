//! Shared test utilities for unit, execute and integration tests.
//!
//! Everything here is built from the miniature corpus in [`crate::fixtures`].

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::config::SchemaConfig;
use crate::db::schema::{derive, TableSchema};
use crate::fixtures;
use crate::graph::{simplify, SimplifiedGraph};
use crate::pipeline::CompiledSchema;
use crate::xsd::{RawGraph, SchemaCompiler};

/// Compile the fixture corpus without touching the filesystem.
pub fn fixture_raw_graph() -> RawGraph {
    let mut compiler = SchemaCompiler::new();
    compiler
        .add_str(fixtures::PUBLICATION_SCHEMA, fixtures::ROOT_FILE)
        .expect("publication fixture should compile");
    compiler
        .add_str(fixtures::SITE_SCHEMA, "netex_part_1/netex_site.xsd")
        .expect("site fixture should compile");
    compiler.finish()
}

pub fn fixture_simplified_graph() -> SimplifiedGraph {
    let raw = fixture_raw_graph();
    let root = raw
        .lookup(fixtures::ROOT_ELEMENT)
        .expect("root element should be defined");
    simplify(&raw, root).expect("fixture graph should simplify")
}

pub fn fixture_entities() -> HashSet<String> {
    fixtures::ENTITIES.iter().map(|s| s.to_string()).collect()
}

pub fn fixture_tables() -> BTreeMap<String, TableSchema> {
    let graph = fixture_simplified_graph();
    derive(&graph, graph.root(), &fixture_entities()).expect("fixture tables should derive")
}

pub fn fixture_schema() -> CompiledSchema {
    CompiledSchema::from_raw(fixture_raw_graph(), fixtures::ROOT_ELEMENT, fixture_entities())
        .expect("fixture schema should build")
}

/// Lay the fixture corpus out under `dir` and return a matching schema config.
pub fn write_fixture_corpus(dir: &Path) -> SchemaConfig {
    fs::create_dir_all(dir.join("netex_part_1")).expect("Failed to create corpus dir");
    fs::write(dir.join(fixtures::ROOT_FILE), fixtures::PUBLICATION_SCHEMA)
        .expect("Failed to write root schema");
    fs::write(dir.join("netex_part_1/netex_site.xsd"), fixtures::SITE_SCHEMA)
        .expect("Failed to write site schema");

    SchemaConfig {
        xsd_dir: dir.to_path_buf(),
        root_file: fixtures::ROOT_FILE.to_string(),
        folders: fixtures::FOLDERS.iter().map(|s| s.to_string()).collect(),
        root_element: fixtures::ROOT_ELEMENT.to_string(),
        entities: fixtures::ENTITIES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Write the fixture instance document under `dir` and return its path.
pub fn write_fixture_document(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, fixtures::STOP_PLACES).expect("Failed to write document");
    path
}

/// Command context over the fixture corpus written to `dir`, with the
/// in-memory database.
pub fn fixture_context(dir: &Path) -> crate::commands::Context {
    let config = crate::config::ConfigFile {
        schema: write_fixture_corpus(dir),
        ..crate::config::ConfigFile::default()
    };
    crate::commands::Context::new(config, crate::db::DatabaseConfig::Memory)
}
