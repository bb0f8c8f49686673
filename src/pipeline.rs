//! End-to-end pipeline: schema corpus to tables, documents to rows.
//!
//! [`CompiledSchema`] is built once per run and shared read-only by the
//! flattening workers.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::config::SchemaConfig;
use crate::db::schema::{self, SchemaError, TableSchema};
use crate::flatten::{self, FlattenError, FlattenResult};
use crate::graph::{self, GraphError, SimplifiedGraph};
use crate::xsd::{self, RawGraph, XsdError};

/// Stack size for flattening workers; the walk recurses once per element level.
pub const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Xsd(#[from] XsdError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),

    #[error("Root element '{name}' is not defined in the schema corpus")]
    UnknownRootElement { name: String },

    #[error("Failed to start worker pool: {message}")]
    WorkerPool { message: String },
}

/// Compiled, simplified and derived schema for one corpus.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub raw: RawGraph,
    pub graph: SimplifiedGraph,
    pub tables: BTreeMap<String, TableSchema>,
    pub entities: HashSet<String>,
}

impl CompiledSchema {
    /// Compile the corpus described by `config`.
    pub fn build(config: &SchemaConfig) -> Result<Self, PipelineError> {
        let raw = xsd::compile(&config.root_path(), &config.scan_roots())?;
        Self::from_raw(raw, &config.root_element, config.entity_set())
    }

    /// Simplify and derive tables from an already compiled graph.
    pub fn from_raw(
        raw: RawGraph,
        root_element: &str,
        entities: HashSet<String>,
    ) -> Result<Self, PipelineError> {
        let root = raw
            .lookup(root_element)
            .ok_or_else(|| PipelineError::UnknownRootElement {
                name: root_element.to_string(),
            })?;
        let graph = graph::simplify(&raw, root)?;
        let tables = schema::derive(&graph, graph.root(), &entities)?;

        info!(
            raw_nodes = raw.len(),
            simplified_nodes = graph.len(),
            tables = tables.len(),
            "Compiled schema"
        );
        Ok(Self {
            raw,
            graph,
            tables,
            entities,
        })
    }

    pub fn flatten_str(&self, text: &str, source_name: &str) -> Result<FlattenResult, FlattenError> {
        flatten::flatten_str(text, source_name, &self.graph, &self.tables)
    }

    pub fn flatten_file(&self, path: &Path) -> Result<FlattenResult, FlattenError> {
        flatten::flatten_file(path, &self.graph, &self.tables)
    }

    /// Flatten every document in parallel and merge the results in input order.
    ///
    /// The first unreadable or malformed document aborts the run.
    pub fn flatten_files(&self, paths: &[PathBuf]) -> Result<FlattenResult, PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .stack_size(WORKER_STACK_SIZE)
            .build()
            .map_err(|e| PipelineError::WorkerPool {
                message: e.to_string(),
            })?;

        let results: Vec<FlattenResult> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| self.flatten_file(path))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut merged = FlattenResult::for_tables(&self.tables);
        for result in results {
            merged.merge(result);
        }
        info!(
            documents = paths.len(),
            rows = merged.row_count(),
            diagnostics = merged.diagnostics.len(),
            "Flattened documents"
        );
        Ok(merged)
    }
}
