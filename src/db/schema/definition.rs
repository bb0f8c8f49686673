//! Core table definition types.
//!
//! A [`TableSchema`] is derived per entity from the simplified schema graph and
//! is the single source of truth for both DDL generation and row flattening.

use serde::Serialize;

use crate::utils::camel_to_snake;

/// Column holding the row identifier.
pub const ID_COLUMN: &str = "id";
/// Column holding the element's XML attributes other than `id`.
pub const ATTRIBUTES_COLUMN: &str = "attributes";
/// Column holding the normalized geometry.
pub const GEOM_COLUMN: &str = "geom";
/// Column linking a row to its enclosing entity row.
pub const PARENT_ID_COLUMN: &str = "parent_id";

/// Bookkeeping column names present on every table (`parent_id` only off the root).
pub const STANDARD_COLUMNS: &[&str] = &[ID_COLUMN, ATTRIBUTES_COLUMN, GEOM_COLUMN, PARENT_ID_COLUMN];

/// Storage shape of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Plain text
    Scalar,
    /// Nested mapping
    Object,
    /// List of text values
    ArrayScalar,
    /// List of nested mappings
    ArrayObject,
    /// Point / linestring / polygon in EPSG:4326
    Geometry,
}

impl ColumnKind {
    /// Returns the PostgreSQL type name for this column kind.
    pub fn postgres_type(&self) -> &'static str {
        match self {
            ColumnKind::Scalar => "TEXT",
            ColumnKind::Object => "JSONB",
            ColumnKind::ArrayScalar => "TEXT[]",
            ColumnKind::ArrayObject => "JSONB[]",
            ColumnKind::Geometry => "geometry(Geometry, 4326)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Scalar => "scalar",
            ColumnKind::Object => "object",
            ColumnKind::ArrayScalar => "array_scalar",
            ColumnKind::ArrayObject => "array_object",
            ColumnKind::Geometry => "geometry",
        }
    }
}

/// A single table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// snake_case column name
    pub name: String,
    /// Tag or attribute name in instance documents
    pub source: String,
    pub kind: ColumnKind,
    pub is_list: bool,
}

impl Column {
    pub fn new(source: &str, kind: ColumnKind) -> Self {
        Self {
            name: camel_to_snake(source),
            source: source.to_string(),
            kind,
            is_list: matches!(kind, ColumnKind::ArrayScalar | ColumnKind::ArrayObject),
        }
    }
}

/// Table derived for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub entity: String,
    pub table_name: String,
    /// Entity whose rows enclose this one; `None` for the document root.
    pub parent: Option<String>,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(entity: &str, parent: Option<&str>) -> Self {
        Self {
            entity: entity.to_string(),
            table_name: camel_to_snake(entity),
            parent: parent.map(str::to_string),
            columns: Vec::new(),
        }
    }

    /// Append a data column. Returns `false` if the snake_case name is already taken.
    pub fn push_column(&mut self, column: Column) -> bool {
        if STANDARD_COLUMNS.contains(&column.name.as_str()) || self.column(&column.name).is_some() {
            return false;
        }
        self.columns.push(column);
        true
    }

    /// Append `id`, `attributes`, `geom` and, off the root, `parent_id`.
    pub fn push_standard_columns(&mut self) {
        self.columns.push(Column::new(ID_COLUMN, ColumnKind::Scalar));
        self.columns.push(Column::new(ATTRIBUTES_COLUMN, ColumnKind::Object));
        self.columns.push(Column::new(GEOM_COLUMN, ColumnKind::Geometry));
        if !self.is_root() {
            self.columns.push(Column::new(PARENT_ID_COLUMN, ColumnKind::Scalar));
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column fed by the given document tag.
    pub fn column_for_source(&self, source: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.source == source)
    }

    /// Number of columns fed from document content (excluding bookkeeping columns).
    pub fn data_column_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| !STANDARD_COLUMNS.contains(&c.name.as_str()))
            .count()
    }
}
