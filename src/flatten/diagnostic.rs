//! Non-fatal findings collected while flattening a document.

use std::fmt;

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Document element with no counterpart in the schema graph; its data is dropped.
    SchemaGap { parent: String, tag: String },
    OversizedGeometry { tag: String, size: usize },
    UnsupportedCrs { tag: String, srs_name: String },
    MalformedGeometry { tag: String, message: String },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::SchemaGap { .. } => "schema_gap",
            Diagnostic::OversizedGeometry { .. } => "oversized_geometry",
            Diagnostic::UnsupportedCrs { .. } => "unsupported_crs",
            Diagnostic::MalformedGeometry { .. } => "malformed_geometry",
        }
    }

    pub(crate) fn emit(&self) {
        warn!(kind = self.kind(), "{}", self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SchemaGap { parent, tag } => {
                write!(f, "'{}' under '{}' is not in the schema graph", tag, parent)
            }
            Diagnostic::OversizedGeometry { tag, size } => {
                write!(f, "'{}' geometry of {} characters skipped", tag, size)
            }
            Diagnostic::UnsupportedCrs { tag, srs_name } => {
                write!(f, "'{}' uses unsupported CRS '{}'", tag, srs_name)
            }
            Diagnostic::MalformedGeometry { tag, message } => {
                write!(f, "'{}' geometry is malformed: {}", tag, message)
            }
        }
    }
}
