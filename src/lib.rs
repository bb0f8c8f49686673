//! netex_loader library - NeTEx to PostGIS loader
//!
//! Compiles the NeTEx XML Schema corpus into a relational schema, flattens
//! instance documents into rows guided by that schema, and bulk-loads the
//! rows into PostgreSQL/PostGIS.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod dedup;
pub mod flatten;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod utils;
pub mod xsd;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod fixtures;

#[cfg(test)]
pub mod test_utils;
