//! ## ontofetch
//!
//! Ontology term fetch to flattened JSON and tabular output.
//!
//! An OWL document is loaded into an in-memory graph, its class hierarchy is
//! walked from one or more root terms and every term found is merged into a
//! single record keyed by its compact identifier. Text annotations and
//! synonyms are layered onto the same records before the table is written out
//! as a JSON document and a TSV file.
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

pub use self::errors::Error;

pub mod cli;
pub mod config;
pub mod errors;
pub mod logger;
pub mod ontology;
pub mod output;

/// Version stamped into the `metadata` section of every JSON document.
pub const CODE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application results options list
pub type Result<T, E = Error> = std::result::Result<T, E>;
