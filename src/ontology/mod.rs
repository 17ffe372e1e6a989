//! Ontology term extraction.
//!
//! Pure pieces (value objects, the namespace table, the entity table and the
//! merger) sit next to the [`GraphQuery`] contract they consume. The
//! oxigraph-backed [`GraphStore`] is one implementation of that contract, and
//! [`FetchService`] wires the passes together.

pub mod entities;
pub mod merger;
pub mod namespaces;
pub mod repositories;
pub mod service;
pub mod source;
pub mod store;
pub mod value_objects;

pub use entities::{EntityRecord, EntityTable, OntologyMetadata, SynonymCategory};
pub use merger::EntityMerger;
pub use namespaces::NamespaceTable;
pub use repositories::{GraphQuery, HierarchyRow, SynonymRow, TextRow};
pub use service::{fetch_ontology, parse_roots, FetchReport, FetchService};
pub use source::OntologySource;
pub use store::{GraphStore, QueryCatalog};
pub use value_objects::{CompactId, Iri, IriError};
