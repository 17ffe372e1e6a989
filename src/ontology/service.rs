use tracing::{debug, info};

use super::entities::{EntityTable, OntologyMetadata};
use super::merger::EntityMerger;
use super::namespaces::{ontology_tag, NamespaceTable};
use super::repositories::GraphQuery;
use super::source::OntologySource;
use super::store::{GraphStore, QueryCatalog};
use super::value_objects::Iri;
use crate::config::Config;
use crate::{Error, Result, CODE_VERSION};

/// Finished result of one run, handed to the output writers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub metadata: OntologyMetadata,
    pub table: EntityTable,
}

/// Drives the hierarchy, backfill, text and synonym passes against a graph.
pub struct FetchService<'a, G: GraphQuery + ?Sized> {
    graph: &'a G,
    namespaces: &'a NamespaceTable,
    configured_prefix: Option<&'a str>,
}

impl<'a, G: GraphQuery + ?Sized> FetchService<'a, G> {
    #[must_use]
    pub fn new(graph: &'a G, namespaces: &'a NamespaceTable) -> Self {
        Self {
            graph,
            namespaces,
            configured_prefix: None,
        }
    }

    /// Forces the ontology tag instead of deriving it from the metadata.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<&'a str>) -> Self {
        self.configured_prefix = prefix;
        self
    }

    /// Runs the hierarchy query once per root, backfills parent stubs and
    /// then issues the text and synonym query once for every known id.
    ///
    /// # Errors
    /// When a query fails or an identifier falls outside the namespace table.
    pub fn run(&self, roots: &[Iri]) -> Result<FetchReport> {
        let mut metadata = self.graph.metadata()?;
        metadata.prefix = ontology_tag(self.configured_prefix, metadata.iri.as_deref());
        metadata.code_version = Some(CODE_VERSION.to_owned());
        info!(iri = ?metadata.iri, prefix = ?metadata.prefix, "ontology metadata");

        let mut merger = EntityMerger::new(self.namespaces, metadata.prefix.clone());
        for root in roots {
            info!(root = %root, "hierarchy query");
            let rows = self.graph.hierarchy(root)?;
            let merged = merger.ingest_hierarchy_rows(rows)?;
            info!(root = %root, rows = merged, terms = merger.table().len(), "merged terms");
        }

        let stubs = merger.finalize_stub_parents();
        info!(stubs, "parent stubs created");

        let ids = merger.table().ids();
        for id in &ids {
            let iri = self.namespaces.expand(id)?;
            if let Some(text) = self.graph.text(&iri)? {
                merger.enrich_text(id, text);
            }
            if let Some(synonyms) = self.graph.synonyms(&iri)? {
                merger.enrich_synonyms(id, &synonyms);
            }
            debug!(id = %id, "enriched");
        }
        info!(terms = ids.len(), "enrichment done");

        Ok(FetchReport {
            metadata,
            table: merger.into_table(),
        })
    }
}

/// Splits a comma separated root list. Entries may be full IRIs or compact
/// identifiers.
///
/// # Errors
/// When an entry can not be expanded, or when the list is empty.
pub fn parse_roots(text: &str, namespaces: &NamespaceTable) -> Result<Vec<Iri>> {
    let roots = text
        .split(',')
        .map(str::trim)
        .filter(|root| !root.is_empty())
        .map(|root| namespaces.expand(root))
        .collect::<Result<Vec<_>>>()?;
    if roots.is_empty() {
        return Err(Error::Config("at least one root term is required".to_owned()));
    }
    Ok(roots)
}

/// Loads `source` (plus its imports) into a fresh graph and runs the
/// [`FetchService`] over it.
///
/// # Errors
/// [`Error::FatalLoad`] when the primary document can not be loaded, or any
/// error of [`FetchService::run`].
pub fn fetch_ontology(
    source: &OntologySource,
    config: &Config,
    namespaces: &NamespaceTable,
    roots: &[Iri],
) -> Result<FetchReport> {
    let queries = QueryCatalog::new(&config.queries, namespaces)?;
    let graph = GraphStore::new(queries)?;
    graph.load_primary(source)?;
    let imports = graph.load_includes(source, &config.imports)?;
    info!(imports, triples = graph.triple_count()?, "graph ready");

    let mut report = FetchService::new(&graph, namespaces)
        .with_prefix(config.metadata.prefix.as_deref())
        .run(roots)?;
    report.metadata.source = Some(source.to_string());
    Ok(report)
}
