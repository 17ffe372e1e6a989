//! In-memory RDF graph backed by oxigraph, queried with SPARQL templates.

use std::collections::HashSet;
use std::path::PathBuf;

use oxigraph::io::RdfParser;
use oxigraph::model::Term;
use oxigraph::sparql::{QueryResults, QuerySolution, SparqlEvaluator};
use oxigraph::store::Store;
use tera::{Context, Tera};
use tracing::{debug, info, warn};

use super::entities::{OntologyMetadata, SynonymCategory};
use super::namespaces::NamespaceTable;
use super::repositories::{GraphQuery, HierarchyRow, SynonymRow, TextRow};
use super::source::OntologySource;
use super::value_objects::Iri;
use crate::config::{ImportSettings, QueryTemplates};
use crate::{Error, Result};

const HIERARCHY: &str = "hierarchy.rq";
const TEXT: &str = "text.rq";
const SYNONYMS: &str = "synonyms.rq";
const METADATA: &str = "metadata.rq";
const IMPORTS: &str = "imports.rq";

/// Compiled query templates plus the `PREFIX` prologue they run with.
pub struct QueryCatalog {
    tera: Tera,
    prologue: String,
}

impl QueryCatalog {
    /// Compiles every template once.
    ///
    /// # Errors
    /// When a template has invalid tera syntax.
    pub fn new(templates: &QueryTemplates, namespaces: &NamespaceTable) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (HIERARCHY, templates.hierarchy.as_str()),
            (TEXT, templates.text.as_str()),
            (SYNONYMS, templates.synonyms.as_str()),
            (METADATA, templates.metadata.as_str()),
            (IMPORTS, templates.imports.as_str()),
        ])?;
        Ok(Self {
            tera,
            prologue: namespaces.sparql_prologue(),
        })
    }

    /// Renders `template` with each binding substituted as an `<iri>` term.
    ///
    /// # Errors
    /// When rendering fails, e.g. on a variable the bindings do not provide.
    pub fn render(&self, template: &str, bindings: &[(&str, &Iri)]) -> Result<String> {
        let mut context = Context::new();
        for (name, iri) in bindings {
            context.insert(*name, &iri.to_sparql());
        }
        let body = self.tera.render(template, &context)?;
        Ok(format!("{}{body}", self.prologue))
    }
}

/// Working graph holding the primary document and its imports.
pub struct GraphStore {
    store: Store,
    queries: QueryCatalog,
}

impl GraphStore {
    /// Creates an empty in-memory graph.
    ///
    /// # Errors
    /// When the in-memory store can not be created.
    pub fn new(queries: QueryCatalog) -> Result<Self> {
        let store = Store::new().map_err(Error::query)?;
        Ok(Self { store, queries })
    }

    /// Number of triples loaded so far.
    ///
    /// # Errors
    /// When the store can not be read.
    pub fn triple_count(&self) -> Result<usize> {
        self.store.len().map_err(Error::query)
    }

    /// Loads the primary document. Any failure is fatal for the run.
    ///
    /// # Errors
    /// [`Error::FatalLoad`] when the document can not be fetched or parsed.
    pub fn load_primary(&self, source: &OntologySource) -> Result<()> {
        info!(source = %source, "fetching and parsing");
        self.load(source)
            .map_err(|err| Error::fatal_load(source.to_string(), err))
    }

    /// Follows `owl:imports`, including imports of imports.
    ///
    /// Each import is attempted once. One that fails to load is logged and
    /// skipped, leaving the triples loaded so far in place. Returns the number
    /// of imports loaded.
    ///
    /// # Errors
    /// Only when the imports query itself fails.
    pub fn load_includes(
        &self,
        primary: &OntologySource,
        settings: &ImportSettings,
    ) -> Result<usize> {
        if !settings.follow {
            return Ok(0);
        }

        let mut search_dirs: Vec<PathBuf> = settings.local_dir.iter().cloned().collect();
        if let Some(dir) = primary.directory() {
            search_dirs.push(dir.join("imports"));
            search_dirs.push(dir.to_path_buf());
        }

        let mut attempted = HashSet::new();
        if let OntologySource::Url(url) = primary {
            attempted.insert(url.clone());
        }

        let mut loaded = 0;
        loop {
            let pending: Vec<Iri> = self
                .imports()?
                .into_iter()
                .filter(|import| !attempted.contains(import))
                .collect();
            if pending.is_empty() {
                break;
            }
            for import in pending {
                attempted.insert(import.clone());
                let source = OntologySource::for_import(&import, &search_dirs);
                match self.load(&source) {
                    Ok(()) => {
                        info!(import = %import, source = %source, "loaded import");
                        loaded += 1;
                    }
                    Err(err) => {
                        warn!(import = %import, error = %err, "import could not be loaded, continuing without it");
                    }
                }
            }
        }
        Ok(loaded)
    }

    fn load(&self, source: &OntologySource) -> Result<()> {
        let bytes = source.fetch()?;
        let mut parser = RdfParser::from_format(source.format());
        if let Some(base) = source.base_iri() {
            parser = parser
                .with_base_iri(base)
                .map_err(|err| Error::fatal_load(source.to_string(), err))?;
        }
        self.store
            .load_from_reader(parser, bytes.as_slice())
            .map_err(|err| Error::fatal_load(source.to_string(), err))?;
        debug!(source = %source, triples = self.triple_count()?, "parsed document");
        Ok(())
    }

    fn imports(&self) -> Result<Vec<Iri>> {
        let query = self.queries.render(IMPORTS, &[])?;
        Ok(self
            .select(&query)?
            .iter()
            .filter_map(|solution| match solution.get("import") {
                Some(Term::NamedNode(node)) => Some(Iri::from(node.clone())),
                _ => None,
            })
            .collect())
    }

    fn select(&self, query: &str) -> Result<Vec<QuerySolution>> {
        let results = SparqlEvaluator::new()
            .parse_query(query)
            .map_err(Error::query)?
            .on_store(&self.store)
            .execute()
            .map_err(Error::query)?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(Error::Query("expected SELECT results".to_owned()));
        };
        solutions
            .map(|solution| solution.map_err(Error::query))
            .collect()
    }

    fn first(&self, query: &str) -> Result<Option<QuerySolution>> {
        Ok(self.select(query)?.into_iter().next())
    }
}

/// Lexical value of a bound IRI or literal. Blank nodes count as unbound.
fn value(solution: &QuerySolution, variable: &str) -> Option<String> {
    match solution.get(variable)? {
        Term::NamedNode(node) => Some(node.as_str().to_owned()),
        Term::Literal(literal) => Some(literal.value().to_owned()),
        _ => None,
    }
}

impl GraphQuery for GraphStore {
    fn hierarchy(&self, root: &Iri) -> Result<Vec<HierarchyRow>> {
        let query = self.queries.render(HIERARCHY, &[("root", root)])?;
        Ok(self
            .select(&query)?
            .iter()
            .map(|solution| HierarchyRow {
                id: value(solution, "id"),
                parent_id: value(solution, "parent_id"),
                label: value(solution, "label"),
                deprecated: value(solution, "deprecated"),
                replaced_by: value(solution, "replaced_by"),
            })
            .collect())
    }

    fn text(&self, entity: &Iri) -> Result<Option<TextRow>> {
        let query = self.queries.render(TEXT, &[("datum", entity)])?;
        Ok(self.first(&query)?.map(|solution| TextRow {
            label: value(&solution, "label"),
            definition: value(&solution, "definition"),
            ui_label: value(&solution, "ui_label"),
            ui_definition: value(&solution, "ui_definition"),
            ui_help: value(&solution, "ui_help"),
        }))
    }

    fn synonyms(&self, entity: &Iri) -> Result<Option<SynonymRow>> {
        let query = self.queries.render(SYNONYMS, &[("datum", entity)])?;
        Ok(self.first(&query)?.map(|solution| {
            SynonymCategory::ALL
                .into_iter()
                .filter_map(|category| {
                    value(&solution, category.field_name())
                        .filter(|raw| !raw.is_empty())
                        .map(|raw| (category, raw))
                })
                .fold(SynonymRow::default(), |row, (category, raw)| {
                    row.with(category, raw)
                })
        }))
    }

    fn metadata(&self) -> Result<OntologyMetadata> {
        let query = self.queries.render(METADATA, &[])?;
        Ok(self
            .first(&query)?
            .map(|solution| OntologyMetadata {
                iri: value(&solution, "iri"),
                title: value(&solution, "title"),
                description: value(&solution, "description"),
                version_iri: value(&solution, "version_iri"),
                version_info: value(&solution, "version_info"),
                license: value(&solution, "license"),
                date: value(&solution, "date"),
                ..OntologyMetadata::default()
            })
            .unwrap_or_default())
    }
}
