//! # Configuration
//!
//! A run is configured by an optional YAML file. Every section has defaults,
//! so an empty file (or no file at all) gives the stock behaviour:
//!
//! ```yaml
//! logger:
//!   level: debug
//!   format: pretty
//! prefixes:
//!   FOODON: http://purl.obolibrary.org/obo/FOODON_
//! output:
//!   multi_value_delimiter: "|"
//! ```
//!
//! The parsed [`Config`] is immutable for the rest of the run and is passed
//! by reference to the components that need it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ontology::entities::SynonymCategory;
use crate::{Error, Result};

/// Root `owl:Thing`, the default hierarchy root.
pub const DEFAULT_ROOT: &str = "http://www.w3.org/2002/07/owl#Thing";

const STRUCTURAL_FIELDS: &[&str] = &[
    "id",
    "parent_id",
    "ontology",
    "other_parents",
    "label",
    "definition",
    "ui_label",
    "ui_definition",
    "ui_help",
    "deprecated",
    "replaced_by",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logger: Logger,
    /// Extra or overriding `prefix: namespace` pairs on top of the built-in
    /// namespaces.
    pub prefixes: BTreeMap<String, String>,
    pub metadata: MetadataSettings,
    pub imports: ImportSettings,
    pub output: OutputSettings,
    pub queries: QueryTemplates,
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    /// When the file can not be read or is not valid YAML for [`Config`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            Error::Config(format!("can not read config `{}`: {err}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Parses configuration from YAML text. Blank text yields the defaults.
    ///
    /// # Errors
    /// When the text is not valid YAML for [`Config`].
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Logger {
    /// Enable log write to stderr
    pub enable: bool,

    /// Set the logger level.
    ///
    /// * options: `trace` | `debug` | `info` | `warn` | `error` | `off`
    pub level: LogLevel,

    /// Set the logger format.
    ///
    /// * options: `compact` | `pretty` | `json`
    pub format: Format,

    /// Override our custom tracing filter.
    ///
    /// Set this to your own filter if you want to see traces from internal
    /// libraries. See more [here](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives)
    pub override_filter: Option<String>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::Info,
            format: Format::Compact,
            override_filter: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogLevel {
    /// The "off" level.
    #[serde(rename = "off")]
    Off,
    /// The "trace" level.
    #[serde(rename = "trace")]
    Trace,
    /// The "debug" level.
    #[serde(rename = "debug")]
    Debug,
    /// The "info" level.
    #[serde(rename = "info")]
    #[default]
    Info,
    /// The "warn" level.
    #[serde(rename = "warn")]
    Warn,
    /// The "error" level.
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Format {
    #[default]
    #[serde(rename = "compact")]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Forces the ontology tag instead of deriving it from the ontology IRI.
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Follow `owl:imports` of the primary document.
    pub follow: bool,
    /// Directory checked for a file named like the import before fetching
    /// it from its IRI.
    pub local_dir: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            follow: true,
            local_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// TSV columns, in order.
    pub fields: Vec<String>,
    /// Joins multi-valued fields in TSV cells.
    pub multi_value_delimiter: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            multi_value_delimiter: ";".to_owned(),
        }
    }
}

/// Structural fields followed by one field per synonym category.
#[must_use]
pub fn default_fields() -> Vec<String> {
    STRUCTURAL_FIELDS
        .iter()
        .map(|field| (*field).to_owned())
        .chain(
            SynonymCategory::ALL
                .iter()
                .map(|category| category.field_name().to_owned()),
        )
        .collect()
}

/// SPARQL query templates. `{{ root }}` and `{{ datum }}` are replaced with an
/// `<iri>` term, and the namespace table's `PREFIX` lines are prepended.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryTemplates {
    pub hierarchy: String,
    pub text: String,
    pub synonyms: String,
    pub metadata: String,
    pub imports: String,
}

impl Default for QueryTemplates {
    fn default() -> Self {
        Self {
            hierarchy: HIERARCHY_QUERY.to_owned(),
            text: TEXT_QUERY.to_owned(),
            synonyms: SYNONYM_QUERY.to_owned(),
            metadata: METADATA_QUERY.to_owned(),
            imports: IMPORTS_QUERY.to_owned(),
        }
    }
}

const HIERARCHY_QUERY: &str = r"
SELECT DISTINCT ?id ?label ?parent_id ?deprecated ?replaced_by
WHERE {
    ?parent_id rdfs:subClassOf* {{ root }} .
    ?id rdfs:subClassOf ?parent_id .
    FILTER(isIRI(?id) && isIRI(?parent_id))
    OPTIONAL { ?id rdfs:label ?label }
    OPTIONAL { ?id GENEPIO:0000006 ?ui_label }
    OPTIONAL { ?id owl:deprecated ?deprecated }
    OPTIONAL { ?id IAO:0100001 ?replaced_by }
}
ORDER BY ?parent_id ?ui_label ?label
";

const TEXT_QUERY: &str = r"
SELECT ?label ?definition ?ui_label ?ui_definition
WHERE {
    VALUES ?datum { {{ datum }} }
    OPTIONAL { ?datum rdfs:label ?label }
    OPTIONAL { ?datum IAO:0000115 ?definition }
    OPTIONAL { ?datum GENEPIO:0000006 ?ui_label }
    OPTIONAL { ?datum GENEPIO:0000162 ?ui_definition }
}
LIMIT 1
";

const SYNONYM_QUERY: &str = r#"
SELECT ?synonym ?broad_synonym ?exact_synonym ?narrow_synonym ?alternative_term
WHERE {
    { SELECT (GROUP_CONCAT(STR(?value); separator=";") AS ?synonym)
      WHERE { {{ datum }} oboInOwl:hasSynonym ?value } }
    { SELECT (GROUP_CONCAT(STR(?value); separator=";") AS ?broad_synonym)
      WHERE { {{ datum }} oboInOwl:hasBroadSynonym ?value } }
    { SELECT (GROUP_CONCAT(STR(?value); separator=";") AS ?exact_synonym)
      WHERE { {{ datum }} oboInOwl:hasExactSynonym ?value } }
    { SELECT (GROUP_CONCAT(STR(?value); separator=";") AS ?narrow_synonym)
      WHERE { {{ datum }} oboInOwl:hasNarrowSynonym ?value } }
    { SELECT (GROUP_CONCAT(STR(?value); separator=";") AS ?alternative_term)
      WHERE { {{ datum }} IAO:0000118 ?value } }
}
"#;

const METADATA_QUERY: &str = r"
SELECT ?iri ?title ?description ?version_iri ?version_info ?license ?date
WHERE {
    ?iri rdf:type owl:Ontology .
    OPTIONAL { ?iri dc:title|dcterms:title ?title }
    OPTIONAL { ?iri dc:description|dcterms:description ?description }
    OPTIONAL { ?iri owl:versionIRI ?version_iri }
    OPTIONAL { ?iri owl:versionInfo ?version_info }
    OPTIONAL { ?iri dc:license|dcterms:license ?license }
    OPTIONAL { ?iri dc:date|dcterms:date ?date }
}
LIMIT 1
";

const IMPORTS_QUERY: &str = r"
SELECT DISTINCT ?import
WHERE {
    ?ontology owl:imports ?import .
    FILTER(isIRI(?import))
}
";
