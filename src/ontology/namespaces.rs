//! Conversion between compact `PREFIX:local` identifiers and expanded IRIs.
//!
//! The [`NamespaceTable`] is built once from configuration and shared by
//! reference for the whole run. It is closed-world: an IRI that no registered
//! namespace covers is a configuration error.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use super::value_objects::{CompactId, Iri};
use crate::{Error, Result};

/// Base of the OBO Foundry PURL space. Terms below it follow the
/// `<base><PREFIX>_<local>` convention.
pub const OBO_BASE: &str = "http://purl.obolibrary.org/obo/";

const DEFAULT_NAMESPACES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("oboInOwl", "http://www.geneontology.org/formats/oboInOwl#"),
    ("obo", OBO_BASE),
    ("BFO", "http://purl.obolibrary.org/obo/BFO_"),
    ("FOODON", "http://purl.obolibrary.org/obo/FOODON_"),
    ("GENEPIO", "http://purl.obolibrary.org/obo/GENEPIO_"),
    ("IAO", "http://purl.obolibrary.org/obo/IAO_"),
    ("NCBITaxon", "http://purl.obolibrary.org/obo/NCBITaxon_"),
    ("OBI", "http://purl.obolibrary.org/obo/OBI_"),
    ("RO", "http://purl.obolibrary.org/obo/RO_"),
    ("UBERON", "http://purl.obolibrary.org/obo/UBERON_"),
    ("UO", "http://purl.obolibrary.org/obo/UO_"),
];

fn obo_local_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9]*)_(.+)$").expect("obo local name pattern is valid")
    })
}

fn obo_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("obo prefix pattern is valid"))
}

/// Prefix to namespace mapping used to normalise identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceTable {
    namespaces: BTreeMap<String, String>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self {
            namespaces: DEFAULT_NAMESPACES
                .iter()
                .map(|(prefix, namespace)| ((*prefix).to_owned(), (*namespace).to_owned()))
                .collect(),
        }
    }
}

impl NamespaceTable {
    /// Creates a table holding only the supplied namespaces.
    pub fn new<I, P, N>(namespaces: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, N)>,
        P: Into<String>,
        N: Into<String>,
    {
        let mut table = Self {
            namespaces: BTreeMap::new(),
        };
        for (prefix, namespace) in namespaces {
            table.register(prefix, namespace)?;
        }
        Ok(table)
    }

    /// Built-in namespaces overlaid with the configured ones.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::default();
        for (prefix, namespace) in overrides {
            table.register(prefix.clone(), namespace.clone())?;
        }
        Ok(table)
    }

    /// Registers (or replaces) a prefix. The namespace must be a valid IRI.
    pub fn register(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Result<()> {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if prefix.is_empty() || prefix.contains(':') {
            return Err(Error::Config(format!("invalid namespace prefix `{prefix}`")));
        }
        Iri::new(namespace.as_str())?;
        self.namespaces.insert(prefix, namespace);
        Ok(())
    }

    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Compacts an expanded IRI.
    ///
    /// The longest registered namespace that prefixes `iri` wins. When that
    /// namespace is the bare OBO base, `<base>FOO_123` still compacts to
    /// `FOO:123` unless `FOO` is registered for another namespace.
    ///
    /// # Errors
    /// [`Error::UnknownNamespace`] when no registered namespace covers `iri`.
    pub fn compact(&self, iri: &str) -> Result<String> {
        let best = self
            .namespaces
            .iter()
            .filter(|(_, namespace)| iri.starts_with(namespace.as_str()))
            .max_by_key(|(_, namespace)| namespace.len());

        let Some((prefix, namespace)) = best else {
            return Err(Error::UnknownNamespace(iri.to_owned()));
        };
        let local = &iri[namespace.len()..];

        if namespace == OBO_BASE {
            if let Some(captures) = obo_local_name().captures(local) {
                let family = &captures[1];
                if self.expands_to_obo(family) {
                    return Ok(format!("{family}:{}", &captures[2]));
                }
            }
        }
        Ok(CompactId::new(prefix.as_str(), local).to_string())
    }

    /// Expands a compact identifier. Absolute IRIs pass through unchanged.
    ///
    /// # Errors
    /// [`Error::UnknownNamespace`] when the prefix is not registered, or
    /// [`Error::InvalidIri`] when the result is not a valid IRI.
    pub fn expand(&self, id: &str) -> Result<Iri> {
        if id.contains("://") {
            return Ok(Iri::new(id)?);
        }
        let compact = CompactId::parse(id)?;
        if let Some(namespace) = self.namespace(compact.prefix()) {
            return Ok(Iri::new(format!("{namespace}{}", compact.local()))?);
        }
        if self.namespace("obo") == Some(OBO_BASE) && obo_prefix().is_match(compact.prefix()) {
            return Ok(Iri::new(format!(
                "{OBO_BASE}{}_{}",
                compact.prefix(),
                compact.local()
            ))?);
        }
        Err(Error::UnknownNamespace(id.to_owned()))
    }

    /// `false` when `prefix` is registered under a namespace other than
    /// `<obo base><prefix>_`, in which case `prefix:local` would expand
    /// elsewhere and the IRI keeps the plain `obo:` form.
    fn expands_to_obo(&self, prefix: &str) -> bool {
        self.namespace(prefix).map_or(true, |namespace| {
            namespace
                .strip_prefix(OBO_BASE)
                .and_then(|rest| rest.strip_suffix('_'))
                == Some(prefix)
        })
    }

    /// Compacts `value` when it is an IRI, otherwise returns it untouched.
    ///
    /// Used for annotation values such as `replaced_by` that are sometimes
    /// written as plain `PREFIX:local` strings.
    pub fn normalize_reference(&self, value: &str) -> Result<String> {
        if value.contains("://") {
            self.compact(value)
        } else {
            Ok(value.trim().to_owned())
        }
    }

    /// `PREFIX` declarations for every registered namespace.
    #[must_use]
    pub fn sparql_prologue(&self) -> String {
        let mut prologue = String::new();
        for (prefix, namespace) in &self.namespaces {
            let _ = writeln!(prologue, "PREFIX {prefix}: <{namespace}>");
        }
        prologue
    }
}

/// Derives the ontology tag stamped onto every record.
///
/// A configured prefix wins. Otherwise the last path segment of the
/// ontology IRI is cut at its first `.` and upper-cased, so
/// `http://purl.obolibrary.org/obo/genepio.owl` yields `GENEPIO`.
#[must_use]
pub fn ontology_tag(configured: Option<&str>, ontology_iri: Option<&str>) -> Option<String> {
    if let Some(prefix) = configured.map(str::trim).filter(|prefix| !prefix.is_empty()) {
        return Some(prefix.to_owned());
    }
    let segment = ontology_iri?
        .trim_end_matches(['/', '#'])
        .rsplit(['/', '#'])
        .next()?;
    let stem = segment.split('.').next().unwrap_or(segment);
    if stem.is_empty() || stem.contains(':') {
        return None;
    }
    Some(stem.to_uppercase())
}
