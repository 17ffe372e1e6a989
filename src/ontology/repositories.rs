use std::collections::BTreeMap;

use super::entities::{OntologyMetadata, SynonymCategory};
use super::value_objects::Iri;
use crate::Result;

/// One binding row of the hierarchy query. Identifiers are expanded IRIs as
/// returned by the graph; the merger normalises them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchyRow {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub label: Option<String>,
    pub deprecated: Option<String>,
    pub replaced_by: Option<String>,
}

impl HierarchyRow {
    /// Row with the two required columns bound.
    #[must_use]
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            parent_id: Some(parent_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_deprecated(mut self, deprecated: impl Into<String>) -> Self {
        self.deprecated = Some(deprecated.into());
        self
    }

    #[must_use]
    pub fn with_replaced_by(mut self, replaced_by: impl Into<String>) -> Self {
        self.replaced_by = Some(replaced_by.into());
        self
    }
}

/// Text annotations attached directly to one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextRow {
    pub label: Option<String>,
    pub definition: Option<String>,
    pub ui_label: Option<String>,
    pub ui_definition: Option<String>,
    pub ui_help: Option<String>,
}

/// Raw, delimiter separated synonym strings for one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynonymRow {
    pub values: BTreeMap<SynonymCategory, String>,
}

impl SynonymRow {
    #[must_use]
    pub fn with(mut self, category: SynonymCategory, raw: impl Into<String>) -> Self {
        self.values.insert(category, raw.into());
        self
    }

    #[must_use]
    pub fn get(&self, category: SynonymCategory) -> Option<&str> {
        self.values.get(&category).map(String::as_str)
    }
}

/// Query contract the backing graph store has to fulfil.
pub trait GraphQuery {
    /// Every transitive descendant of `root`, one row per (term, parent) pair,
    /// ideally ordered by parent, UI label and label.
    fn hierarchy(&self, root: &Iri) -> Result<Vec<HierarchyRow>>;

    /// Text annotations of `entity`, at most one row.
    fn text(&self, entity: &Iri) -> Result<Option<TextRow>>;

    /// Synonym annotations of `entity`, at most one row.
    fn synonyms(&self, entity: &Iri) -> Result<Option<SynonymRow>>;

    /// Ontology level annotations.
    fn metadata(&self) -> Result<OntologyMetadata>;
}
