use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// `datatype` value marking a record created only because it was referenced
/// as a parent.
pub const STUB_DATATYPE: &str = "entity";

/// Annotation relations that classify alternate names for a term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynonymCategory {
    /// `oboInOwl:hasSynonym`
    Synonym,
    /// `oboInOwl:hasBroadSynonym`
    BroadSynonym,
    /// `oboInOwl:hasExactSynonym`
    ExactSynonym,
    /// `oboInOwl:hasNarrowSynonym`
    NarrowSynonym,
    /// `IAO:0000118`
    AlternativeTerm,
}

impl SynonymCategory {
    pub const ALL: [Self; 5] = [
        Self::Synonym,
        Self::BroadSynonym,
        Self::ExactSynonym,
        Self::NarrowSynonym,
        Self::AlternativeTerm,
    ];

    /// Field name used in JSON, TSV headers and query variables.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Synonym => "synonym",
            Self::BroadSynonym => "broad_synonym",
            Self::ExactSynonym => "exact_synonym",
            Self::NarrowSynonym => "narrow_synonym",
            Self::AlternativeTerm => "alternative_term",
        }
    }

    /// Character separating phrases in a raw annotation value.
    #[must_use]
    pub fn delimiter(self) -> char {
        ';'
    }
}

impl fmt::Display for SynonymCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for SynonymCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.field_name() == s)
            .ok_or_else(|| format!("unknown synonym category `{s}`"))
    }
}

/// Flattened description of one ontology term.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_parents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(flatten)]
    pub synonyms: BTreeMap<SynonymCategory, Vec<String>>,
}

impl EntityRecord {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Minimal placeholder for a parent that was never described itself.
    #[must_use]
    pub fn stub(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            datatype: Some(STUB_DATATYPE.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.datatype.as_deref() == Some(STUB_DATATYPE)
    }

    /// Records an additional parent. Returns `false` when `parent` is already
    /// the primary parent or already listed.
    pub fn add_other_parent(&mut self, parent: &str) -> bool {
        if self.parent_id.as_deref() == Some(parent)
            || self.other_parents.iter().any(|other| other == parent)
        {
            return false;
        }
        self.other_parents.push(parent.to_owned());
        true
    }

    #[must_use]
    pub fn synonyms(&self, category: SynonymCategory) -> &[String] {
        self.synonyms.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Textual value of a named output field, multi-valued fields joined with
    /// `delimiter`. Unknown and absent fields yield `None`.
    #[must_use]
    pub fn field(&self, name: &str, delimiter: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "parent_id" => self.parent_id.clone(),
            "other_parents" => {
                (!self.other_parents.is_empty()).then(|| self.other_parents.join(delimiter))
            }
            "label" => self.label.clone(),
            "definition" => self.definition.clone(),
            "ui_label" => self.ui_label.clone(),
            "ui_definition" => self.ui_definition.clone(),
            "ui_help" => self.ui_help.clone(),
            "deprecated" => self.deprecated.map(|flag| flag.to_string()),
            "replaced_by" => self.replaced_by.clone(),
            "ontology" => self.ontology.clone(),
            "datatype" => self.datatype.clone(),
            other => {
                let category = other.parse::<SynonymCategory>().ok()?;
                let phrases = self.synonyms.get(&category)?;
                (!phrases.is_empty()).then(|| phrases.join(delimiter))
            }
        }
    }
}

/// Identifier keyed record set that remembers first-insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityTable {
    records: Vec<EntityRecord>,
    index: HashMap<String, usize>,
}

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EntityRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EntityRecord> {
        self.index
            .get(id)
            .copied()
            .map(move |position| &mut self.records[position])
    }

    /// Returns the record for `id`, creating an empty one on first touch. The
    /// boolean is `true` when the record already existed.
    pub fn upsert(&mut self, id: &str) -> (&mut EntityRecord, bool) {
        if let Some(&position) = self.index.get(id) {
            return (&mut self.records[position], true);
        }
        self.records.push(EntityRecord::new(id));
        let position = self.records.len() - 1;
        self.index.insert(id.to_owned(), position);
        (&mut self.records[position], false)
    }

    /// Inserts `record` unless its id is already present. Returns whether the
    /// record was inserted.
    pub fn insert_if_absent(&mut self, record: EntityRecord) -> bool {
        if self.index.contains_key(&record.id) {
            return false;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter()
    }

    /// Identifiers in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }
}

impl Serialize for EntityTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.id, record)?;
        }
        map.end()
    }
}

/// Ontology level annotations emitted as the `metadata` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OntologyMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_iri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
}
