//! Builds the canonical entity table from query rows.
//!
//! Structural rows are merged first. A term reached through several parents
//! keeps the parent of its first sighting and collects the rest in
//! `other_parents`. Parents referenced but never described get stub records in
//! a single backfill sweep, and the text and synonym passes then enrich
//! records that already exist.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::entities::{EntityRecord, EntityTable};
use super::namespaces::NamespaceTable;
use super::repositories::{HierarchyRow, SynonymRow, TextRow};
use crate::Result;

/// Owns the entity table for the duration of one run.
pub struct EntityMerger<'a> {
    namespaces: &'a NamespaceTable,
    ontology: Option<String>,
    table: EntityTable,
    pending_parents: Vec<String>,
    pending_seen: HashSet<String>,
}

impl<'a> EntityMerger<'a> {
    /// `ontology` is the tag stamped onto every structurally sighted record.
    #[must_use]
    pub fn new(namespaces: &'a NamespaceTable, ontology: Option<String>) -> Self {
        Self {
            namespaces,
            ontology,
            table: EntityTable::new(),
            pending_parents: Vec::new(),
            pending_seen: HashSet::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &EntityTable {
        &self.table
    }

    #[must_use]
    pub fn into_table(self) -> EntityTable {
        self.table
    }

    /// Parents referenced so far that [`Self::finalize_stub_parents`] has not
    /// yet resolved, in first-reference order.
    #[must_use]
    pub fn pending_parents(&self) -> &[String] {
        &self.pending_parents
    }

    /// Merges structural rows into the table.
    ///
    /// Rows missing `id` or `parent_id` are skipped with a warning.
    ///
    /// # Errors
    /// Fails when an identifier falls outside every registered namespace.
    pub fn ingest_hierarchy_rows<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = HierarchyRow>,
    {
        let mut merged = 0;
        for row in rows {
            let (Some(raw_id), Some(raw_parent)) = (row.id.as_deref(), row.parent_id.as_deref())
            else {
                warn!(?row, "skipping hierarchy row without id or parent");
                continue;
            };

            let id = self.namespaces.compact(raw_id)?;
            let parent_id = self.namespaces.compact(raw_parent)?;
            let replaced_by = row
                .replaced_by
                .as_deref()
                .map(|value| self.namespaces.normalize_reference(value))
                .transpose()?
                .filter(|value| !value.is_empty());
            let deprecated = row.deprecated.as_deref().and_then(|value| {
                let flag = parse_flag(value);
                if flag.is_none() {
                    warn!(id = %id, value, "ignoring unrecognised deprecation value");
                }
                flag
            });

            let (record, existed) = self.table.upsert(&id);
            match record.parent_id.as_deref() {
                None => record.parent_id = Some(parent_id.clone()),
                Some(existing) if existing != parent_id => {
                    if record.add_other_parent(&parent_id) {
                        debug!(id = %id, parent = %parent_id, "additional parent");
                    }
                }
                Some(_) => {}
            }
            if existed && record.is_stub() {
                record.datatype = None;
            }

            if let Some(label) = row.label.filter(|label| !label.is_empty()) {
                record.label = Some(label);
            }
            if deprecated.is_some() {
                record.deprecated = deprecated;
            }
            if replaced_by.is_some() {
                record.replaced_by = replaced_by;
            }
            if self.ontology.is_some() {
                record.ontology.clone_from(&self.ontology);
            }

            if self.pending_seen.insert(parent_id.clone()) {
                self.pending_parents.push(parent_id);
            }
            merged += 1;
        }
        Ok(merged)
    }

    /// Inserts a stub for every pending parent without a record of its own.
    ///
    /// Must run after all hierarchy rows are ingested. Returns the number of
    /// stubs created.
    pub fn finalize_stub_parents(&mut self) -> usize {
        self.pending_seen.clear();
        std::mem::take(&mut self.pending_parents)
            .into_iter()
            .filter(|parent| self.table.insert_if_absent(EntityRecord::stub(parent.as_str())))
            .count()
    }

    /// Overwrites the record's text fields with the non-empty incoming ones.
    ///
    /// # Panics
    /// When `id` is not in the table. Enrichment only ever iterates ids the
    /// structural pass produced, so a miss means the passes ran out of order.
    pub fn enrich_text(&mut self, id: &str, text: TextRow) {
        let record = self.existing(id, "text");
        let TextRow {
            label,
            definition,
            ui_label,
            ui_definition,
            ui_help,
        } = text;
        overwrite(&mut record.label, label);
        overwrite(&mut record.definition, definition);
        overwrite(&mut record.ui_label, ui_label);
        overwrite(&mut record.ui_definition, ui_definition);
        overwrite(&mut record.ui_help, ui_help);
    }

    /// Appends the phrases of every non-empty synonym category.
    ///
    /// # Panics
    /// When `id` is not in the table, see [`Self::enrich_text`].
    pub fn enrich_synonyms(&mut self, id: &str, synonyms: &SynonymRow) {
        let record = self.existing(id, "synonym");
        for (&category, raw) in &synonyms.values {
            if raw.trim().is_empty() {
                continue;
            }
            let phrases = split_phrases(raw, category.delimiter());
            if phrases.is_empty() {
                continue;
            }
            record.synonyms.entry(category).or_default().extend(phrases);
        }
    }

    fn existing(&mut self, id: &str, pass: &str) -> &mut EntityRecord {
        match self.table.get_mut(id) {
            Some(record) => record,
            None => panic!("{pass} enrichment for `{id}` which the structural pass never produced"),
        }
    }
}

fn overwrite(field: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming.filter(|value| !value.trim().is_empty()) {
        *field = Some(value);
    }
}

/// Parses an `owl:deprecated` literal.
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Splits a raw synonym annotation into trimmed phrases.
///
/// Escaped (`\n`) and literal line breaks count as delimiters and double
/// quotes are dropped. Commas are not delimiters since many phrases contain
/// them.
#[must_use]
pub fn split_phrases(raw: &str, delimiter: char) -> Vec<String> {
    let separator = delimiter.to_string();
    raw.replace("\\n", &separator)
        .replace("\r\n", &separator)
        .replace(['\n', '\r'], &separator)
        .replace('"', "")
        .split(delimiter)
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(str::to_owned)
        .collect()
}
