//! JSON and TSV renderings of a [`FetchReport`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::OutputSettings;
use crate::ontology::entities::{EntityTable, OntologyMetadata};
use crate::ontology::service::FetchReport;
use crate::Result;

#[derive(Serialize)]
struct Document<'a> {
    metadata: &'a OntologyMetadata,
    specifications: &'a EntityTable,
}

/// Pretty printed `{ "metadata": ..., "specifications": ... }` document.
///
/// # Errors
/// When serialisation fails.
pub fn render_json(report: &FetchReport) -> Result<String> {
    let document = Document {
        metadata: &report.metadata,
        specifications: &report.table,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Tab separated table with one row per record and `settings.fields` as
/// header.
#[must_use]
pub fn render_tsv(report: &FetchReport, settings: &OutputSettings) -> String {
    let mut out = settings.fields.join("\t");
    out.push('\n');
    for record in report.table.iter() {
        let row: Vec<String> = settings
            .fields
            .iter()
            .map(|field| {
                record
                    .field(field, &settings.multi_value_delimiter)
                    .map(|value| clean_cell(&value))
                    .unwrap_or_default()
            })
            .collect();
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Replaces tabs and line breaks, literal or escaped, with a single space.
fn clean_cell(value: &str) -> String {
    value
        .replace("\\r\\n", " ")
        .replace("\\n", " ")
        .replace("\r\n", " ")
        .replace(['\r', '\n', '\t'], " ")
        .trim()
        .to_owned()
}

/// Paths of the two artifacts written for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifacts {
    pub json: PathBuf,
    pub tsv: PathBuf,
}

impl Artifacts {
    #[must_use]
    pub fn new(folder: &Path, basename: &str) -> Self {
        Self {
            json: folder.join(format!("{basename}.json")),
            tsv: folder.join(format!("{basename}.tsv")),
        }
    }
}

/// Writes `<folder>/<basename>.json` and `<folder>/<basename>.tsv`, creating
/// `folder` when missing.
///
/// # Errors
/// On serialisation or I/O failure.
pub fn write_artifacts(
    report: &FetchReport,
    settings: &OutputSettings,
    folder: &Path,
    basename: &str,
) -> Result<Artifacts> {
    fs::create_dir_all(folder)?;
    let artifacts = Artifacts::new(folder, basename);
    fs::write(&artifacts.json, render_json(report)?)?;
    fs::write(&artifacts.tsv, render_tsv(report, settings))?;
    tracing::info!(json = %artifacts.json.display(), tsv = %artifacts.tsv.display(), "wrote output");
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::{clean_cell, render_json, render_tsv};
    use crate::config::OutputSettings;
    use crate::ontology::entities::{EntityRecord, SynonymCategory};
    use crate::ontology::service::FetchReport;

    fn report() -> FetchReport {
        let mut report = FetchReport::default();
        report.metadata.prefix = Some("GENEPIO".into());
        let (term, _) = report.table.upsert("GENEPIO:1");
        term.parent_id = Some("GENEPIO:0".into());
        term.other_parents = vec!["GENEPIO:2".into(), "GENEPIO:3".into()];
        term.label = Some("term one".into());
        term.definition = Some("first line\nsecond\tline".into());
        term.deprecated = Some(false);
        term.synonyms
            .insert(SynonymCategory::ExactSynonym, vec!["t1".into(), "one".into()]);
        report.table.insert_if_absent(EntityRecord::stub("GENEPIO:0"));
        report
    }

    #[test]
    fn tsv_header_is_the_configured_field_list() {
        let settings = OutputSettings {
            fields: vec!["label".into(), "id".into(), "language".into()],
            multi_value_delimiter: "|".into(),
        };
        let rendered = render_tsv(&report(), &settings);
        let header = rendered.lines().next().expect("header");
        assert_eq!(header, "label\tid\tlanguage");
        assert_eq!(rendered.lines().nth(2), Some("\tGENEPIO:0\t"));
    }

    #[test]
    fn tsv_flattens_lists_and_text() {
        let settings = OutputSettings {
            fields: vec![
                "parent_id".into(),
                "other_parents".into(),
                "definition".into(),
                "deprecated".into(),
                "exact_synonym".into(),
                "datatype".into(),
                "id".into(),
            ],
            multi_value_delimiter: ";".into(),
        };
        assert_snapshot!(
            render_tsv(&report(), &settings).trim_end(),
            @"parent_id\tother_parents\tdefinition\tdeprecated\texact_synonym\tdatatype\tid\nGENEPIO:0\tGENEPIO:2;GENEPIO:3\tfirst line second line\tfalse\tt1;one\t\tGENEPIO:1\n\t\t\t\t\tentity\tGENEPIO:0"
        );
    }

    #[test]
    fn json_document_has_metadata_and_specifications() {
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&report()).expect("json")).expect("parse");
        assert_eq!(value["metadata"]["prefix"], "GENEPIO");
        assert_eq!(value["specifications"]["GENEPIO:1"]["other_parents"][1], "GENEPIO:3");
        assert_eq!(value["specifications"]["GENEPIO:0"]["datatype"], "entity");
        assert!(value["specifications"]["GENEPIO:0"].get("label").is_none());
    }

    #[test]
    fn cells_lose_escaped_line_breaks() {
        assert_eq!(clean_cell("a\\nb"), "a b");
        assert_eq!(clean_cell(" a\r\nb\t"), "a b");
    }
}
