use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use ontofetch::cli::{self, Cli};
use ontofetch::config::{Config, ImportSettings, QueryTemplates};
use ontofetch::ontology::{
    fetch_ontology, parse_roots, GraphQuery, GraphStore, Iri, NamespaceTable, OntologySource,
    QueryCatalog, SynonymCategory,
};
use ontofetch::Error;

const PRIMARY: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:obo="http://purl.obolibrary.org/obo/"
     xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#"
     xmlns:dc="http://purl.org/dc/elements/1.1/">
  <owl:Ontology rdf:about="http://purl.obolibrary.org/obo/genepio.owl">
    <dc:title>Fixture ontology</dc:title>
    <owl:versionInfo>2024-01-01</owl:versionInfo>
    <owl:imports rdf:resource="http://purl.obolibrary.org/obo/genepio/fixture-import.owl"/>
    <owl:imports rdf:resource="file:///nonexistent/ontofetch/missing.owl"/>
  </owl:Ontology>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/GENEPIO_0000001">
    <rdfs:label>root term</rdfs:label>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/GENEPIO_0000002">
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/GENEPIO_0000001"/>
    <rdfs:label>term one</rdfs:label>
    <obo:IAO_0000115>first term</obo:IAO_0000115>
    <obo:GENEPIO_0000006>Term 1</obo:GENEPIO_0000006>
    <oboInOwl:hasExactSynonym>t1</oboInOwl:hasExactSynonym>
    <oboInOwl:hasExactSynonym>one</oboInOwl:hasExactSynonym>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/GENEPIO_0000003">
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/GENEPIO_0000002"/>
    <rdfs:label>term two</rdfs:label>
    <owl:deprecated rdf:datatype="http://www.w3.org/2001/XMLSchema#boolean">true</owl:deprecated>
    <obo:IAO_0100001 rdf:resource="http://purl.obolibrary.org/obo/GENEPIO_0000002"/>
  </owl:Class>
</rdf:RDF>
"#;

const IMPORTED: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
     xmlns:owl="http://www.w3.org/2002/07/owl#">
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/GENEPIO_0000004">
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/GENEPIO_0000002"/>
    <rdfs:label>imported term</rdfs:label>
  </owl:Class>
</rdf:RDF>
"#;

/// Writes the fixture ontology, and its import under `imports/`, into a
/// fresh temporary folder.
fn fixture_dir(name: &str) -> PathBuf {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ontofetch-{name}-{seed}"));
    fs::create_dir_all(dir.join("imports")).expect("fixture dir");
    fs::write(dir.join("genepio.owl"), PRIMARY).expect("primary");
    fs::write(dir.join("imports").join("fixture-import.owl"), IMPORTED).expect("import");
    dir
}

fn source(dir: &Path) -> OntologySource {
    OntologySource::parse(&dir.join("genepio.owl").to_string_lossy()).expect("source")
}

fn loaded_store(dir: &Path, follow: bool) -> GraphStore {
    let namespaces = NamespaceTable::default();
    let queries = QueryCatalog::new(&QueryTemplates::default(), &namespaces).expect("catalog");
    let store = GraphStore::new(queries).expect("store");
    let source = source(dir);
    store.load_primary(&source).expect("primary");
    let settings = ImportSettings {
        follow,
        ..ImportSettings::default()
    };
    store.load_includes(&source, &settings).expect("imports");
    store
}

fn obo(local: &str) -> Iri {
    Iri::new(format!("http://purl.obolibrary.org/obo/{local}")).expect("iri")
}

#[test]
fn hierarchy_query_walks_descendants() {
    let dir = fixture_dir("hierarchy");
    let store = loaded_store(&dir, false);

    let mut rows = store.hierarchy(&obo("GENEPIO_0000001")).expect("hierarchy");
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    let ids: Vec<_> = rows.iter().filter_map(|row| row.id.as_deref()).collect();
    assert_eq!(
        ids,
        vec![
            "http://purl.obolibrary.org/obo/GENEPIO_0000002",
            "http://purl.obolibrary.org/obo/GENEPIO_0000003"
        ]
    );
    let deprecated = &rows[1];
    assert_eq!(
        deprecated.parent_id.as_deref(),
        Some("http://purl.obolibrary.org/obo/GENEPIO_0000002")
    );
    assert_eq!(deprecated.label.as_deref(), Some("term two"));
    assert_eq!(deprecated.deprecated.as_deref(), Some("true"));
    assert_eq!(
        deprecated.replaced_by.as_deref(),
        Some("http://purl.obolibrary.org/obo/GENEPIO_0000002")
    );
}

#[test]
fn text_synonym_and_metadata_queries() {
    let dir = fixture_dir("annotations");
    let store = loaded_store(&dir, false);

    let text = store
        .text(&obo("GENEPIO_0000002"))
        .expect("text")
        .expect("text row");
    assert_eq!(text.label.as_deref(), Some("term one"));
    assert_eq!(text.definition.as_deref(), Some("first term"));
    assert_eq!(text.ui_label.as_deref(), Some("Term 1"));
    assert_eq!(text.ui_definition, None);

    let synonyms = store
        .synonyms(&obo("GENEPIO_0000002"))
        .expect("synonyms")
        .expect("synonym row");
    let mut exact: Vec<&str> = synonyms
        .get(SynonymCategory::ExactSynonym)
        .expect("exact synonyms")
        .split(';')
        .collect();
    exact.sort_unstable();
    assert_eq!(exact, vec!["one", "t1"]);
    assert_eq!(synonyms.get(SynonymCategory::BroadSynonym), None);

    let metadata = store.metadata().expect("metadata");
    assert_eq!(
        metadata.iri.as_deref(),
        Some("http://purl.obolibrary.org/obo/genepio.owl")
    );
    assert_eq!(metadata.title.as_deref(), Some("Fixture ontology"));
    assert_eq!(metadata.version_info.as_deref(), Some("2024-01-01"));
}

#[test]
fn failed_import_does_not_abort_loading() {
    let dir = fixture_dir("imports");
    let namespaces = NamespaceTable::default();
    let queries = QueryCatalog::new(&QueryTemplates::default(), &namespaces).expect("catalog");
    let store = GraphStore::new(queries).expect("store");
    let source = source(&dir);
    store.load_primary(&source).expect("primary");
    let before = store.triple_count().expect("triples");

    let loaded = store
        .load_includes(&source, &ImportSettings::default())
        .expect("imports");

    assert_eq!(loaded, 1);
    assert!(store.triple_count().expect("triples") > before);
    let ids: Vec<_> = store
        .hierarchy(&obo("GENEPIO_0000002"))
        .expect("hierarchy")
        .into_iter()
        .filter_map(|row| row.id)
        .collect();
    assert!(ids.contains(&"http://purl.obolibrary.org/obo/GENEPIO_0000004".to_owned()));
}

#[test]
fn missing_or_malformed_primary_is_fatal() {
    let dir = fixture_dir("fatal");

    let missing = OntologySource::parse(&dir.join("absent.owl").to_string_lossy());
    assert!(matches!(missing, Err(Error::FatalLoad { .. })));

    let broken = dir.join("broken.owl");
    fs::write(&broken, "<rdf:RDF this is not xml").expect("broken fixture");
    let namespaces = NamespaceTable::default();
    let queries = QueryCatalog::new(&QueryTemplates::default(), &namespaces).expect("catalog");
    let store = GraphStore::new(queries).expect("store");
    let result = store.load_primary(&OntologySource::Path(broken));
    assert!(matches!(result, Err(Error::FatalLoad { .. })));
}

#[test]
fn fetch_ontology_builds_the_full_table() {
    let dir = fixture_dir("fetch");
    let namespaces = NamespaceTable::default();
    let roots = parse_roots("GENEPIO:0000001", &namespaces).expect("roots");

    let report = fetch_ontology(&source(&dir), &Config::default(), &namespaces, &roots)
        .expect("report");

    assert_eq!(report.metadata.prefix.as_deref(), Some("GENEPIO"));
    assert!(report.metadata.source.is_some());

    let table = &report.table;
    assert_eq!(table.len(), 4);
    let term = table.get("GENEPIO:0000002").expect("term one");
    assert_eq!(term.parent_id.as_deref(), Some("GENEPIO:0000001"));
    assert_eq!(term.definition.as_deref(), Some("first term"));
    assert_eq!(term.synonyms(SynonymCategory::ExactSynonym).len(), 2);
    assert_eq!(term.ontology.as_deref(), Some("GENEPIO"));

    let deprecated = table.get("GENEPIO:0000003").expect("term two");
    assert_eq!(deprecated.deprecated, Some(true));
    assert_eq!(deprecated.replaced_by.as_deref(), Some("GENEPIO:0000002"));

    assert_eq!(
        table.get("GENEPIO:0000004").and_then(|term| term.label.as_deref()),
        Some("imported term")
    );

    let root = table.get("GENEPIO:0000001").expect("root stub");
    assert!(root.is_stub());
    assert_eq!(root.label.as_deref(), Some("root term"));
}

#[test]
fn cli_run_writes_both_artifacts() {
    let dir = fixture_dir("cli");
    let out = dir.join("out");
    let primary = dir.join("genepio.owl");
    let args = Cli::try_parse_from([
        "ontofetch",
        primary.to_str().expect("utf-8 path"),
        "-o",
        out.to_str().expect("utf-8 path"),
        "-r",
        "GENEPIO:0000001",
    ])
    .expect("args");

    let artifacts = cli::run(&args).expect("run");

    assert_eq!(artifacts.json, out.join("genepio.json"));
    let tsv = fs::read_to_string(&artifacts.tsv).expect("tsv");
    assert!(tsv.starts_with("id\tparent_id\tontology\t"));
    assert_eq!(tsv.lines().count(), 5);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&artifacts.json).expect("json")).expect("parse");
    assert_eq!(
        json["specifications"]["GENEPIO:0000002"]["label"],
        "term one"
    );
}
