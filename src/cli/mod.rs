//! Command line front end.
//!
//! ```sh
//! # local file, outputs next to the working directory
//! ontofetch ../genepio/src/ontology/genepio-merged.owl
//!
//! # OBI "data visualization" and IAO "documenting" branches into test/
//! ontofetch https://raw.githubusercontent.com/obi-ontology/obi/master/obi.owl \
//!     -o test/ -r OBI:0200111,IAO:0000572
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use colored::Colorize;

use crate::config::{Config, DEFAULT_ROOT};
use crate::ontology::{fetch_ontology, parse_roots, NamespaceTable, OntologySource};
use crate::output::{write_artifacts, Artifacts};
use crate::{logger, Result};

#[derive(Parser, Debug)]
#[command(name = "ontofetch")]
#[command(version, disable_version_flag = true)]
#[command(about = "Ontology term fetch to tabular and JSON output", long_about = None)]
pub struct Cli {
    /// Ontology file path or URL
    pub source: String,

    /// Folder receiving <name>.json and <name>.tsv
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Comma separated root term IRIs or compact ids to fetch underlying terms from
    #[arg(short, long, default_value = DEFAULT_ROOT)]
    pub root: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long = "version", visible_short_alias = 'V', action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// Parses the process arguments, runs, and maps the outcome to an exit code.
#[must_use]
pub fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(report(&run(&cli)))
}

/// Prints the written paths or the diagnostic. Returns `1` on any error.
fn report(outcome: &Result<Artifacts>) -> u8 {
    match outcome {
        Ok(artifacts) => {
            println!("{}", artifacts.json.display());
            println!("{}", artifacts.tsv.display());
            0
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            1
        }
    }
}

/// Runs one fetch as described by `cli`.
///
/// # Errors
/// Any configuration, load, query or output error.
pub fn run(cli: &Cli) -> Result<Artifacts> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Err(err) = logger::init(&config.logger) {
        eprintln!("{} {err}", "warning:".yellow());
    }

    let namespaces = NamespaceTable::with_overrides(&config.prefixes)?;
    let roots = parse_roots(&cli.root, &namespaces)?;
    let source = OntologySource::parse(&cli.source)?;

    let fetched = fetch_ontology(&source, &config, &namespaces, &roots)?;
    write_artifacts(&fetched, &config.output, &cli.output, &source.basename())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use clap::error::ErrorKind;
    use clap::Parser;
    use rstest::rstest;

    use super::{report, Cli};
    use crate::config::DEFAULT_ROOT;
    use crate::output::Artifacts;
    use crate::Error;

    #[test]
    fn defaults_to_owl_thing_and_current_folder() {
        let cli = Cli::try_parse_from(["ontofetch", "genepio.owl"]).expect("parse");
        assert_eq!(cli.source, "genepio.owl");
        assert_eq!(cli.root, DEFAULT_ROOT);
        assert_eq!(cli.output, PathBuf::from("."));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn accepts_short_options() {
        let cli = Cli::try_parse_from([
            "ontofetch",
            "obi.owl",
            "-o",
            "test/",
            "-r",
            "OBI:0200111,IAO:0000572",
            "-c",
            "ontofetch.yaml",
        ])
        .expect("parse");
        assert_eq!(cli.output, PathBuf::from("test/"));
        assert_eq!(cli.root, "OBI:0200111,IAO:0000572");
        assert_eq!(cli.config, Some(PathBuf::from("ontofetch.yaml")));
    }

    #[rstest]
    #[case("-v")]
    #[case("-V")]
    #[case("--version")]
    fn version_flag_short_circuits(#[case] flag: &str) {
        let err = Cli::try_parse_from(["ontofetch", flag]).expect_err("version");
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn errors_map_to_exit_code_one() {
        let failed = Err(Error::fatal_load("missing.owl", "no such file"));
        assert_eq!(report(&failed), 1);

        let written = Ok(Artifacts::new(Path::new("out"), "genepio"));
        assert_eq!(report(&written), 0);
    }

    #[test]
    fn source_is_required() {
        let err = Cli::try_parse_from(["ontofetch"]).expect_err("missing source");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
