use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use oxigraph::io::RdfFormat;

use super::value_objects::Iri;
use crate::{Error, Result};

/// Where an ontology document is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OntologySource {
    Path(PathBuf),
    Url(Iri),
}

impl OntologySource {
    /// `http(s)://` text is a URL, `file://` and anything else a local path.
    ///
    /// # Errors
    /// When a URL is not a valid IRI or a local path does not exist.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.starts_with("http://") || text.starts_with("https://") {
            return Ok(Self::Url(Iri::new(text)?));
        }
        let path = PathBuf::from(text.strip_prefix("file://").unwrap_or(text));
        if !path.is_file() {
            return Err(Error::fatal_load(text, "no such file"));
        }
        Ok(Self::Path(path))
    }

    /// Source for an `owl:imports` target.
    ///
    /// A file carrying the import's last path segment in one of `search_dirs`
    /// is preferred over fetching the IRI itself.
    #[must_use]
    pub fn for_import(import: &Iri, search_dirs: &[PathBuf]) -> Self {
        let file_name = last_segment(import.as_str());
        if let Some(file_name) = file_name {
            for dir in search_dirs {
                let candidate = dir.join(file_name);
                if candidate.is_file() {
                    return Self::Path(candidate);
                }
            }
        }
        if let Some(path) = import.as_str().strip_prefix("file://") {
            return Self::Path(PathBuf::from(path));
        }
        Self::Url(import.clone())
    }

    /// Reads the whole document.
    ///
    /// # Errors
    /// On I/O failure, HTTP failure or a non-success HTTP status.
    pub fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            Self::Path(path) => Ok(fs::read(path)?),
            Self::Url(url) => {
                let response = reqwest::blocking::get(url.as_str())?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            }
        }
    }

    /// RDF syntax guessed from the file extension, RDF/XML when unknown.
    #[must_use]
    pub fn format(&self) -> RdfFormat {
        let name = match self {
            Self::Path(path) => path.to_string_lossy().into_owned(),
            Self::Url(url) => url.as_str().to_owned(),
        };
        Path::new(&name)
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| RdfFormat::from_extension(&extension.to_ascii_lowercase()))
            .unwrap_or(RdfFormat::RdfXml)
    }

    /// Base IRI for resolving relative references, only known for URLs.
    #[must_use]
    pub fn base_iri(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Url(url) => Some(url.as_str()),
        }
    }

    /// Directory holding a local document.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => path.parent(),
            Self::Url(_) => None,
        }
    }

    /// File name without extension, used to name output files.
    ///
    /// `../genepio/src/ontology/genepio-merged.owl` gives `genepio-merged`.
    #[must_use]
    pub fn basename(&self) -> String {
        let name = match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Self::Url(url) => last_segment(url.as_str()).map(str::to_owned),
        };
        let name = name.unwrap_or_else(|| "ontology".to_owned());
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
            _ => name,
        }
    }
}

impl fmt::Display for OntologySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

fn last_segment(iri: &str) -> Option<&str> {
    let path = iri.split(['?', '#']).next().unwrap_or(iri);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
