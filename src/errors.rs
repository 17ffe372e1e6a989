//! # Application Error Handling

use crate::ontology::value_objects::IriError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The primary ontology document could not be fetched or parsed.
    #[error("{location} could not be loaded: {reason}")]
    FatalLoad { location: String, reason: String },

    /// An identifier used a prefix or namespace missing from the namespace
    /// table. The table is closed-world, so this is a configuration error.
    #[error("no registered namespace for `{0}`")]
    UnknownNamespace(String),

    #[error(transparent)]
    InvalidIri(#[from] IriError),

    #[error("query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Template(#[from] tera::Error),

    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn fatal_load(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::FatalLoad {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn query(err: impl ToString) -> Self {
        Self::Query(err.to_string())
    }
}
