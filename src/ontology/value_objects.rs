use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use thiserror::Error;

/// Value object ensuring that supplied text represents a valid IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    ///
    /// The constructor rejects malformed identifiers, so an [`Iri`] can be
    /// spliced between angle brackets into a SPARQL query as is.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the IRI in SPARQL/Turtle `<...>` form.
    #[must_use]
    pub fn to_sparql(&self) -> String {
        format!("<{}>", self.value)
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NamedNode> for Iri {
    fn from(node: NamedNode) -> Self {
        Self {
            value: node.into_string(),
        }
    }
}

/// A `PREFIX:local` identifier such as `GENEPIO:0001677`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompactId {
    prefix: String,
    local: String,
}

impl CompactId {
    /// Splits `text` on its first `:`.
    ///
    /// The prefix must be non-empty and must not contain `/`, which rules out
    /// absolute IRIs such as `http://...`.
    pub fn parse(text: &str) -> Result<Self, IriError> {
        match text.split_once(':') {
            Some((prefix, local))
                if !prefix.is_empty() && !prefix.contains('/') && !local.starts_with("//") =>
            {
                Ok(Self {
                    prefix: prefix.to_owned(),
                    local: local.to_owned(),
                })
            }
            _ => Err(IriError::NotCompact {
                value: text.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }
}

impl Display for CompactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// Errors produced when validating an [`Iri`] or a [`CompactId`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
    /// The provided text is not of the `PREFIX:local` shape.
    #[error("not a compact identifier: {value}")]
    NotCompact { value: String },
}
