//! Internet media type parsing (RFC 2046 / RFC 6838 structure).
//!
//! `application/vnd.api+json; charset=utf-8` parses into type `application`, subtype
//! `vnd.api+json`, tree `vnd.api` and suffix `json`. Parameters are ignored and every part is
//! lowercased.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaTypeError {
    #[error("Malformed media type \"{0}\"")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
}

impl MediaType {
    pub fn parse(raw: &str) -> Result<Self, MediaTypeError> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        let malformed = || MediaTypeError::Malformed(raw.to_string());

        let (kind, subtype) = essence.split_once('/').ok_or_else(malformed)?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        let valid = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace) && !part.contains('/');
        if !valid(kind) || !valid(subtype) {
            return Err(malformed());
        }

        Ok(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
        })
    }

    /// The top-level type, e.g. `application`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The full subtype including any suffix, e.g. `vnd.api+json`.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The subtype without its structured syntax suffix, e.g. `vnd.api`.
    pub fn tree(&self) -> &str {
        self.subtype.split_once('+').map_or(self.subtype.as_str(), |(tree, _)| tree)
    }

    /// The structured syntax suffix, e.g. `json` in `vnd.api+json`.
    pub fn suffix(&self) -> Option<&str> {
        self.subtype.split_once('+').map(|(_, suffix)| suffix)
    }

    pub fn is_json(&self) -> bool {
        self.subtype == "json" || self.suffix() == Some("json")
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}
