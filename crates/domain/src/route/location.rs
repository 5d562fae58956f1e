//! Parsed navigation target (`path?query#hash`)

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::{DomainError, DomainResult};

/// A navigation target inside the application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Absolute path, always starting with `/`.
    pub path: String,
    /// Decoded query pairs in their original order.
    pub query: Vec<(String, String)>,
    /// Fragment without the leading `#`.
    pub hash: Option<String>,
}

impl Location {
    /// A location with no query or fragment.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Appends a query pair.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Value of `key` when it appears exactly once.
    ///
    /// A repeated key is a list, not a string, and yields `None`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        let mut values = self.query.iter().filter(|(k, _)| k == key);
        match (values.next(), values.next()) {
            (Some((_, v)), None) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Path plus encoded query and fragment.
    #[must_use]
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            out.push('?');
            out.push_str(&encoded);
        }
        if let Some(hash) = &self.hash {
            out.push('#');
            out.push_str(hash);
        }
        out
    }
}

impl FromStr for Location {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::new("/"));
        }
        if !is_in_app_path(s) {
            return Err(DomainError::InvalidLocation(s.to_string()));
        }

        let (rest, hash) = match s.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_string())),
            None => (s, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        Ok(Self {
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            hash,
        })
    }
}

/// Starts with one `/` and cannot be read as protocol-relative.
///
/// Browsers read `\` as `/` and drop tabs and newlines from URLs, so
/// `/\host` and `/<tab>/host` lead off-site just like `//host`.
fn is_in_app_path(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !s.chars().any(char::is_control)
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}
