//! Query-term expansion.
//!
//! A term such as `"Auckland"` may need to match several raw selector
//! spellings (`"Auckland"`, `"Waitemata"`, ...). Aliases come from an optional
//! JSON table:
//!
//! ```json
//! { "Auckland": ["Waitemata", "Counties Manukau"] }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Case-insensitive table of term → selector aliases.
#[derive(Debug, Clone, Default)]
pub struct TermMapping {
    aliases: HashMap<String, Vec<String>>,
}

impl TermMapping {
    /// Build from any iterator of (term, aliases); keys are folded to lowercase
    /// and aliases of keys that collide after folding are merged.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
        for (term, values) in entries {
            aliases
                .entry(term.as_ref().to_lowercase())
                .or_default()
                .extend(values.into_iter().map(Into::into));
        }
        Self { aliases }
    }

    /// Parse a mapping from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::new(raw))
    }

    /// Load a mapping file; any read or parse failure is returned
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_json(&content).map_err(|error| ConfigError::Json {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Aliases for `term`, empty if unmapped
    pub fn aliases(&self, term: &str) -> &[String] {
        self.aliases
            .get(&term.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Selectors treated as matching a query term.
#[derive(Debug, Clone)]
pub struct TermSet {
    term: String,
    selectors: HashSet<String>,
}

impl TermSet {
    /// A set holding only `term`
    pub fn new(term: &str) -> Self {
        let mut selectors = HashSet::new();
        selectors.insert(term.to_lowercase());
        Self {
            term: term.to_string(),
            selectors,
        }
    }

    /// `term` plus its aliases from `mapping`
    pub fn with_mapping(term: &str, mapping: &TermMapping) -> Self {
        let mut set = Self::new(term);
        set.selectors
            .extend(mapping.aliases(term).iter().map(|a| a.to_lowercase()));
        set
    }

    /// Resolve `term` against an optional mapping file
    pub fn resolve(term: &str, mapping_path: Option<&Path>) -> ConfigResult<Self> {
        match mapping_path {
            Some(path) => Ok(Self::with_mapping(term, &TermMapping::load(path)?)),
            None => Ok(Self::new(term)),
        }
    }

    /// The query term as given
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether `selector` matches the term or one of its aliases
    pub fn contains(&self, selector: &str) -> bool {
        self.selectors.contains(&selector.to_lowercase())
    }

    /// Whether `selector` is the term itself, not an alias
    pub fn is_exact(&self, selector: &str) -> bool {
        self.term.to_lowercase() == selector.to_lowercase()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Matching selectors, lowercased and sorted
    pub fn selectors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.selectors.iter().map(String::as_str).collect();
        out.sort_unstable();
        out
    }
}
