// WHY: Glossary term injection engine
// Wraps the first unprotected mention of each dictionary term in a tooltip element

pub mod annotator;
pub mod folding;
pub mod index;
pub mod locator;

use serde::{Deserialize, Serialize};

pub use annotator::{inject_terms, Annotated, AnnotateOptions, Annotator, Injection};
pub use index::TermIndex;
pub use locator::{Exclusion, HeuristicLocator, Occurrence, OccurrenceLocator};

/// A glossary entry: canonical surface form, optional aliases and tooltip body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    pub term: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Term {
    pub fn new(term: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            aliases: Vec::new(),
            content: Some(content.into()),
        }
    }

    /// Builder-style alias registration
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Term without tooltip content (renders the placeholder)
    pub fn without_content(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            aliases: Vec::new(),
            content: None,
        }
    }
}
