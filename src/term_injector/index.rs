// WHY: single lookup table from every lowercased surface form (term or alias) to its owner
// Built once per dictionary and shared read-only across scans

use std::collections::HashMap;
use tracing::{debug, warn};

use super::folding::fold;
use super::Term;

/// Lowercased key -> owning term
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    terms: Vec<Term>,
    /// Position in `terms` of the current owner of each key
    owners: HashMap<String, usize>,
    /// Keys in first-insertion order, for deterministic automaton construction
    keys: Vec<String>,
}

impl TermIndex {
    /// Index canonical forms first (dictionary order), then aliases (dictionary order,
    /// alias order within a term). Colliding keys are overwritten: last write wins.
    pub fn build(terms: &[Term]) -> Self {
        let mut index = Self {
            terms: terms.to_vec(),
            owners: HashMap::with_capacity(terms.len()),
            keys: Vec::with_capacity(terms.len()),
        };

        for (owner, term) in terms.iter().enumerate() {
            index.insert(&term.term, owner);
        }
        for (owner, term) in terms.iter().enumerate() {
            for alias in &term.aliases {
                index.insert(alias, owner);
            }
        }

        debug!(
            "Built term index: {} terms, {} distinct keys",
            index.terms.len(),
            index.keys.len()
        );
        index
    }

    fn insert(&mut self, surface: &str, owner: usize) {
        let key = fold(surface);
        // An empty key matches at every offset and can never advance the cursor
        if key.is_empty() {
            warn!("Ignoring empty glossary key for term {:?}", self.terms[owner].term);
            return;
        }
        if let Some(previous) = self.owners.insert(key.clone(), owner) {
            if previous != owner {
                debug!(
                    "Glossary key {:?} reassigned from {:?} to {:?}",
                    key, self.terms[previous].term, self.terms[owner].term
                );
            }
        } else {
            self.keys.push(key);
        }
    }

    /// Owning term for a lowercased key
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.owners.get(key).map(|&owner| &self.terms[owner])
    }

    /// Owning term for any surface form, folding it first
    pub fn lookup(&self, surface: &str) -> Option<&Term> {
        self.get(&fold(surface))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
