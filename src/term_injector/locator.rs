// WHY: finds the next candidate mention and classifies whether it sits in a protected zone
// Protected zones are detected by forward/backward delimiter search only; no markup parsing

use aho_corasick::{AhoCorasick, Input, MatchKind};
use tracing::{debug, warn};

use super::folding::{fold, FoldedText};
use super::index::TermIndex;

/// Which protected zones a candidate was found in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exclusion {
    /// Inside `[...]` of a markdown link
    pub link_label: bool,
    /// Inside `(...)` of a markdown link
    pub link_target: bool,
    /// Inside an `<a ...>...</a>` element
    pub anchor: bool,
    /// On a line starting with `#`
    pub heading: bool,
    /// Inside a tooltip element already present in the text
    pub tooltip: bool,
}

impl Exclusion {
    pub fn is_excluded(&self) -> bool {
        self.link_label || self.link_target || self.anchor || self.heading || self.tooltip
    }
}

/// Winning candidate for one scan step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Byte offset of the match in the scanned text
    pub position: usize,
    /// Matched slice with its original casing
    pub matched_text: String,
    /// Index key that produced the match
    pub key: String,
    pub exclusion: Exclusion,
}

impl Occurrence {
    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_excluded()
    }

    /// Byte offset just past the original match
    pub fn end(&self) -> usize {
        self.position + self.matched_text.len()
    }
}

/// Finds the next candidate mention at or after a byte offset
pub trait OccurrenceLocator {
    fn locate(&self, text: &str, from: usize) -> Option<Occurrence>;
}

enum KeyMatcher {
    /// Leftmost-longest automaton over all keys
    Automaton(AhoCorasick),
    /// One substring search per key
    Linear,
}

/// Delimiter-heuristic locator over a term index
pub struct HeuristicLocator {
    keys: Vec<String>,
    matcher: KeyMatcher,
    /// Opening and closing markers of the tooltip element, lowercased
    wrapper: Option<(String, String)>,
}

impl HeuristicLocator {
    pub fn new(index: &TermIndex) -> Self {
        let keys = index.keys().to_vec();
        // WHY: leftmost-longest gives exactly "smallest start wins, longest key on ties"
        let matcher = match AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&keys)
        {
            Ok(automaton) => KeyMatcher::Automaton(automaton),
            Err(e) => {
                warn!("Falling back to per-key search, automaton build failed: {}", e);
                KeyMatcher::Linear
            }
        };

        Self {
            keys,
            matcher,
            wrapper: None,
        }
    }

    /// Locator that searches each key separately
    pub fn linear(index: &TermIndex) -> Self {
        Self {
            keys: index.keys().to_vec(),
            matcher: KeyMatcher::Linear,
            wrapper: None,
        }
    }

    /// Also treat the inside of existing `<tag ...>...</tag>` elements as protected
    pub fn with_wrapper_tag(mut self, tag: &str) -> Self {
        let tag = fold(tag);
        self.wrapper = Some((format!("<{tag} "), format!("</{tag}>")));
        self
    }

    /// Earliest key match in `folded` at or after `from`: (start, end)
    fn find_key(&self, folded: &str, from: usize) -> Option<(usize, usize)> {
        match &self.matcher {
            KeyMatcher::Automaton(automaton) => automaton
                .find(Input::new(folded).range(from..))
                .map(|m| (m.start(), m.end())),
            KeyMatcher::Linear => {
                let rest = &folded[from..];
                let mut best: Option<(usize, usize)> = None;
                for key in &self.keys {
                    let Some(found) = rest.find(key.as_str()) else {
                        continue;
                    };
                    let start = from + found;
                    let replaces = match best {
                        None => true,
                        Some((best_start, best_end)) => {
                            start < best_start
                                || (start <= best_start && key.len() > best_end - best_start)
                        }
                    };
                    if replaces {
                        best = Some((start, start + key.len()));
                    }
                }
                best
            }
        }
    }

    fn classify(&self, folded: &str, start: usize) -> Exclusion {
        let rest = &folded[start..];
        let tooltip = self
            .wrapper
            .as_ref()
            .is_some_and(|(open, close)| closes_before_reopening(rest, open, close));

        Exclusion {
            link_label: closes_before_reopening(rest, "[", "]"),
            link_target: closes_before_reopening(rest, "(", ")"),
            anchor: closes_before_reopening(rest, "<a ", "</a>"),
            heading: on_heading_line(folded, start),
            tooltip,
        }
    }
}

impl OccurrenceLocator for HeuristicLocator {
    fn locate(&self, text: &str, from: usize) -> Option<Occurrence> {
        if self.keys.is_empty() || from >= text.len() {
            return None;
        }

        let view = FoldedText::new(text);
        let folded = view.as_str();
        let (start, end) = self.find_key(folded, view.folded_offset(from))?;

        let span = view.original_span(text, start..end);
        let exclusion = self.classify(folded, start);
        let occurrence = Occurrence {
            position: span.start,
            matched_text: text[span].to_string(),
            key: folded[start..end].to_string(),
            exclusion,
        };

        if exclusion.is_excluded() {
            debug!(
                "Candidate {:?} at {} is in a protected zone: {:?}",
                occurrence.matched_text, occurrence.position, exclusion
            );
        }
        Some(occurrence)
    }
}

/// True when a closing marker follows with no opening marker before it,
/// i.e. the position is inside a span that was opened earlier
fn closes_before_reopening(rest: &str, open: &str, close: &str) -> bool {
    match rest.find(close) {
        None => false,
        Some(closing) => match rest.find(open) {
            Some(opening) => opening >= closing,
            None => true,
        },
    }
}

/// True when the line containing `position` starts with `#`
fn on_heading_line(text: &str, position: usize) -> bool {
    match text[..position].rfind('\n') {
        Some(newline) => text.as_bytes().get(newline + 1) == Some(&b'#'),
        // First line of the document
        None => text.starts_with('#'),
    }
}
