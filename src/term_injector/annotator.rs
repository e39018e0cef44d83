// WHY: drives the scan/rewrite loop over one buffer
// Each step either wraps a candidate, or steps past it, so the cursor only moves forward

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::folding::fold;
use super::index::TermIndex;
use super::locator::{HeuristicLocator, Occurrence, OccurrenceLocator};
use super::Term;

/// Rendering and de-duplication options for annotation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AnnotateOptions {
    /// Element name of the inserted tooltip wrapper
    pub tag: String,
    /// Body used when a term has no content
    pub missing_content: String,
    /// Treat tooltips already in the input as annotated and protected.
    /// Off by default: the plain scan knows only links, anchors and headings
    pub respect_existing: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            tag: "tooltip".to_string(),
            missing_content: "missing content".to_string(),
            respect_existing: false,
        }
    }
}

/// One inserted tooltip
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// Byte offset of the inserted element in the output text
    pub position: usize,
    pub matched_text: String,
    /// Canonical term that owns the matched key
    pub term: String,
}

/// Result of annotating one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated {
    pub text: String,
    pub injections: Vec<Injection>,
    /// Candidates stepped over because they were in a protected zone
    pub skipped_excluded: usize,
    /// Candidates stepped over because their surface text was already wrapped
    pub skipped_duplicate: usize,
}

/// Per-invocation scan state, discarded once the buffer is returned
struct ScanState {
    buffer: String,
    cursor: usize,
    annotated: HashSet<String>,
}

/// Wraps the first unprotected mention of each glossary term
pub struct Annotator<L = HeuristicLocator> {
    index: TermIndex,
    locator: L,
    options: AnnotateOptions,
}

impl Annotator<HeuristicLocator> {
    pub fn new(terms: &[Term]) -> Self {
        Self::with_options(terms, AnnotateOptions::default())
    }

    pub fn with_options(terms: &[Term], options: AnnotateOptions) -> Self {
        let index = TermIndex::build(terms);
        let mut locator = HeuristicLocator::new(&index);
        if options.respect_existing {
            locator = locator.with_wrapper_tag(&options.tag);
        }
        Self {
            index,
            locator,
            options,
        }
    }
}

impl<L: OccurrenceLocator> Annotator<L> {
    /// Annotator with a custom candidate locator
    pub fn with_locator(index: TermIndex, locator: L, options: AnnotateOptions) -> Self {
        Self {
            index,
            locator,
            options,
        }
    }

    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    pub fn options(&self) -> &AnnotateOptions {
        &self.options
    }

    /// Annotate a document, returning the new text and what was inserted
    pub fn annotate(&self, text: &str) -> Annotated {
        let mut state = ScanState {
            buffer: text.to_string(),
            cursor: 0,
            annotated: HashSet::new(),
        };
        if self.options.respect_existing {
            state.annotated = existing_titles(text, &self.options.tag);
        }

        let mut result = Annotated {
            text: String::new(),
            injections: Vec::new(),
            skipped_excluded: 0,
            skipped_duplicate: 0,
        };

        while let Some(occurrence) = self.locator.locate(&state.buffer, state.cursor) {
            let surface = fold(&occurrence.matched_text);

            if occurrence.is_excluded() {
                result.skipped_excluded += 1;
                state.cursor = occurrence.end();
            } else if state.annotated.contains(&surface) {
                trace!("Already annotated {:?}, skipping", occurrence.matched_text);
                result.skipped_duplicate += 1;
                state.cursor = occurrence.end();
            } else {
                let injection = self.inject(&mut state, &occurrence);
                state.annotated.insert(surface);
                result.injections.push(injection);
            }
        }

        debug!(
            "Annotation finished: {} injected, {} excluded, {} duplicates",
            result.injections.len(),
            result.skipped_excluded,
            result.skipped_duplicate
        );
        result.text = state.buffer;
        result
    }

    /// Splice the tooltip over the match and move the cursor past the inserted markup
    fn inject(&self, state: &mut ScanState, occurrence: &Occurrence) -> Injection {
        let term = self
            .index
            .get(&occurrence.key)
            .or_else(|| self.index.lookup(&occurrence.matched_text));
        let content = term
            .and_then(|t| t.content.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(self.options.missing_content.as_str());

        let markup = format!(
            "<{tag} title=\"{title}\">{content}</{tag}>",
            tag = self.options.tag,
            title = occurrence.matched_text,
        );

        state
            .buffer
            .replace_range(occurrence.position..occurrence.end(), &markup);
        state.cursor = occurrence.position + markup.len();

        debug!(
            "Injected tooltip for {:?} at {}",
            occurrence.matched_text, occurrence.position
        );
        Injection {
            position: occurrence.position,
            matched_text: occurrence.matched_text.clone(),
            term: term.map(|t| t.term.clone()).unwrap_or_default(),
        }
    }
}

/// Lowercased titles of tooltip elements already present in `text`
fn existing_titles(text: &str, tag: &str) -> HashSet<String> {
    let folded = fold(text);
    let opening = format!("<{} title=\"", fold(tag));

    let mut titles = HashSet::new();
    let mut from = 0;
    while let Some(found) = folded[from..].find(&opening) {
        let title_start = from + found + opening.len();
        let Some(title_len) = folded[title_start..].find('"') else {
            break;
        };
        titles.insert(folded[title_start..title_start + title_len].to_string());
        from = title_start + title_len;
    }
    titles
}

/// Annotate `text` against `terms` with default options
pub fn inject_terms(text: &str, terms: &[Term]) -> String {
    Annotator::new(terms).annotate(text).text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> Term {
        Term::new("Layer", "A map layer")
    }

    #[test]
    fn test_first_occurrence_only() {
        let out = inject_terms("Layer is a Layer", &[layer()]);
        assert_eq!(out, "<tooltip title=\"Layer\">A map layer</tooltip> is a Layer");
    }

    #[test]
    fn test_case_preserved_in_title() {
        let out = inject_terms("the LAYER here", &[Term::new("layer", "desc")]);
        assert_eq!(out, "the <tooltip title=\"LAYER\">desc</tooltip> here");
    }

    #[test]
    fn test_missing_content_placeholder() {
        let out = inject_terms("a Layer", &[Term::without_content("Layer")]);
        assert_eq!(out, "a <tooltip title=\"Layer\">missing content</tooltip>");
    }

    #[test]
    fn test_empty_content_uses_placeholder() {
        let out = inject_terms("a Layer", &[Term::new("Layer", "")]);
        assert_eq!(out, "a <tooltip title=\"Layer\">missing content</tooltip>");
    }

    #[test]
    fn test_custom_tag_and_placeholder() {
        let options = AnnotateOptions {
            tag: "terriatooltip".to_string(),
            missing_content: "n/a".to_string(),
            respect_existing: true,
        };
        let annotator = Annotator::with_options(&[Term::without_content("Layer")], options);
        let out = annotator.annotate("Layer").text;
        assert_eq!(out, "<terriatooltip title=\"Layer\">n/a</terriatooltip>");
    }

    #[test]
    fn test_each_term_annotated_once() {
        let terms = [layer(), Term::new("Map", "A map")];
        let result = Annotator::new(&terms).annotate("Map and Layer. Another Map, another layer.");

        assert_eq!(result.injections.len(), 2);
        assert_eq!(result.skipped_duplicate, 2);
        assert_eq!(result.injections[0].term, "Map");
        assert_eq!(result.injections[0].position, 0);
        assert_eq!(result.injections[1].term, "Layer");
        assert!(result.text.ends_with("Another Map, another layer."));
    }

    #[test]
    fn test_excluded_occurrence_does_not_consume_term() {
        let text = "# Layer\nThe Layer body";
        let result = Annotator::new(&[layer()]).annotate(text);

        assert_eq!(result.skipped_excluded, 1);
        assert_eq!(
            result.text,
            "# Layer\nThe <tooltip title=\"Layer\">A map layer</tooltip> body"
        );
    }

    #[test]
    fn test_same_surface_via_different_term_is_skipped() {
        // Both entries own "tier"; the second mention is skipped regardless of owner
        let terms = [
            Term::new("Tier", "first"),
            Term::new("Level", "second").with_aliases(["tier"]),
        ];
        let result = Annotator::new(&terms).annotate("tier then TIER");
        assert_eq!(result.injections.len(), 1);
        assert_eq!(result.injections[0].term, "Level");
        assert_eq!(result.skipped_duplicate, 1);
    }

    #[test]
    fn test_injection_positions_are_in_output_coordinates() {
        let terms = [Term::new("alpha", "A"), Term::new("beta", "B")];
        let result = Annotator::new(&terms).annotate("alpha beta");

        for injection in &result.injections {
            assert!(result.text[injection.position..].starts_with("<tooltip"));
        }
    }

    #[test]
    fn test_input_without_terms_is_unchanged() {
        let text = "Nothing to see here.";
        let result = Annotator::new(&[layer()]).annotate(text);
        assert_eq!(result.text, text);
        assert!(result.injections.is_empty());
    }

    #[test]
    fn test_existing_titles_are_collected() {
        let titles = existing_titles(
            "<Tooltip title=\"Layer\">x</Tooltip> and <tooltip title=\"Map\">y</tooltip>",
            "tooltip",
        );
        assert_eq!(titles.len(), 2);
        assert!(titles.contains("layer"));
        assert!(titles.contains("map"));
    }

    #[test]
    fn test_stray_closing_tag_does_not_protect_by_default() {
        let out = inject_terms("Layer then </tooltip>", &[Term::new("Layer", "d")]);
        assert_eq!(out, "<tooltip title=\"Layer\">d</tooltip> then </tooltip>");
    }

    #[test]
    fn test_existing_tooltips_are_plain_text_by_default() {
        let out = inject_terms(
            "<tooltip title=\"Layer\">x</tooltip> and a Layer",
            &[Term::new("Layer", "d")],
        );
        assert_eq!(
            out,
            "<tooltip title=\"<tooltip title=\"Layer\">d</tooltip>\">x</tooltip> and a Layer"
        );
    }

    #[test]
    fn test_reannotation_is_stable_when_respecting_existing() {
        let terms = [layer(), Term::new("Map", "A map")];
        let options = AnnotateOptions {
            respect_existing: true,
            ..AnnotateOptions::default()
        };
        let annotator = Annotator::with_options(&terms, options);

        let once = annotator.annotate("Layer on a Map. Layer again, Map again.").text;
        let twice = annotator.annotate(&once).text;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reannotation_rewraps_titles_by_default() {
        let annotator = Annotator::new(&[layer()]);

        let once = annotator.annotate("Layer").text;
        let twice = annotator.annotate(&once).text;
        assert_ne!(once, twice);
    }
}
