// Test fixtures with known help documents and expected outputs
// WHY: Golden-file testing requires deterministic input/output pairs for validation

#![allow(dead_code)]

/// Glossary used by the golden documents
pub const GLOSSARY_JSON: &str = r#"[
  {"term": "Layer", "aliases": ["tier"], "content": "A map layer"},
  {"term": "Map", "content": "A map"},
  {"term": "Map Server", "content": "Serves maps"}
]"#;

/// Help document exercising every protected zone
pub const GUIDE_TEXT: &str = r#"# Layer Settings
Each Layer on the Map can be styled. See [Layer docs](http://example.com/layer) for details.
A Map Server publishes layers, and the map server caches tiles.
<a href="http://example.com">Map Server guide</a> explains more about a tier.
## Map Server
Tiers group layers; a Layer is never re-annotated.
"#;

/// Expected annotation of GUIDE_TEXT with GLOSSARY_JSON
/// WHY: headings, link labels, link targets and anchors stay untouched;
/// each surface form is wrapped once
pub const GUIDE_EXPECTED: &str = r#"# Layer Settings
Each <tooltip title="Layer">A map layer</tooltip> on the <tooltip title="Map">A map</tooltip> can be styled. See [Layer docs](http://example.com/layer) for details.
A <tooltip title="Map Server">Serves maps</tooltip> publishes layers, and the map server caches tiles.
<a href="http://example.com">Map Server guide</a> explains more about a <tooltip title="tier">A map layer</tooltip>.
## Map Server
Tiers group layers; a Layer is never re-annotated.
"#;

/// Document with no glossary terms
pub const PLAIN_TEXT: &str = "Nothing in this file matches the glossary.\n";
