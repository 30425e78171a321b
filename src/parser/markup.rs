//! Reduced class-hierarchy markup loader
//!
//! An alternate producer for the [`crate::Ontology`]: class declarations
//! carrying a human-readable label become terms, direct subclass axioms
//! between two labeled classes become is-a edges. Everything else in the
//! markup (general axioms, annotations, restrictions) is skipped.
//!
//! The accepted subset is line-oriented:
//!
//! ```text
//! <owl:Class rdf:about="http://purl.obolibrary.org/obo/HP_0000001">
//!     <rdfs:label>All</rdfs:label>
//!     <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/HP_0000118"/>
//! </owl:Class>
//! ```
use tracing::trace;

use crate::term::{Term, TermId};

/// Maps class IRIs to compact identifiers
///
/// Contraction first consults the explicit `(prefix, IRI prefix)`
/// entries, then falls back to the conventional form where the last IRI
/// segment is `PREFIX_code`. The map is passed explicitly to the loader;
/// there is no process-wide prefix registry.
///
/// # Examples
///
/// ```
/// use ontograph::CurieMap;
///
/// let mut curies = CurieMap::new();
/// curies.insert("HP", "http://purl.obolibrary.org/obo/HP_");
///
/// let id = curies
///     .contract("http://purl.obolibrary.org/obo/HP_0000118")
///     .unwrap();
/// assert_eq!(id.as_str(), "HP:0000118");
///
/// // the universal top class has no compact form
/// assert!(curies.contract("http://www.w3.org/2002/07/owl#Thing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurieMap {
    entries: Vec<(String, String)>,
}

impl CurieMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an explicit IRI prefix for a compact prefix
    pub fn insert(&mut self, prefix: impl Into<String>, iri_prefix: impl Into<String>) {
        self.entries.push((prefix.into(), iri_prefix.into()));
    }

    /// Contracts an IRI to a [`TermId`], if possible
    pub fn contract(&self, iri: &str) -> Option<TermId> {
        for (prefix, iri_prefix) in &self.entries {
            if let Some(code) = iri.strip_prefix(iri_prefix.as_str()) {
                let compact = format!("{}:{}", prefix, code);
                return TermId::try_from(compact.as_str()).ok();
            }
        }

        // conventional fallback: last segment of the IRI is PREFIX_code
        let segment = iri.rsplit(['/', '#']).next()?;
        let (prefix, code) = segment.split_once('_')?;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        let compact = format!("{}:{}", prefix, code);
        TermId::try_from(compact.as_str()).ok()
    }
}

/// One class block extracted from the markup
#[derive(Debug)]
pub(crate) struct MarkupClass {
    pub id: TermId,
    pub label: Option<String>,
    pub parents: Vec<TermId>,
    pub deprecated: bool,
}

impl MarkupClass {
    fn new(id: TermId) -> Self {
        MarkupClass {
            id,
            label: None,
            parents: Vec::new(),
            deprecated: false,
        }
    }
}

/// Scans the markup and extracts all class blocks
///
/// Classes whose IRI cannot be contracted through `curies` are skipped,
/// as are subclass targets that cannot be contracted. Unrecognized lines
/// never fail the load; subclass-edge extraction is the only concern of
/// this reader.
pub(crate) fn parse_markup(text: &str, curies: &CurieMap) -> Vec<MarkupClass> {
    let mut classes: Vec<MarkupClass> = Vec::new();
    let mut current: Option<MarkupClass> = None;
    // depth of class blocks whose IRI did not contract; their content
    // must not leak into a surrounding class
    let mut skipping = 0usize;

    for raw in text.lines() {
        let line = raw.trim();

        if line.starts_with("<owl:Class") && !line.ends_with("/>") {
            if skipping > 0 || current.is_some() {
                skipping += 1;
                continue;
            }
            match attribute(line, "rdf:about").and_then(|iri| curies.contract(iri)) {
                Some(id) => current = Some(MarkupClass::new(id)),
                None => {
                    trace!("skipping class without compact identifier: {}", line);
                    skipping += 1;
                }
            }
        } else if line.starts_with("</owl:Class>") {
            if skipping > 0 {
                skipping -= 1;
            } else if let Some(class) = current.take() {
                classes.push(class);
            }
        } else if skipping > 0 {
            continue;
        } else if let Some(class) = current.as_mut() {
            if line.starts_with("<rdfs:label") {
                if let Some(text) = tag_text(line) {
                    class.label = Some(text.to_string());
                }
            } else if line.starts_with("<rdfs:subClassOf") {
                match attribute(line, "rdf:resource").and_then(|iri| curies.contract(iri)) {
                    Some(parent) => class.parents.push(parent),
                    None => trace!("skipping subclass axiom without plain target: {}", line),
                }
            } else if line.starts_with("<owl:deprecated") && tag_text(line) == Some("true") {
                class.deprecated = true;
            }
        }
    }

    classes
}

/// Builds the (term, is-a edge) tuples the ontology builder consumes
///
/// Classes lacking a label are silently excluded; an edge survives only
/// when both of its endpoints are labeled, non-deprecated classes.
/// Deprecated classes keep their label but are handed over as obsolete
/// terms.
pub(crate) fn extract_hierarchy(
    classes: Vec<MarkupClass>,
) -> (Vec<Term>, Vec<(TermId, TermId)>) {
    let labeled: std::collections::HashSet<TermId> = classes
        .iter()
        .filter(|class| class.label.is_some() && !class.deprecated)
        .map(|class| class.id.clone())
        .collect();

    let mut terms = Vec::new();
    let mut edges = Vec::new();
    for class in classes {
        let Some(label) = class.label else {
            trace!("excluding unlabeled class {}", class.id);
            continue;
        };
        let mut term = Term::new(class.id.clone(), label);
        term.set_obsolete(class.deprecated);
        if !class.deprecated {
            for parent in class.parents {
                if labeled.contains(&parent) {
                    edges.push((class.id.clone(), parent));
                }
            }
        }
        terms.push(term);
    }
    (terms, edges)
}

fn attribute<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let start = line.find(name)?;
    let rest = &line[start + name.len()..];
    let rest = rest.strip_prefix("=\"")?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn tag_text(line: &str) -> Option<&str> {
    let start = line.find('>')?;
    let rest = &line[start + 1..];
    let end = rest.find('<')?;
    Some(&rest[..end])
}
