//! The immutable ontology graph and its accessors
use core::fmt::Debug;
use std::collections::hash_map::{HashMap, Values};
use std::fmt::Display;
use std::path::Path;

use crate::parser::markup::{self, CurieMap};
use crate::parser::obo;
use crate::term::internal::TermInternal;
use crate::term::{SubsetDef, SynonymTypeDef, Term, TermId};
use crate::OntographResult;

mod algo;
mod builder;
mod termarena;

pub use builder::BuildOptions;
use builder::OntologyBuilder;
use termarena::Arena;

/// Key of a [`Relationship`] within one [`Ontology`]
///
/// Ids are assigned monotonically during the build, starting at 1, and
/// are unique per ontology instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(u32);

impl RelationId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Debug for RelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RelationId({})", self.0)
    }
}

impl Display for RelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type of a [`Relationship`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// The source term is a more specific case of the target term
    IsA,
    /// A relation declared via a `[Typedef]` stanza, e.g. `part_of`
    Typed(String),
}

/// One directed relationship between two terms
///
/// Is-a relationships point from the more specific to the more general
/// term (child → parent) and make up the graph's edges; typed relations
/// are retained in the relation map only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    id: RelationId,
    source: TermId,
    target: TermId,
    kind: RelationKind,
}

impl Relationship {
    pub fn id(&self) -> RelationId {
        self.id
    }

    pub fn source(&self) -> &TermId {
        &self.source
    }

    pub fn target(&self) -> &TermId {
        &self.target
    }

    pub fn kind(&self) -> &RelationKind {
        &self.kind
    }
}

/// A relation type declared via a `[Typedef]` stanza
#[derive(Debug, Clone, Default)]
pub struct RelationTypeDef {
    id: String,
    name: Option<String>,
    cyclic: bool,
    transitive: bool,
    symmetric: bool,
    antisymmetric: bool,
    reflexive: bool,
    domain: Option<TermId>,
    range: Option<TermId>,
}

impl RelationTypeDef {
    /// The typedef identifier, e.g. `part_of`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `true` if the source declared `is_cyclic: true` for this relation
    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    pub fn is_transitive(&self) -> bool {
        self.transitive
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn is_antisymmetric(&self) -> bool {
        self.antisymmetric
    }

    pub fn is_reflexive(&self) -> bool {
        self.reflexive
    }

    pub fn domain(&self) -> Option<&TermId> {
        self.domain.as_ref()
    }

    pub fn range(&self) -> Option<&TermId> {
        self.range.as_ref()
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The ontology graph: all terms, their relationships and one root
///
/// An `Ontology` is built once from a source file and never mutated
/// afterwards. Its term and relation maps are plain data behind `&self`
/// accessors, so a built instance can be read from any number of threads
/// without synchronization.
///
/// # Construction
///
/// - [`Ontology::from_obo`] / [`Ontology::from_obo_str`]: the stanza
///   text format
/// - [`Ontology::from_markup`] / [`Ontology::from_markup_str`]: the
///   reduced class-hierarchy markup, with an explicit [`CurieMap`]
///
/// Both producers end in the same builder, so the output contract is
/// identical: every edge's endpoints are vertices, alternate and
/// obsolete identifiers resolve to canonical ones, and exactly one root
/// exists (inserted as [`crate::ARTIFICIAL_ROOT_ID`] when the source
/// has several parent-less terms).
///
/// # Queries
///
/// All graph queries live on `&self` and allocate their own working
/// sets; see [`Ontology::exists_path`], [`Ontology::child_terms`],
/// [`Ontology::parent_terms`], [`Ontology::ancestor_terms`],
/// [`Ontology::descendant_terms`]. Probing an identifier that is not in
/// the term map is a normal outcome and yields an empty result, never an
/// error.
///
/// # Example graph
///
/// The documentation examples use this small hierarchy:
///
/// ```mermaid
/// graph BT
///     HP:0000118["HP:0000118<br>Phenotypic abnormality"] --> HP:0000001["HP:0000001<br>All"]
///     HP:0000707["HP:0000707<br>Abnormality of the nervous system"] --> HP:0000118
///     HP:0012639["HP:0012639<br>Abnormal nervous system morphology"] --> HP:0000707
/// ```
///
/// # Examples
///
/// ```
/// use ontograph::{Ontology, TermId};
///
/// let ontology = Ontology::from_obo("tests/small.obo").unwrap();
///
/// let nervous = TermId::try_from("HP:0000707").unwrap();
/// let term = ontology.get(&nervous).unwrap();
/// assert_eq!(term.name(), "Abnormality of the nervous system");
///
/// // the fixture has a single top-level term, no artificial root needed
/// assert_eq!(ontology.root().as_str(), "HP:0000001");
///
/// for term in &ontology {
///     println!("{}: {}", term.id(), term.name());
/// }
/// ```
pub struct Ontology {
    terms: Arena,
    obsolete: HashMap<TermId, Term>,
    aliases: HashMap<TermId, TermId>,
    relations: Vec<Relationship>,
    relation_types: Vec<RelationTypeDef>,
    subset_defs: Vec<SubsetDef>,
    synonym_types: Vec<SynonymTypeDef>,
    metadata: Vec<(String, String)>,
    root: TermId,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ontology with {} terms", self.terms.len())
    }
}

/// Loading
impl Ontology {
    /// Loads an ontology from a stanza-format file
    ///
    /// # Errors
    ///
    /// - [`crate::OntographError::CannotOpenFile`]: file not present or
    ///   unreadable
    /// - any parse or build error of [`Ontology::from_obo_str`]
    pub fn from_obo<P: AsRef<Path>>(filename: P) -> OntographResult<Ontology> {
        Self::from_obo_with(filename, BuildOptions::default())
    }

    /// Loads an ontology from a stanza-format file with explicit options
    pub fn from_obo_with<P: AsRef<Path>>(
        filename: P,
        options: BuildOptions,
    ) -> OntographResult<Ontology> {
        let document = obo::read_obo_file(filename)?;
        OntologyBuilder::new(options).document(&document)?.build()
    }

    /// Builds an ontology from stanza-format text
    ///
    /// # Errors
    ///
    /// Parse errors ([`crate::OntographError::Lex`],
    /// [`crate::OntographError::UnknownKey`],
    /// [`crate::OntographError::IllegalKeyForMode`],
    /// [`crate::OntographError::ValueFormat`]) and build errors
    /// ([`crate::OntographError::DuplicateTerm`],
    /// [`crate::OntographError::DanglingEdge`],
    /// [`crate::OntographError::NoRoot`]) are all fail-fast: no partial
    /// ontology is ever returned.
    pub fn from_obo_str(text: &str) -> OntographResult<Ontology> {
        Self::from_obo_str_with(text, BuildOptions::default())
    }

    /// Builds an ontology from stanza-format text with explicit options
    pub fn from_obo_str_with(text: &str, options: BuildOptions) -> OntographResult<Ontology> {
        let document = obo::parse_obo_document(text)?;
        OntologyBuilder::new(options).document(&document)?.build()
    }

    /// Loads an ontology from a class-hierarchy markup file
    ///
    /// `curies` maps class IRIs to compact identifiers; see [`CurieMap`].
    pub fn from_markup<P: AsRef<Path>>(
        filename: P,
        curies: &CurieMap,
    ) -> OntographResult<Ontology> {
        let content = std::fs::read_to_string(&filename).map_err(|_| {
            crate::OntographError::CannotOpenFile(filename.as_ref().display().to_string())
        })?;
        Self::from_markup_str(&content, curies)
    }

    /// Builds an ontology from class-hierarchy markup text
    pub fn from_markup_str(text: &str, curies: &CurieMap) -> OntographResult<Ontology> {
        let classes = markup::parse_markup(text, curies);
        let (terms, edges) = markup::extract_hierarchy(classes);

        let mut builder = OntologyBuilder::new(BuildOptions::default());
        for term in terms {
            builder.add_term(term);
        }
        for (child, parent) in edges {
            builder.add_edge(child, parent);
        }
        builder.build()
    }
}

/// Accessors
impl Ontology {
    /// The root term identifier
    ///
    /// Either the single parent-less term of the source, or
    /// [`crate::ARTIFICIAL_ROOT_ID`] if several had to be consolidated.
    pub fn root(&self) -> &TermId {
        &self.root
    }

    /// Looks up a canonical identifier in the term map
    pub fn get(&self, id: &TermId) -> Option<&Term> {
        self.terms.get(id).map(TermInternal::term)
    }

    /// Resolves any identifier to its canonical identifier
    ///
    /// Canonical ids resolve to themselves; alternate ids and obsolete
    /// ids with a declared replacement resolve to the canonical term
    /// they redirect to. Anything else is `None`.
    pub fn resolve<'a>(&'a self, id: &'a TermId) -> Option<&'a TermId> {
        if self.terms.contains(id) {
            return Some(id);
        }
        self.aliases.get(id)
    }

    /// Looks up an obsolete term record by its (obsolete) identifier
    pub fn obsolete(&self, id: &TermId) -> Option<&Term> {
        self.obsolete.get(id)
    }

    /// All obsolete term records
    pub fn obsolete_terms(&self) -> Values<'_, TermId, Term> {
        self.obsolete.values()
    }

    /// Looks up a relationship by its id
    pub fn relation(&self, id: RelationId) -> Option<&Relationship> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|idx| self.relations.get(idx))
    }

    /// All relationships, is-a and typed alike
    pub fn relations(&self) -> std::slice::Iter<'_, Relationship> {
        self.relations.iter()
    }

    /// Relation types declared via `[Typedef]` stanzas
    pub fn relation_types(&self) -> &[RelationTypeDef] {
        &self.relation_types
    }

    /// Subsets declared in the file header
    pub fn subset_defs(&self) -> &[SubsetDef] {
        &self.subset_defs
    }

    /// Synonym types declared in the file header
    pub fn synonym_types(&self) -> &[SynonymTypeDef] {
        &self.synonym_types
    }

    /// File-level metadata in source order, e.g. `data-version`
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// The value of a single metadata key
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of canonical terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates over all canonical terms
    pub fn terms(&self) -> Iter<'_> {
        Iter {
            inner: self.terms.values(),
        }
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.terms
    }
}

/// Iterator over the canonical terms of an [`Ontology`]
pub struct Iter<'a> {
    inner: Values<'a, TermId, TermInternal>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Term;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(TermInternal::term)
    }
}

impl<'a> IntoIterator for &'a Ontology {
    type Item = &'a Term;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn small() -> Ontology {
        Ontology::from_obo("tests/small.obo").unwrap()
    }

    #[test]
    fn term_lookup() {
        let ontology = small();
        assert_eq!(ontology.len(), 4);

        let id = TermId::try_from("HP:0000118").unwrap();
        assert_eq!(ontology.get(&id).unwrap().name(), "Phenotypic abnormality");

        let absent = TermId::try_from("HP:9999999").unwrap();
        assert!(ontology.get(&absent).is_none());
    }

    #[test]
    fn metadata_is_ordered() {
        let ontology = small();
        assert_eq!(
            ontology.metadata_value("data-version"),
            Some("releases/2017-06-05")
        );
        assert_eq!(ontology.metadata()[0].0, "format-version");
    }

    #[test]
    fn obsolete_terms_are_not_vertices() {
        let ontology = small();
        let obsolete = TermId::try_from("HP:0009999").unwrap();
        assert!(ontology.get(&obsolete).is_none());
        assert_eq!(ontology.obsolete(&obsolete).unwrap().name(), "Old morphology");
    }

    #[test]
    fn obsolete_id_resolves_to_replacement() {
        let ontology = small();
        let obsolete = TermId::try_from("HP:0009999").unwrap();
        assert_eq!(
            ontology.resolve(&obsolete).unwrap().as_str(),
            "HP:0012639"
        );
    }

    #[test]
    fn alt_id_resolves_to_canonical() {
        let ontology = small();
        let alt = TermId::try_from("HP:0001234").unwrap();
        assert_eq!(ontology.resolve(&alt).unwrap().as_str(), "HP:0000707");
        // canonical ids resolve to themselves
        let canonical = TermId::try_from("HP:0000707").unwrap();
        assert_eq!(ontology.resolve(&canonical), Some(&canonical));
        // unknown ids resolve to nothing
        let absent = TermId::try_from("HP:7777777").unwrap();
        assert!(ontology.resolve(&absent).is_none());
    }

    #[test]
    fn relation_lookup() {
        let ontology = small();
        let first = ontology.relations().next().unwrap();
        assert_eq!(ontology.relation(first.id()), Some(first));
        assert!(ontology
            .relations()
            .all(|relation| relation.kind() == &RelationKind::IsA));
    }

    #[test]
    fn typedef_records_are_kept() {
        let ontology = small();
        assert_eq!(ontology.relation_types().len(), 1);
        assert_eq!(ontology.relation_types()[0].id(), "part_of");
        assert!(!ontology.relation_types()[0].is_cyclic());
    }

    #[test]
    fn iteration_covers_all_terms() {
        let ontology = small();
        assert_eq!(ontology.terms().count(), ontology.len());
        assert_eq!((&ontology).into_iter().count(), 4);
    }

    #[test]
    fn markup_and_obo_share_the_output_contract() {
        let markup = r#"
            <owl:Class rdf:about="http://purl.obolibrary.org/obo/HP_0000001">
                <rdfs:label>All</rdfs:label>
            </owl:Class>
            <owl:Class rdf:about="http://purl.obolibrary.org/obo/HP_0000118">
                <rdfs:label>Phenotypic abnormality</rdfs:label>
                <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/HP_0000001"/>
            </owl:Class>
        "#;
        let ontology = Ontology::from_markup_str(markup, &CurieMap::new()).unwrap();
        assert_eq!(ontology.len(), 2);
        assert_eq!(ontology.root().as_str(), "HP:0000001");

        let child = TermId::try_from("HP:0000118").unwrap();
        assert!(ontology.exists_path(&child, ontology.root()));
    }
}
