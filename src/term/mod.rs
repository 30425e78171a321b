//! Terms and their value types
//!
//! A [`Term`] is one named concept of the ontology, identified by a
//! [`TermId`]. Term records are created during parsing and never mutated
//! afterwards.
use std::collections::HashSet;
use std::fmt::Display;

use smallvec::SmallVec;

use crate::parser::entry::EntryValue;
use crate::parser::obo::Stanza;
use crate::parser::EntryType;
use crate::{OntographError, OntographResult};

mod termid;
pub(crate) mod internal;

pub use termid::TermId;

/// An unordered set of [`TermId`]s, the result type of all graph queries
pub type TermIdSet = HashSet<TermId>;

/// Scope of a [`Synonym`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynonymScope {
    Exact,
    Broad,
    Narrow,
    Related,
}

impl SynonymScope {
    /// Parses a scope token, e.g. `EXACT`
    ///
    /// Returns `None` if the token is not one of the four scopes.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "EXACT" => Some(SynonymScope::Exact),
            "BROAD" => Some(SynonymScope::Broad),
            "NARROW" => Some(SynonymScope::Narrow),
            "RELATED" => Some(SynonymScope::Related),
            _ => None,
        }
    }
}

impl Display for SynonymScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            SynonymScope::Exact => "EXACT",
            SynonymScope::Broad => "BROAD",
            SynonymScope::Narrow => "NARROW",
            SynonymScope::Related => "RELATED",
        };
        write!(f, "{}", token)
    }
}

/// An alternative name of a term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synonym {
    text: String,
    scope: SynonymScope,
    synonym_type: Option<String>,
}

impl Synonym {
    pub(crate) fn new(text: String, scope: SynonymScope, synonym_type: Option<String>) -> Self {
        Synonym {
            text,
            scope,
            synonym_type,
        }
    }

    /// The synonym text, without quotes
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scope(&self) -> SynonymScope {
        self.scope
    }

    /// Name of a `synonymtypedef` declared in the file header, if any
    pub fn synonym_type(&self) -> Option<&str> {
        self.synonym_type.as_deref()
    }
}

/// A synonym type declared in the file header via `synonymtypedef`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTypeDef {
    name: String,
    description: String,
    scope: Option<SynonymScope>,
}

impl SynonymTypeDef {
    pub(crate) fn new(name: String, description: String, scope: Option<SynonymScope>) -> Self {
        SynonymTypeDef {
            name,
            description,
            scope,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scope(&self) -> Option<SynonymScope> {
        self.scope
    }
}

/// A subset declared in the file header via `subsetdef`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetDef {
    name: String,
    description: String,
}

impl SubsetDef {
    pub(crate) fn new(name: String, description: String) -> Self {
        SubsetDef { name, description }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A cross-reference to an external database entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xref {
    target: String,
    description: Option<String>,
}

impl Xref {
    pub(crate) fn new(target: String, description: Option<String>) -> Self {
        Xref {
            target,
            description,
        }
    }

    /// The referenced identifier, e.g. `UMLS:C4025901`
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// One named concept of the ontology
///
/// All fields except `id` and `name` are optional. A `Term` is immutable;
/// parent and child connections live in the [`crate::Ontology`] graph, not
/// on the term itself.
#[derive(Debug, Clone)]
pub struct Term {
    id: TermId,
    name: String,
    alt_ids: SmallVec<[TermId; 2]>,
    definition: Option<String>,
    comment: Option<String>,
    subsets: Vec<String>,
    synonyms: Vec<Synonym>,
    xrefs: Vec<Xref>,
    obsolete: bool,
    replaced_by: Option<TermId>,
    created_by: Option<String>,
    creation_date: Option<String>,
}

impl Term {
    /// Constructs a minimal term with only id and name set
    pub fn new(id: TermId, name: impl Into<String>) -> Term {
        Term {
            id,
            name: name.into(),
            alt_ids: SmallVec::new(),
            definition: None,
            comment: None,
            subsets: Vec::new(),
            synonyms: Vec::new(),
            xrefs: Vec::new(),
            obsolete: false,
            replaced_by: None,
            created_by: None,
            creation_date: None,
        }
    }

    /// Builds the term record of a `[Term]` stanza
    ///
    /// Fails with [`OntographError::MissingKey`] when the stanza lacks an
    /// `id` or `name` entry.
    pub(crate) fn from_stanza(stanza: &Stanza) -> OntographResult<Term> {
        let mut id: Option<TermId> = None;
        let mut name: Option<&str> = None;
        let mut alt_ids = SmallVec::new();
        let mut definition = None;
        let mut comment = None;
        let mut subsets = Vec::new();
        let mut synonyms = Vec::new();
        let mut xrefs = Vec::new();
        let mut obsolete = false;
        let mut replaced_by = None;
        let mut created_by = None;
        let mut creation_date = None;

        for entry in stanza.entries() {
            match (entry.entry_type(), entry.value()) {
                (EntryType::Id, EntryValue::Str(s)) => id = Some(TermId::try_from(s.as_str())?),
                (EntryType::Name, EntryValue::Str(s)) => name = Some(s.as_str()),
                (EntryType::AltId, EntryValue::Id(alt)) => alt_ids.push(alt.clone()),
                (EntryType::Def, EntryValue::Str(s)) => definition = Some(s.clone()),
                (EntryType::Comment, EntryValue::Str(s)) => comment = Some(s.clone()),
                (EntryType::Subset, EntryValue::Str(s)) => subsets.push(s.clone()),
                (EntryType::Synonym, EntryValue::Synonym(s)) => synonyms.push(s.clone()),
                (EntryType::Xref, EntryValue::Xref(x)) => xrefs.push(x.clone()),
                (EntryType::IsObsolete, EntryValue::Bool(b)) => obsolete = *b,
                (EntryType::ReplacedBy, EntryValue::Id(target)) => {
                    replaced_by = Some(target.clone());
                }
                (EntryType::CreatedBy, EntryValue::Str(s)) => created_by = Some(s.clone()),
                (EntryType::CreationDate, EntryValue::Str(s)) => creation_date = Some(s.clone()),
                // is_a and relationship entries turn into graph edges, the
                // remaining keys carry no term-level data
                _ => {}
            }
        }

        let Some(id) = id else {
            return Err(OntographError::MissingKey {
                line: stanza.line(),
                key: "id".to_string(),
            });
        };
        let Some(name) = name else {
            return Err(OntographError::MissingKey {
                line: stanza.line(),
                key: "name".to_string(),
            });
        };

        Ok(Term {
            id,
            name: name.to_string(),
            alt_ids,
            definition,
            comment,
            subsets,
            synonyms,
            xrefs,
            obsolete,
            replaced_by,
            created_by,
            creation_date,
        })
    }

    pub fn id(&self) -> &TermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternate identifiers that redirect to this term
    pub fn alt_ids(&self) -> &[TermId] {
        &self.alt_ids
    }

    /// Free-text definition, without quotes
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn subsets(&self) -> &[String] {
        &self.subsets
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    pub fn xrefs(&self) -> &[Xref] {
        &self.xrefs
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// The canonical term replacing this obsolete term, if declared
    pub fn replaced_by(&self) -> Option<&TermId> {
        self.replaced_by.as_ref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.creation_date.as_deref()
    }

    pub(crate) fn set_obsolete(&mut self, obsolete: bool) {
        self.obsolete = obsolete;
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Term {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scope_tokens_roundtrip() {
        for token in ["EXACT", "BROAD", "NARROW", "RELATED"] {
            let scope = SynonymScope::from_token(token).unwrap();
            assert_eq!(scope.to_string(), token);
        }
        assert!(SynonymScope::from_token("exact").is_none());
        assert!(SynonymScope::from_token("SOMETIMES").is_none());
    }

    #[test]
    fn minimal_term() {
        let id = TermId::try_from("HP:0000001").unwrap();
        let term = Term::new(id.clone(), "All");
        assert_eq!(term.id(), &id);
        assert_eq!(term.name(), "All");
        assert!(!term.is_obsolete());
        assert!(term.definition().is_none());
        assert!(term.alt_ids().is_empty());
    }

    #[test]
    fn terms_compare_by_id() {
        let id = TermId::try_from("HP:0000001").unwrap();
        let a = Term::new(id.clone(), "All");
        let b = Term::new(id, "Everything");
        assert_eq!(a, b);
    }
}
