//! Typed stanza entries and the key registry
//!
//! Every recognized `key: value` line becomes one immutable
//! [`StanzaEntry`]. The set of recognized keys and the stanza kinds each
//! key is legal in are fixed by [`EntryType`].
use std::fmt::Display;

use smallvec::SmallVec;

use crate::parser::StanzaKind;
use crate::term::{SubsetDef, Synonym, SynonymTypeDef, Xref};
use crate::TermId;

/// Every key the stanza grammar recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    // file header
    FormatVersion,
    DataVersion,
    Date,
    SavedBy,
    AutoGeneratedBy,
    DefaultNamespace,
    Remark,
    Ontology,
    Subsetdef,
    Synonymtypedef,
    Idspace,
    Import,
    // shared by Term, Typedef and Instance stanzas
    Id,
    Name,
    AltId,
    Def,
    Comment,
    Synonym,
    Xref,
    IsAnonymous,
    IsObsolete,
    ReplacedBy,
    Consider,
    CreatedBy,
    CreationDate,
    Namespace,
    PropertyValue,
    // Term and Typedef stanzas
    Subset,
    IsA,
    // Term stanzas only
    UnionOf,
    IntersectionOf,
    DisjointFrom,
    Relationship,
    // Typedef stanzas only
    Domain,
    Range,
    InverseOf,
    TransitiveOver,
    IsCyclic,
    IsReflexive,
    IsSymmetric,
    IsAntisymmetric,
    IsTransitive,
    IsMetadataTag,
    // Instance stanzas only
    InstanceOf,
}

impl EntryType {
    /// Looks a key up in the registry, e.g. `is_a` → [`EntryType::IsA`]
    pub fn from_key(key: &str) -> Option<EntryType> {
        let entry_type = match key {
            "format-version" => EntryType::FormatVersion,
            "data-version" => EntryType::DataVersion,
            "date" => EntryType::Date,
            "saved-by" => EntryType::SavedBy,
            "auto-generated-by" => EntryType::AutoGeneratedBy,
            "default-namespace" => EntryType::DefaultNamespace,
            "remark" => EntryType::Remark,
            "ontology" => EntryType::Ontology,
            "subsetdef" => EntryType::Subsetdef,
            "synonymtypedef" => EntryType::Synonymtypedef,
            "idspace" => EntryType::Idspace,
            "import" => EntryType::Import,
            "id" => EntryType::Id,
            "name" => EntryType::Name,
            "alt_id" => EntryType::AltId,
            "def" => EntryType::Def,
            "comment" => EntryType::Comment,
            "synonym" => EntryType::Synonym,
            "xref" => EntryType::Xref,
            "is_anonymous" => EntryType::IsAnonymous,
            "is_obsolete" => EntryType::IsObsolete,
            "replaced_by" => EntryType::ReplacedBy,
            "consider" => EntryType::Consider,
            "created_by" => EntryType::CreatedBy,
            "creation_date" => EntryType::CreationDate,
            "namespace" => EntryType::Namespace,
            "property_value" => EntryType::PropertyValue,
            "subset" => EntryType::Subset,
            "is_a" => EntryType::IsA,
            "union_of" => EntryType::UnionOf,
            "intersection_of" => EntryType::IntersectionOf,
            "disjoint_from" => EntryType::DisjointFrom,
            "relationship" => EntryType::Relationship,
            "domain" => EntryType::Domain,
            "range" => EntryType::Range,
            "inverse_of" => EntryType::InverseOf,
            "transitive_over" => EntryType::TransitiveOver,
            "is_cyclic" => EntryType::IsCyclic,
            "is_reflexive" => EntryType::IsReflexive,
            "is_symmetric" => EntryType::IsSymmetric,
            "is_antisymmetric" => EntryType::IsAntisymmetric,
            "is_transitive" => EntryType::IsTransitive,
            "is_metadata_tag" => EntryType::IsMetadataTag,
            "instance_of" => EntryType::InstanceOf,
            _ => return None,
        };
        Some(entry_type)
    }

    /// The key as it appears in source text
    pub fn key(&self) -> &'static str {
        match self {
            EntryType::FormatVersion => "format-version",
            EntryType::DataVersion => "data-version",
            EntryType::Date => "date",
            EntryType::SavedBy => "saved-by",
            EntryType::AutoGeneratedBy => "auto-generated-by",
            EntryType::DefaultNamespace => "default-namespace",
            EntryType::Remark => "remark",
            EntryType::Ontology => "ontology",
            EntryType::Subsetdef => "subsetdef",
            EntryType::Synonymtypedef => "synonymtypedef",
            EntryType::Idspace => "idspace",
            EntryType::Import => "import",
            EntryType::Id => "id",
            EntryType::Name => "name",
            EntryType::AltId => "alt_id",
            EntryType::Def => "def",
            EntryType::Comment => "comment",
            EntryType::Synonym => "synonym",
            EntryType::Xref => "xref",
            EntryType::IsAnonymous => "is_anonymous",
            EntryType::IsObsolete => "is_obsolete",
            EntryType::ReplacedBy => "replaced_by",
            EntryType::Consider => "consider",
            EntryType::CreatedBy => "created_by",
            EntryType::CreationDate => "creation_date",
            EntryType::Namespace => "namespace",
            EntryType::PropertyValue => "property_value",
            EntryType::Subset => "subset",
            EntryType::IsA => "is_a",
            EntryType::UnionOf => "union_of",
            EntryType::IntersectionOf => "intersection_of",
            EntryType::DisjointFrom => "disjoint_from",
            EntryType::Relationship => "relationship",
            EntryType::Domain => "domain",
            EntryType::Range => "range",
            EntryType::InverseOf => "inverse_of",
            EntryType::TransitiveOver => "transitive_over",
            EntryType::IsCyclic => "is_cyclic",
            EntryType::IsReflexive => "is_reflexive",
            EntryType::IsSymmetric => "is_symmetric",
            EntryType::IsAntisymmetric => "is_antisymmetric",
            EntryType::IsTransitive => "is_transitive",
            EntryType::IsMetadataTag => "is_metadata_tag",
            EntryType::InstanceOf => "instance_of",
        }
    }

    /// Returns `true` if this key is legal inside the given stanza kind
    pub fn allowed_in(&self, kind: StanzaKind) -> bool {
        match self {
            EntryType::FormatVersion
            | EntryType::DataVersion
            | EntryType::Date
            | EntryType::SavedBy
            | EntryType::AutoGeneratedBy
            | EntryType::DefaultNamespace
            | EntryType::Remark
            | EntryType::Ontology
            | EntryType::Subsetdef
            | EntryType::Synonymtypedef
            | EntryType::Idspace
            | EntryType::Import => kind == StanzaKind::Header,
            EntryType::Id
            | EntryType::Name
            | EntryType::AltId
            | EntryType::Def
            | EntryType::Comment
            | EntryType::Synonym
            | EntryType::Xref
            | EntryType::IsAnonymous
            | EntryType::IsObsolete
            | EntryType::ReplacedBy
            | EntryType::Consider
            | EntryType::CreatedBy
            | EntryType::CreationDate
            | EntryType::Namespace
            | EntryType::PropertyValue => {
                matches!(
                    kind,
                    StanzaKind::Term | StanzaKind::Typedef | StanzaKind::Instance
                )
            }
            EntryType::Subset | EntryType::IsA => {
                matches!(kind, StanzaKind::Term | StanzaKind::Typedef)
            }
            EntryType::UnionOf
            | EntryType::IntersectionOf
            | EntryType::DisjointFrom
            | EntryType::Relationship => kind == StanzaKind::Term,
            EntryType::Domain
            | EntryType::Range
            | EntryType::InverseOf
            | EntryType::TransitiveOver
            | EntryType::IsCyclic
            | EntryType::IsReflexive
            | EntryType::IsSymmetric
            | EntryType::IsAntisymmetric
            | EntryType::IsTransitive
            | EntryType::IsMetadataTag => kind == StanzaKind::Typedef,
            EntryType::InstanceOf => kind == StanzaKind::Instance,
        }
    }
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The parsed payload of a stanza entry
///
/// One variant per value grammar; the pairing of [`EntryType`] and
/// variant is fixed by the parser (e.g. `is_a` always carries
/// [`EntryValue::Id`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    /// Free or quoted text
    Str(String),
    /// `true` / `false`
    Bool(bool),
    /// A bare `PREFIX:code` identifier
    Id(TermId),
    Synonym(Synonym),
    SynonymTypeDef(SynonymTypeDef),
    SubsetDef(SubsetDef),
    Xref(Xref),
    /// A typed relation, e.g. `relationship: part_of HP:0000001`
    Relationship { relation: String, target: TermId },
}

impl EntryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EntryValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EntryValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<&TermId> {
        match self {
            EntryValue::Id(id) => Some(id),
            _ => None,
        }
    }
}

/// The ordered `{key=value, ...}` block trailing an entry value
///
/// Keys are not required to be unique; duplicate pairs are kept in
/// source order. Re-serializing via [`Display`] reproduces the parsed
/// block exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailingModifier {
    pairs: SmallVec<[(String, String); 2]>,
}

impl TrailingModifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: String, value: String) {
        self.pairs.push((key, value));
    }

    /// The `(key, value)` pairs in source order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Display for TrailingModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (n, (key, value)) in self.pairs.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// One parsed `key: value` line
///
/// Entries are immutable once parsed; the ontology builder consumes them
/// without modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanzaEntry {
    entry_type: EntryType,
    value: EntryValue,
    modifiers: Option<TrailingModifier>,
    comment: Option<String>,
}

impl StanzaEntry {
    pub(crate) fn new(
        entry_type: EntryType,
        value: EntryValue,
        modifiers: Option<TrailingModifier>,
        comment: Option<String>,
    ) -> Self {
        StanzaEntry {
            entry_type,
            value,
            modifiers,
            comment,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn value(&self) -> &EntryValue {
        &self.value
    }

    /// The trailing `{...}` modifier block, if present
    pub fn modifiers(&self) -> Option<&TrailingModifier> {
        self.modifiers.as_ref()
    }

    /// The trailing `! ...` comment, if present
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_lookup_roundtrip() {
        for key in ["is_a", "domain", "synonymtypedef", "format-version", "id"] {
            let entry_type = EntryType::from_key(key).unwrap();
            assert_eq!(entry_type.key(), key);
        }
        assert!(EntryType::from_key("no_such_key").is_none());
    }

    #[test]
    fn domain_is_typedef_only() {
        assert!(EntryType::Domain.allowed_in(StanzaKind::Typedef));
        assert!(!EntryType::Domain.allowed_in(StanzaKind::Term));
        assert!(!EntryType::Domain.allowed_in(StanzaKind::Header));
        assert!(!EntryType::Domain.allowed_in(StanzaKind::Instance));
    }

    #[test]
    fn synonymtypedef_is_header_only() {
        assert!(EntryType::Synonymtypedef.allowed_in(StanzaKind::Header));
        assert!(!EntryType::Synonymtypedef.allowed_in(StanzaKind::Term));
        assert!(!EntryType::Synonymtypedef.allowed_in(StanzaKind::Typedef));
    }

    #[test]
    fn shared_keys() {
        for kind in [StanzaKind::Term, StanzaKind::Typedef, StanzaKind::Instance] {
            assert!(EntryType::Id.allowed_in(kind));
            assert!(EntryType::Name.allowed_in(kind));
            assert!(EntryType::IsObsolete.allowed_in(kind));
        }
        assert!(!EntryType::Id.allowed_in(StanzaKind::Header));
    }

    #[test]
    fn is_a_not_legal_in_instance() {
        assert!(EntryType::IsA.allowed_in(StanzaKind::Term));
        assert!(EntryType::IsA.allowed_in(StanzaKind::Typedef));
        assert!(!EntryType::IsA.allowed_in(StanzaKind::Instance));
    }

    #[test]
    fn modifier_display_preserves_order_and_duplicates() {
        let mut modifier = TrailingModifier::new();
        modifier.push("b".to_string(), "2".to_string());
        modifier.push("a".to_string(), "1".to_string());
        modifier.push("b".to_string(), "3".to_string());
        assert_eq!(modifier.to_string(), "{b=2, a=1, b=3}");
        assert_eq!(modifier.len(), 3);
    }
}
