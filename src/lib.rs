//! Parse OBO-style ontology files into an immutable, queryable graph
//!
//! `ontograph` ingests the stanza-based OBO text format (and a reduced
//! class-hierarchy markup as an alternate source) and builds a single
//! directed graph of terms with one canonical root. The graph is
//! constructed once and never mutated afterwards, so it can be shared
//! freely across threads.
//!
//! # Examples
//!
//! ```
//! use ontograph::{Ontology, TermId};
//!
//! let ontology = Ontology::from_obo_str("\
//! format-version: 1.2
//! data-version: releases/2024-01-01
//!
//! [Term]
//! id: HP:0000001
//! name: All
//!
//! [Term]
//! id: HP:0000118
//! name: Phenotypic abnormality
//! is_a: HP:0000001 ! All
//! ").unwrap();
//!
//! let root = ontology.root();
//! assert_eq!(root.as_str(), "HP:0000001");
//!
//! let child = TermId::try_from("HP:0000118").unwrap();
//! assert!(ontology.exists_path(&child, root));
//! ```
use thiserror::Error;

pub mod parser;
pub mod term;
mod ontology;

pub use ontology::{BuildOptions, Ontology, RelationId, RelationKind, RelationTypeDef, Relationship};
pub use parser::entry::{EntryType, EntryValue, StanzaEntry, TrailingModifier};
pub use parser::markup::CurieMap;
pub use parser::StanzaKind;
pub use term::{SubsetDef, Synonym, SynonymScope, SynonymTypeDef, Term, TermId, TermIdSet};

/// Identifier of the term inserted when several parent-less terms
/// must be consolidated under one root.
///
/// The `ROOT` prefix is reserved; source files must not use it.
pub const ARTIFICIAL_ROOT_ID: &str = "ROOT:0000000";

const DEFAULT_NUM_PARENTS: usize = 8;
const DEFAULT_NUM_TERMS: usize = 20_000;

/// Errors raised while parsing source text or building the ontology graph
///
/// Parse and build failures are fail-fast: the top-level load returns the
/// first error and no partial ontology. Probing a built [`Ontology`] for an
/// unknown term is *not* an error; queries return empty results instead.
#[derive(Error, Debug)]
pub enum OntographError {
    /// A line matched no recognized shape (stanza header, `key: value`,
    /// comment or blank)
    #[error("line {line}: unrecognized line: {excerpt}")]
    Lex { line: usize, excerpt: String },
    /// The key is not part of the stanza grammar at all
    #[error("line {line}: unknown key `{key}` in [{mode}] stanza")]
    UnknownKey {
        line: usize,
        key: String,
        mode: StanzaKind,
    },
    /// The key exists but is not legal in the current stanza kind
    #[error("line {line}: key `{key}` is not allowed in [{mode}] stanza")]
    IllegalKeyForMode {
        line: usize,
        key: String,
        mode: StanzaKind,
    },
    /// The value payload does not match the grammar of its key
    #[error("line {line}: malformed value for `{key}`: {reason}")]
    ValueFormat {
        line: usize,
        key: String,
        reason: String,
    },
    /// A stanza is missing a key it must carry (`id`, `name`)
    #[error("stanza at line {line} is missing required key `{key}`")]
    MissingKey { line: usize, key: String },
    /// An identifier is not of the `PREFIX:code` form
    #[error("invalid term id `{0}`")]
    InvalidTermId(String),
    /// A relationship references an identifier that resolves to no term
    #[error("relationship from {source} references unknown term {target}")]
    DanglingEdge { source: TermId, target: TermId },
    /// The same canonical identifier was declared by two term stanzas
    #[error("duplicate term {0}")]
    DuplicateTerm(TermId),
    /// The is-a graph has no usable root (every term has a parent and no
    /// cycle tolerance or explicit root was declared)
    #[error("ontology has no root")]
    NoRoot,
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
}

/// Crate-wide result alias
pub type OntographResult<T> = Result<T, OntographError>;
