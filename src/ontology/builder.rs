//! Two-phase construction of the ontology graph
//!
//! Phase 1 collects every canonical and alternate identifier without
//! touching any edge. Phase 2 resolves edge endpoints through a pure
//! lookup over the phase-1 result, wires the adjacency and settles on a
//! root. No intermediate state escapes the builder.
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::parser::entry::{EntryType, EntryValue};
use crate::parser::obo::{OboDocument, Stanza};
use crate::parser::StanzaKind;
use crate::term::internal::TermInternal;
use crate::term::{Term, TermId};
use crate::{OntographError, OntographResult};

use super::termarena::Arena;
use super::{Ontology, RelationId, RelationKind, RelationTypeDef, Relationship};

const MAX_ALIAS_HOPS: usize = 32;

/// Options of one ontology build
///
/// Passed by value into the load call; there is no process-wide
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    declared_root: Option<TermId>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the term to use as root
    ///
    /// Required when a `[Typedef]` stanza declares `is_cyclic: true` and
    /// the graph does not present exactly one parent-less term: with
    /// cycle detection off, the builder refuses to guess a root.
    #[must_use]
    pub fn declared_root(mut self, root: TermId) -> Self {
        self.declared_root = Some(root);
        self
    }
}

/// Accumulates terms and raw edges, then builds the immutable graph
pub(crate) struct OntologyBuilder {
    options: BuildOptions,
    terms: Vec<Term>,
    obsolete: Vec<Term>,
    edges: Vec<(TermId, TermId)>,
    typed_edges: Vec<(TermId, String, TermId)>,
    relation_types: Vec<RelationTypeDef>,
    subset_defs: Vec<crate::term::SubsetDef>,
    synonym_types: Vec<crate::term::SynonymTypeDef>,
    metadata: Vec<(String, String)>,
}

impl OntologyBuilder {
    pub fn new(options: BuildOptions) -> Self {
        OntologyBuilder {
            options,
            terms: Vec::new(),
            obsolete: Vec::new(),
            edges: Vec::new(),
            typed_edges: Vec::new(),
            relation_types: Vec::new(),
            subset_defs: Vec::new(),
            synonym_types: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Consumes a parsed stanza document
    pub fn document(mut self, document: &OboDocument) -> OntographResult<Self> {
        for entry in document.header() {
            match (entry.entry_type(), entry.value()) {
                (EntryType::Subsetdef, EntryValue::SubsetDef(def)) => {
                    self.subset_defs.push(def.clone());
                }
                (EntryType::Synonymtypedef, EntryValue::SynonymTypeDef(def)) => {
                    self.synonym_types.push(def.clone());
                }
                (entry_type, EntryValue::Str(value)) => {
                    self.metadata
                        .push((entry_type.key().to_string(), value.clone()));
                }
                _ => {}
            }
        }

        for stanza in document.stanzas() {
            match stanza.kind() {
                StanzaKind::Term => {
                    let term = Term::from_stanza(stanza)?;
                    if !term.is_obsolete() {
                        for entry in stanza.entries() {
                            match (entry.entry_type(), entry.value()) {
                                (EntryType::IsA, EntryValue::Id(parent)) => {
                                    self.edges.push((term.id().clone(), parent.clone()));
                                }
                                (
                                    EntryType::Relationship,
                                    EntryValue::Relationship { relation, target },
                                ) => {
                                    self.typed_edges.push((
                                        term.id().clone(),
                                        relation.clone(),
                                        target.clone(),
                                    ));
                                }
                                _ => {}
                            }
                        }
                    }
                    self.add_term(term);
                }
                StanzaKind::Typedef => {
                    let def = typedef_from_stanza(stanza)?;
                    self.relation_types.push(def);
                }
                StanzaKind::Instance => {
                    trace!("ignoring [Instance] stanza at line {}", stanza.line());
                }
                // the assembler never emits header stanzas
                StanzaKind::Header => {}
            }
        }

        Ok(self)
    }

    /// Adds one term; obsolete terms are routed to the obsolete map
    pub fn add_term(&mut self, term: Term) {
        if term.is_obsolete() {
            self.obsolete.push(term);
        } else {
            self.terms.push(term);
        }
    }

    /// Adds one raw is-a edge, child → parent
    pub fn add_edge(&mut self, child: TermId, parent: TermId) {
        self.edges.push((child, parent));
    }

    /// Builds the immutable [`Ontology`]
    ///
    /// # Errors
    ///
    /// - [`OntographError::DuplicateTerm`]: one canonical id declared twice
    /// - [`OntographError::DanglingEdge`]: an edge endpoint resolves to no
    ///   canonical term
    /// - [`OntographError::NoRoot`]: an is-a cycle without declared cycle
    ///   tolerance, no term at all, or cycle tolerance without a usable root
    pub fn build(self) -> OntographResult<Ontology> {
        let OntologyBuilder {
            options,
            terms,
            obsolete,
            edges,
            typed_edges,
            relation_types,
            subset_defs,
            synonym_types,
            metadata,
        } = self;

        // phase 1: identifiers only
        let mut canonical: HashSet<TermId> = HashSet::with_capacity(terms.len());
        for term in &terms {
            if !canonical.insert(term.id().clone()) {
                return Err(OntographError::DuplicateTerm(term.id().clone()));
            }
        }
        let mut obsolete_ids: HashSet<&TermId> = HashSet::with_capacity(obsolete.len());
        for term in &obsolete {
            if canonical.contains(term.id()) || !obsolete_ids.insert(term.id()) {
                return Err(OntographError::DuplicateTerm(term.id().clone()));
            }
        }

        let aliases = collect_aliases(&terms, &obsolete, &canonical);

        let mut arena = Arena::default();
        for term in terms {
            arena.insert(TermInternal::new(term));
        }

        // phase 2: edges, through a pure lookup over the phase-1 maps
        let mut relations: Vec<Relationship> = Vec::with_capacity(edges.len());
        for (child, parent) in &edges {
            let Some(child) = resolve_id(child, &canonical, &aliases) else {
                return Err(OntographError::DanglingEdge {
                    source: child.clone(),
                    target: parent.clone(),
                });
            };
            let Some(parent) = resolve_id(parent, &canonical, &aliases) else {
                return Err(OntographError::DanglingEdge {
                    source: child.clone(),
                    target: parent.clone(),
                });
            };
            relations.push(Relationship {
                id: RelationId(relations.len() as u32 + 1),
                source: child.clone(),
                target: parent.clone(),
                kind: RelationKind::IsA,
            });
            if let Some(internal) = arena.get_mut(child) {
                internal.add_parent(parent.clone());
            }
            if let Some(internal) = arena.get_mut(parent) {
                internal.add_child(child.clone());
            }
        }
        for (source, relation, target) in &typed_edges {
            let (Some(source), Some(target)) = (
                resolve_id(source, &canonical, &aliases),
                resolve_id(target, &canonical, &aliases),
            ) else {
                return Err(OntographError::DanglingEdge {
                    source: source.clone(),
                    target: target.clone(),
                });
            };
            relations.push(Relationship {
                id: RelationId(relations.len() as u32 + 1),
                source: source.clone(),
                target: target.clone(),
                kind: RelationKind::Typed(relation.clone()),
            });
        }

        let cyclic = relation_types.iter().any(RelationTypeDef::is_cyclic);
        let candidates: Vec<TermId> = arena
            .values()
            .filter(|internal| internal.parents().is_empty())
            .map(|internal| internal.id().clone())
            .collect();

        if !cyclic {
            check_acyclic(&arena, &candidates)?;
        }

        let root = select_root(&mut arena, &mut relations, candidates, cyclic, &options)?;

        let obsolete: HashMap<TermId, Term> = obsolete
            .into_iter()
            .map(|term| (term.id().clone(), term))
            .collect();

        Ok(Ontology {
            terms: arena,
            obsolete,
            aliases,
            relations,
            relation_types,
            subset_defs,
            synonym_types,
            metadata,
            root,
        })
    }
}

/// Resolves any identifier to a canonical one, or `None`
fn resolve_id<'a>(
    id: &'a TermId,
    canonical: &'a HashSet<TermId>,
    aliases: &'a HashMap<TermId, TermId>,
) -> Option<&'a TermId> {
    if canonical.contains(id) {
        Some(id)
    } else {
        aliases.get(id)
    }
}

/// Builds the alternate-id → canonical-id map
///
/// Covers alt ids of live terms plus the ids (own and alternate) of
/// obsolete terms that declare a replacement. Redirection chains are
/// flattened; a redirection that reaches no canonical term is dropped
/// with a warning, so a later edge through it fails as dangling.
fn collect_aliases(
    terms: &[Term],
    obsolete: &[Term],
    canonical: &HashSet<TermId>,
) -> HashMap<TermId, TermId> {
    let mut raw: HashMap<TermId, TermId> = HashMap::new();
    for term in terms {
        for alt in term.alt_ids() {
            if canonical.contains(alt) {
                warn!("alternate id {} of {} is itself canonical", alt, term.id());
                continue;
            }
            raw.insert(alt.clone(), term.id().clone());
        }
    }
    for term in obsolete {
        let Some(replacement) = term.replaced_by() else {
            continue;
        };
        raw.insert(term.id().clone(), replacement.clone());
        for alt in term.alt_ids() {
            if !canonical.contains(alt) {
                raw.insert(alt.clone(), replacement.clone());
            }
        }
    }

    let mut flat = HashMap::with_capacity(raw.len());
    for (id, first) in &raw {
        let mut target = first;
        let mut hops = 0;
        while !canonical.contains(target) && hops < MAX_ALIAS_HOPS {
            match raw.get(target) {
                Some(next) => {
                    target = next;
                    hops += 1;
                }
                None => break,
            }
        }
        if canonical.contains(target) {
            flat.insert(id.clone(), target.clone());
        } else {
            warn!("dropping redirection {} -> {}: no canonical target", id, first);
        }
    }
    flat
}

/// Verifies the is-a digraph is acyclic by stripping it from the
/// candidate roots down
fn check_acyclic(arena: &Arena, candidates: &[TermId]) -> OntographResult<()> {
    let mut pending: HashMap<&TermId, usize> = arena
        .values()
        .map(|internal| (internal.id(), internal.parents().len()))
        .collect();

    let mut queue: Vec<&TermId> = Vec::with_capacity(candidates.len());
    for id in candidates {
        if let Some((key, _)) = pending.remove_entry(id) {
            queue.push(key);
        }
    }

    let mut stripped = 0;
    while let Some(id) = queue.pop() {
        stripped += 1;
        let Some(internal) = arena.get(id) else {
            continue;
        };
        for child in internal.children() {
            if let Some(count) = pending.get_mut(child) {
                *count -= 1;
                if *count == 0 {
                    if let Some((key, _)) = pending.remove_entry(child) {
                        queue.push(key);
                    }
                }
            }
        }
    }

    if stripped != arena.len() {
        return Err(OntographError::NoRoot);
    }
    Ok(())
}

/// Settles on the one root, inserting the artificial root term when the
/// source presents several parent-less terms
fn select_root(
    arena: &mut Arena,
    relations: &mut Vec<Relationship>,
    candidates: Vec<TermId>,
    cyclic: bool,
    options: &BuildOptions,
) -> OntographResult<TermId> {
    if cyclic {
        // cycle detection is off, so a parent-less term is not a reliable
        // signal; an explicit root wins, a single candidate is accepted
        if let Some(root) = &options.declared_root {
            if !arena.contains(root) {
                return Err(OntographError::NoRoot);
            }
            debug!("using declared root {}", root);
            return Ok(root.clone());
        }
        return match candidates.as_slice() {
            [root] => Ok(root.clone()),
            _ => Err(OntographError::NoRoot),
        };
    }

    match candidates.as_slice() {
        [] => Err(OntographError::NoRoot),
        [root] => Ok(root.clone()),
        _ => {
            let root_id = TermId::artificial_root();
            if arena.contains(&root_id) {
                return Err(OntographError::DuplicateTerm(root_id));
            }
            debug!(
                "consolidating {} top-level terms under {}",
                candidates.len(),
                root_id
            );

            let mut root = TermInternal::new(Term::new(root_id.clone(), "artificial root"));
            for candidate in candidates {
                relations.push(Relationship {
                    id: RelationId(relations.len() as u32 + 1),
                    source: candidate.clone(),
                    target: root_id.clone(),
                    kind: RelationKind::IsA,
                });
                root.add_child(candidate.clone());
                if let Some(internal) = arena.get_mut(&candidate) {
                    internal.add_parent(root_id.clone());
                }
            }
            arena.insert(root);
            Ok(root_id)
        }
    }
}

fn typedef_from_stanza(stanza: &Stanza) -> OntographResult<RelationTypeDef> {
    let mut def = RelationTypeDef::default();
    let mut has_id = false;
    for entry in stanza.entries() {
        match (entry.entry_type(), entry.value()) {
            (EntryType::Id, EntryValue::Str(id)) => {
                def.id = id.clone();
                has_id = true;
            }
            (EntryType::Name, EntryValue::Str(name)) => def.name = Some(name.clone()),
            (EntryType::IsCyclic, EntryValue::Bool(flag)) => def.cyclic = *flag,
            (EntryType::IsTransitive, EntryValue::Bool(flag)) => def.transitive = *flag,
            (EntryType::IsSymmetric, EntryValue::Bool(flag)) => def.symmetric = *flag,
            (EntryType::IsAntisymmetric, EntryValue::Bool(flag)) => def.antisymmetric = *flag,
            (EntryType::IsReflexive, EntryValue::Bool(flag)) => def.reflexive = *flag,
            (EntryType::Domain, EntryValue::Id(id)) => def.domain = Some(id.clone()),
            (EntryType::Range, EntryValue::Id(id)) => def.range = Some(id.clone()),
            _ => {}
        }
    }
    if !has_id {
        return Err(OntographError::MissingKey {
            line: stanza.line(),
            key: "id".to_string(),
        });
    }
    Ok(def)
}
