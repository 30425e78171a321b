use crate::term::{Term, TermId, TermIdSet};
use crate::DEFAULT_NUM_PARENTS;

/// A term plus its direct graph connections
///
/// Only the ontology builder wires parents and children; once the
/// [`crate::Ontology`] is handed out, these sets are never touched again.
#[derive(Debug)]
pub(crate) struct TermInternal {
    term: Term,
    parents: TermIdSet,
    children: TermIdSet,
}

impl TermInternal {
    pub fn new(term: Term) -> TermInternal {
        TermInternal {
            term,
            parents: TermIdSet::with_capacity(DEFAULT_NUM_PARENTS),
            children: TermIdSet::with_capacity(DEFAULT_NUM_PARENTS),
        }
    }

    pub fn id(&self) -> &TermId {
        self.term.id()
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn parents(&self) -> &TermIdSet {
        &self.parents
    }

    pub fn children(&self) -> &TermIdSet {
        &self.children
    }

    pub fn add_parent(&mut self, parent_id: TermId) {
        self.parents.insert(parent_id);
    }

    pub fn add_child(&mut self, child_id: TermId) {
        self.children.insert(child_id);
    }
}

impl PartialEq for TermInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TermInternal {}
