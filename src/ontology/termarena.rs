use std::collections::hash_map::{HashMap, Values};

use crate::term::internal::TermInternal;
use crate::term::TermId;
use crate::DEFAULT_NUM_TERMS;

/// Storage of all canonical terms, indexed by identifier
pub(crate) struct Arena {
    terms: HashMap<TermId, TermInternal>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn insert(&mut self, term: TermInternal) {
        let id = term.id().clone();
        self.terms.insert(id, term);
    }

    pub fn contains(&self, id: &TermId) -> bool {
        self.terms.contains_key(id)
    }

    pub fn get(&self, id: &TermId) -> Option<&TermInternal> {
        self.terms.get(id)
    }

    pub fn get_mut(&mut self, id: &TermId) -> Option<&mut TermInternal> {
        self.terms.get_mut(id)
    }

    pub fn values(&self) -> Values<'_, TermId, TermInternal> {
        self.terms.values()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            terms: HashMap::with_capacity(DEFAULT_NUM_TERMS),
        }
    }
}
