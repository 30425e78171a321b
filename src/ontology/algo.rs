//! Graph queries over a built [`Ontology`]
//!
//! Every operation is a pure function of `&self`: each call allocates
//! its own visited set and frontier, so concurrent queries never share
//! mutable state. Asking about an identifier that is not in the term
//! map is a normal outcome and yields `false` or an empty set.
use crate::term::{TermId, TermIdSet};
use crate::Ontology;

impl Ontology {
    /// Returns `true` iff a non-empty directed path leads from `from`
    /// to `to` along child → parent edges
    ///
    /// The zero-length path does not count: `exists_path(t, t)` is
    /// `false` for every term of an acyclic ontology.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontograph::{Ontology, TermId};
    ///
    /// let ontology = Ontology::from_obo("tests/small.obo").unwrap();
    /// let root = TermId::try_from("HP:0000001").unwrap();
    /// let morphology = TermId::try_from("HP:0012639").unwrap();
    ///
    /// assert!(ontology.exists_path(&morphology, &root));
    /// assert!(!ontology.exists_path(&root, &morphology));
    /// assert!(!ontology.exists_path(&root, &root));
    /// ```
    pub fn exists_path(&self, from: &TermId, to: &TermId) -> bool {
        let Some(start) = self.arena().get(from) else {
            return false;
        };

        let mut visited = TermIdSet::new();
        let mut frontier: Vec<&TermId> = start.parents().iter().collect();
        while let Some(id) = frontier.pop() {
            if id == to {
                return true;
            }
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(internal) = self.arena().get(id) {
                frontier.extend(internal.parents());
            }
        }
        false
    }

    /// The terms with a direct edge into `term` (one-hop children)
    ///
    /// `term` itself is part of the result when `include_self` is set.
    pub fn child_terms(&self, term: &TermId, include_self: bool) -> TermIdSet {
        let mut result = TermIdSet::new();
        if let Some(internal) = self.arena().get(term) {
            result.extend(internal.children().iter().cloned());
            if include_self {
                result.insert(term.clone());
            }
        }
        result
    }

    /// The one-hop children of every term in `terms`, as one union
    pub fn child_terms_of(&self, terms: &TermIdSet, include_self: bool) -> TermIdSet {
        let mut result = TermIdSet::new();
        for term in terms {
            result.extend(self.child_terms(term, include_self));
        }
        result
    }

    /// The terms `term` has a direct edge to (one-hop parents)
    ///
    /// `term` itself is part of the result when `include_self` is set.
    pub fn parent_terms(&self, term: &TermId, include_self: bool) -> TermIdSet {
        let mut result = TermIdSet::new();
        if let Some(internal) = self.arena().get(term) {
            result.extend(internal.parents().iter().cloned());
            if include_self {
                result.insert(term.clone());
            }
        }
        result
    }

    /// The one-hop parents of every term in `terms`, as one union
    pub fn parent_terms_of(&self, terms: &TermIdSet, include_self: bool) -> TermIdSet {
        let mut result = TermIdSet::new();
        for term in terms {
            result.extend(self.parent_terms(term, include_self));
        }
        result
    }

    /// The transitive closure of parents of `term`
    ///
    /// All terms reachable by following child → parent edges repeatedly;
    /// `term` itself is part of the result when `include_self` is set.
    pub fn ancestor_terms(&self, term: &TermId, include_self: bool) -> TermIdSet {
        let Some(start) = self.arena().get(term) else {
            return TermIdSet::new();
        };

        let mut closure = TermIdSet::new();
        let mut frontier: Vec<&TermId> = start.parents().iter().collect();
        while let Some(id) = frontier.pop() {
            if !closure.insert(id.clone()) {
                continue;
            }
            if let Some(internal) = self.arena().get(id) {
                frontier.extend(internal.parents());
            }
        }
        if include_self {
            closure.insert(term.clone());
        }
        closure
    }

    /// The ancestor closure of `term`, restricted to the sub-ontology
    /// rooted at `new_root`
    ///
    /// `new_root` must be an ancestor of `term` (or `term` itself) for
    /// the result to be non-empty; ancestors above `new_root` are cut
    /// off. When `term` equals `new_root` the result is `{new_root}`,
    /// or empty without `include_self`.
    pub fn ancestor_terms_within(
        &self,
        new_root: &TermId,
        term: &TermId,
        include_self: bool,
    ) -> TermIdSet {
        let mut result = TermIdSet::new();
        if !self.arena().contains(term) {
            return result;
        }
        if term == new_root {
            if include_self {
                result.insert(term.clone());
            }
            return result;
        }

        // no ancestor path can leave the sub-ontology and re-enter it,
        // so the bounded closure is the plain closure intersected with
        // the descendants of the new root
        let sub = self.descendant_terms(new_root);
        if !sub.contains(term) {
            return result;
        }
        for ancestor in self.ancestor_terms(term, include_self) {
            if sub.contains(&ancestor) {
                result.insert(ancestor);
            }
        }
        result
    }

    /// The transitive closure of children of `term`, always including
    /// `term` itself
    pub fn descendant_terms(&self, term: &TermId) -> TermIdSet {
        let mut closure = TermIdSet::new();
        if !self.arena().contains(term) {
            return closure;
        }

        closure.insert(term.clone());
        let mut frontier: Vec<TermId> = vec![term.clone()];
        while let Some(id) = frontier.pop() {
            if let Some(internal) = self.arena().get(&id) {
                for child in internal.children() {
                    if closure.insert(child.clone()) {
                        frontier.push(child.clone());
                    }
                }
            }
        }
        closure
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(s: &str) -> TermId {
        TermId::try_from(s).unwrap()
    }

    fn set(ids: &[&TermId]) -> TermIdSet {
        ids.iter().map(|id| (*id).clone()).collect()
    }

    /// The example graph has id1->id2, id1->id3, id1->id4, id2->id5,
    /// id3->id5, id4->id5; id5 is the pre-existing root
    fn diamond() -> (Ontology, TermId, TermId, TermId, TermId, TermId) {
        let ontology = Ontology::from_obo_str(
            "format-version: 1.2\n\
             \n\
             [Term]\n\
             id: HP:0000001\n\
             name: term1\n\
             is_a: HP:0000002\n\
             is_a: HP:0000003\n\
             is_a: HP:0000004\n\
             \n\
             [Term]\n\
             id: HP:0000002\n\
             name: term2\n\
             is_a: HP:0000005\n\
             \n\
             [Term]\n\
             id: HP:0000003\n\
             name: term3\n\
             is_a: HP:0000005\n\
             \n\
             [Term]\n\
             id: HP:0000004\n\
             name: term4\n\
             is_a: HP:0000005\n\
             \n\
             [Term]\n\
             id: HP:0000005\n\
             name: term5\n",
        )
        .unwrap();
        (
            ontology,
            id("HP:0000001"),
            id("HP:0000002"),
            id("HP:0000003"),
            id("HP:0000004"),
            id("HP:0000005"),
        )
    }

    #[test]
    fn path_exists() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();
        assert_eq!(ontology.root(), &id5);

        assert!(ontology.exists_path(&id1, &id2));
        assert!(!ontology.exists_path(&id2, &id1));
        assert!(ontology.exists_path(&id1, &id3));
        assert!(!ontology.exists_path(&id3, &id1));
        assert!(ontology.exists_path(&id1, &id4));
        assert!(!ontology.exists_path(&id4, &id1));
        assert!(ontology.exists_path(&id1, &id5));
        assert!(!ontology.exists_path(&id5, &id1));
        assert!(ontology.exists_path(&id2, &id5));
        assert!(!ontology.exists_path(&id5, &id2));
        assert!(ontology.exists_path(&id4, &id5));
        assert!(!ontology.exists_path(&id5, &id4));
    }

    #[test]
    fn no_term_has_a_path_to_itself() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();
        for term in [&id1, &id2, &id3, &id4, &id5] {
            assert!(!ontology.exists_path(term, term));
        }
    }

    #[test]
    fn children_of_interior_and_leaf_terms() {
        let (ontology, id1, _, _, id4, _) = diamond();
        // id4 has only one child term, id1: id1->id4
        assert_eq!(ontology.child_terms(&id4, true), set(&[&id4, &id1]));
        // id1 is a leaf term and thus has no children
        assert_eq!(ontology.child_terms(&id1, true), set(&[&id1]));
    }

    #[test]
    fn children_of_the_root() {
        let (ontology, _, id2, id3, id4, id5) = diamond();
        assert_eq!(
            ontology.child_terms(&id5, true),
            set(&[&id2, &id3, &id4, &id5])
        );
        assert_eq!(
            ontology.child_terms(&id5, false),
            set(&[&id2, &id3, &id4])
        );
    }

    #[test]
    fn children_of_a_set() {
        let (ontology, id1, id2, id3, _, _) = diamond();
        let query = set(&[&id2, &id3]);
        assert_eq!(
            ontology.child_terms_of(&query, true),
            set(&[&id1, &id2, &id3])
        );
        assert_eq!(ontology.child_terms_of(&query, false), set(&[&id1]));
    }

    #[test]
    fn parents_of_id2() {
        let (ontology, _, id2, _, _, id5) = diamond();
        assert_eq!(ontology.parent_terms(&id2, true), set(&[&id2, &id5]));
        // only id5 is a parent of id5 (itself, via include_self)
        assert_eq!(ontology.parent_terms(&id5, true), set(&[&id5]));
    }

    #[test]
    fn parents_of_id1() {
        let (ontology, id1, id2, id3, id4, _) = diamond();
        // id5 is an ancestor but not a direct parent of id1
        assert_eq!(
            ontology.parent_terms(&id1, true),
            set(&[&id1, &id2, &id3, &id4])
        );
        assert_eq!(
            ontology.parent_terms(&id1, false),
            set(&[&id2, &id3, &id4])
        );
    }

    #[test]
    fn parents_of_a_set() {
        let (ontology, _, _, id3, id4, id5) = diamond();
        let query = set(&[&id3, &id4]);
        assert_eq!(
            ontology.parent_terms_of(&query, true),
            set(&[&id3, &id4, &id5])
        );
    }

    #[test]
    fn root_has_no_parent() {
        let (ontology, _, _, _, _, id5) = diamond();
        assert_eq!(ontology.parent_terms(&id5, false), TermIdSet::new());
    }

    #[test]
    fn ancestors_of_id1() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();
        assert_eq!(
            ontology.ancestor_terms(&id1, true),
            set(&[&id1, &id2, &id3, &id4, &id5])
        );
        assert_eq!(
            ontology.ancestor_terms(&id1, false),
            set(&[&id2, &id3, &id4, &id5])
        );
    }

    #[test]
    fn term_is_its_own_ancestor_only_with_include_self() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();
        for term in [&id1, &id2, &id3, &id4, &id5] {
            assert!(ontology.ancestor_terms(term, true).contains(term));
            assert!(!ontology.ancestor_terms(term, false).contains(term));
        }
    }

    #[test]
    fn ancestors_within_a_sub_ontology() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();

        // with id5 as the new root the sub-ontology is the whole graph
        assert_eq!(
            ontology.ancestor_terms_within(&id5, &id1, true),
            set(&[&id1, &id2, &id3, &id4, &id5])
        );
        assert_eq!(
            ontology.ancestor_terms_within(&id5, &id1, false),
            set(&[&id2, &id3, &id4, &id5])
        );

        // with id2 as the new root only id1 and id2 remain
        assert_eq!(
            ontology.ancestor_terms_within(&id2, &id1, true),
            set(&[&id1, &id2])
        );
        assert_eq!(
            ontology.ancestor_terms_within(&id2, &id1, false),
            set(&[&id2])
        );
    }

    #[test]
    fn ancestors_within_with_term_equal_to_new_root() {
        let (ontology, _, id2, _, _, _) = diamond();
        assert_eq!(
            ontology.ancestor_terms_within(&id2, &id2, true),
            set(&[&id2])
        );
        assert_eq!(
            ontology.ancestor_terms_within(&id2, &id2, false),
            TermIdSet::new()
        );
    }

    #[test]
    fn ancestors_within_an_unrelated_sub_ontology() {
        let (ontology, _, id2, id3, _, _) = diamond();
        // id2 is not a descendant of id3
        assert_eq!(
            ontology.ancestor_terms_within(&id3, &id2, true),
            TermIdSet::new()
        );
    }

    #[test]
    fn descendants_of_the_root() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();
        assert_eq!(
            ontology.descendant_terms(&id5),
            set(&[&id1, &id2, &id3, &id4, &id5])
        );
        // a leaf has only itself as descendant
        assert_eq!(ontology.descendant_terms(&id1), set(&[&id1]));
    }

    #[test]
    fn ancestors_and_descendants_are_inverse() {
        let (ontology, id1, id2, id3, id4, id5) = diamond();
        let all = [&id1, &id2, &id3, &id4, &id5];
        for a in all {
            let ancestors = ontology.ancestor_terms(a, true);
            for b in all {
                assert_eq!(
                    ancestors.contains(b),
                    ontology.descendant_terms(b).contains(a),
                    "mismatch between ancestors({}) and descendants({})",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn unknown_ids_yield_empty_results() {
        let (ontology, id1, _, _, _, _) = diamond();
        let absent = id("HP:9999999");

        assert!(!ontology.exists_path(&absent, &id1));
        assert!(!ontology.exists_path(&id1, &absent));
        assert!(ontology.child_terms(&absent, true).is_empty());
        assert!(ontology.parent_terms(&absent, true).is_empty());
        assert!(ontology.ancestor_terms(&absent, true).is_empty());
        assert!(ontology.descendant_terms(&absent).is_empty());
        assert!(ontology
            .ancestor_terms_within(&id1, &absent, true)
            .is_empty());
        assert!(ontology
            .ancestor_terms_within(&absent, &id1, true)
            .is_empty());
    }
}
