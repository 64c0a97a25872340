//! Sentences the reader has tagged for focused practice.

use std::collections::BTreeSet;

use tracing::debug;

use crate::passage::{Passage, SentenceId};

/// A set of sentence ids scoped to one passage.
///
/// Only ids that exist in the scoped passage can ever be members, so ids
/// from a previously loaded passage never leak in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    passage_id: Option<String>,
    known: BTreeSet<SentenceId>,
    selected: BTreeSet<SentenceId>,
}

impl SelectionSet {
    /// An unscoped, empty set. Every toggle is rejected until it is scoped.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_passage(passage: &Passage) -> Self {
        let mut set = Self::new();
        set.rescope(passage);
        set
    }

    /// Scope the set to `passage`.
    ///
    /// Membership survives only when it is the same passage, and then only
    /// for ids the passage still contains.
    pub fn rescope(&mut self, passage: &Passage) {
        self.rescope_as(passage.id(), passage);
    }

    /// Like [`SelectionSet::rescope`], keyed by `scope` instead of the
    /// passage's own id. Sessions key by the id the passage was opened
    /// under, which can differ from the id stored in the file.
    pub fn rescope_as(&mut self, scope: &str, passage: &Passage) {
        self.known = passage.sentences().iter().map(|s| s.id()).collect();
        if self.passage_id.as_deref() == Some(scope) {
            let known = &self.known;
            self.selected.retain(|id| known.contains(id));
        } else {
            self.selected.clear();
            self.passage_id = Some(scope.to_string());
        }
    }

    /// Drop membership and scope entirely.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn passage_id(&self) -> Option<&str> {
        self.passage_id.as_deref()
    }

    /// Add `id` if absent, remove it if present.
    ///
    /// Returns `false` and leaves the set untouched when `id` is not a
    /// sentence of the scoped passage.
    pub fn toggle(&mut self, id: SentenceId) -> bool {
        if !self.known.contains(&id) {
            debug!(id, "Ignoring toggle for unknown sentence");
            return false;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        true
    }

    /// Empty the set. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn is_selected(&self, id: SentenceId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SentenceId> + '_ {
        self.selected.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::{Chunk, Sentence};

    fn passage(id: &str, ids: &[SentenceId]) -> Passage {
        let sentences = ids
            .iter()
            .map(|&i| Sentence::new(i, vec![Chunk::new(format!("s{}", i), "")]))
            .collect();
        Passage::new(id, "Title", sentences).unwrap()
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let p = passage("p", &[1, 3, 5]);
        let mut set = SelectionSet::for_passage(&p);
        let before = set.clone();

        assert!(set.toggle(3));
        assert!(set.is_selected(3));
        assert!(set.toggle(3));
        assert_eq!(set, before);
    }

    #[test]
    fn test_toggle_unknown_id_is_rejected() {
        let p = passage("p", &[1, 3, 5]);
        let mut set = SelectionSet::for_passage(&p);
        assert!(!set.toggle(4));
        assert!(!set.is_selected(4));
        assert!(set.is_empty());

        let mut unscoped = SelectionSet::new();
        assert!(!unscoped.toggle(1));
        assert!(unscoped.is_empty());
    }

    #[test]
    fn test_rescope_to_other_passage_clears() {
        let a = passage("a", &[1, 2, 3]);
        let b = passage("b", &[1, 2, 3]);
        let mut set = SelectionSet::for_passage(&a);
        set.toggle(2);

        set.rescope(&b);
        assert!(set.is_empty());
        assert_eq!(set.passage_id(), Some("b"));
    }

    #[test]
    fn test_rescope_same_passage_drops_stale_ids() {
        let a = passage("a", &[1, 2, 3]);
        let mut set = SelectionSet::for_passage(&a);
        set.toggle(1);
        set.toggle(3);

        let revised = passage("a", &[1, 2]);
        set.rescope(&revised);
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![1]);
        assert!(!set.toggle(3));
    }

    #[test]
    fn test_clear_reports_change() {
        let p = passage("p", &[1]);
        let mut set = SelectionSet::for_passage(&p);
        assert!(!set.clear());
        set.toggle(1);
        assert!(set.clear());
        assert!(set.is_empty());
    }
}
