use std::collections::HashMap;
use std::fmt;

use crate::document::{Document, NodeId};

/// Opaque, stable identity for one node instance.
///
/// Used as the list key when reconciling rendered rows across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(u64);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

/// Side table assigning a [`Key`] to each node handle it has seen.
///
/// The registry never owns nodes. Entries for removed nodes stay until they
/// are evicted with [`IdentityRegistry::evict`] or swept with
/// [`IdentityRegistry::retain_live`]. Keys come from a monotonic counter and
/// are never handed out twice, even after eviction.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    keys: HashMap<NodeId, Key>,
    next: u64,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for `node`, allocating a fresh one on first sight.
    pub fn key_for(&mut self, node: NodeId) -> Key {
        *self.keys.entry(node).or_insert_with(|| {
            let key = Key(self.next);
            self.next += 1;
            key
        })
    }

    /// Previously assigned key, without allocating.
    pub fn get(&self, node: NodeId) -> Option<Key> {
        self.keys.get(&node).copied()
    }

    pub fn evict(&mut self, node: NodeId) -> Option<Key> {
        self.keys.remove(&node)
    }

    /// Drop every entry whose node is no longer in `document`. Returns the
    /// number of entries evicted.
    pub fn retain_live(&mut self, document: &Document) -> usize {
        let before = self.keys.len();
        self.keys.retain(|&node, _| document.contains(node));
        let evicted = before - self.keys.len();
        if evicted > 0 {
            log::debug!("evicted {evicted} stale identity keys");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::two_paragraphs;

    #[test]
    fn test_same_instance_same_key() {
        let (doc, paragraphs) = two_paragraphs("a", "b");
        let mut registry = IdentityRegistry::new();

        let first = registry.key_for(paragraphs[0]);
        let second = registry.key_for(paragraphs[0]);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert!(doc.contains(paragraphs[0]));
    }

    #[test]
    fn test_distinct_instances_distinct_keys() {
        let (_doc, paragraphs) = two_paragraphs("same", "same");
        let mut registry = IdentityRegistry::new();

        assert_ne!(
            registry.key_for(paragraphs[0]),
            registry.key_for(paragraphs[1])
        );
    }

    #[test]
    fn test_keys_not_reused_after_eviction() {
        // Given a key that was assigned and then evicted
        let (_doc, paragraphs) = two_paragraphs("a", "b");
        let mut registry = IdentityRegistry::new();
        let evicted = registry.key_for(paragraphs[0]);
        assert_eq!(registry.evict(paragraphs[0]), Some(evicted));

        // When keys are requested again
        let other = registry.key_for(paragraphs[1]);
        let again = registry.key_for(paragraphs[0]);

        // Then no key is handed out twice
        assert_ne!(other, evicted);
        assert_ne!(again, evicted);
        assert_ne!(again, other);
    }

    #[test]
    fn test_retain_live_sweeps_removed_nodes() {
        // Given keys for both paragraphs
        let (mut doc, paragraphs) = two_paragraphs("a", "b");
        let mut registry = IdentityRegistry::new();
        registry.key_for(paragraphs[0]);
        let kept = registry.key_for(paragraphs[1]);

        // When the first paragraph is removed and the registry swept
        let root = doc.root();
        doc.remove_child(root, 0).unwrap();
        let evicted = registry.retain_live(&doc);

        // Then only the live node keeps its key
        assert_eq!(evicted, 1);
        assert_eq!(registry.get(paragraphs[0]), None);
        assert_eq!(registry.get(paragraphs[1]), Some(kept));
    }
}
