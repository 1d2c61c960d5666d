//! A prefix tree over sorted wire-index tuples (§3, "Trie"), used both as a plain set of seen
//! tuples and as a subset-query store: "has some tuple I already recorded become a subset of
//! this (larger) tuple?" is the question the incompressible-tuple store and the failure-dedup
//! trie both need, and both are answered by the same recursive descent.
//!
//! The spec describes a fixed-fan-out array indexed by wire index (`childs_len = universe
//! size`); we use a sparse `hashbrown::HashMap` per node instead; since real tuples only ever
//! touch a small fraction of the circuit's wires at any one node, this trades the spec's O(1)
//! child lookup for O(1) amortized lookup at a fraction of the memory.

use hashbrown::HashMap;

/// Per-input leak flags stored at a trie leaf (§3: "A leaf carries an optional `SecretDep[2]`").
pub type SecretDep = [bool; 2];

#[derive(Default)]
struct TrieNode {
    children: HashMap<usize, Box<TrieNode>>,
    leaked: Option<SecretDep>,
}

/// A trie of wire-index tuples. Construct one per property-driver invocation; it is owned by
/// the parallel driver and dropped once the search returns (§3, "Lifecycles").
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
        }
    }

    /// Inserts `comb` (must be sorted ascending) with the given leak flags. Returns `true` if
    /// this is the first time this exact tuple was inserted — used by the driver to only
    /// increment its shared failure counter on first insertion (§4.7).
    pub fn insert(&mut self, comb: &[usize], leaked: SecretDep) -> bool {
        let mut node = &mut self.root;
        for &wire in comb {
            node = node.children.entry(wire).or_insert_with(|| Box::new(TrieNode::default()));
        }
        if node.leaked.is_some() {
            false
        } else {
            node.leaked = Some(leaked);
            true
        }
    }

    /// Whether `comb` (exactly) was previously inserted.
    pub fn contains(&self, comb: &[usize]) -> bool {
        let mut node = &self.root;
        for &wire in comb {
            match node.children.get(&wire) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.leaked.is_some()
    }

    /// Whether some previously-inserted tuple is a (not necessarily proper) subset of `comb`.
    /// `comb` must be sorted ascending. This is how the incompressible-tuple store tells the
    /// enumerator "skip this tuple, a smaller failure it contains was already recorded".
    pub fn contains_subset(&self, comb: &[usize]) -> bool {
        Self::contains_subset_from(&self.root, comb, 0)
    }

    fn contains_subset_from(node: &TrieNode, comb: &[usize], start: usize) -> bool {
        if node.leaked.is_some() {
            return true;
        }
        for i in start..comb.len() {
            if let Some(child) = node.children.get(&comb[i]) {
                if Self::contains_subset_from(child, comb, i + 1) {
                    return true;
                }
            }
        }
        false
    }

    /// Merges `other` into `self`, keeping the first-seen leak flags on conflicts. Used to
    /// combine per-worker incompressible-tuple tries gathered during reconstruction.
    pub fn merge(&mut self, other: &Trie) {
        Self::merge_into(&mut self.root, &other.root);
    }

    fn merge_into(dst: &mut TrieNode, src: &TrieNode) {
        if dst.leaked.is_none() {
            dst.leaked = src.leaked;
        }
        for (wire, child) in &src.children {
            let entry = dst.children.entry(*wire).or_insert_with(|| Box::new(TrieNode::default()));
            Self::merge_into(entry, child);
        }
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_first_insertion_only() {
        let mut trie = Trie::new();
        assert!(trie.insert(&[1, 3, 5], [true, false]));
        assert!(!trie.insert(&[1, 3, 5], [true, false]));
    }

    #[test]
    fn contains_subset_finds_a_recorded_prefix_subsequence() {
        let mut trie = Trie::new();
        trie.insert(&[1, 3], [true, false]);
        assert!(trie.contains_subset(&[0, 1, 2, 3, 4]));
        assert!(!trie.contains_subset(&[0, 1, 2, 4]));
    }

    #[test]
    fn merge_keeps_first_seen_leak_flags() {
        let mut a = Trie::new();
        a.insert(&[2], [true, false]);
        let mut b = Trie::new();
        b.insert(&[2], [false, true]);
        b.insert(&[5], [true, true]);
        a.merge(&b);
        assert!(a.contains(&[2]));
        assert!(a.contains(&[5]));
    }
}
