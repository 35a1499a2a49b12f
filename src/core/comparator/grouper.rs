//! Groups photos into clusters using transitive relationships.
//!
//! If A matches B and B matches C, then {A, B, C} forms a single group
//! even if A doesn't directly match C.

use super::Edge;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Partition of a batch into duplicate groups and unmatched indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clustering {
    /// Components of size >= 2, ordered by smallest member, members ascending
    pub groups: Vec<Vec<usize>>,
    /// Indices with no edges, ascending
    pub others: Vec<usize>,
}

impl Clustering {
    /// Total number of indices covered by groups and others
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum::<usize>() + self.others.len()
    }

    /// Whether the clustering covers no indices at all
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.others.is_empty()
    }
}

/// Union-find over dense positions, with path halving and union by size
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut root_a, mut root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        if self.size[root_a] < self.size[root_b] {
            std::mem::swap(&mut root_a, &mut root_b);
        }
        self.parent[root_b] = root_a;
        self.size[root_a] += self.size[root_b];
    }
}

/// Groups photos into duplicate clusters using transitive relationships
pub struct TransitiveGrouper;

impl TransitiveGrouper {
    /// Create a new transitive grouper
    pub fn new() -> Self {
        Self
    }

    /// Split `indices` into connected components under `edges`.
    ///
    /// Every index lands in exactly one group or in `others`. Duplicate
    /// indices are collapsed and edges naming unknown indices are ignored.
    pub fn assemble(&self, indices: &[usize], edges: &[Edge]) -> Clustering {
        let mut nodes = indices.to_vec();
        nodes.sort_unstable();
        nodes.dedup();

        let position: HashMap<usize, usize> =
            nodes.iter().enumerate().map(|(pos, &index)| (index, pos)).collect();

        let mut sets = DisjointSet::new(nodes.len());
        for edge in edges {
            if let (Some(&a), Some(&b)) = (position.get(&edge.a), position.get(&edge.b)) {
                sets.union(a, b);
            }
        }

        // Nodes are visited in ascending order, so each component's first
        // member is its smallest and members are pushed ascending.
        let mut component_of_root: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<usize>> = Vec::new();
        for (pos, &index) in nodes.iter().enumerate() {
            let root = sets.find(pos);
            let slot = *component_of_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(index);
        }

        let mut clustering = Clustering::default();
        for members in components {
            if members.len() >= 2 {
                clustering.groups.push(members);
            } else {
                clustering.others.extend(members);
            }
        }

        clustering
    }
}

impl Default for TransitiveGrouper {
    fn default() -> Self {
        Self::new()
    }
}
