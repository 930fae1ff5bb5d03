//! Append-only graph primitives backing the S and R relations.
//!
//! Edges are only ever added, never removed; pruning happens once, after
//! saturation, when the graphs are compressed into hierarchies.

use crate::ids::{ClassId, PropertyId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

/// A single-direction append-only graph.
#[derive(Debug, Clone)]
pub struct DirectedGraph<N> {
    edges: FxHashMap<N, FxHashSet<N>>,
    len: usize,
}

impl<N: Copy + Eq + Hash> DirectedGraph<N> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            edges: FxHashMap::default(),
            len: 0,
        }
    }

    /// Adds an edge and returns whether it was new.
    pub fn add(&mut self, from: N, to: N) -> bool {
        let added = self.edges.entry(from).or_default().insert(to);
        if added {
            self.len += 1;
        }
        added
    }

    /// Returns true if the edge is present.
    pub fn contains(&self, from: N, to: N) -> bool {
        self.edges.get(&from).is_some_and(|s| s.contains(&to))
    }

    /// The targets of all edges leaving `from`. Empty for unknown nodes.
    pub fn successors(&self, from: N) -> impl Iterator<Item = N> + '_ {
        self.edges.get(&from).into_iter().flatten().copied()
    }

    /// The number of successors of `from`.
    pub fn successor_count(&self, from: N) -> usize {
        self.edges.get(&from).map_or(0, FxHashSet::len)
    }

    /// All nodes with at least one outgoing edge.
    pub fn sources(&self) -> impl Iterator<Item = N> + '_ {
        self.edges.keys().copied()
    }

    /// The number of edges.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<N: Copy + Eq + Hash> Default for DirectedGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed graph indexed in both directions.
#[derive(Debug, Clone)]
pub struct BidirectionalGraph<N> {
    forward: DirectedGraph<N>,
    backward: DirectedGraph<N>,
}

impl<N: Copy + Eq + Hash> BidirectionalGraph<N> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            forward: DirectedGraph::new(),
            backward: DirectedGraph::new(),
        }
    }

    /// Adds an edge and returns whether it was new.
    pub fn add(&mut self, from: N, to: N) -> bool {
        let added = self.forward.add(from, to);
        if added {
            self.backward.add(to, from);
        }
        added
    }

    /// Returns true if the edge is present.
    pub fn contains(&self, from: N, to: N) -> bool {
        self.forward.contains(from, to)
    }

    /// The targets of all edges leaving `from`.
    pub fn successors(&self, from: N) -> impl Iterator<Item = N> + '_ {
        self.forward.successors(from)
    }

    /// The sources of all edges arriving at `to`.
    pub fn predecessors(&self, to: N) -> impl Iterator<Item = N> + '_ {
        self.backward.successors(to)
    }

    /// The number of successors of `from`.
    pub fn successor_count(&self, from: N) -> usize {
        self.forward.successor_count(from)
    }

    /// The forward half of the graph.
    pub fn forward(&self) -> &DirectedGraph<N> {
        &self.forward
    }

    /// The number of edges.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns true if the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

impl<N: Copy + Eq + Hash> Default for BidirectionalGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The R relation: one binary relation over classes per property, with
/// reverse indices so the completion rules never rescan.
#[derive(Debug, Clone, Default)]
pub struct RelationMap {
    len: usize,
    rights_by_key: FxHashMap<(PropertyId, ClassId), FxHashSet<ClassId>>,
    lefts_by_key: FxHashMap<(PropertyId, ClassId), FxHashSet<ClassId>>,
    pairs_by_left: FxHashMap<ClassId, FxHashSet<(PropertyId, ClassId)>>,
    pairs_by_right: FxHashMap<ClassId, FxHashSet<(PropertyId, ClassId)>>,
}

impl RelationMap {
    /// Creates an empty relation map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `R(property, left, right)` and returns whether it was new.
    pub fn add(&mut self, property: PropertyId, left: ClassId, right: ClassId) -> bool {
        let added = self
            .rights_by_key
            .entry((property, left))
            .or_default()
            .insert(right);
        if added {
            self.lefts_by_key
                .entry((property, right))
                .or_default()
                .insert(left);
            self.pairs_by_left
                .entry(left)
                .or_default()
                .insert((property, right));
            self.pairs_by_right
                .entry(right)
                .or_default()
                .insert((property, left));
            self.len += 1;
        }
        added
    }

    /// Returns true if `R(property, left, right)` is present.
    pub fn contains(&self, property: PropertyId, left: ClassId, right: ClassId) -> bool {
        self.rights_by_key
            .get(&(property, left))
            .is_some_and(|s| s.contains(&right))
    }

    /// All `y` with `R(property, left, y)`.
    pub fn rights(&self, property: PropertyId, left: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.rights_by_key
            .get(&(property, left))
            .into_iter()
            .flatten()
            .copied()
    }

    /// All `x` with `R(property, x, right)`.
    pub fn lefts(&self, property: PropertyId, right: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.lefts_by_key
            .get(&(property, right))
            .into_iter()
            .flatten()
            .copied()
    }

    /// All `(property, y)` with `R(property, left, y)`.
    pub fn pairs_by_left(&self, left: ClassId) -> impl Iterator<Item = (PropertyId, ClassId)> + '_ {
        self.pairs_by_left.get(&left).into_iter().flatten().copied()
    }

    /// All `(property, x)` with `R(property, x, right)`.
    pub fn pairs_by_right(&self, right: ClassId) -> impl Iterator<Item = (PropertyId, ClassId)> + '_ {
        self.pairs_by_right
            .get(&right)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Returns true if any property relates `left` to `right`, in either
    /// direction.
    pub fn related(&self, left: ClassId, right: ClassId) -> bool {
        self.pairs_by_left
            .get(&left)
            .is_some_and(|s| s.iter().any(|(_, y)| *y == right))
            || self
                .pairs_by_left
                .get(&right)
                .is_some_and(|s| s.iter().any(|(_, y)| *y == left))
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the relation is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
