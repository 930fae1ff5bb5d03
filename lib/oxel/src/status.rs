//! Shared mutable state of a classification run.
//!
//! The status owns the S and R relations, the pending queues feeding them,
//! and the table of synthetic nodes created for inverse and functional
//! reasoning. Every collection sits behind its own mutex so rule
//! evaluation only locks what it touches; a poisoned lock is recovered,
//! since all updates are single insertions that cannot leave a collection
//! half-written.

use crate::graph::{BidirectionalGraph, RelationMap};
use crate::ids::{ClassId, EntityAllocator, PropertyId};
use crate::ontology::ExtendedOntology;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeSet, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The identity of a synthetic node: a base class refined by the
/// existential edges that were merged into it.
///
/// Node contents are interned, so two rule applications arriving at the
/// same content reuse one node id. A node with no existentials is the
/// base class itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VNode {
    base: ClassId,
    existentials: BTreeSet<(PropertyId, ClassId)>,
}

impl VNode {
    /// A node standing for a plain class.
    pub fn atomic(base: ClassId) -> Self {
        Self {
            base,
            existentials: BTreeSet::new(),
        }
    }

    /// A node with explicit existential content.
    pub fn new(base: ClassId, existentials: BTreeSet<(PropertyId, ClassId)>) -> Self {
        Self { base, existentials }
    }

    /// The base class.
    pub fn base(&self) -> ClassId {
        self.base
    }

    /// The existential edges folded into this node.
    pub fn existentials(&self) -> &BTreeSet<(PropertyId, ClassId)> {
        &self.existentials
    }

    /// The node obtained by merging another node's existentials into this
    /// one. Both nodes must share a base.
    pub fn merged_with(&self, other: &VNode) -> Self {
        let mut existentials = self.existentials.clone();
        existentials.extend(other.existentials.iter().copied());
        Self {
            base: self.base,
            existentials,
        }
    }
}

#[derive(Debug, Default)]
struct NodeTable {
    by_content: FxHashMap<VNode, ClassId>,
    by_id: FxHashMap<ClassId, VNode>,
}

/// An asserted subsumption `sub ⊑ sup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SEntry {
    pub sub: ClassId,
    pub sup: ClassId,
}

impl SEntry {
    pub fn new(sub: ClassId, sup: ClassId) -> Self {
        Self { sub, sup }
    }
}

/// An asserted role link `R(property, left, right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct REntry {
    pub property: PropertyId,
    pub left: ClassId,
    pub right: ClassId,
}

impl REntry {
    pub fn new(property: PropertyId, left: ClassId, right: ClassId) -> Self {
        Self {
            property,
            left,
            right,
        }
    }
}

/// A FIFO queue that ignores re-submissions of entries it has ever held.
#[derive(Debug)]
struct PendingQueue<T> {
    queue: VecDeque<T>,
    seen: FxHashSet<T>,
}

impl<T: Copy + Eq + Hash> PendingQueue<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            seen: FxHashSet::default(),
        }
    }

    fn push(&mut self, entry: T) -> bool {
        let fresh = self.seen.insert(entry);
        if fresh {
            self.queue.push_back(entry);
        }
        fresh
    }

    fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// The mutable state of one classification run.
pub struct ClassifierStatus {
    ids: Mutex<EntityAllocator>,
    s: Mutex<BidirectionalGraph<ClassId>>,
    r: Mutex<RelationMap>,
    nodes: Mutex<NodeTable>,
    queue_s: Mutex<PendingQueue<SEntry>>,
    queue_r: Mutex<PendingQueue<REntry>>,
    role_supers: BidirectionalGraph<PropertyId>,
}

impl ClassifierStatus {
    /// Creates the initial state for an ontology: every class is seeded
    /// below itself and top, above bottom, and reflexive properties relate
    /// every class to itself.
    pub fn new(ontology: &ExtendedOntology, ids: EntityAllocator) -> Self {
        let mut role_supers = BidirectionalGraph::new();
        for sub in ontology.role_graph().sources() {
            for sup in ontology.role_graph().successors(sub) {
                role_supers.add(sub, sup);
            }
        }

        let status = Self {
            ids: Mutex::new(ids),
            s: Mutex::new(BidirectionalGraph::new()),
            r: Mutex::new(RelationMap::new()),
            nodes: Mutex::new(NodeTable::default()),
            queue_s: Mutex::new(PendingQueue::new()),
            queue_r: Mutex::new(PendingQueue::new()),
            role_supers,
        };

        let reflexive: Vec<PropertyId> = ontology.reflexive_properties().collect();
        for &class in ontology.classes() {
            // The bottom edge is recorded directly: it feeds hierarchy
            // compression, not the rules.
            status.add_to_s(SEntry::new(ClassId::BOTTOM, class));
            status.suggest_s(SEntry::new(class, class));
            status.suggest_s(SEntry::new(class, ClassId::TOP));
            for &property in &reflexive {
                status.suggest_r(REntry::new(property, class, class));
            }
        }
        status
    }

    /// Records a subsumption. Returns whether it was new.
    pub fn add_to_s(&self, entry: SEntry) -> bool {
        lock(&self.s).add(entry.sub, entry.sup)
    }

    /// Records a role link. Returns whether it was new.
    pub fn add_to_r(&self, entry: REntry) -> bool {
        lock(&self.r).add(entry.property, entry.left, entry.right)
    }

    /// Returns true if `sub ⊑ sup` has been derived.
    pub fn s_contains(&self, sub: ClassId, sup: ClassId) -> bool {
        lock(&self.s).contains(sub, sup)
    }

    /// All derived subsumers of `sub`.
    pub fn subsumers(&self, sub: ClassId) -> Vec<ClassId> {
        lock(&self.s).successors(sub).collect()
    }

    /// All derived subsumees of `sup`.
    pub fn subsumees(&self, sup: ClassId) -> Vec<ClassId> {
        lock(&self.s).predecessors(sup).collect()
    }

    /// The total number of derived subsumptions.
    pub fn s_len(&self) -> usize {
        lock(&self.s).len()
    }

    /// A snapshot of the forward S graph, for compression.
    pub fn s_graph(&self) -> BidirectionalGraph<ClassId> {
        lock(&self.s).clone()
    }

    /// All `y` with `R(property, left, y)`.
    pub fn r_rights(&self, property: PropertyId, left: ClassId) -> Vec<ClassId> {
        lock(&self.r).rights(property, left).collect()
    }

    /// All `x` with `R(property, x, right)`.
    pub fn r_lefts(&self, property: PropertyId, right: ClassId) -> Vec<ClassId> {
        lock(&self.r).lefts(property, right).collect()
    }

    /// All `(property, x)` with `R(property, x, right)`.
    pub fn r_pairs_by_right(&self, right: ClassId) -> Vec<(PropertyId, ClassId)> {
        lock(&self.r).pairs_by_right(right).collect()
    }

    /// Returns true if any property links the two classes either way.
    pub fn r_related(&self, left: ClassId, right: ClassId) -> bool {
        lock(&self.r).related(left, right)
    }

    /// The strict super-properties of `property` under the saturated role
    /// hierarchy.
    pub fn role_supers(&self, property: PropertyId) -> Vec<PropertyId> {
        self.role_supers.successors(property).collect()
    }

    /// Queues a subsumption unless it is already derived or pending.
    pub fn suggest_s(&self, entry: SEntry) -> bool {
        if lock(&self.s).contains(entry.sub, entry.sup) {
            return false;
        }
        lock(&self.queue_s).push(entry)
    }

    /// Queues a role link unless it is already derived or pending.
    pub fn suggest_r(&self, entry: REntry) -> bool {
        if lock(&self.r).contains(entry.property, entry.left, entry.right) {
            return false;
        }
        lock(&self.queue_r).push(entry)
    }

    /// Takes the next pending subsumption.
    pub fn pop_s(&self) -> Option<SEntry> {
        lock(&self.queue_s).pop()
    }

    /// Takes the next pending role link.
    pub fn pop_r(&self) -> Option<REntry> {
        lock(&self.queue_r).pop()
    }

    /// The number of pending subsumptions.
    pub fn pending_s(&self) -> usize {
        lock(&self.queue_s).len()
    }

    /// The number of pending role links.
    pub fn pending_r(&self) -> usize {
        lock(&self.queue_r).len()
    }

    /// Interns a node content, minting an id on first sight.
    ///
    /// A content without existentials is the base class itself and never
    /// allocates. Returns the node id and whether it is new; new nodes are
    /// immediately placed above bottom so hierarchy compression sees them.
    pub fn create_or_get_node(&self, content: VNode) -> (ClassId, bool) {
        if content.existentials().is_empty() {
            return (content.base(), false);
        }
        let mut nodes = lock(&self.nodes);
        if let Some(&id) = nodes.by_content.get(&content) {
            return (id, false);
        }
        let id = lock(&self.ids).next_class_id();
        nodes.by_content.insert(content.clone(), id);
        nodes.by_id.insert(id, content);
        drop(nodes);
        self.add_to_s(SEntry::new(ClassId::BOTTOM, id));
        (id, true)
    }

    /// The content of a synthetic node, if `id` is one.
    pub fn node_content(&self, id: ClassId) -> Option<VNode> {
        lock(&self.nodes).by_id.get(&id).cloned()
    }

    /// The base class of a node: the node itself unless it is synthetic.
    pub fn base_of(&self, id: ClassId) -> ClassId {
        lock(&self.nodes).by_id.get(&id).map_or(id, VNode::base)
    }

    /// The inverse of a property, minting it on first use.
    pub fn inverse_of(&self, property: PropertyId) -> PropertyId {
        lock(&self.ids).inverse_of(property)
    }

    /// Runs a closure against the allocator.
    pub fn with_ids<T>(&self, f: impl FnOnce(&EntityAllocator) -> T) -> T {
        f(&lock(&self.ids))
    }
}

impl std::fmt::Debug for ClassifierStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierStatus")
            .field("s_len", &self.s_len())
            .field("pending_s", &self.pending_s())
            .field("pending_r", &self.pending_r())
            .finish_non_exhaustive()
    }
}
