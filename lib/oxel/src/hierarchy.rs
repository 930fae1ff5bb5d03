//! Compression of a saturated subsumer graph into a frozen hierarchy.
//!
//! Mutual subsumption collapses into equivalence groups keyed by a
//! representative id (the smallest member), and the remaining strict
//! subsumptions are layered into direct parent/child links. The result is
//! immutable and answers the ancestor/descendant query surface.

use crate::graph::DirectedGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

/// A frozen hierarchy over ids of type `N` with equivalence groups and
/// direct parent/child links.
#[derive(Debug, Clone)]
pub struct Hierarchy<N> {
    representative: FxHashMap<N, N>,
    members: FxHashMap<N, Vec<N>>,
    ancestors: FxHashMap<N, FxHashSet<N>>,
    parents: FxHashMap<N, FxHashSet<N>>,
    children: FxHashMap<N, FxHashSet<N>>,
    top: N,
    bottom: N,
}

impl<N: Copy + Eq + Ord + Hash> Hierarchy<N> {
    /// Compresses a subsumer graph restricted to `keep` into a hierarchy.
    ///
    /// `subsumers` edges read "subsumee → subsumer". The graph does not
    /// need to be transitively closed; closure over the kept elements is
    /// recomputed here. `top` and `bottom` are always kept: every element
    /// is placed below `top`, and `bottom` below every element.
    pub fn compress(subsumers: &DirectedGraph<N>, keep: &FxHashSet<N>, top: N, bottom: N) -> Self {
        let mut kept: FxHashSet<N> = keep.clone();
        kept.insert(top);
        kept.insert(bottom);

        // Restricted subsumer sets, reflexive and anchored at top/bottom.
        let mut sups: FxHashMap<N, FxHashSet<N>> = FxHashMap::default();
        for &x in &kept {
            let mut set: FxHashSet<N> = subsumers
                .successors(x)
                .filter(|y| kept.contains(y))
                .collect();
            set.insert(x);
            set.insert(top);
            sups.insert(x, set);
        }
        if let Some(bottom_sups) = sups.get_mut(&bottom) {
            bottom_sups.extend(kept.iter().copied());
        }

        // Transitive closure by repeated relaxation until no change.
        loop {
            let mut changed = false;
            let elements: Vec<N> = sups.keys().copied().collect();
            for x in elements {
                let direct: Vec<N> = sups[&x].iter().copied().collect();
                let mut gained: Vec<N> = Vec::new();
                for y in direct {
                    if y == x {
                        continue;
                    }
                    if let Some(indirect) = sups.get(&y) {
                        for &z in indirect {
                            if !sups[&x].contains(&z) {
                                gained.push(z);
                            }
                        }
                    }
                }
                if !gained.is_empty() {
                    changed = true;
                    if let Some(set) = sups.get_mut(&x) {
                        set.extend(gained);
                    }
                }
            }
            if !changed {
                break;
            }
        }

        // Equivalence groups: mutual subsumption, smallest member as
        // representative.
        let mut representative: FxHashMap<N, N> = FxHashMap::default();
        let mut members: FxHashMap<N, Vec<N>> = FxHashMap::default();
        for &x in &kept {
            let group_min = sups[&x]
                .iter()
                .filter(|y| sups.get(*y).is_some_and(|s| s.contains(&x)))
                .copied()
                .min()
                .unwrap_or(x);
            representative.insert(x, group_min);
            members.entry(group_min).or_default().push(x);
        }
        for group in members.values_mut() {
            group.sort_unstable();
        }

        // Strict ancestors per representative.
        let mut ancestors: FxHashMap<N, FxHashSet<N>> = FxHashMap::default();
        for (&rep, group) in &members {
            let mut strict: FxHashSet<N> = FxHashSet::default();
            for member in group {
                for y in &sups[member] {
                    let y_rep = representative[y];
                    if y_rep != rep {
                        strict.insert(y_rep);
                    }
                }
            }
            ancestors.insert(rep, strict);
        }

        // Direct parents: the minimal strict ancestors.
        let mut parents: FxHashMap<N, FxHashSet<N>> = FxHashMap::default();
        let mut children: FxHashMap<N, FxHashSet<N>> = FxHashMap::default();
        for rep in members.keys() {
            parents.entry(*rep).or_default();
            children.entry(*rep).or_default();
        }
        for (&rep, strict) in &ancestors {
            for &p in strict {
                let has_intermediate = strict
                    .iter()
                    .any(|&q| q != p && ancestors.get(&q).is_some_and(|a| a.contains(&p)));
                if !has_intermediate {
                    parents.entry(rep).or_default().insert(p);
                    children.entry(p).or_default().insert(rep);
                }
            }
        }

        Self {
            representative,
            members,
            ancestors,
            parents,
            children,
            top,
            bottom,
        }
    }

    /// The top element.
    pub fn top(&self) -> N {
        self.top
    }

    /// The bottom element.
    pub fn bottom(&self) -> N {
        self.bottom
    }

    /// Returns true if the element was kept in this hierarchy.
    pub fn contains(&self, x: N) -> bool {
        self.representative.contains_key(&x)
    }

    /// All elements of the hierarchy.
    pub fn elements(&self) -> impl Iterator<Item = N> + '_ {
        self.representative.keys().copied()
    }

    /// The representative of the equivalence group of `x`.
    pub fn representative_of(&self, x: N) -> Option<N> {
        self.representative.get(&x).copied()
    }

    /// All members of the equivalence group of `x`, including `x` itself.
    /// Empty for unknown elements.
    pub fn equivalents(&self, x: N) -> Vec<N> {
        self.representative
            .get(&x)
            .and_then(|rep| self.members.get(rep))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if `x` and `y` are in the same equivalence group.
    pub fn equivalent(&self, x: N, y: N) -> bool {
        match (self.representative.get(&x), self.representative.get(&y)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// The members of the direct parent groups of `x`, sorted.
    pub fn parents(&self, x: N) -> Vec<N> {
        self.expand(self.representative.get(&x).and_then(|rep| self.parents.get(rep)))
    }

    /// The members of the direct child groups of `x`, sorted.
    pub fn children(&self, x: N) -> Vec<N> {
        self.expand(self.representative.get(&x).and_then(|rep| self.children.get(rep)))
    }

    /// The members of all strict ancestor groups of `x`, sorted.
    pub fn ancestors(&self, x: N) -> Vec<N> {
        self.expand(self.representative.get(&x).and_then(|rep| self.ancestors.get(rep)))
    }

    /// The members of all strict descendant groups of `x`, sorted.
    pub fn descendants(&self, x: N) -> Vec<N> {
        let Some(&rep) = self.representative.get(&x) else {
            return Vec::new();
        };
        let mut out: Vec<N> = Vec::new();
        for (&q, strict) in &self.ancestors {
            if strict.contains(&rep) {
                if let Some(group) = self.members.get(&q) {
                    out.extend(group.iter().copied());
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Returns true if `sub ⊑ sup` holds in this hierarchy (equivalence
    /// counts as subsumption).
    pub fn is_subsumed_by(&self, sub: N, sup: N) -> bool {
        let (Some(&sub_rep), Some(&sup_rep)) =
            (self.representative.get(&sub), self.representative.get(&sup))
        else {
            return false;
        };
        sub_rep == sup_rep
            || self
                .ancestors
                .get(&sub_rep)
                .is_some_and(|a| a.contains(&sup_rep))
    }

    fn expand(&self, reps: Option<&FxHashSet<N>>) -> Vec<N> {
        let mut out: Vec<N> = Vec::new();
        if let Some(reps) = reps {
            for rep in reps {
                if let Some(group) = self.members.get(rep) {
                    out.extend(group.iter().copied());
                }
            }
        }
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ClassId;

    fn keep(ids: &[u32]) -> FxHashSet<ClassId> {
        ids.iter().map(|&i| ClassId(i)).collect()
    }

    #[test]
    fn chain_becomes_layers() {
        // 2 ⊑ 3 ⊑ 4, everything below top.
        let mut g = DirectedGraph::new();
        g.add(ClassId(2), ClassId(3));
        g.add(ClassId(3), ClassId(4));
        let h = Hierarchy::compress(&g, &keep(&[2, 3, 4]), ClassId::TOP, ClassId::BOTTOM);
        assert_eq!(h.parents(ClassId(2)), vec![ClassId(3)]);
        assert_eq!(h.parents(ClassId(3)), vec![ClassId(4)]);
        assert_eq!(h.parents(ClassId(4)), vec![ClassId::TOP]);
        assert_eq!(h.children(ClassId(3)), vec![ClassId(2)]);
        assert!(h.is_subsumed_by(ClassId(2), ClassId(4)));
        assert!(!h.is_subsumed_by(ClassId(4), ClassId(2)));
        assert_eq!(
            h.ancestors(ClassId(2)),
            vec![ClassId::TOP, ClassId(3), ClassId(4)]
        );
        // Bottom sits below the single leaf.
        assert_eq!(h.parents(ClassId::BOTTOM), vec![ClassId(2)]);
    }

    #[test]
    fn cycles_collapse_into_equivalence_groups() {
        let mut g = DirectedGraph::new();
        g.add(ClassId(2), ClassId(3));
        g.add(ClassId(3), ClassId(4));
        g.add(ClassId(4), ClassId(2));
        g.add(ClassId(4), ClassId(5));
        let h = Hierarchy::compress(&g, &keep(&[2, 3, 4, 5]), ClassId::TOP, ClassId::BOTTOM);
        assert!(h.equivalent(ClassId(2), ClassId(4)));
        assert_eq!(h.representative_of(ClassId(4)), Some(ClassId(2)));
        assert_eq!(
            h.equivalents(ClassId(3)),
            vec![ClassId(2), ClassId(3), ClassId(4)]
        );
        assert_eq!(h.parents(ClassId(2)), vec![ClassId(5)]);
        assert_eq!(h.descendants(ClassId(5)).first(), Some(&ClassId::BOTTOM));
    }

    #[test]
    fn total_collapse_is_representable() {
        // top ⊑ bottom makes every element equivalent to bottom.
        let mut g = DirectedGraph::new();
        g.add(ClassId::TOP, ClassId::BOTTOM);
        g.add(ClassId(2), ClassId(3));
        let h = Hierarchy::compress(&g, &keep(&[2, 3]), ClassId::TOP, ClassId::BOTTOM);
        assert!(h.equivalent(ClassId(2), ClassId::BOTTOM));
        assert!(h.equivalent(ClassId::TOP, ClassId::BOTTOM));
        assert_eq!(h.equivalents(ClassId::BOTTOM).len(), 4);
        assert!(h.parents(ClassId(2)).is_empty());
    }

    #[test]
    fn unknown_elements_answer_empty() {
        let g = DirectedGraph::new();
        let h = Hierarchy::compress(&g, &keep(&[]), ClassId::TOP, ClassId::BOTTOM);
        assert!(h.equivalents(ClassId(9)).is_empty());
        assert!(h.parents(ClassId(9)).is_empty());
        assert!(!h.is_subsumed_by(ClassId(9), ClassId::TOP));
    }
}
