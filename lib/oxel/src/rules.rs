//! The completion rules and their assembly into a rule chain.
//!
//! Each rule is a pure function from one freshly committed S or R entry to
//! the entries it forces. The chain is assembled once per run from the
//! ontology's expressivity, so ontologies without inverses, functionality
//! or bottom never evaluate the rules those features need.

use crate::ids::ClassId;
use crate::ontology::{Expressivity, ExtendedOntology};
use crate::status::{ClassifierStatus, REntry, SEntry, VNode};

/// An entry forced by a rule application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    S(SEntry),
    R(REntry),
}

type SRule = fn(&ExtendedOntology, &ClassifierStatus, SEntry) -> Vec<Change>;
type RRule = fn(&ExtendedOntology, &ClassifierStatus, REntry) -> Vec<Change>;

/// The rules active for one classification run.
#[derive(Debug, Clone)]
pub struct RuleChain {
    s_rules: Vec<SRule>,
    r_rules: Vec<RRule>,
}

impl RuleChain {
    /// Assembles the chain for the given language features.
    pub fn for_expressivity(expressivity: Expressivity) -> Self {
        let mut s_rules: Vec<SRule> = vec![cr1_told_subsumers, cr2_conjunctions];
        s_rules.push(if expressivity.has_inverse {
            cr3_existentials_with_witness
        } else {
            cr3_existentials
        });
        s_rules.push(cr4_filler_subsumption_from_s);

        let mut r_rules: Vec<RRule> = vec![
            cr4_filler_subsumption_from_r,
            cr5_role_hierarchy,
            cr6_role_chains,
            range_restriction,
        ];
        if expressivity.has_inverse {
            r_rules.push(cr7_inverse_links);
        }
        if expressivity.has_functional {
            r_rules.push(cr8_functional_merge);
            r_rules.push(cr9_witness_fusion);
        }
        if expressivity.has_bottom {
            s_rules.push(bottom_from_subsumption);
            r_rules.push(bottom_from_link);
        }

        Self { s_rules, r_rules }
    }

    /// Applies every S rule to a committed subsumption.
    pub fn apply_s(
        &self,
        ontology: &ExtendedOntology,
        status: &ClassifierStatus,
        entry: SEntry,
    ) -> Vec<Change> {
        let mut changes = Vec::new();
        for rule in &self.s_rules {
            changes.extend(rule(ontology, status, entry));
        }
        changes
    }

    /// Applies every R rule to a committed role link.
    pub fn apply_r(
        &self,
        ontology: &ExtendedOntology,
        status: &ClassifierStatus,
        entry: REntry,
    ) -> Vec<Change> {
        let mut changes = Vec::new();
        for rule in &self.r_rules {
            changes.extend(rule(ontology, status, entry));
        }
        changes
    }
}

/// CR1: `S(x, a)` and `a ⊑ b` force `S(x, b)`.
fn cr1_told_subsumers(
    ontology: &ExtendedOntology,
    _status: &ClassifierStatus,
    entry: SEntry,
) -> Vec<Change> {
    ontology
        .gci0_sups(entry.sup)
        .iter()
        .map(|&sup| Change::S(SEntry::new(entry.sub, sup)))
        .collect()
}

/// CR2: `S(x, a)`, `S(x, b)` and `a ⊓ b ⊑ c` force `S(x, c)`.
fn cr2_conjunctions(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: SEntry,
) -> Vec<Change> {
    let mut changes = Vec::new();
    for &(left, right, sup) in ontology.gci1_with_operand(entry.sup) {
        let other = if entry.sup == left { right } else { left };
        if status.s_contains(entry.sub, other) {
            changes.push(Change::S(SEntry::new(entry.sub, sup)));
        }
    }
    changes
}

/// CR3: `S(x, a)` and `a ⊑ ∃r.b` force `R(r, x, b)`.
fn cr3_existentials(
    ontology: &ExtendedOntology,
    _status: &ClassifierStatus,
    entry: SEntry,
) -> Vec<Change> {
    ontology
        .gci2_under(entry.sup)
        .iter()
        .map(|&(property, filler)| Change::R(REntry::new(property, entry.sub, filler)))
        .collect()
}

/// CR3 with inverses: the existential target is a witness node that
/// remembers the inverse edge back to the subject.
///
/// The witness content uses the subject's base class rather than the
/// subject itself, so the set of reachable contents stays finite on cyclic
/// axioms.
fn cr3_existentials_with_witness(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: SEntry,
) -> Vec<Change> {
    let mut changes = Vec::new();
    for &(property, filler) in ontology.gci2_under(entry.sup) {
        let back = (status.inverse_of(property), status.base_of(entry.sub));
        let content = VNode::new(filler, [back].into_iter().collect());
        let (witness, is_new) = status.create_or_get_node(content.clone());
        changes.push(Change::R(REntry::new(property, entry.sub, witness)));
        if is_new {
            changes.push(Change::S(SEntry::new(witness, witness)));
            changes.push(Change::S(SEntry::new(witness, ClassId::TOP)));
            changes.push(Change::S(SEntry::new(witness, filler)));
            for &(p, target) in content.existentials() {
                changes.push(Change::R(REntry::new(p, witness, target)));
            }
        }
    }
    changes
}

/// CR4, S side: `S(x, a)`, `R(r, y, x)` and `∃r.a ⊑ b` force `S(y, b)`.
fn cr4_filler_subsumption_from_s(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: SEntry,
) -> Vec<Change> {
    let mut changes = Vec::new();
    for &(property, sup) in ontology.gci3_with_filler(entry.sup) {
        for left in status.r_lefts(property, entry.sub) {
            changes.push(Change::S(SEntry::new(left, sup)));
        }
    }
    changes
}

/// CR4, R side: `R(r, x, y)`, `S(y, a)` and `∃r.a ⊑ b` force `S(x, b)`.
fn cr4_filler_subsumption_from_r(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    let mut changes = Vec::new();
    for filler in status.subsumers(entry.right) {
        for &sup in ontology.gci3_sups(entry.property, filler) {
            changes.push(Change::S(SEntry::new(entry.left, sup)));
        }
    }
    changes
}

/// CR5: `R(r, x, y)` and `r ⊑ s` force `R(s, x, y)`.
fn cr5_role_hierarchy(
    _ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    status
        .role_supers(entry.property)
        .into_iter()
        .map(|sup| Change::R(REntry::new(sup, entry.left, entry.right)))
        .collect()
}

/// CR6: `R(l, x, y)`, `R(m, y, z)` and `l ∘ m ⊑ t` force `R(t, x, z)`,
/// matching the committed link against both chain positions.
fn cr6_role_chains(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    let mut changes = Vec::new();
    for &(second, sup) in ontology.chains_with_left(entry.property) {
        for target in status.r_rights(second, entry.right) {
            changes.push(Change::R(REntry::new(sup, entry.left, target)));
        }
    }
    for &(first, sup) in ontology.chains_with_right(entry.property) {
        for source in status.r_lefts(first, entry.left) {
            changes.push(Change::R(REntry::new(sup, source, entry.right)));
        }
    }
    changes
}

/// `R(r, x, y)` and `range(r) ⊆ a` force `S(y, a)`.
fn range_restriction(
    ontology: &ExtendedOntology,
    _status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    ontology
        .ranges(entry.property)
        .iter()
        .map(|&range| Change::S(SEntry::new(entry.right, range)))
        .collect()
}

/// CR7: `R(r, x, y)` forces `R(r⁻, y, x)`.
fn cr7_inverse_links(
    _ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    vec![Change::R(REntry::new(
        status.inverse_of(entry.property),
        entry.right,
        entry.left,
    ))]
}

/// CR8: two fillers of one functional edge subsume each other.
fn cr8_functional_merge(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    if !ontology.is_functional(entry.property) {
        return Vec::new();
    }
    let mut changes = Vec::new();
    for other in status.r_rights(entry.property, entry.left) {
        if other != entry.right {
            changes.push(Change::S(SEntry::new(entry.right, other)));
            changes.push(Change::S(SEntry::new(other, entry.right)));
        }
    }
    changes
}

/// CR9: two same-base fillers of one functional edge fuse into a single
/// witness carrying the union of their existential content.
fn cr9_witness_fusion(
    ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    if !ontology.is_functional(entry.property) {
        return Vec::new();
    }
    let right_content = status
        .node_content(entry.right)
        .unwrap_or_else(|| VNode::atomic(entry.right));
    let mut changes = Vec::new();
    for other in status.r_rights(entry.property, entry.left) {
        if other == entry.right || status.base_of(other) != right_content.base() {
            continue;
        }
        let other_content = status
            .node_content(other)
            .unwrap_or_else(|| VNode::atomic(other));
        let merged = right_content.merged_with(&other_content);
        let (fused, is_new) = status.create_or_get_node(merged.clone());
        changes.push(Change::R(REntry::new(entry.property, entry.left, fused)));
        for node in [entry.right, other] {
            if node != fused {
                changes.push(Change::S(SEntry::new(node, fused)));
                changes.push(Change::S(SEntry::new(fused, node)));
            }
        }
        if is_new {
            changes.push(Change::S(SEntry::new(fused, fused)));
            changes.push(Change::S(SEntry::new(fused, ClassId::TOP)));
            changes.push(Change::S(SEntry::new(fused, merged.base())));
            for &(p, target) in merged.existentials() {
                changes.push(Change::R(REntry::new(p, fused, target)));
            }
        }
    }
    changes
}

/// Unsatisfiability flows backwards over role links: `S(y, ⊥)` and
/// `R(r, x, y)` force `S(x, ⊥)`.
fn bottom_from_subsumption(
    _ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: SEntry,
) -> Vec<Change> {
    if entry.sup != ClassId::BOTTOM {
        return Vec::new();
    }
    status
        .r_pairs_by_right(entry.sub)
        .into_iter()
        .map(|(_, left)| Change::S(SEntry::new(left, ClassId::BOTTOM)))
        .collect()
}

/// The R-side half of bottom propagation, for links that arrive after the
/// filler is already unsatisfiable.
fn bottom_from_link(
    _ontology: &ExtendedOntology,
    status: &ClassifierStatus,
    entry: REntry,
) -> Vec<Change> {
    if status.s_contains(entry.right, ClassId::BOTTOM) {
        vec![Change::S(SEntry::new(entry.left, ClassId::BOTTOM))]
    } else {
        Vec::new()
    }
}
