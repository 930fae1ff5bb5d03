//! The indexed axiom store the completion rules run against.
//!
//! Loading saturates the role axioms up front (inverses of role
//! inclusions and chains, transitivity of the role hierarchy,
//! functionality of sub-roles) and builds per-shape indices so that every
//! rule application is a hash lookup, never a scan.

use crate::axiom::{NormalForm, NormalizedAxiom};
use crate::graph::DirectedGraph;
use crate::ids::{ClassId, EntityAllocator, IndividualId, PropertyId};
use rustc_hash::{FxHashMap, FxHashSet};

/// The language features the loaded ontology actually uses.
///
/// The rule chain is assembled from this, so ontologies that stay in plain
/// EL never pay for inverse, functionality or bottom handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Expressivity {
    /// Some property has an inverse.
    pub has_inverse: bool,
    /// Some property is functional.
    pub has_functional: bool,
    /// `owl:Nothing` occurs, directly or through nominals.
    pub has_bottom: bool,
    /// Some individual occurs in a class position.
    pub has_nominal: bool,
}

/// A normalized ontology with saturated role axioms and lookup indices.
#[derive(Debug, Clone)]
pub struct ExtendedOntology {
    axioms: Vec<NormalizedAxiom>,
    expressivity: Expressivity,
    classes: FxHashSet<ClassId>,
    properties: FxHashSet<PropertyId>,
    individuals: FxHashSet<IndividualId>,
    nominal_by_individual: FxHashMap<IndividualId, ClassId>,
    nominal_classes: FxHashSet<ClassId>,
    gci0_by_sub: FxHashMap<ClassId, Vec<ClassId>>,
    gci1_by_operand: FxHashMap<ClassId, Vec<(ClassId, ClassId, ClassId)>>,
    gci2_by_sub: FxHashMap<ClassId, Vec<(PropertyId, ClassId)>>,
    gci3_by_key: FxHashMap<(PropertyId, ClassId), Vec<ClassId>>,
    gci3_by_filler: FxHashMap<ClassId, Vec<(PropertyId, ClassId)>>,
    range_by_property: FxHashMap<PropertyId, Vec<ClassId>>,
    chains_by_left: FxHashMap<PropertyId, Vec<(PropertyId, PropertyId)>>,
    chains_by_right: FxHashMap<PropertyId, Vec<(PropertyId, PropertyId)>>,
    role_graph: DirectedGraph<PropertyId>,
    functional: FxHashSet<PropertyId>,
    reflexive: FxHashSet<PropertyId>,
}

impl ExtendedOntology {
    /// Loads normalized axioms, saturating the role box and building all
    /// rule indices.
    pub fn load(normalized: Vec<NormalizedAxiom>, ids: &mut EntityAllocator) -> Self {
        // Whether inverses are in play is decided by the input, before
        // saturation mints any inverse ids of its own.
        let has_inverse = ids.has_inverses();

        let mut classes: FxHashSet<ClassId> = FxHashSet::default();
        classes.insert(ClassId::BOTTOM);
        classes.insert(ClassId::TOP);
        let mut properties: FxHashSet<PropertyId> = FxHashSet::default();
        let mut individuals: FxHashSet<IndividualId> = FxHashSet::default();
        let mut nominal_by_individual: FxHashMap<IndividualId, ClassId> = FxHashMap::default();
        let mut nominal_classes: FxHashSet<ClassId> = FxHashSet::default();

        let mut sub_properties: FxHashSet<(PropertyId, PropertyId)> = FxHashSet::default();
        let mut chains: FxHashSet<(PropertyId, PropertyId, PropertyId)> = FxHashSet::default();
        let mut functional: FxHashSet<PropertyId> = FxHashSet::default();
        let mut reflexive: FxHashSet<PropertyId> = FxHashSet::default();

        let mut has_bottom = false;
        let mut has_nominal = false;

        for axiom in &normalized {
            for class in axiom.form.classes_in_signature() {
                if class == ClassId::BOTTOM {
                    has_bottom = true;
                }
                classes.insert(class);
            }
            for property in axiom.form.properties_in_signature() {
                properties.insert(property);
            }
            match axiom.form {
                NormalForm::SubProperty { sub, sup } => {
                    sub_properties.insert((sub, sup));
                }
                NormalForm::PropertyChain { left, right, sup } => {
                    chains.insert((left, right, sup));
                }
                NormalForm::Functional { property } => {
                    functional.insert(property);
                }
                NormalForm::Reflexive { property } => {
                    reflexive.insert(property);
                }
                NormalForm::Nominal { class, individual } => {
                    has_nominal = true;
                    individuals.insert(individual);
                    nominal_by_individual.insert(individual, class);
                    nominal_classes.insert(class);
                }
                _ => {}
            }
        }
        // A nominal class can become unsatisfiable, so nominals force
        // bottom handling on.
        has_bottom |= has_nominal;

        // Role saturation. Inverses of role inclusions and transitivity of
        // the hierarchy interact, so they run to a joint fixpoint; the
        // inverse map is an involution, so no new properties appear after
        // the first pass and the fixpoint is finite.
        loop {
            let mut gained: Vec<(PropertyId, PropertyId)> = Vec::new();
            if has_inverse {
                for &(sub, sup) in &sub_properties {
                    let candidate = (ids.inverse_of(sub), ids.inverse_of(sup));
                    if !sub_properties.contains(&candidate) {
                        gained.push(candidate);
                    }
                }
            }
            for &(a, b) in &sub_properties {
                for &(c, d) in &sub_properties {
                    if b == c && a != d && !sub_properties.contains(&(a, d)) {
                        gained.push((a, d));
                    }
                }
            }
            if gained.is_empty() {
                break;
            }
            sub_properties.extend(gained);
        }

        // Inverses of chains: l ∘ m ⊑ t entails m⁻ ∘ l⁻ ⊑ t⁻.
        if has_inverse {
            let original: Vec<_> = chains.iter().copied().collect();
            for (left, right, sup) in original {
                chains.insert((
                    ids.inverse_of(right),
                    ids.inverse_of(left),
                    ids.inverse_of(sup),
                ));
            }
        }

        // Functionality flows down the role hierarchy.
        let inherited: Vec<PropertyId> = sub_properties
            .iter()
            .filter(|(sub, sup)| functional.contains(sup) && !functional.contains(sub))
            .map(|&(sub, _)| sub)
            .collect();
        functional.extend(inherited);

        let has_functional = !functional.is_empty();

        // Saturation may have minted inverse properties; record them.
        for &(sub, sup) in &sub_properties {
            properties.insert(sub);
            properties.insert(sup);
        }
        for &(left, right, sup) in &chains {
            properties.insert(left);
            properties.insert(right);
            properties.insert(sup);
        }

        let mut role_graph = DirectedGraph::new();
        for &(sub, sup) in &sub_properties {
            if sub != sup {
                role_graph.add(sub, sup);
            }
        }

        // Per-shape indices.
        let mut gci0_by_sub: FxHashMap<ClassId, Vec<ClassId>> = FxHashMap::default();
        let mut gci1_by_operand: FxHashMap<ClassId, Vec<(ClassId, ClassId, ClassId)>> =
            FxHashMap::default();
        let mut gci2_by_sub: FxHashMap<ClassId, Vec<(PropertyId, ClassId)>> = FxHashMap::default();
        let mut gci3_by_key: FxHashMap<(PropertyId, ClassId), Vec<ClassId>> = FxHashMap::default();
        let mut gci3_by_filler: FxHashMap<ClassId, Vec<(PropertyId, ClassId)>> =
            FxHashMap::default();
        let mut range_by_property: FxHashMap<PropertyId, Vec<ClassId>> = FxHashMap::default();

        for axiom in &normalized {
            match axiom.form {
                NormalForm::Gci0 { sub, sup } => {
                    gci0_by_sub.entry(sub).or_default().push(sup);
                }
                NormalForm::Gci1 { left, right, sup } => {
                    gci1_by_operand
                        .entry(left)
                        .or_default()
                        .push((left, right, sup));
                    if left != right {
                        gci1_by_operand
                            .entry(right)
                            .or_default()
                            .push((left, right, sup));
                    }
                }
                NormalForm::Gci2 {
                    sub,
                    property,
                    filler,
                } => {
                    gci2_by_sub.entry(sub).or_default().push((property, filler));
                }
                NormalForm::Gci3 {
                    property,
                    filler,
                    sup,
                } => {
                    gci3_by_key.entry((property, filler)).or_default().push(sup);
                    gci3_by_filler
                        .entry(filler)
                        .or_default()
                        .push((property, sup));
                }
                NormalForm::Range { property, range } => {
                    range_by_property.entry(property).or_default().push(range);
                }
                NormalForm::Nominal { class, .. } => {
                    // The nominal class is non-empty, which the engine
                    // reads off its seed subsumptions, not an index.
                    classes.insert(class);
                }
                NormalForm::Reflexive { .. }
                | NormalForm::SubProperty { .. }
                | NormalForm::PropertyChain { .. }
                | NormalForm::Functional { .. } => {}
            }
        }

        let mut chains_by_left: FxHashMap<PropertyId, Vec<(PropertyId, PropertyId)>> =
            FxHashMap::default();
        let mut chains_by_right: FxHashMap<PropertyId, Vec<(PropertyId, PropertyId)>> =
            FxHashMap::default();
        for &(left, right, sup) in &chains {
            chains_by_left.entry(left).or_default().push((right, sup));
            chains_by_right.entry(right).or_default().push((left, sup));
        }

        Self {
            axioms: normalized,
            expressivity: Expressivity {
                has_inverse,
                has_functional,
                has_bottom,
                has_nominal,
            },
            classes,
            properties,
            individuals,
            nominal_by_individual,
            nominal_classes,
            gci0_by_sub,
            gci1_by_operand,
            gci2_by_sub,
            gci3_by_key,
            gci3_by_filler,
            range_by_property,
            chains_by_left,
            chains_by_right,
            role_graph,
            functional,
            reflexive,
        }
    }

    /// The normalized axioms the ontology was loaded from.
    pub fn axioms(&self) -> &[NormalizedAxiom] {
        &self.axioms
    }

    /// The language features in use.
    pub fn expressivity(&self) -> Expressivity {
        self.expressivity
    }

    /// All classes in the signature, always including top and bottom.
    pub fn classes(&self) -> &FxHashSet<ClassId> {
        &self.classes
    }

    /// All object properties in the signature.
    pub fn properties(&self) -> &FxHashSet<PropertyId> {
        &self.properties
    }

    /// All named individuals.
    pub fn individuals(&self) -> &FxHashSet<IndividualId> {
        &self.individuals
    }

    /// The nominal class of an individual, if it occurs in the ontology.
    pub fn nominal_class_of(&self, individual: IndividualId) -> Option<ClassId> {
        self.nominal_by_individual.get(&individual).copied()
    }

    /// All classes that stand for a nominal.
    pub fn nominal_classes(&self) -> &FxHashSet<ClassId> {
        &self.nominal_classes
    }

    /// All `B` with `sub ⊑ B`.
    pub fn gci0_sups(&self, sub: ClassId) -> &[ClassId] {
        self.gci0_by_sub.get(&sub).map_or(&[], Vec::as_slice)
    }

    /// All conjunction axioms `(left, right, sup)` mentioning `operand` on
    /// the left side.
    pub fn gci1_with_operand(&self, operand: ClassId) -> &[(ClassId, ClassId, ClassId)] {
        self.gci1_by_operand.get(&operand).map_or(&[], Vec::as_slice)
    }

    /// All `(r, B)` with `sub ⊑ ∃r.B`.
    pub fn gci2_under(&self, sub: ClassId) -> &[(PropertyId, ClassId)] {
        self.gci2_by_sub.get(&sub).map_or(&[], Vec::as_slice)
    }

    /// All `B` with `∃property.filler ⊑ B`.
    pub fn gci3_sups(&self, property: PropertyId, filler: ClassId) -> &[ClassId] {
        self.gci3_by_key
            .get(&(property, filler))
            .map_or(&[], Vec::as_slice)
    }

    /// All `(r, B)` with `∃r.filler ⊑ B`.
    pub fn gci3_with_filler(&self, filler: ClassId) -> &[(PropertyId, ClassId)] {
        self.gci3_by_filler.get(&filler).map_or(&[], Vec::as_slice)
    }

    /// All `A` with `range(property) ⊆ A`.
    pub fn ranges(&self, property: PropertyId) -> &[ClassId] {
        self.range_by_property
            .get(&property)
            .map_or(&[], Vec::as_slice)
    }

    /// All `(m, t)` with `property ∘ m ⊑ t`.
    pub fn chains_with_left(&self, property: PropertyId) -> &[(PropertyId, PropertyId)] {
        self.chains_by_left.get(&property).map_or(&[], Vec::as_slice)
    }

    /// All `(l, t)` with `l ∘ property ⊑ t`.
    pub fn chains_with_right(&self, property: PropertyId) -> &[(PropertyId, PropertyId)] {
        self.chains_by_right
            .get(&property)
            .map_or(&[], Vec::as_slice)
    }

    /// The transitively closed strict role hierarchy.
    pub fn role_graph(&self) -> &DirectedGraph<PropertyId> {
        &self.role_graph
    }

    /// Returns true if the property is functional, directly or through a
    /// super-role.
    pub fn is_functional(&self, property: PropertyId) -> bool {
        self.functional.contains(&property)
    }

    /// All reflexive properties.
    pub fn reflexive_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.reflexive.iter().copied()
    }
}
