//! Integer identifiers for classes, object properties and individuals,
//! and the run-scoped allocator that mints fresh ones.
//!
//! Identifiers are dense non-negative integers. Ids below the allocator's
//! offset are "original" (they came from the source ontology); ids at or
//! above it are auxiliary, created during normalization or completion.
//! The allocator is monotone: auxiliary ids are never reused.

use rustc_hash::FxHashMap;
use std::fmt;

/// A class identifier.
///
/// The translation layer must reserve id 0 for `owl:Nothing` and id 1 for
/// `owl:Thing`; every other original class starts at 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

impl ClassId {
    /// The unsatisfiable class (`owl:Nothing`).
    pub const BOTTOM: Self = Self(0);
    /// The universal class (`owl:Thing`).
    pub const TOP: Self = Self(1);
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::BOTTOM => write!(f, "⊥"),
            Self::TOP => write!(f, "⊤"),
            Self(id) => write!(f, "C{id}"),
        }
    }
}

/// An object property identifier.
///
/// Ids 0 and 1 are reserved for the bottom and top properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(pub u32);

impl PropertyId {
    /// The empty property (`owl:bottomObjectProperty`).
    pub const BOTTOM: Self = Self(0);
    /// The universal property (`owl:topObjectProperty`).
    pub const TOP: Self = Self(1);
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A named individual identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndividualId(pub u32);

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Run-scoped identifier and entity service.
///
/// One allocator is created per classification run, so independent runs
/// never collide and tests can use isolated id spaces. It mints fresh
/// auxiliary class and property ids, maps individuals to their synthetic
/// "nominal" classes, and maps properties to their inverses with the
/// guarantee that `inverse_of(inverse_of(r)) == r`.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    class_offset: u32,
    property_offset: u32,
    next_class: u32,
    next_property: u32,
    nominal_by_individual: FxHashMap<IndividualId, ClassId>,
    individual_by_nominal: FxHashMap<ClassId, IndividualId>,
    inverse: FxHashMap<PropertyId, PropertyId>,
}

impl EntityAllocator {
    /// Creates an allocator for an ontology whose original classes occupy
    /// `[0, class_count)` and original properties `[0, property_count)`.
    ///
    /// Both offsets are at least 2 so that the reserved top/bottom ids are
    /// always original.
    pub fn new(class_count: u32, property_count: u32) -> Self {
        let class_offset = class_count.max(2);
        let property_offset = property_count.max(2);
        Self {
            class_offset,
            property_offset,
            next_class: class_offset,
            next_property: property_offset,
            nominal_by_individual: FxHashMap::default(),
            individual_by_nominal: FxHashMap::default(),
            inverse: FxHashMap::default(),
        }
    }

    /// Mints a fresh auxiliary class id.
    pub fn next_class_id(&mut self) -> ClassId {
        let id = ClassId(self.next_class);
        self.next_class += 1;
        id
    }

    /// Mints a fresh auxiliary property id.
    pub fn next_property_id(&mut self) -> PropertyId {
        let id = PropertyId(self.next_property);
        self.next_property += 1;
        id
    }

    /// Returns true if the class id was created during this run.
    #[inline]
    pub fn is_auxiliary_class(&self, class: ClassId) -> bool {
        class.0 >= self.class_offset
    }

    /// Returns true if the property id was created during this run.
    #[inline]
    pub fn is_auxiliary_property(&self, property: PropertyId) -> bool {
        property.0 >= self.property_offset
    }

    /// Returns the auxiliary class standing for the nominal `{a}`,
    /// creating it on first use. Idempotent per individual.
    pub fn nominal_class(&mut self, individual: IndividualId) -> ClassId {
        if let Some(class) = self.nominal_by_individual.get(&individual) {
            return *class;
        }
        let class = self.next_class_id();
        self.nominal_by_individual.insert(individual, class);
        self.individual_by_nominal.insert(class, individual);
        class
    }

    /// Returns the individual a nominal class stands for, if any.
    pub fn individual_of_nominal(&self, class: ClassId) -> Option<IndividualId> {
        self.individual_by_nominal.get(&class).copied()
    }

    /// Returns true if the class is the nominal class of some individual.
    #[inline]
    pub fn is_nominal_class(&self, class: ClassId) -> bool {
        self.individual_by_nominal.contains_key(&class)
    }

    /// All individuals that have a nominal class so far.
    pub fn individuals(&self) -> impl Iterator<Item = IndividualId> + '_ {
        self.nominal_by_individual.keys().copied()
    }

    /// All nominal classes created so far.
    pub fn nominal_classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.individual_by_nominal.keys().copied()
    }

    /// Returns the inverse of a property, creating a fresh auxiliary
    /// property on first use.
    ///
    /// Each property has at most one inverse, and the mapping is an
    /// involution: `inverse_of(inverse_of(r)) == r`.
    pub fn inverse_of(&mut self, property: PropertyId) -> PropertyId {
        if let Some(inverse) = self.inverse.get(&property) {
            return *inverse;
        }
        let inverse = self.next_property_id();
        self.inverse.insert(property, inverse);
        self.inverse.insert(inverse, property);
        inverse
    }

    /// Returns the inverse of a property without creating one.
    pub fn registered_inverse(&self, property: PropertyId) -> Option<PropertyId> {
        self.inverse.get(&property).copied()
    }

    /// Declares `inverse` as the inverse of `property` and returns the
    /// canonical inverse id of `property`.
    ///
    /// When `property` (or `inverse`) already has a registered inverse the
    /// existing binding wins and the returned id differs from `inverse`;
    /// the caller is expected to equate the two through role axioms.
    pub fn bind_inverse(&mut self, property: PropertyId, inverse: PropertyId) -> PropertyId {
        if let Some(existing) = self.inverse.get(&property) {
            return *existing;
        }
        if let Some(existing) = self.inverse.get(&inverse) {
            // `inverse` is already the inverse of `existing`, so `property`
            // must be equated with `existing` by the caller.
            return *existing;
        }
        self.inverse.insert(property, inverse);
        self.inverse.insert(inverse, property);
        inverse
    }

    /// Returns true if any inverse binding exists, i.e. the ontology uses
    /// inverse roles.
    #[inline]
    pub fn has_inverses(&self) -> bool {
        !self.inverse.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_monotone_and_auxiliary() {
        let mut ids = EntityAllocator::new(5, 3);
        let a = ids.next_class_id();
        let b = ids.next_class_id();
        assert!(a < b);
        assert!(ids.is_auxiliary_class(a));
        assert!(!ids.is_auxiliary_class(ClassId(4)));
        assert!(!ids.is_auxiliary_class(ClassId::BOTTOM));
        let p = ids.next_property_id();
        assert!(ids.is_auxiliary_property(p));
    }

    #[test]
    fn nominal_class_is_idempotent() {
        let mut ids = EntityAllocator::new(2, 2);
        let a = IndividualId(0);
        let n1 = ids.nominal_class(a);
        let n2 = ids.nominal_class(a);
        assert_eq!(n1, n2);
        assert!(ids.is_auxiliary_class(n1));
        assert!(ids.is_nominal_class(n1));
        assert_eq!(ids.individual_of_nominal(n1), Some(a));
    }

    #[test]
    fn inverse_is_an_involution() {
        let mut ids = EntityAllocator::new(2, 4);
        let r = PropertyId(2);
        let inv = ids.inverse_of(r);
        assert_ne!(inv, r);
        assert_eq!(ids.inverse_of(inv), r);
        assert_eq!(ids.inverse_of(r), inv);
    }

    #[test]
    fn bind_inverse_keeps_existing_binding() {
        let mut ids = EntityAllocator::new(2, 5);
        let r = PropertyId(2);
        let s = PropertyId(3);
        let t = PropertyId(4);
        assert_eq!(ids.bind_inverse(r, s), s);
        assert_eq!(ids.bind_inverse(r, t), s);
        assert_eq!(ids.registered_inverse(s), Some(r));
    }
}
