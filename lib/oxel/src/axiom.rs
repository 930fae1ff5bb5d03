//! Complex input axioms and the EL++ normal forms.
//!
//! The completion engine only understands the normal forms; arbitrary
//! axioms are rewritten into them by [`crate::normalize`].

use crate::ids::{ClassId, IndividualId, PropertyId};
use std::fmt;

/// An opaque axiom annotation.
///
/// Annotations are payload carried through normalization; the engine never
/// inspects them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Annotation(String);

impl Annotation {
    /// Creates an annotation from its opaque payload.
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// Returns the opaque payload.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An EL class expression over integer-identified entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    /// A named (atomic) class.
    Class(ClassId),
    /// `ObjectIntersectionOf(C1, ..., Cn)`.
    IntersectionOf(Vec<ClassExpression>),
    /// `ObjectSomeValuesFrom(r, C)`.
    SomeValuesFrom {
        property: PropertyId,
        filler: Box<ClassExpression>,
    },
    /// `ObjectOneOf(a)` - the nominal `{a}`.
    OneOf(IndividualId),
}

impl ClassExpression {
    /// The unsatisfiable class.
    pub fn bottom() -> Self {
        Self::Class(ClassId::BOTTOM)
    }

    /// The universal class.
    pub fn top() -> Self {
        Self::Class(ClassId::TOP)
    }

    /// Creates an existential restriction.
    pub fn some_values_from(property: PropertyId, filler: ClassExpression) -> Self {
        Self::SomeValuesFrom {
            property,
            filler: Box::new(filler),
        }
    }

    /// Returns true if this is a named class.
    #[inline]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// Returns the named class if this is one.
    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            Self::Class(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns true if the expression mentions `owl:Nothing` anywhere.
    pub fn contains_bottom(&self) -> bool {
        match self {
            Self::Class(c) => *c == ClassId::BOTTOM,
            Self::IntersectionOf(parts) => parts.iter().any(Self::contains_bottom),
            Self::SomeValuesFrom { filler, .. } => filler.contains_bottom(),
            Self::OneOf(_) => false,
        }
    }

    /// Returns true if the expression mentions a nominal anywhere.
    pub fn contains_nominal(&self) -> bool {
        match self {
            Self::Class(_) => false,
            Self::IntersectionOf(parts) => parts.iter().any(Self::contains_nominal),
            Self::SomeValuesFrom { filler, .. } => filler.contains_nominal(),
            Self::OneOf(_) => true,
        }
    }
}

impl From<ClassId> for ClassExpression {
    fn from(class: ClassId) -> Self {
        Self::Class(class)
    }
}

/// A complex axiom as handed over by the translation layer.
///
/// Class expressions may be arbitrarily nested; property axioms are always
/// over named properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axiom {
    /// `SubClassOf(sub, sup)`.
    SubClassOf {
        sub: ClassExpression,
        sup: ClassExpression,
    },
    /// `EquivalentClasses(C1, ..., Cn)`.
    EquivalentClasses(Vec<ClassExpression>),
    /// `DisjointClasses(C1, ..., Cn)`.
    DisjointClasses(Vec<ClassExpression>),
    /// `SubObjectPropertyOf(sub, sup)`.
    SubObjectPropertyOf { sub: PropertyId, sup: PropertyId },
    /// `SubObjectPropertyOf(ObjectPropertyChain(r1 ... rk), s)`.
    SubPropertyChainOf {
        chain: Vec<PropertyId>,
        sup: PropertyId,
    },
    /// `EquivalentObjectProperties(r1, ..., rn)`.
    EquivalentObjectProperties(Vec<PropertyId>),
    /// `InverseObjectProperties(r, s)`.
    InverseObjectProperties(PropertyId, PropertyId),
    /// `TransitiveObjectProperty(r)`.
    TransitiveObjectProperty(PropertyId),
    /// `ReflexiveObjectProperty(r)`.
    ReflexiveObjectProperty(PropertyId),
    /// `ObjectPropertyDomain(r, C)`.
    ObjectPropertyDomain {
        property: PropertyId,
        domain: ClassExpression,
    },
    /// `ObjectPropertyRange(r, C)`.
    ObjectPropertyRange {
        property: PropertyId,
        range: ClassExpression,
    },
    /// `FunctionalObjectProperty(r)`.
    FunctionalObjectProperty(PropertyId),
}

/// A complex axiom together with its annotation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedAxiom {
    pub axiom: Axiom,
    pub annotations: Vec<Annotation>,
}

impl AnnotatedAxiom {
    /// Wraps an axiom with no annotations.
    pub fn new(axiom: Axiom) -> Self {
        Self {
            axiom,
            annotations: Vec::new(),
        }
    }

    /// Wraps an axiom with the given annotations.
    pub fn with_annotations(axiom: Axiom, annotations: Vec<Annotation>) -> Self {
        Self { axiom, annotations }
    }
}

impl From<Axiom> for AnnotatedAxiom {
    fn from(axiom: Axiom) -> Self {
        Self::new(axiom)
    }
}

/// The atomic axiom shapes the completion engine reasons over.
///
/// Every field is an entity id, so an axiom's signature is derivable from
/// its fields alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalForm {
    /// GCI0: `A ⊑ B`.
    Gci0 { sub: ClassId, sup: ClassId },
    /// GCI1: `A ⊓ B ⊑ C`.
    Gci1 {
        left: ClassId,
        right: ClassId,
        sup: ClassId,
    },
    /// GCI2: `A ⊑ ∃r.B`.
    Gci2 {
        sub: ClassId,
        property: PropertyId,
        filler: ClassId,
    },
    /// GCI3: `∃r.A ⊑ B`.
    Gci3 {
        property: PropertyId,
        filler: ClassId,
        sup: ClassId,
    },
    /// RI1: `ε ⊑ r` (reflexivity).
    Reflexive { property: PropertyId },
    /// RI2: `r ⊑ s`.
    SubProperty { sub: PropertyId, sup: PropertyId },
    /// RI3: `r ∘ s ⊑ t`.
    PropertyChain {
        left: PropertyId,
        right: PropertyId,
        sup: PropertyId,
    },
    /// `range(r) ⊆ A`.
    Range {
        property: PropertyId,
        range: ClassId,
    },
    /// `{a} ≡ A`, binding an individual to its nominal class.
    Nominal {
        class: ClassId,
        individual: IndividualId,
    },
    /// `functional(r)`.
    Functional { property: PropertyId },
}

impl NormalForm {
    /// The classes mentioned by this axiom.
    pub fn classes_in_signature(&self) -> Vec<ClassId> {
        match *self {
            Self::Gci0 { sub, sup } => vec![sub, sup],
            Self::Gci1 { left, right, sup } => vec![left, right, sup],
            Self::Gci2 { sub, filler, .. } => vec![sub, filler],
            Self::Gci3 { filler, sup, .. } => vec![filler, sup],
            Self::Range { range, .. } => vec![range],
            Self::Nominal { class, .. } => vec![class],
            Self::Reflexive { .. } | Self::SubProperty { .. } | Self::PropertyChain { .. } | Self::Functional { .. } => {
                Vec::new()
            }
        }
    }

    /// The object properties mentioned by this axiom.
    pub fn properties_in_signature(&self) -> Vec<PropertyId> {
        match *self {
            Self::Gci2 { property, .. }
            | Self::Gci3 { property, .. }
            | Self::Range { property, .. }
            | Self::Reflexive { property }
            | Self::Functional { property } => vec![property],
            Self::SubProperty { sub, sup } => vec![sub, sup],
            Self::PropertyChain { left, right, sup } => vec![left, right, sup],
            Self::Gci0 { .. } | Self::Gci1 { .. } | Self::Nominal { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Gci0 { sub, sup } => write!(f, "{sub} ⊑ {sup}"),
            Self::Gci1 { left, right, sup } => write!(f, "{left} ⊓ {right} ⊑ {sup}"),
            Self::Gci2 {
                sub,
                property,
                filler,
            } => write!(f, "{sub} ⊑ ∃{property}.{filler}"),
            Self::Gci3 {
                property,
                filler,
                sup,
            } => write!(f, "∃{property}.{filler} ⊑ {sup}"),
            Self::Reflexive { property } => write!(f, "ε ⊑ {property}"),
            Self::SubProperty { sub, sup } => write!(f, "{sub} ⊑ {sup}"),
            Self::PropertyChain { left, right, sup } => write!(f, "{left} ∘ {right} ⊑ {sup}"),
            Self::Range { property, range } => write!(f, "range({property}) ⊆ {range}"),
            Self::Nominal { class, individual } => write!(f, "{{{individual}}} ≡ {class}"),
            Self::Functional { property } => write!(f, "functional({property})"),
        }
    }
}

/// A normal-form axiom together with its annotation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAxiom {
    pub form: NormalForm,
    pub annotations: Vec<Annotation>,
}

impl NormalizedAxiom {
    /// Wraps a normal form with no annotations.
    pub fn new(form: NormalForm) -> Self {
        Self {
            form,
            annotations: Vec::new(),
        }
    }
}

impl From<NormalForm> for NormalizedAxiom {
    fn from(form: NormalForm) -> Self {
        Self::new(form)
    }
}
