//! Rewriting of arbitrary input axioms into the EL++ normal forms.
//!
//! Normalization runs a worklist: complex axioms are peeled one rewrite
//! step at a time, minting auxiliary classes and properties as needed,
//! until only normal forms remain. The rewrite system is terminating (each
//! step strictly shrinks the remaining expression structure) and keeps the
//! annotation sets of the axioms it splits.

use crate::axiom::{AnnotatedAxiom, Annotation, Axiom, ClassExpression, NormalForm, NormalizedAxiom};
use crate::ids::EntityAllocator;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// The outcome of normalization: the deduplicated normal forms plus the
/// input axioms that were dropped as unrepresentable or vacuous.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub axioms: Vec<NormalizedAxiom>,
    pub dropped: Vec<AnnotatedAxiom>,
}

enum WorkItem {
    Complex(AnnotatedAxiom),
    Normal(NormalizedAxiom),
}

/// Rewrites `axioms` into normal forms, minting auxiliary entities from
/// `ids`.
///
/// The output is deduplicated on the normal form; when the same form is
/// produced from several inputs their annotation sets are merged. Axioms
/// that cannot contribute (empty property chains, subclass axioms with an
/// unsatisfiable left side) are reported in
/// [`dropped`](Normalization::dropped) instead of being silently ignored.
pub fn normalize(axioms: Vec<AnnotatedAxiom>, ids: &mut EntityAllocator) -> Normalization {
    let mut work: VecDeque<WorkItem> = axioms.into_iter().map(WorkItem::Complex).collect();
    let mut index: FxHashMap<NormalForm, usize> = FxHashMap::default();
    let mut out: Vec<NormalizedAxiom> = Vec::new();
    let mut dropped: Vec<AnnotatedAxiom> = Vec::new();

    while let Some(item) = work.pop_front() {
        match item {
            WorkItem::Normal(normalized) => {
                if let Some(&at) = index.get(&normalized.form) {
                    let existing = &mut out[at].annotations;
                    for annotation in normalized.annotations {
                        if !existing.contains(&annotation) {
                            existing.push(annotation);
                        }
                    }
                } else {
                    index.insert(normalized.form, out.len());
                    out.push(normalized);
                }
            }
            WorkItem::Complex(annotated) => {
                rewrite(annotated, ids, &mut work, &mut dropped);
            }
        }
    }

    Normalization {
        axioms: out,
        dropped,
    }
}

fn rewrite(
    annotated: AnnotatedAxiom,
    ids: &mut EntityAllocator,
    work: &mut VecDeque<WorkItem>,
    dropped: &mut Vec<AnnotatedAxiom>,
) {
    let annotations = annotated.annotations.clone();
    let complex = |axiom: Axiom, annotations: &[Annotation]| {
        WorkItem::Complex(AnnotatedAxiom::with_annotations(
            axiom,
            annotations.to_vec(),
        ))
    };
    let normal = |form: NormalForm, annotations: &[Annotation]| {
        WorkItem::Normal(NormalizedAxiom {
            form,
            annotations: annotations.to_vec(),
        })
    };

    match annotated.axiom {
        Axiom::SubClassOf { sub, sup } => {
            rewrite_subclass(sub, sup, annotated.annotations, ids, work, dropped);
        }
        Axiom::EquivalentClasses(expressions) => {
            for (i, a) in expressions.iter().enumerate() {
                for (j, b) in expressions.iter().enumerate() {
                    if i != j {
                        work.push_back(complex(
                            Axiom::SubClassOf {
                                sub: a.clone(),
                                sup: b.clone(),
                            },
                            &annotations,
                        ));
                    }
                }
            }
        }
        Axiom::DisjointClasses(expressions) => {
            for (i, a) in expressions.iter().enumerate() {
                for b in expressions.iter().skip(i + 1) {
                    work.push_back(complex(
                        Axiom::SubClassOf {
                            sub: ClassExpression::IntersectionOf(vec![a.clone(), b.clone()]),
                            sup: ClassExpression::bottom(),
                        },
                        &annotations,
                    ));
                }
            }
        }
        Axiom::SubObjectPropertyOf { sub, sup } => {
            work.push_back(normal(NormalForm::SubProperty { sub, sup }, &annotations));
        }
        Axiom::SubPropertyChainOf { chain, sup } => match chain.as_slice() {
            [] => dropped.push(AnnotatedAxiom::with_annotations(
                Axiom::SubPropertyChainOf { chain, sup },
                annotated.annotations,
            )),
            [sub] => {
                work.push_back(normal(
                    NormalForm::SubProperty { sub: *sub, sup },
                    &annotations,
                ));
            }
            [left, right] => {
                work.push_back(normal(
                    NormalForm::PropertyChain {
                        left: *left,
                        right: *right,
                        sup,
                    },
                    &annotations,
                ));
            }
            [prefix @ .., left, right] => {
                // Fold the last two links into a fresh property and retry
                // on the shortened chain.
                let folded = ids.next_property_id();
                work.push_back(normal(
                    NormalForm::PropertyChain {
                        left: *left,
                        right: *right,
                        sup: folded,
                    },
                    &annotations,
                ));
                let mut shorter = prefix.to_vec();
                shorter.push(folded);
                work.push_back(complex(
                    Axiom::SubPropertyChainOf {
                        chain: shorter,
                        sup,
                    },
                    &annotations,
                ));
            }
        },
        Axiom::EquivalentObjectProperties(properties) => {
            for (i, &a) in properties.iter().enumerate() {
                for (j, &b) in properties.iter().enumerate() {
                    if i != j {
                        work.push_back(normal(
                            NormalForm::SubProperty { sub: a, sup: b },
                            &annotations,
                        ));
                    }
                }
            }
        }
        Axiom::InverseObjectProperties(property, inverse) => {
            let canonical = ids.bind_inverse(property, inverse);
            if canonical != inverse {
                // `property` already had an inverse; equate the two names.
                work.push_back(normal(
                    NormalForm::SubProperty {
                        sub: inverse,
                        sup: canonical,
                    },
                    &annotations,
                ));
                work.push_back(normal(
                    NormalForm::SubProperty {
                        sub: canonical,
                        sup: inverse,
                    },
                    &annotations,
                ));
            }
        }
        Axiom::TransitiveObjectProperty(property) => {
            work.push_back(normal(
                NormalForm::PropertyChain {
                    left: property,
                    right: property,
                    sup: property,
                },
                &annotations,
            ));
        }
        Axiom::ReflexiveObjectProperty(property) => {
            work.push_back(normal(NormalForm::Reflexive { property }, &annotations));
        }
        Axiom::ObjectPropertyDomain { property, domain } => {
            work.push_back(complex(
                Axiom::SubClassOf {
                    sub: ClassExpression::some_values_from(property, ClassExpression::top()),
                    sup: domain,
                },
                &annotations,
            ));
        }
        Axiom::ObjectPropertyRange { property, range } => {
            if let Some(class) = range.as_class() {
                work.push_back(normal(NormalForm::Range { property, range: class }, &annotations));
            } else {
                let fresh = ids.next_class_id();
                work.push_back(normal(
                    NormalForm::Range {
                        property,
                        range: fresh,
                    },
                    &annotations,
                ));
                work.push_back(complex(
                    Axiom::SubClassOf {
                        sub: ClassExpression::Class(fresh),
                        sup: range,
                    },
                    &annotations,
                ));
            }
        }
        Axiom::FunctionalObjectProperty(property) => {
            work.push_back(normal(NormalForm::Functional { property }, &annotations));
        }
    }
}

fn rewrite_subclass(
    sub: ClassExpression,
    sup: ClassExpression,
    annotations: Vec<Annotation>,
    ids: &mut EntityAllocator,
    work: &mut VecDeque<WorkItem>,
    dropped: &mut Vec<AnnotatedAxiom>,
) {
    // A subclass axiom with an unsatisfiable left side holds vacuously.
    if sub.contains_bottom() {
        dropped.push(AnnotatedAxiom::with_annotations(
            Axiom::SubClassOf { sub, sup },
            annotations,
        ));
        return;
    }

    let sub = replace_nominals(sub, ids, &annotations, work);
    let sup = replace_nominals(sup, ids, &annotations, work);

    // An unsatisfiable right side collapses to bottom itself.
    let sup = if sup.contains_bottom() && sup != ClassExpression::bottom() {
        ClassExpression::bottom()
    } else {
        sup
    };

    if let Some(form) = as_normal_form(&sub, &sup) {
        work.push_back(WorkItem::Normal(NormalizedAxiom { form, annotations }));
        return;
    }

    let requeue = |axiom: Axiom, annotations: Vec<Annotation>| {
        WorkItem::Complex(AnnotatedAxiom::with_annotations(axiom, annotations))
    };

    match (sub, sup) {
        // Both sides complex: split over a fresh class.
        (sub @ (ClassExpression::IntersectionOf(_) | ClassExpression::SomeValuesFrom { .. }),
         sup @ (ClassExpression::IntersectionOf(_) | ClassExpression::SomeValuesFrom { .. })) => {
            let fresh = ClassExpression::Class(ids.next_class_id());
            work.push_back(requeue(
                Axiom::SubClassOf {
                    sub,
                    sup: fresh.clone(),
                },
                annotations.clone(),
            ));
            work.push_back(requeue(Axiom::SubClassOf { sub: fresh, sup }, annotations));
        }
        // Atomic ⊑ intersection: distribute over the parts.
        (sub @ ClassExpression::Class(_), ClassExpression::IntersectionOf(parts)) => {
            for part in parts {
                work.push_back(requeue(
                    Axiom::SubClassOf {
                        sub: sub.clone(),
                        sup: part,
                    },
                    annotations.clone(),
                ));
            }
        }
        // Atomic ⊑ ∃r.(complex): name the filler.
        (ClassExpression::Class(sub), ClassExpression::SomeValuesFrom { property, filler }) => {
            let fresh = ids.next_class_id();
            work.push_back(WorkItem::Normal(NormalizedAxiom {
                form: NormalForm::Gci2 {
                    sub,
                    property,
                    filler: fresh,
                },
                annotations: annotations.clone(),
            }));
            work.push_back(requeue(
                Axiom::SubClassOf {
                    sub: ClassExpression::Class(fresh),
                    sup: *filler,
                },
                annotations,
            ));
        }
        // Intersection ⊑ atomic.
        (ClassExpression::IntersectionOf(parts), sup @ ClassExpression::Class(_)) => {
            if let Some(at) = parts.iter().position(|p| !p.is_atomic()) {
                // Name the first complex conjunct.
                let fresh = ClassExpression::Class(ids.next_class_id());
                let mut named = parts;
                let conjunct = std::mem::replace(&mut named[at], fresh.clone());
                work.push_back(requeue(
                    Axiom::SubClassOf {
                        sub: conjunct,
                        sup: fresh,
                    },
                    annotations.clone(),
                ));
                work.push_back(requeue(
                    Axiom::SubClassOf {
                        sub: ClassExpression::IntersectionOf(named),
                        sup,
                    },
                    annotations,
                ));
            } else {
                match parts.len() {
                    0 => work.push_back(requeue(
                        Axiom::SubClassOf {
                            sub: ClassExpression::top(),
                            sup,
                        },
                        annotations,
                    )),
                    1 => {
                        let mut parts = parts;
                        work.push_back(requeue(
                            Axiom::SubClassOf {
                                sub: parts.pop().unwrap_or(ClassExpression::top()),
                                sup,
                            },
                            annotations,
                        ));
                    }
                    // Two atomic conjuncts match GCI1 directly above, so
                    // this arm only sees longer intersections: fold the
                    // first two into a fresh class.
                    _ => {
                        let mut parts = parts;
                        let left = parts.remove(0);
                        let right = parts.remove(0);
                        let fresh = ids.next_class_id();
                        if let (Some(left), Some(right)) = (left.as_class(), right.as_class()) {
                            work.push_back(WorkItem::Normal(NormalizedAxiom {
                                form: NormalForm::Gci1 {
                                    left,
                                    right,
                                    sup: fresh,
                                },
                                annotations: annotations.clone(),
                            }));
                        }
                        parts.insert(0, ClassExpression::Class(fresh));
                        work.push_back(requeue(
                            Axiom::SubClassOf {
                                sub: ClassExpression::IntersectionOf(parts),
                                sup,
                            },
                            annotations,
                        ));
                    }
                }
            }
        }
        // ∃r.(complex) ⊑ atomic: name the filler.
        (ClassExpression::SomeValuesFrom { property, filler }, ClassExpression::Class(sup)) => {
            let fresh = ids.next_class_id();
            work.push_back(requeue(
                Axiom::SubClassOf {
                    sub: *filler,
                    sup: ClassExpression::Class(fresh),
                },
                annotations.clone(),
            ));
            work.push_back(WorkItem::Normal(NormalizedAxiom {
                form: NormalForm::Gci3 {
                    property,
                    filler: fresh,
                    sup,
                },
                annotations,
            }));
        }
        // Nominals were replaced above; nothing else is reachable, but
        // record rather than panic if it ever is.
        (sub, sup) => dropped.push(AnnotatedAxiom::with_annotations(
            Axiom::SubClassOf { sub, sup },
            annotations,
        )),
    }
}

/// Replaces every nominal `{a}` with its synthetic class, emitting the
/// binding axiom for each one encountered.
fn replace_nominals(
    expression: ClassExpression,
    ids: &mut EntityAllocator,
    annotations: &[Annotation],
    work: &mut VecDeque<WorkItem>,
) -> ClassExpression {
    match expression {
        ClassExpression::OneOf(individual) => {
            let class = ids.nominal_class(individual);
            work.push_back(WorkItem::Normal(NormalizedAxiom {
                form: NormalForm::Nominal { class, individual },
                annotations: annotations.to_vec(),
            }));
            ClassExpression::Class(class)
        }
        ClassExpression::IntersectionOf(parts) => ClassExpression::IntersectionOf(
            parts
                .into_iter()
                .map(|p| replace_nominals(p, ids, annotations, work))
                .collect(),
        ),
        ClassExpression::SomeValuesFrom { property, filler } => ClassExpression::SomeValuesFrom {
            property,
            filler: Box::new(replace_nominals(*filler, ids, annotations, work)),
        },
        atomic @ ClassExpression::Class(_) => atomic,
    }
}

/// Matches a subclass axiom that already is a normal form.
fn as_normal_form(sub: &ClassExpression, sup: &ClassExpression) -> Option<NormalForm> {
    match (sub, sup) {
        (ClassExpression::Class(sub), ClassExpression::Class(sup)) => Some(NormalForm::Gci0 {
            sub: *sub,
            sup: *sup,
        }),
        (ClassExpression::IntersectionOf(parts), ClassExpression::Class(sup)) => {
            match parts.as_slice() {
                [ClassExpression::Class(left), ClassExpression::Class(right)] => {
                    Some(NormalForm::Gci1 {
                        left: *left,
                        right: *right,
                        sup: *sup,
                    })
                }
                _ => None,
            }
        }
        (ClassExpression::Class(sub), ClassExpression::SomeValuesFrom { property, filler }) => {
            filler.as_class().map(|filler| NormalForm::Gci2 {
                sub: *sub,
                property: *property,
                filler,
            })
        }
        (ClassExpression::SomeValuesFrom { property, filler }, ClassExpression::Class(sup)) => {
            filler.as_class().map(|filler| NormalForm::Gci3 {
                property: *property,
                filler,
                sup: *sup,
            })
        }
        _ => None,
    }
}
