#![allow(clippy::panic_in_result_fn)]

use oxel::{
    Axiom, ClassExpression, ClassId, ClassificationError, Classifier, EntityAllocator,
    ExtendedOntology, IndividualId, PropertyId, normalize,
};

fn classified(
    axioms: Vec<Axiom>,
    class_count: u32,
    property_count: u32,
) -> Result<Classifier, ClassificationError> {
    let mut ids = EntityAllocator::new(class_count, property_count);
    let normalized = normalize(axioms.into_iter().map(Into::into).collect(), &mut ids);
    let ontology = ExtendedOntology::load(normalized.axioms, &mut ids);
    let mut classifier = Classifier::new(ontology, ids);
    classifier.classify()?;
    Ok(classifier)
}

fn class(id: u32) -> ClassExpression {
    ClassExpression::Class(ClassId(id))
}

#[test]
fn every_class_sits_below_top_and_above_bottom() -> Result<(), ClassificationError> {
    let classifier = classified(
        vec![Axiom::SubClassOf {
            sub: class(2),
            sup: class(3),
        }],
        4,
        2,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    for id in [2, 3] {
        assert!(hierarchy.is_subsumed_by(ClassId(id), ClassId(id)));
        assert!(hierarchy.is_subsumed_by(ClassId(id), ClassId::TOP));
        assert!(hierarchy.is_subsumed_by(ClassId::BOTTOM, ClassId(id)));
    }
    Ok(())
}

#[test]
fn told_subsumptions_compose_transitively() -> Result<(), ClassificationError> {
    let classifier = classified(
        vec![
            Axiom::SubClassOf {
                sub: class(2),
                sup: class(3),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: class(4),
            },
        ],
        5,
        2,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(4)));
    assert!(!hierarchy.is_subsumed_by(ClassId(4), ClassId(2)));
    // The direct parent skips nothing.
    assert_eq!(hierarchy.parents(ClassId(2)), vec![ClassId(3)]);
    Ok(())
}

#[test]
fn existentials_compose_with_filler_subsumption() -> Result<(), ClassificationError> {
    // A ⊑ ∃r.B, B ⊑ C, ∃r.C ⊑ D entail A ⊑ D.
    let r = PropertyId(2);
    let classifier = classified(
        vec![
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: class(4),
            },
            Axiom::SubClassOf {
                sub: ClassExpression::some_values_from(r, class(4)),
                sup: class(5),
            },
        ],
        6,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(5)));
    assert!(!hierarchy.is_subsumed_by(ClassId(3), ClassId(5)));
    Ok(())
}

#[test]
fn transitive_roles_chain_existentials() -> Result<(), ClassificationError> {
    // X ⊑ ∃r.Y, Y ⊑ ∃r.Z, transitive(r), ∃r.Z ⊑ W entail X ⊑ W.
    let r = PropertyId(2);
    let classifier = classified(
        vec![
            Axiom::TransitiveObjectProperty(r),
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: ClassExpression::some_values_from(r, class(4)),
            },
            Axiom::SubClassOf {
                sub: ClassExpression::some_values_from(r, class(4)),
                sup: class(5),
            },
        ],
        6,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(5)));
    assert!(hierarchy.is_subsumed_by(ClassId(3), ClassId(5)));
    Ok(())
}

#[test]
fn functional_roles_merge_their_fillers() -> Result<(), ClassificationError> {
    // r ⊑ s, functional(s), X ⊑ ∃r.Y, X ⊑ ∃s.Z entail Y ≡ Z.
    let (r, s) = (PropertyId(2), PropertyId(3));
    let classifier = classified(
        vec![
            Axiom::SubObjectPropertyOf { sub: r, sup: s },
            Axiom::FunctionalObjectProperty(s),
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(s, class(4)),
            },
        ],
        5,
        4,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId(3), ClassId(4)));
    Ok(())
}

#[test]
fn unsatisfiable_fillers_absorb_their_subjects() -> Result<(), ClassificationError> {
    // A ⊑ ∃r.B and B ⊑ ⊥ entail A ⊑ ⊥.
    let r = PropertyId(2);
    let classifier = classified(
        vec![
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: ClassExpression::bottom(),
            },
        ],
        4,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId(2), ClassId::BOTTOM));
    assert!(hierarchy.equivalent(ClassId(3), ClassId::BOTTOM));
    assert!(!hierarchy.equivalent(ClassId::TOP, ClassId::BOTTOM));
    Ok(())
}

#[test]
fn unsatisfiable_subjects_leave_their_fillers_satisfiable() -> Result<(), ClassificationError> {
    // A ⊑ ⊥ and A ⊑ ∃r.B say nothing about B: only the direction from an
    // unsatisfiable filler back to its subjects is sound.
    let r = PropertyId(2);
    let classifier = classified(
        vec![
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::bottom(),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
        ],
        4,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId(2), ClassId::BOTTOM));
    assert!(!hierarchy.equivalent(ClassId(3), ClassId::BOTTOM));
    Ok(())
}

#[test]
fn disjointness_empties_the_overlap() -> Result<(), ClassificationError> {
    let classifier = classified(
        vec![
            Axiom::DisjointClasses(vec![class(2), class(3)]),
            Axiom::SubClassOf {
                sub: class(4),
                sup: class(2),
            },
            Axiom::SubClassOf {
                sub: class(4),
                sup: class(3),
            },
        ],
        5,
        2,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId(4), ClassId::BOTTOM));
    assert!(!hierarchy.equivalent(ClassId(2), ClassId::BOTTOM));
    Ok(())
}

#[test]
fn a_contradictory_ontology_still_classifies() -> Result<(), ClassificationError> {
    // ⊤ ⊑ ⊥ collapses every class into the bottom group.
    let classifier = classified(
        vec![
            Axiom::SubClassOf {
                sub: ClassExpression::top(),
                sup: ClassExpression::bottom(),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: class(3),
            },
        ],
        4,
        2,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId::TOP, ClassId::BOTTOM));
    assert!(hierarchy.equivalent(ClassId(2), ClassId::BOTTOM));
    assert!(hierarchy.equivalent(ClassId(3), ClassId::BOTTOM));
    Ok(())
}

#[test]
fn domain_and_range_constrain_link_ends() -> Result<(), ClassificationError> {
    let r = PropertyId(2);
    let classifier = classified(
        vec![
            Axiom::ObjectPropertyDomain {
                property: r,
                domain: class(4),
            },
            Axiom::ObjectPropertyRange {
                property: r,
                range: class(5),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
        ],
        6,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(4)));
    assert!(hierarchy.is_subsumed_by(ClassId(3), ClassId(5)));
    Ok(())
}

#[test]
fn reflexive_roles_apply_existential_axioms_to_self() -> Result<(), ClassificationError> {
    // reflexive(r), ∃r.A ⊑ B, X ⊑ A entail X ⊑ B.
    let r = PropertyId(2);
    let classifier = classified(
        vec![
            Axiom::ReflexiveObjectProperty(r),
            Axiom::SubClassOf {
                sub: ClassExpression::some_values_from(r, class(2)),
                sup: class(3),
            },
            Axiom::SubClassOf {
                sub: class(4),
                sup: class(2),
            },
        ],
        5,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(4), ClassId(3)));
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(3)));
    Ok(())
}

#[test]
fn inverse_roles_see_the_subject_from_the_target() -> Result<(), ClassificationError> {
    // inverse(r, s), range(s) ⊆ C, X ⊑ ∃r.Y entail X ⊑ C, because X is
    // the target of the inverted link.
    let (r, s) = (PropertyId(2), PropertyId(3));
    let classifier = classified(
        vec![
            Axiom::InverseObjectProperties(r, s),
            Axiom::ObjectPropertyRange {
                property: s,
                range: class(4),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
        ],
        5,
        4,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(4)));
    Ok(())
}

#[test]
fn long_property_chains_compose() -> Result<(), ClassificationError> {
    // r ∘ s ⊑ t, X ⊑ ∃r.Y, Y ⊑ ∃s.Z, ∃t.Z ⊑ W entail X ⊑ W.
    let (r, s, t) = (PropertyId(2), PropertyId(3), PropertyId(4));
    let classifier = classified(
        vec![
            Axiom::SubPropertyChainOf {
                chain: vec![r, s],
                sup: t,
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(r, class(3)),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: ClassExpression::some_values_from(s, class(4)),
            },
            Axiom::SubClassOf {
                sub: ClassExpression::some_values_from(t, class(4)),
                sup: class(5),
            },
        ],
        6,
        5,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(5)));
    assert!(!hierarchy.is_subsumed_by(ClassId(3), ClassId(5)));
    Ok(())
}

#[test]
fn property_hierarchy_reports_inclusions_and_equivalences(
) -> Result<(), ClassificationError> {
    let (r, s, t) = (PropertyId(2), PropertyId(3), PropertyId(4));
    let classifier = classified(
        vec![
            Axiom::SubObjectPropertyOf { sub: r, sup: s },
            Axiom::EquivalentObjectProperties(vec![s, t]),
        ],
        2,
        5,
    )?;
    let properties = classifier.classification()?.property_hierarchy();
    assert!(properties.is_subsumed_by(r, s));
    assert!(properties.is_subsumed_by(r, t));
    assert!(properties.equivalent(s, t));
    assert!(!properties.is_subsumed_by(s, r));
    assert!(properties.is_subsumed_by(r, PropertyId::TOP));
    Ok(())
}

#[test]
fn classes_bound_to_the_same_nominal_coincide() -> Result<(), ClassificationError> {
    // {a} ≡ A and {a} ≡ B entail A ≡ B.
    let a = IndividualId(0);
    let classifier = classified(
        vec![
            Axiom::EquivalentClasses(vec![ClassExpression::OneOf(a), class(2)]),
            Axiom::EquivalentClasses(vec![ClassExpression::OneOf(a), class(3)]),
        ],
        4,
        2,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId(2), ClassId(3)));
    // Nominal classes stay out of the reported hierarchy.
    for element in hierarchy.equivalents(ClassId(2)) {
        assert!(element == ClassId(2) || element == ClassId(3));
    }
    Ok(())
}

#[test]
fn same_individuals_are_reported_symmetrically() -> Result<(), ClassificationError> {
    // {a} ≡ A and {b} ≡ A force a = b.
    let (a, b) = (IndividualId(0), IndividualId(1));
    let classifier = classified(
        vec![
            Axiom::EquivalentClasses(vec![ClassExpression::OneOf(a), class(2)]),
            Axiom::EquivalentClasses(vec![ClassExpression::OneOf(b), class(2)]),
        ],
        3,
        2,
    )?;
    let classification = classifier.classification()?;
    assert_eq!(classification.same_individuals(a), &[b]);
    assert_eq!(classification.same_individuals(b), &[a]);
    Ok(())
}

#[test]
fn direct_types_are_the_most_specific_named_classes() -> Result<(), ClassificationError> {
    // {a} ⊑ C and C ⊑ D give a the single direct type C.
    let a = IndividualId(0);
    let classifier = classified(
        vec![
            Axiom::SubClassOf {
                sub: ClassExpression::OneOf(a),
                sup: class(2),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: class(3),
            },
        ],
        4,
        2,
    )?;
    let classification = classifier.classification()?;
    assert_eq!(classification.direct_types(a), &[ClassId(2)]);
    assert!(classification.same_individuals(a).is_empty());
    Ok(())
}

#[test]
fn an_equivalent_named_class_is_the_direct_type() -> Result<(), ClassificationError> {
    let a = IndividualId(0);
    let classifier = classified(
        vec![Axiom::EquivalentClasses(vec![
            ClassExpression::OneOf(a),
            class(2),
        ])],
        3,
        2,
    )?;
    assert_eq!(
        classifier.classification()?.direct_types(a),
        &[ClassId(2)]
    );
    Ok(())
}

#[test]
fn nominal_subsumees_merge_only_when_connected() -> Result<(), ClassificationError> {
    // B ⊑ {a} and C ⊑ {a} merge once a link witnesses both non-empty.
    let a = IndividualId(0);
    let p = PropertyId(2);
    let linked = classified(
        vec![
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::OneOf(a),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: ClassExpression::OneOf(a),
            },
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::some_values_from(p, class(3)),
            },
        ],
        4,
        3,
    )?;
    let hierarchy = linked.classification()?.class_hierarchy();
    assert!(hierarchy.equivalent(ClassId(2), ClassId(3)));

    // Without the link either class may be empty, so nothing merges.
    let unlinked = classified(
        vec![
            Axiom::SubClassOf {
                sub: class(2),
                sup: ClassExpression::OneOf(a),
            },
            Axiom::SubClassOf {
                sub: class(3),
                sup: ClassExpression::OneOf(a),
            },
        ],
        4,
        3,
    )?;
    let hierarchy = unlinked.classification()?.class_hierarchy();
    assert!(!hierarchy.equivalent(ClassId(2), ClassId(3)));
    Ok(())
}

#[test]
fn auxiliary_names_never_leak_into_results() -> Result<(), ClassificationError> {
    // Deep nesting mints several auxiliary classes; none may surface.
    let r = PropertyId(2);
    let classifier = classified(
        vec![Axiom::SubClassOf {
            sub: class(2),
            sup: ClassExpression::some_values_from(
                r,
                ClassExpression::IntersectionOf(vec![
                    class(3),
                    ClassExpression::some_values_from(r, class(4)),
                ]),
            ),
        }],
        5,
        3,
    )?;
    let hierarchy = classifier.classification()?.class_hierarchy();
    for element in hierarchy.elements() {
        assert!(element.0 < 5, "auxiliary class {element} leaked");
    }
    Ok(())
}

#[test]
fn dropped_axioms_are_reported() {
    let mut ids = EntityAllocator::new(4, 3);
    let normalized = normalize(
        vec![
            Axiom::SubPropertyChainOf {
                chain: vec![],
                sup: PropertyId(2),
            }
            .into(),
            Axiom::SubClassOf {
                sub: class(2),
                sup: class(3),
            }
            .into(),
        ],
        &mut ids,
    );
    assert_eq!(normalized.dropped.len(), 1);
    assert_eq!(normalized.axioms.len(), 1);
}
