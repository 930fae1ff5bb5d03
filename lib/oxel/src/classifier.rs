//! The classification driver: a cooperative fixpoint loop over the
//! pending queues, followed by post-processing into frozen hierarchies.
//!
//! [`Classifier::process`] performs one bounded step, so a caller can
//! interleave classification with other work and watch progress through
//! [`Classifier::subsumption_count`]. [`Classifier::classify`] drives the
//! loop to completion.

use crate::error::ClassificationError;
use crate::hierarchy::Hierarchy;
use crate::ids::{ClassId, EntityAllocator, IndividualId, PropertyId};
use crate::ontology::ExtendedOntology;
use crate::rules::{Change, RuleChain};
use crate::status::{ClassifierStatus, SEntry};
use rustc_hash::{FxHashMap, FxHashSet};

/// The frozen result of a classification run.
#[derive(Debug, Clone)]
pub struct Classification {
    class_hierarchy: Hierarchy<ClassId>,
    property_hierarchy: Hierarchy<PropertyId>,
    direct_types: FxHashMap<IndividualId, Vec<ClassId>>,
    same_individuals: FxHashMap<IndividualId, Vec<IndividualId>>,
}

impl Classification {
    /// The hierarchy over the named classes.
    pub fn class_hierarchy(&self) -> &Hierarchy<ClassId> {
        &self.class_hierarchy
    }

    /// The hierarchy over the named object properties.
    pub fn property_hierarchy(&self) -> &Hierarchy<PropertyId> {
        &self.property_hierarchy
    }

    /// The most specific named classes an individual belongs to.
    pub fn direct_types(&self, individual: IndividualId) -> &[ClassId] {
        self.direct_types
            .get(&individual)
            .map_or(&[], Vec::as_slice)
    }

    /// The individuals entailed to be equal to `individual`, excluding
    /// itself.
    pub fn same_individuals(&self, individual: IndividualId) -> &[IndividualId] {
        self.same_individuals
            .get(&individual)
            .map_or(&[], Vec::as_slice)
    }
}

/// A classification run over one loaded ontology.
pub struct Classifier {
    ontology: ExtendedOntology,
    status: ClassifierStatus,
    chain: RuleChain,
    classification: Option<Classification>,
}

impl Classifier {
    /// Prepares a run: seeds the state and assembles the rule chain for
    /// the ontology's expressivity.
    pub fn new(ontology: ExtendedOntology, ids: EntityAllocator) -> Self {
        let chain = RuleChain::for_expressivity(ontology.expressivity());
        let status = ClassifierStatus::new(&ontology, ids);
        Self {
            ontology,
            status,
            chain,
            classification: None,
        }
    }

    /// The ontology this run classifies.
    pub fn ontology(&self) -> &ExtendedOntology {
        &self.ontology
    }

    /// Performs one step: commits one pending entry and evaluates the
    /// rules it triggers. Returns `true` once classification is complete.
    ///
    /// The step that finds both queues empty performs post-processing, so
    /// the final call is heavier than the others.
    pub fn process(&mut self) -> Result<bool, ClassificationError> {
        if self.classification.is_some() {
            return Ok(true);
        }
        // Drain the longer queue first to keep both short.
        let entry = if self.status.pending_s() >= self.status.pending_r() {
            self.status.pop_s().map(Change::S)
        } else {
            self.status.pop_r().map(Change::R)
        };
        let Some(entry) = entry.or_else(|| {
            self.status
                .pop_s()
                .map(Change::S)
                .or_else(|| self.status.pop_r().map(Change::R))
        }) else {
            self.classification = Some(self.post_process()?);
            return Ok(true);
        };
        let changes = match entry {
            Change::S(entry) => {
                if self.status.add_to_s(entry) {
                    self.chain.apply_s(&self.ontology, &self.status, entry)
                } else {
                    Vec::new()
                }
            }
            Change::R(entry) => {
                if self.status.add_to_r(entry) {
                    self.chain.apply_r(&self.ontology, &self.status, entry)
                } else {
                    Vec::new()
                }
            }
        };
        for change in changes {
            match change {
                Change::S(entry) => {
                    self.status.suggest_s(entry);
                }
                Change::R(entry) => {
                    self.status.suggest_r(entry);
                }
            }
        }
        Ok(false)
    }

    /// Runs the fixpoint to completion.
    pub fn classify(&mut self) -> Result<(), ClassificationError> {
        while !self.process()? {}
        Ok(())
    }

    /// The result, once [`classify`](Self::classify) has finished.
    pub fn classification(&self) -> Result<&Classification, ClassificationError> {
        self.classification
            .as_ref()
            .ok_or(ClassificationError::Unclassified)
    }

    /// Returns true once the run is complete.
    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    /// The number of entries waiting to be committed.
    pub fn pending_entries(&self) -> usize {
        self.status.pending_s() + self.status.pending_r()
    }

    /// The number of subsumptions derived so far. Monotone across steps.
    pub fn subsumption_count(&self) -> usize {
        self.status.s_len()
    }

    fn post_process(&self) -> Result<Classification, ClassificationError> {
        let named_classes: FxHashSet<ClassId> = self
            .status
            .with_ids(|ids| {
                self.ontology
                    .classes()
                    .iter()
                    .filter(|&&class| !ids.is_auxiliary_class(class))
                    .copied()
                    .collect()
            });
        let named_properties: FxHashSet<PropertyId> = self
            .status
            .with_ids(|ids| {
                self.ontology
                    .properties()
                    .iter()
                    .filter(|&&property| !ids.is_auxiliary_property(property))
                    .copied()
                    .collect()
            });
        let nominal_classes = self.ontology.nominal_classes();

        let property_hierarchy = Hierarchy::compress(
            self.ontology.role_graph(),
            &named_properties,
            PropertyId::TOP,
            PropertyId::BOTTOM,
        );

        let mut direct_types: FxHashMap<IndividualId, Vec<ClassId>> = FxHashMap::default();
        let mut same_individuals: FxHashMap<IndividualId, Vec<IndividualId>> =
            FxHashMap::default();

        if self.ontology.expressivity().has_nominal {
            self.propagate_nominals(&named_classes, nominal_classes);

            // Individuals are read off a hierarchy that keeps the nominal
            // classes alongside the named ones.
            let mut with_nominals = named_classes.clone();
            with_nominals.extend(nominal_classes.iter().copied());
            let snapshot = self.status.s_graph();
            let individual_hierarchy = Hierarchy::compress(
                snapshot.forward(),
                &with_nominals,
                ClassId::TOP,
                ClassId::BOTTOM,
            );

            let mut individuals: Vec<IndividualId> =
                self.ontology.individuals().iter().copied().collect();
            individuals.sort_unstable();
            for individual in individuals {
                let Some(nominal) = self.ontology.nominal_class_of(individual) else {
                    continue;
                };
                let equivalents = individual_hierarchy.equivalents(nominal);

                let mut types: Vec<ClassId> = equivalents
                    .iter()
                    .filter(|class| !nominal_classes.contains(class))
                    .copied()
                    .collect();
                if types.is_empty() {
                    for parent in individual_hierarchy.parents(nominal) {
                        if nominal_classes.contains(&parent) {
                            return Err(ClassificationError::InvariantViolation(format!(
                                "individual {individual} has a strictly more general nominal"
                            )));
                        }
                        types.push(parent);
                    }
                }
                types.sort_unstable();
                direct_types.insert(individual, types);

                let mut same: Vec<IndividualId> = equivalents
                    .iter()
                    .filter_map(|&class| {
                        self.status
                            .with_ids(|ids| ids.individual_of_nominal(class))
                    })
                    .filter(|&other| other != individual)
                    .collect();
                same.sort_unstable();
                same_individuals.insert(individual, same);
            }
        }

        let snapshot = self.status.s_graph();
        let class_hierarchy = Hierarchy::compress(
            snapshot.forward(),
            &named_classes,
            ClassId::TOP,
            ClassId::BOTTOM,
        );

        Ok(Classification {
            class_hierarchy,
            property_hierarchy,
            direct_types,
            same_individuals,
        })
    }

    /// Equates the subsumees of each nominal that are provably connected
    /// to the nominal's single element.
    ///
    /// Two classes below `{a}` denote the same singleton, but only when
    /// both are known non-empty; connectivity over R, directly or through
    /// a shared nominal, is the witness for that.
    fn propagate_nominals(
        &self,
        named_classes: &FxHashSet<ClassId>,
        nominal_classes: &FxHashSet<ClassId>,
    ) {
        let nominals: Vec<ClassId> = {
            let mut sorted: Vec<ClassId> = nominal_classes.iter().copied().collect();
            sorted.sort_unstable();
            sorted
        };
        for &nominal in &nominals {
            let mut below: Vec<ClassId> = self
                .status
                .subsumees(nominal)
                .into_iter()
                .filter(|class| {
                    *class != ClassId::BOTTOM
                        && (named_classes.contains(class) || nominal_classes.contains(class))
                })
                .collect();
            below.push(nominal);
            below.sort_unstable();
            below.dedup();

            for (i, &x) in below.iter().enumerate() {
                for &y in below.iter().skip(i + 1) {
                    let connected = self.status.r_related(x, y)
                        || nominals.iter().any(|&m| {
                            self.status.r_related(x, m) && self.status.r_related(y, m)
                        })
                        || (nominal_classes.contains(&x) && nominal_classes.contains(&y));
                    if !connected
                        || (self.status.s_contains(x, y) && self.status.s_contains(y, x))
                    {
                        continue;
                    }
                    for sup in self.status.subsumers(y) {
                        self.status.add_to_s(SEntry::new(x, sup));
                    }
                    for sup in self.status.subsumers(x) {
                        self.status.add_to_s(SEntry::new(y, sup));
                    }
                    self.status.add_to_s(SEntry::new(x, y));
                    self.status.add_to_s(SEntry::new(y, x));
                }
            }
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("pending", &self.pending_entries())
            .field("subsumptions", &self.subsumption_count())
            .field("classified", &self.is_classified())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::NormalForm;

    fn classifier(forms: Vec<NormalForm>, class_count: u32, property_count: u32) -> Classifier {
        let mut ids = EntityAllocator::new(class_count, property_count);
        let ontology =
            ExtendedOntology::load(forms.into_iter().map(Into::into).collect(), &mut ids);
        Classifier::new(ontology, ids)
    }

    #[test]
    fn classification_is_unavailable_before_the_fixpoint() {
        let classifier = classifier(
            vec![NormalForm::Gci0 {
                sub: ClassId(2),
                sup: ClassId(3),
            }],
            4,
            2,
        );
        assert!(matches!(
            classifier.classification(),
            Err(ClassificationError::Unclassified)
        ));
    }

    #[test]
    fn stepping_is_monotone_and_terminates() {
        let mut classifier = classifier(
            vec![
                NormalForm::Gci0 {
                    sub: ClassId(2),
                    sup: ClassId(3),
                },
                NormalForm::Gci0 {
                    sub: ClassId(3),
                    sup: ClassId(4),
                },
            ],
            5,
            2,
        );
        let mut previous = classifier.subsumption_count();
        let mut steps = 0usize;
        loop {
            let done = classifier.process().unwrap();
            let count = classifier.subsumption_count();
            assert!(count >= previous);
            previous = count;
            if done {
                break;
            }
            steps += 1;
            assert!(steps < 10_000, "fixpoint did not terminate");
        }
        assert!(classifier.is_classified());
        // Further steps are no-ops.
        assert!(classifier.process().unwrap());
        let hierarchy = classifier.classification().unwrap().class_hierarchy();
        assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(4)));
    }
}
