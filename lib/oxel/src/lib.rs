//! EL++ ontology classification for Oxigraph.
//!
//! This crate computes the class hierarchy of an EL++ ontology:
//! - Normalization of arbitrary class and property axioms into the EL++
//!   normal forms, with auxiliary naming of complex expressions
//! - A completion-rule fixpoint deriving every entailed subsumption,
//!   with optional inverse, functionality, nominal and bottom handling
//! - Compression of the saturated state into frozen class and property
//!   hierarchies, direct types and same-individual groups
//!
//! # Example
//! ```
//! use oxel::{
//!     Axiom, ClassExpression, ClassId, Classifier, EntityAllocator,
//!     ExtendedOntology, normalize,
//! };
//!
//! // Two named classes besides ⊥ (id 0) and ⊤ (id 1).
//! let mut ids = EntityAllocator::new(4, 2);
//! let axioms = vec![
//!     Axiom::SubClassOf {
//!         sub: ClassExpression::Class(ClassId(2)),
//!         sup: ClassExpression::Class(ClassId(3)),
//!     }
//!     .into(),
//! ];
//! let normalized = normalize(axioms, &mut ids);
//! let ontology = ExtendedOntology::load(normalized.axioms, &mut ids);
//! let mut classifier = Classifier::new(ontology, ids);
//! classifier.classify()?;
//! let hierarchy = classifier.classification()?.class_hierarchy();
//! assert!(hierarchy.is_subsumed_by(ClassId(2), ClassId(3)));
//! # Ok::<_, oxel::ClassificationError>(())
//! ```

mod axiom;
mod classifier;
mod error;
mod graph;
mod hierarchy;
mod ids;
mod normalize;
mod ontology;
mod rules;
mod status;

pub use axiom::{
    AnnotatedAxiom, Annotation, Axiom, ClassExpression, NormalForm, NormalizedAxiom,
};
pub use classifier::{Classification, Classifier};
pub use error::ClassificationError;
pub use graph::{BidirectionalGraph, DirectedGraph, RelationMap};
pub use hierarchy::Hierarchy;
pub use ids::{ClassId, EntityAllocator, IndividualId, PropertyId};
pub use normalize::{Normalization, normalize};
pub use ontology::{Expressivity, ExtendedOntology};
