//! Errors surfaced by the classification API.

/// An error returned by [`Classifier`](crate::Classifier) operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// The result was requested before the fixpoint finished.
    #[error("the ontology has not been classified yet")]
    Unclassified,
    /// Post-processing found a state the modeling rules out.
    #[error("modeling invariant violated: {0}")]
    InvariantViolation(String),
}
