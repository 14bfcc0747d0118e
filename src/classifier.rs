//! Rejection classification.
//!
//! Decides, for each rejection that reaches a guarded future, whether it is
//! captured into the result tuple or propagated as the future's own error.
//!
//! The rule reads inverted on purpose: an installed predicate names the
//! *expected* errors. A truthy predicate captures, a missing predicate
//! captures, and only a predicate that returns `false` propagates.

use std::fmt;

use crate::config::{global_predicate, GuardConfig, Predicate};
use crate::rejection::Rejection;

/// What a guarded future does with a rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Place the error in the tuple's error slot.
    Capture,
    /// Complete the guarded future with the error.
    Propagate,
}

#[derive(Clone, Default)]
enum PredicateSource {
    /// Read the process-wide cell at settle time.
    #[default]
    Global,
    /// A predicate fixed at construction.
    Scoped(Option<Predicate>),
}

/// Decides whether a rejection is captured or propagated.
///
/// The [`global`](Self::global) classifier follows [`configure`](crate::configure);
/// classifiers built with [`new`](Self::new) keep their own predicate and can
/// be scoped per module, request or test.
#[derive(Clone, Default)]
pub struct RejectionClassifier {
    source: PredicateSource,
}

impl fmt::Debug for RejectionClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            PredicateSource::Global => "global",
            PredicateSource::Scoped(Some(_)) => "scoped",
            PredicateSource::Scoped(None) => "capture-all",
        };
        f.debug_struct("RejectionClassifier")
            .field("source", &source)
            .finish()
    }
}

impl RejectionClassifier {
    /// A classifier backed by the process-wide predicate.
    pub fn global() -> Self {
        Self::default()
    }

    /// A scoped classifier using `config`'s predicate.
    pub fn new(config: GuardConfig) -> Self {
        Self {
            source: PredicateSource::Scoped(config.predicate),
        }
    }

    /// A scoped classifier that captures every rejection.
    pub fn capture_all() -> Self {
        Self::new(GuardConfig::default())
    }

    /// Returns true if this classifier reads the process-wide predicate.
    pub fn is_global(&self) -> bool {
        matches!(self.source, PredicateSource::Global)
    }

    /// Returns true if a predicate is currently active for this classifier.
    pub fn has_predicate(&self) -> bool {
        self.predicate().is_some()
    }

    fn predicate(&self) -> Option<Predicate> {
        match &self.source {
            PredicateSource::Global => global_predicate(),
            PredicateSource::Scoped(predicate) => predicate.clone(),
        }
    }

    /// Classifies a rejection.
    pub fn classify<E: Rejection>(&self, error: &E) -> Disposition {
        let error: &dyn Rejection = error;
        match self.predicate() {
            Some(predicate) if !predicate(error) => Disposition::Propagate,
            _ => Disposition::Capture,
        }
    }

    /// Returns true only when a predicate is active and rejects `error`.
    pub fn should_propagate<E: Rejection>(&self, error: &E) -> bool {
        self.classify(error) == Disposition::Propagate
    }
}
