//! Process-wide classification configuration.
//!
//! A single cell holds at most one predicate. [`configure`] replaces it
//! verbatim, last writer wins, and every guarded future that settles
//! afterwards through the global classifier observes the new predicate.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::rejection::Rejection;

/// A classifier predicate.
///
/// Returns `true` for errors that are expected/operational (captured into the
/// tuple) and `false` for errors that must propagate.
pub type Predicate = Arc<dyn Fn(&dyn Rejection) -> bool + Send + Sync>;

static GLOBAL_PREDICATE: RwLock<Option<Predicate>> = RwLock::new(None);

/// Configuration for the rejection classifier.
#[derive(Clone, Default)]
pub struct GuardConfig {
    /// The predicate to install; `None` captures every rejection.
    pub predicate: Option<Predicate>,
}

impl fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardConfig")
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl GuardConfig {
    /// Creates a configuration with no predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the predicate.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&dyn Rejection) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Clears the predicate.
    pub fn without_predicate(mut self) -> Self {
        self.predicate = None;
        self
    }

    /// Returns true if a predicate is set.
    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }
}

/// Installs `config.predicate` as the process-wide predicate.
///
/// Passing a configuration without a predicate resets the global classifier
/// to capture every rejection.
///
/// # Examples
///
/// ```
/// use tuple_guard::{configure, GuardConfig, Rejection};
///
/// configure(GuardConfig::new().with_predicate(|e: &dyn Rejection| e.code().is_some()));
/// // ...
/// configure(GuardConfig::default());
/// ```
pub fn configure(config: GuardConfig) {
    let installed = config.predicate.is_some();
    *GLOBAL_PREDICATE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = config.predicate;
    debug!(target: "tuple_guard", installed, "global classifier predicate replaced");
}

/// Returns a snapshot of the process-wide configuration.
pub fn current_config() -> GuardConfig {
    GuardConfig {
        predicate: global_predicate(),
    }
}

pub(crate) fn global_predicate() -> Option<Predicate> {
    GLOBAL_PREDICATE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Serializes tests that touch the global cell and resets it to capture-all.
#[cfg(test)]
pub(crate) fn exclusive_global() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    configure(GuardConfig::default());
    guard
}
