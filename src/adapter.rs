//! The tuple adapter.
//!
//! Turns a future of `Result<T, E>` into a future of
//! `Result<(Option<T>, Option<E>), E>`: successes and captured rejections both
//! complete with `Ok(tuple)`, and only rejections the classifier marks for
//! propagation complete with `Err(e)`.
//!
//! Two entry points share one settle rule:
//!
//! - [`wrap`] / [`wrap_with_default`] wrap a callable before it is invoked.
//! - [`guard`] (or [`GuardExt::guarded`]) guards a future that already exists.
//!
//! Panics inside the wrapped callable or its future are never caught.

use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use pin_project::pin_project;
use tracing::{debug, warn};

use crate::classifier::{Disposition, RejectionClassifier};
use crate::config::GuardConfig;
use crate::rejection::Rejection;

/// The `(value, error)` pair a guarded call resolves to.
pub type Tuple<T, E> = (Option<T>, Option<E>);

/// Source of the value placed in a captured-failure tuple.
pub trait DefaultData<T> {
    /// Produces the value slot for one captured failure.
    fn default_data(&self) -> Option<T>;
}

/// No default data: captured failures carry `None` in the value slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoDefault;

impl<T> DefaultData<T> for NoDefault {
    fn default_data(&self) -> Option<T> {
        None
    }
}

impl<T: Clone> DefaultData<T> for Option<T> {
    fn default_data(&self) -> Option<T> {
        self.clone()
    }
}

/// Future returned by every guarded call.
#[pin_project]
#[must_use = "futures do nothing unless polled"]
pub struct Guarded<Fut, T> {
    #[pin]
    inner: Fut,
    default: Option<T>,
    classifier: RejectionClassifier,
}

impl<Fut, T> Guarded<Fut, T> {
    pub(crate) fn new(inner: Fut, default: Option<T>, classifier: RejectionClassifier) -> Self {
        Self {
            inner,
            default,
            classifier,
        }
    }
}

impl<Fut, T, E> Future for Guarded<Fut, T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Rejection,
{
    type Output = Result<Tuple<T, E>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let outcome = ready!(this.inner.poll(cx));
        Poll::Ready(settle(outcome, this.default.take(), this.classifier))
    }
}

fn settle<T, E: Rejection>(
    outcome: Result<T, E>,
    default: Option<T>,
    classifier: &RejectionClassifier,
) -> Result<Tuple<T, E>, E> {
    let error = match outcome {
        Ok(value) => return Ok((Some(value), None)),
        Err(error) => error,
    };

    match classifier.classify(&error) {
        Disposition::Capture => {
            debug!(target: "tuple_guard", code = ?error.code(), error = ?error, "captured rejection");
            Ok((default, Some(error)))
        }
        Disposition::Propagate => {
            warn!(target: "tuple_guard", code = ?error.code(), error = ?error, "propagating unrecognized rejection");
            Err(error)
        }
    }
}

/// An asynchronous callable wrapped with tuple semantics.
///
/// Multiple arguments are passed as a tuple: `wrapped.call((a, b))`.
#[derive(Clone, Debug)]
pub struct Wrapped<F, D = NoDefault> {
    op: F,
    default: D,
    classifier: RejectionClassifier,
}

impl<F, D> Wrapped<F, D> {
    /// Invokes the wrapped callable with `args`.
    pub fn call<A, Fut, T, E>(&self, args: A) -> Guarded<Fut, T>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        D: DefaultData<T>,
    {
        Guarded::new(
            (self.op)(args),
            self.default.default_data(),
            self.classifier.clone(),
        )
    }

    /// The classifier consulted when a call rejects.
    pub fn classifier(&self) -> &RejectionClassifier {
        &self.classifier
    }

    /// Returns the original callable.
    pub fn into_inner(self) -> F {
        self.op
    }
}

impl<F, T> Wrapped<F, Option<T>> {
    /// The default data substituted on capture.
    pub fn default_data(&self) -> Option<&T> {
        self.default.as_ref()
    }
}

/// Bundles a classifier with the wrap and guard entry points.
///
/// [`TupleAdapter::global`] consults the process-wide predicate; an adapter
/// built with [`TupleAdapter::new`] keeps its own.
#[derive(Clone, Debug, Default)]
pub struct TupleAdapter {
    classifier: RejectionClassifier,
}

impl TupleAdapter {
    /// An adapter following [`configure`](crate::configure).
    pub fn global() -> Self {
        Self::default()
    }

    /// An adapter with its own predicate.
    pub fn new(config: GuardConfig) -> Self {
        Self::with_classifier(RejectionClassifier::new(config))
    }

    /// An adapter using `classifier`.
    pub fn with_classifier(classifier: RejectionClassifier) -> Self {
        Self { classifier }
    }

    /// The adapter's classifier.
    pub fn classifier(&self) -> &RejectionClassifier {
        &self.classifier
    }

    /// Wraps `op`; captured failures carry `None` in the value slot.
    pub fn wrap<F>(&self, op: F) -> Wrapped<F> {
        Wrapped {
            op,
            default: NoDefault,
            classifier: self.classifier.clone(),
        }
    }

    /// Wraps `op`; captured failures carry a clone of `default`.
    pub fn wrap_with_default<F, T>(&self, op: F, default: T) -> Wrapped<F, Option<T>> {
        Wrapped {
            op,
            default: Some(default),
            classifier: self.classifier.clone(),
        }
    }

    /// Guards an already-constructed future. No default data.
    pub fn guard<Fut, T, E>(&self, fut: Fut) -> Guarded<Fut, T>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        Guarded::new(fut, None, self.classifier.clone())
    }
}

/// Wraps `op` with the global classifier.
///
/// # Examples
///
/// ```
/// use tuple_guard::wrap;
///
/// # tokio_test::block_on(async {
/// let fetch = wrap(|id: u32| async move {
///     if id == 0 { Err("boom") } else { Ok(id * 2) }
/// });
///
/// assert_eq!(fetch.call(2).await, Ok((Some(4), None)));
/// assert_eq!(fetch.call(0).await, Ok((None, Some("boom"))));
/// # });
/// ```
pub fn wrap<F>(op: F) -> Wrapped<F> {
    TupleAdapter::global().wrap(op)
}

/// Wraps `op` with the global classifier and default data for captures.
pub fn wrap_with_default<F, T>(op: F, default: T) -> Wrapped<F, Option<T>> {
    TupleAdapter::global().wrap_with_default(op, default)
}

/// Guards an existing future with the global classifier.
pub fn guard<Fut, T, E>(fut: Fut) -> Guarded<Fut, T>
where
    Fut: Future<Output = Result<T, E>>,
{
    TupleAdapter::global().guard(fut)
}

/// Method syntax for [`guard`].
pub trait GuardExt<T, E>: Future<Output = Result<T, E>> + Sized {
    /// Guards this future with the global classifier.
    fn guarded(self) -> Guarded<Self, T> {
        guard(self)
    }

    /// Guards this future with `adapter`'s classifier.
    fn guarded_by(self, adapter: &TupleAdapter) -> Guarded<Self, T> {
        adapter.guard(self)
    }
}

impl<Fut, T, E> GuardExt<T, E> for Fut where Fut: Future<Output = Result<T, E>> {}
