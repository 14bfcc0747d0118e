//! Attaching the tuple adapter to methods.
//!
//! There is no decorator hook to intercept method definitions, so attachment
//! is an explicit higher-order wrapper. A method is any `Fn(&S, A) -> Fut`;
//! the receiver is passed through on every call.
//!
//! - [`guard_method`] / [`guard_method_with_default`] wrap a typed method.
//! - [`TupleDecorator`] covers the two decorator shapes: inline, or with a
//!   pre-bound default producing a configured wrapper.
//! - [`MethodTable::bind_guarded`] attaches the adapter to a named table
//!   member and rejects non-callable members at attachment time.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::adapter::{DefaultData, Guarded, NoDefault};
use crate::classifier::RejectionClassifier;
use crate::error::GuardError;

/// A method wrapped with tuple semantics.
#[derive(Clone, Debug)]
pub struct GuardedMethod<M, D = NoDefault> {
    method: M,
    default: D,
    classifier: RejectionClassifier,
}

impl<M, D> GuardedMethod<M, D> {
    /// Calls the method on `receiver` with `args`.
    pub fn call<'a, S, A, Fut, T, E>(&self, receiver: &'a S, args: A) -> Guarded<Fut, T>
    where
        S: ?Sized,
        M: Fn(&'a S, A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        D: DefaultData<T>,
    {
        Guarded::new(
            (self.method)(receiver, args),
            self.default.default_data(),
            self.classifier.clone(),
        )
    }

    /// Returns the original method.
    pub fn into_inner(self) -> M {
        self.method
    }
}

/// Wraps `method` with the global classifier.
///
/// # Examples
///
/// ```
/// use tuple_guard::{guard_method, Fault};
///
/// struct Users;
///
/// impl Users {
///     async fn find(&self, id: u32) -> Result<String, Fault> {
///         match id {
///             1 => Ok("ada".to_string()),
///             _ => Err(Fault::new("no such user").with_code(404)),
///         }
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let find = guard_method(Users::find);
/// let (user, err) = find.call(&Users, 1).await.unwrap();
/// assert_eq!(user.as_deref(), Some("ada"));
/// assert!(err.is_none());
/// # });
/// ```
pub fn guard_method<M>(method: M) -> GuardedMethod<M> {
    TupleDecorator::new().decorate(method)
}

/// Wraps `method` with the global classifier and default data for captures.
pub fn guard_method_with_default<M, T: Clone>(
    method: M,
    default: T,
) -> GuardedMethod<M, Option<T>> {
    TupleDecorator::with_default(default).decorate(method)
}

/// Produces [`GuardedMethod`]s sharing one default and classifier.
#[derive(Clone, Debug, Default)]
pub struct TupleDecorator<D = NoDefault> {
    default: D,
    classifier: RejectionClassifier,
}

impl TupleDecorator {
    /// A decorator without default data.
    pub fn new() -> Self {
        Self::default()
    }

    /// A decorator whose captures carry a clone of `default`.
    pub fn with_default<T>(default: T) -> TupleDecorator<Option<T>> {
        TupleDecorator {
            default: Some(default),
            classifier: RejectionClassifier::global(),
        }
    }
}

impl<D: Clone> TupleDecorator<D> {
    /// Uses `classifier` instead of the global one.
    pub fn with_classifier(mut self, classifier: RejectionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Attaches the adapter to `method`.
    pub fn decorate<M>(&self, method: M) -> GuardedMethod<M, D> {
        GuardedMethod {
            method,
            default: self.default.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

/// A type-erased asynchronous method stored in a [`MethodTable`].
pub type BoxedMethod<S, A, T, E> =
    Arc<dyn for<'a> Fn(&'a S, A) -> BoxFuture<'a, Result<T, E>> + Send + Sync>;

/// A member of a [`MethodTable`].
pub enum Member<S, A, T, E> {
    /// A callable method.
    Method(BoxedMethod<S, A, T, E>),
    /// A plain data value.
    Value(serde_json::Value),
}

impl<S, A, T, E> Clone for Member<S, A, T, E> {
    fn clone(&self) -> Self {
        match self {
            Member::Method(method) => Member::Method(Arc::clone(method)),
            Member::Value(value) => Member::Value(value.clone()),
        }
    }
}

impl<S, A, T, E> fmt::Debug for Member<S, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Method(_) => f.write_str("Method(<fn>)"),
            Member::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl<S, A, T, E> Member<S, A, T, E> {
    /// The member's type name as reported in attachment errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Member::Method(_) => "function",
            Member::Value(value) => json_type_name(value),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Named members of a receiver type, looked up at attachment time.
pub struct MethodTable<S, A, T, E> {
    members: HashMap<String, Member<S, A, T, E>>,
}

impl<S, A, T, E> Default for MethodTable<S, A, T, E> {
    fn default() -> Self {
        Self {
            members: HashMap::new(),
        }
    }
}

impl<S, A, T, E> fmt::Debug for MethodTable<S, A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("members", &self.members)
            .finish()
    }
}

impl<S, A, T, E> MethodTable<S, A, T, E> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a method member.
    pub fn insert_method<M>(&mut self, name: impl Into<String>, method: M) -> &mut Self
    where
        M: for<'a> Fn(&'a S, A) -> BoxFuture<'a, Result<T, E>> + Send + Sync + 'static,
    {
        self.members
            .insert(name.into(), Member::Method(Arc::new(method)));
        self
    }

    /// Adds or replaces a data member.
    pub fn insert_value(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.members.insert(name.into(), Member::Value(value));
        self
    }

    /// Looks up a member.
    pub fn get(&self, name: &str) -> Option<&Member<S, A, T, E>> {
        self.members.get(name)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the table has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Attaches the adapter to the member `name` using the global classifier.
    ///
    /// Fails immediately when the member is missing or is not a method.
    pub fn bind_guarded(
        &self,
        name: &str,
        default: Option<T>,
    ) -> Result<BoundMethod<S, A, T, E>, GuardError> {
        self.bind_guarded_with(name, default, RejectionClassifier::global())
    }

    /// Like [`bind_guarded`](Self::bind_guarded) with an explicit classifier.
    pub fn bind_guarded_with(
        &self,
        name: &str,
        default: Option<T>,
        classifier: RejectionClassifier,
    ) -> Result<BoundMethod<S, A, T, E>, GuardError> {
        let member = self
            .members
            .get(name)
            .ok_or_else(|| GuardError::MissingMember(name.to_string()))?;

        match member {
            Member::Method(method) => {
                debug!(target: "tuple_guard", member = name, "attached tuple guard");
                Ok(BoundMethod {
                    method: Arc::clone(method),
                    default,
                    classifier,
                })
            }
            Member::Value(value) => Err(GuardError::NotCallable {
                member: name.to_string(),
                found: json_type_name(value),
            }),
        }
    }
}

/// A table member with the adapter attached.
pub struct BoundMethod<S, A, T, E> {
    method: BoxedMethod<S, A, T, E>,
    default: Option<T>,
    classifier: RejectionClassifier,
}

impl<S, A, T: Clone, E> Clone for BoundMethod<S, A, T, E> {
    fn clone(&self) -> Self {
        Self {
            method: Arc::clone(&self.method),
            default: self.default.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl<S, A, T, E> BoundMethod<S, A, T, E> {
    /// Calls the bound method on `receiver` with `args`.
    pub fn call<'a>(&self, receiver: &'a S, args: A) -> Guarded<BoxFuture<'a, Result<T, E>>, T>
    where
        T: Clone,
    {
        Guarded::new(
            (self.method)(receiver, args),
            self.default.clone(),
            self.classifier.clone(),
        )
    }
}
