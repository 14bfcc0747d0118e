//! tuple-guard - result tuples for fallible futures
//!
//! Guarded futures never fail for the errors you expect: they complete with a
//! `(value, error)` pair instead, so call sites branch on the pair rather than
//! threading `?` through every await. Errors an installed predicate does not
//! recognize still propagate as the guarded future's own `Err`.
//!
//! ```
//! use tuple_guard::{configure, guard, wrap, GuardConfig, Rejection};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let load = wrap(|id: u32| async move {
//!     if id == 7 { Ok("seven") } else { Err(json!({"code": 404})) }
//! });
//!
//! let (value, err) = load.call(7).await.unwrap();
//! assert_eq!((value, err), (Some("seven"), None));
//!
//! // Only errors carrying a code are expected; anything else propagates.
//! configure(GuardConfig::new().with_predicate(|e: &dyn Rejection| e.code().is_some()));
//! assert!(load.call(1).await.is_ok());
//! assert!(guard(async { Err::<(), _>(json!({"id": 1})) }).await.is_err());
//! configure(GuardConfig::default());
//! # });
//! ```

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod method;
pub mod rejection;
pub mod settings;

pub use adapter::{
    guard, wrap, wrap_with_default, DefaultData, GuardExt, Guarded, NoDefault, Tuple,
    TupleAdapter, Wrapped,
};
pub use classifier::{Disposition, RejectionClassifier};
pub use crate::config::{configure, current_config, GuardConfig, Predicate};
pub use error::GuardError;
pub use method::{
    guard_method, guard_method_with_default, BoundMethod, BoxedMethod, GuardedMethod, Member,
    MethodTable, TupleDecorator,
};
pub use rejection::{ErrorCode, Fault, Rejection};
pub use settings::Settings;
