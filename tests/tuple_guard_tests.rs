//! Integration tests for guarded futures.
//!
//! Exercises the public surface end-to-end: wrapping callables, guarding
//! existing futures, global and scoped classification, method attachment
//! and settings-driven configuration.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{err, ok, try_join, try_join_all};
use serde_json::{json, Value};
use tuple_guard::{
    configure, guard, guard_method, guard_method_with_default, wrap, wrap_with_default, Fault, GuardConfig, GuardError,
    GuardExt, MethodTable, Rejection, Settings, TupleAdapter, TupleDecorator,
};

/// Tests in this file share the process-wide predicate.
fn global_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    let guard = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    configure(GuardConfig::default());
    guard
}

fn code_predicate() -> GuardConfig {
    GuardConfig::new().with_predicate(|e: &dyn Rejection| e.code().is_some())
}

// ============================================================================
// Wrapping callables
// ============================================================================

#[tokio::test]
async fn test_wrapped_callable_resolves_to_value() {
    let _lock = global_lock();
    let request = wrap(|data: &'static str| async move { Ok::<_, Fault>(data) });

    let (data, error) = request.call("X").await.expect("never propagates");

    assert_eq!(data, Some("X"));
    assert!(error.is_none());
}

#[tokio::test]
async fn test_wrapped_callable_captures_rejection() {
    let _lock = global_lock();
    let request = wrap(|reason: &'static str| async move { Err::<String, _>(reason) });

    let (data, error) = request.call("boom").await.expect("captured");

    assert!(data.is_none());
    assert_eq!(error, Some("boom"));
}

#[tokio::test]
async fn test_wrapped_async_fn_with_error_message() {
    let _lock = global_lock();

    async fn reject(message: String) -> Result<u32, Fault> {
        Err(Fault::new(message))
    }

    let (data, error) = wrap(reject)
        .call("some data".to_string())
        .await
        .expect("captured");

    assert!(data.is_none());
    assert_eq!(error.and_then(|e| e.message()).as_deref(), Some("some data"));
}

#[tokio::test]
async fn test_expected_error_captured_with_predicate() {
    let _lock = global_lock();
    configure(code_predicate());

    let request = wrap(|()| async { Err::<Value, _>(json!({"code": 404})) });
    let (data, error) = request.call(()).await.expect("captured");

    assert!(data.is_none());
    assert_eq!(error.expect("error slot")["code"], 404);
}

#[tokio::test]
async fn test_unexpected_error_propagates_with_predicate() {
    let _lock = global_lock();
    configure(code_predicate());

    let request = wrap(|()| async { Err::<Value, _>(json!({"id": 404})) });
    let error = request.call(()).await.expect_err("propagated");

    assert_eq!(error["id"], 404);
}

#[tokio::test]
async fn test_default_data_on_capture() {
    let _lock = global_lock();
    let request = wrap_with_default(
        |()| async { Err::<Value, _>("err") },
        json!({"foo": "bar", "baz": "qux"}),
    );

    let (data, error) = request.call(()).await.expect("captured");
    let data = data.expect("default data");

    assert!(error.is_some());
    assert_eq!(data["foo"], "bar");
    assert_eq!(data["baz"], "qux");
}

// ============================================================================
// Guarding existing futures
// ============================================================================

#[tokio::test]
async fn test_guard_resolved_future() {
    let _lock = global_lock();

    let (data, error) = guard(ok::<_, &str>("some data")).await.expect("resolves");

    assert_eq!(data, Some("some data"));
    assert!(error.is_none());
}

#[tokio::test]
async fn test_guard_async_block_rejection() {
    let _lock = global_lock();

    let (data, error) = guard(async { Err::<(), _>(Fault::new("some error")) })
        .await
        .expect("captured");

    assert!(data.is_none());
    assert_eq!(error.expect("error slot").to_string(), "some error");
}

#[tokio::test]
async fn test_guard_join_resolves() {
    let _lock = global_lock();

    let joined = try_join(ok::<_, &str>("foo"), ok("bar"));
    let (data, error) = guard(joined).await.expect("resolves");

    assert!(error.is_none());
    assert_eq!(data, Some(("foo", "bar")));
}

#[tokio::test]
async fn test_guard_join_rejects_like_single_future() {
    let _lock = global_lock();

    let joined = try_join_all(vec![ok::<&str, &str>("foo"), err("bar")]);
    let (data, error) = joined.guarded().await.expect("captured");

    assert!(data.is_none());
    assert_eq!(error, Some("bar"));
}

#[tokio::test]
async fn test_guard_never_applies_default_data() {
    let _lock = global_lock();
    configure(code_predicate());

    let (data, error) = guard(err::<Value, _>(json!({"code": 503})))
        .await
        .expect("captured");

    assert!(data.is_none());
    assert_eq!(error, Some(json!({"code": 503})));
}

#[tokio::test]
async fn test_guard_propagates_unrecognized_error() {
    let _lock = global_lock();
    configure(code_predicate());

    let error = guard(err::<(), _>(Fault::new("programmer error")))
        .await
        .expect_err("propagated");

    assert_eq!(error, Fault::new("programmer error"));
}

// ============================================================================
// Configuration reset and scoping
// ============================================================================

#[tokio::test]
async fn test_empty_config_resets_classifier() {
    let _lock = global_lock();
    configure(GuardConfig::new().with_predicate(|_: &dyn Rejection| false));
    configure(GuardConfig::default());

    let result = guard(err::<(), _>(json!({"id": 1}))).await;

    assert_eq!(result, Ok((None, Some(json!({"id": 1})))));
}

#[tokio::test]
async fn test_scoped_adapter_independent_of_global() {
    let _lock = global_lock();
    let scoped = TupleAdapter::new(code_predicate());

    let error = scoped
        .guard(err::<(), _>(json!({"id": 1})))
        .await
        .expect_err("scoped predicate propagates");
    assert_eq!(error, json!({"id": 1}));

    let captured = guard(err::<(), _>(json!({"id": 1}))).await;
    assert!(captured.is_ok(), "global classifier still captures");
}

// ============================================================================
// Method attachment
// ============================================================================

struct Service;

impl Service {
    async fn simple_resolve(&self, data: &'static str) -> Result<&'static str, Fault> {
        Ok(data)
    }

    async fn request_with_code(&self, code: i64) -> Result<(), Fault> {
        Err(Fault::new("request failed").with_code(code))
    }

    async fn request_without_code(&self, _: ()) -> Result<(), Fault> {
        Err(Fault::new("undefined is not a function"))
    }
}

#[tokio::test]
async fn test_method_resolves() {
    let _lock = global_lock();
    let method = guard_method(Service::simple_resolve);

    let result = method.call(&Service, "some data").await;

    assert_eq!(result, Ok((Some("some data"), None)));
}

#[tokio::test]
async fn test_method_predicate_splits_errors() {
    let _lock = global_lock();
    configure(code_predicate());

    let with_code = guard_method(Service::request_with_code);
    let (_, error) = with_code.call(&Service, 404).await.expect("captured");
    assert_eq!(error.and_then(|e| e.code()).map(|c| c.to_string()).as_deref(), Some("404"));

    let without_code = guard_method(Service::request_without_code);
    let error = without_code.call(&Service, ()).await.expect_err("propagated");
    assert_eq!(error.message, "undefined is not a function");
}

#[tokio::test]
async fn test_decorator_with_default() {
    let _lock = global_lock();
    let decorator = TupleDecorator::with_default(());
    let method = decorator.decorate(Service::request_with_code);

    let result = method.call(&Service, 500).await.expect("captured");

    assert_eq!(result.0, Some(()));
    assert!(result.1.is_some());
}

#[tokio::test]
async fn test_method_with_default_fills_value_slot() {
    let _lock = global_lock();
    let method = guard_method_with_default(Service::request_with_code, ());

    let (data, error) = method.call(&Service, 503).await.expect("captured");

    assert_eq!(data, Some(()));
    assert_eq!(error.map(|e| e.message), Some("request failed".to_string()));
}

#[test]
fn test_attaching_to_value_fails_immediately() {
    let mut table: MethodTable<Service, (), (), Fault> = MethodTable::new();
    table.insert_value("version", json!("1.0"));

    let error = table.bind_guarded("version", None).err().expect("not callable");

    assert!(matches!(error, GuardError::NotCallable { .. }));
    assert_eq!(
        error.to_string(),
        "tuple guard can only be applied to methods, not: string"
    );
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_rules_drive_global_classifier() {
    let _lock = global_lock();
    let settings = Settings::from_toml_str(
        r#"
[classifier]
mode = "rules"
capture_codes = [404]
"#,
    )
    .expect("valid settings");
    settings.apply();

    let captured = guard(err::<(), _>(json!({"code": 404}))).await;
    assert!(captured.is_ok());

    let propagated = guard(err::<(), _>(json!({"code": 500}))).await;
    assert_eq!(propagated, Err(json!({"code": 500})));
}

#[test]
fn test_settings_sync_usage_with_block_on() {
    let _lock = global_lock();
    let settings = Settings::from_toml_str("").expect("empty settings");
    settings.apply();

    let result = tokio_test::block_on(guard(err::<(), _>("boom")));

    assert_eq!(result, Ok((None, Some("boom"))));
}
