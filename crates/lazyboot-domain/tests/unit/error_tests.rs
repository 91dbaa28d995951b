//! Unit tests for domain error types

use lazyboot_domain::{Error, ModuleId, ProviderToken, Token};

struct Cache;
struct Database;

const CACHE: Token<Cache> = Token::new("cache");
const DATABASE: Token<Database> = Token::new("database");

#[test]
fn test_factory_error() {
    let error = Error::factory("connection refused");
    match &error {
        Error::Factory { message, source } => {
            assert_eq!(message, "connection refused");
            assert!(source.is_none());
        }
        _ => panic!("Expected Factory error"),
    }
    assert!(error.to_string().contains("connection refused"));
}

#[test]
fn test_circular_dependency_names_chain() {
    let error = Error::circular_dependency(vec![CACHE.erase(), DATABASE.erase(), CACHE.erase()]);
    assert_eq!(
        error.to_string(),
        "Circular dependency: cache -> database -> cache"
    );
    assert!(error.is_cycle());
}

#[test]
fn test_circular_import_names_chain() {
    let error = Error::circular_import(vec![
        ModuleId::from_static("a"),
        ModuleId::from_static("b"),
        ModuleId::from_static("a"),
    ]);
    assert_eq!(error.to_string(), "Circular module import: a -> b -> a");
}

#[test]
fn test_unknown_provider_display() {
    let error = Error::unknown_provider(CACHE.erase(), ModuleId::from_static("root"));
    assert_eq!(error.to_string(), "Unknown provider `cache` in module `root`");
}

#[test]
fn test_root_cause_and_failing_provider() {
    let cause = Error::factory("redis unreachable");
    let wrapped = Error::bootstrap_failure(Error::provider_failed(CACHE.erase(), cause));

    assert!(wrapped.is_bootstrap_failure());
    assert!(matches!(wrapped.root_cause(), Error::Factory { .. }));
    assert_eq!(wrapped.failing_provider(), Some(&CACHE.erase()));
    assert!(wrapped.to_string().contains("cache"));
    assert!(wrapped.to_string().contains("redis unreachable"));
}

#[test]
fn test_failing_provider_prefers_innermost() {
    let inner = Error::provider_failed(CACHE.erase(), Error::factory("boom"));
    let outer = Error::module_load_failure(
        ModuleId::from_static("report"),
        Error::provider_failed(DATABASE.erase(), inner),
    );
    assert!(outer.is_module_load_failure());
    assert_eq!(outer.failing_provider(), Some(&CACHE.erase()));
}

#[test]
fn test_error_source_chain() {
    use std::error::Error as _;

    let io = std::io::Error::other("disk gone");
    let error = Error::bootstrap_failure(Error::factory_with_source("open failed", io));

    let source = error.source().expect("bootstrap failure has a source");
    assert!(source.to_string().contains("open failed"));
    let inner = source.source().expect("factory error has a source");
    assert_eq!(inner.to_string(), "disk gone");
}

#[test]
fn test_errors_are_cloneable() {
    let error = Error::bootstrap_failure(Error::factory("boom"));
    let clone = error.clone();
    assert_eq!(error.to_string(), clone.to_string());
}

#[test]
fn test_string_conversions() {
    let from_str: Error = "bad".into();
    let from_string: Error = String::from("worse").into();
    assert!(matches!(from_str, Error::Factory { .. }));
    assert!(from_string.to_string().contains("worse"));
}

#[test]
fn test_type_mismatch_display() {
    let error = Error::TypeMismatch {
        token: ProviderToken::of::<u32>("port"),
        registered: "u32",
        expected: "alloc::string::String",
    };
    assert!(error.to_string().contains("registered as `u32`"));
}
