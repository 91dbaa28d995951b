//! Unit tests for lifecycle states and scopes

use lazyboot_domain::{BootstrapState, ContainerStatus, ModuleId, Scope};

#[test]
fn test_scope_default_is_singleton() {
    assert_eq!(Scope::default(), Scope::Singleton);
}

#[test]
fn test_scope_serde() {
    let json = serde_json::to_string(&Scope::Transient).unwrap();
    assert_eq!(json, "\"transient\"");
    let scope: Scope = serde_json::from_str("\"singleton\"").unwrap();
    assert_eq!(scope, Scope::Singleton);
}

#[test]
fn test_container_status_settled() {
    assert!(!ContainerStatus::Initializing.is_settled());
    assert!(ContainerStatus::Ready.is_settled());
    assert!(ContainerStatus::Failed.is_settled());
    assert!(ContainerStatus::Disposed.is_settled());
    assert_eq!(ContainerStatus::Ready.to_string(), "ready");
}

#[test]
fn test_bootstrap_state_display() {
    assert_eq!(BootstrapState::NotStarted.to_string(), "not_started");
    assert_eq!(BootstrapState::InFlight.to_string(), "in_flight");
    let json = serde_json::to_string(&BootstrapState::InFlight).unwrap();
    assert_eq!(json, "\"in_flight\"");
    assert_eq!(BootstrapState::ShutDown.to_string(), "shut_down");
}

#[test]
fn test_bootstrap_terminal_states() {
    assert!(BootstrapState::Failed.is_terminal());
    assert!(BootstrapState::ShutDown.is_terminal());
    assert!(!BootstrapState::Ready.is_terminal());
    assert!(!BootstrapState::InFlight.is_terminal());
}

#[test]
fn test_module_id_equality_across_sources() {
    let borrowed = ModuleId::from_static("report");
    let owned = ModuleId::from(String::from("report"));
    assert_eq!(borrowed, owned);
    assert_eq!(owned.as_str(), "report");
    assert_eq!(borrowed.to_string(), "report");
}

#[test]
fn test_module_id_serde_is_transparent() {
    let id = ModuleId::from_static("export");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"export\"");
    let back: ModuleId = serde_json::from_str("\"export\"").unwrap();
    assert_eq!(back, id);
}
