//! Invocation Dispatcher Tests

use lazyboot_domain::BootstrapState;
use lazyboot_infrastructure::config::{AppConfig, WorkerKind};
use lazyboot_infrastructure::di::modules::{DATABASE, EXPORT_MODULE, REPORT_MODULE};
use lazyboot_infrastructure::di::{BootstrapSlot, Invocation, InvocationDispatcher};
use serde_json::json;
use std::sync::Arc;

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.data.connect_delay_ms = 30;
    config.bootstrap.worker_init_delay_ms = 5;
    config
}

#[tokio::test]
async fn test_first_invocation_is_cold_and_second_is_warm() {
    let dispatcher = InvocationDispatcher::new(fast_config());

    let cold = dispatcher.dispatch(Invocation::root()).await.unwrap();
    let warm = dispatcher.dispatch(Invocation::root()).await.unwrap();

    assert!(cold.cold);
    assert!(!warm.cold);
    assert!(cold.elapsed_ms >= 30);
    assert!(warm.elapsed_ms < cold.elapsed_ms);
    assert_eq!(cold.invocation, 1);
    assert_eq!(warm.invocation, 2);
    assert_eq!(warm.body["records"], 0);
}

#[tokio::test]
async fn test_worker_modules_load_on_demand() {
    let dispatcher = InvocationDispatcher::new(fast_config());

    dispatcher.dispatch(Invocation::root()).await.unwrap();
    let workers = dispatcher.workers().unwrap();
    assert!(!workers.is_loaded(&REPORT_MODULE));

    let first = dispatcher
        .dispatch(Invocation::for_worker(WorkerKind::Report, json!({ "key": "a" })))
        .await
        .unwrap();
    let second = dispatcher
        .dispatch(Invocation::for_worker(WorkerKind::Report, json!({ "key": "b" })))
        .await
        .unwrap();

    assert!(first.worker_cold);
    assert!(!second.worker_cold);
    assert_eq!(second.body["records"], 2);
    assert!(workers.is_loaded(&REPORT_MODULE));
    assert!(!workers.is_loaded(&EXPORT_MODULE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invocations_share_one_root() {
    let slot = Arc::new(BootstrapSlot::new());
    let dispatcher = Arc::new(InvocationDispatcher::with_slot(
        fast_config(),
        Arc::clone(&slot),
    ));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher
                    .dispatch(Invocation::for_worker(
                        WorkerKind::Report,
                        json!({ "key": format!("record-{i}") }),
                    ))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let root = slot.root().unwrap();
    let db = root.get(&DATABASE).await.unwrap();
    assert_eq!(db.len(), 16);
    assert_eq!(slot.state(), BootstrapState::Ready);
}

#[tokio::test]
async fn test_export_jobs_are_transient() {
    let dispatcher = InvocationDispatcher::new(fast_config());
    dispatcher
        .dispatch(Invocation::for_worker(
            WorkerKind::Report,
            json!({ "key": "alpha", "total": 3 }),
        ))
        .await
        .unwrap();

    let first = dispatcher
        .dispatch(Invocation::for_worker(WorkerKind::Export, json!({})))
        .await
        .unwrap();
    let second = dispatcher
        .dispatch(Invocation::for_worker(
            WorkerKind::Export,
            json!({ "prefix": "beta" }),
        ))
        .await
        .unwrap();

    assert_eq!(first.body["job"], 1);
    assert_eq!(second.body["job"], 2);
    assert_eq!(first.body["lines"].as_array().unwrap().len(), 1);
    assert!(second.body["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_prewarm_loads_configured_workers() {
    let mut config = fast_config();
    config.bootstrap.prewarm = vec![WorkerKind::Export, WorkerKind::Export];
    let dispatcher = InvocationDispatcher::new(config);

    let loaded = dispatcher.prewarm().await.unwrap();

    assert_eq!(loaded, [WorkerKind::Export]);
    assert_eq!(dispatcher.slot().state(), BootstrapState::Ready);
    let workers = dispatcher.workers().unwrap();
    assert!(workers.is_loaded(&EXPORT_MODULE));

    let outcome = dispatcher
        .dispatch(Invocation::for_worker(WorkerKind::Export, json!({})))
        .await
        .unwrap();
    assert!(!outcome.cold);
    assert!(!outcome.worker_cold);
}

#[tokio::test]
async fn test_prewarm_without_workers_leaves_first_invocation_cold() {
    let dispatcher = InvocationDispatcher::new(fast_config());

    let loaded = dispatcher.prewarm().await.unwrap();

    assert!(loaded.is_empty());
    assert_eq!(dispatcher.slot().state(), BootstrapState::NotStarted);
    assert!(dispatcher.workers().is_none());

    let outcome = dispatcher.dispatch(Invocation::root()).await.unwrap();
    assert!(outcome.cold);
}

#[tokio::test]
async fn test_unreachable_database_fails_bootstrap() {
    let mut config = fast_config();
    config.data.connection_url = "fail://primary".to_string();
    let dispatcher = InvocationDispatcher::new(config);

    for _ in 0..2 {
        let error = dispatcher.dispatch(Invocation::root()).await.unwrap_err();
        assert!(error.is_bootstrap_failure());
        assert_eq!(error.failing_provider(), Some(&DATABASE.erase()));
    }
    assert_eq!(dispatcher.slot().state(), BootstrapState::Failed);
}

#[tokio::test]
async fn test_shutdown_closes_database() {
    let dispatcher = InvocationDispatcher::new(fast_config());
    dispatcher
        .dispatch(Invocation::for_worker(WorkerKind::Report, json!({})))
        .await
        .unwrap();
    let db = dispatcher
        .slot()
        .root()
        .unwrap()
        .get(&DATABASE)
        .await
        .unwrap();

    assert!(dispatcher.shutdown().await);

    assert!(!db.is_open());
    assert!(db.insert("late", json!(null)).is_err());
    assert!(dispatcher.workers().unwrap().loaded_modules().is_empty());
}
