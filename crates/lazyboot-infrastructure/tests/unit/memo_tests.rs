//! Memo Tests

use lazyboot_infrastructure::di::{Memo, MemoPhase};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn test_memo_runs_init_once() {
    let memo = Memo::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = Arc::clone(&calls);
        let value = memo
            .get_or_init(move || async move { calls.fetch_add(1, Ordering::SeqCst) + 1 })
            .await;
        assert_eq!(value, 1);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(memo.phase(), MemoPhase::Settled);
}

#[tokio::test]
async fn test_empty_memo_has_no_value() {
    let memo: Memo<u32> = Memo::default();
    assert_eq!(memo.phase(), MemoPhase::Empty);
    assert_eq!(memo.get(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_init() {
    let memo = Arc::new(Memo::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let memo = Arc::clone(&memo);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                memo.get_or_init(move || async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    calls.fetch_add(1, Ordering::SeqCst)
                })
                .await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), 0);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_first_caller_does_not_rerun_init() {
    let memo = Arc::new(Memo::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let memo = Arc::clone(&memo);
        let calls = Arc::clone(&calls);
        tokio::spawn(async move {
            memo.get_or_init(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                1
            })
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    first.abort();
    let _ = first.await;
    assert_eq!(memo.phase(), MemoPhase::Pending);

    let calls_second = Arc::clone(&calls);
    let value = memo
        .get_or_init(move || async move {
            calls_second.fetch_add(1, Ordering::SeqCst);
            2
        })
        .await;

    assert_eq!(value, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_memo_caches_errors() {
    let memo: Memo<Result<u32, String>> = Memo::new();

    let first = memo.get_or_init(|| async { Err("boom".to_string()) }).await;
    let second = memo.get_or_init(|| async { Ok(7) }).await;

    assert_eq!(first, Err("boom".to_string()));
    assert_eq!(second, Err("boom".to_string()));
    assert_eq!(memo.get(), Some(Err("boom".to_string())));
}
