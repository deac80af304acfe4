//! # Bus to Execution Pipeline
//!
//! Events published on the system topic reach the functions registered on
//! their channel, through the real bus, cache, store and resolver.

use super::fixtures::*;
use shared_bus::{EventPublisher, TypedCache, SYSTEM_TOPIC};
use shared_types::{Command, ExecData, MsgType};
use std::time::Duration;

fn orders_tenant() -> Shared {
    let shared = Shared::new().with_tenant("tok-t", "T");
    shared
        .store
        .register("T", ExecData::new("f1-id", "f1", "orders", "throw()"));
    shared
        .store
        .register("T", ExecData::new("f2-id", "f2", "orders", "ok()"));
    shared
}

#[tokio::test]
async fn test_failing_function_isolated_end_to_end() {
    let shared = orders_tenant();
    let replica = shared.replica(true, &["f1"]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    shared
        .bus
        .publish(SYSTEM_TOPIC, db_event("tok-t", "orders"))
        .await;

    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 2).await);

    let metrics = replica.dispatcher.metrics();
    assert!(
        eventually({
            let dispatcher = replica.dispatcher.clone();
            move || dispatcher.metrics().executions_succeeded == 1
        })
        .await
    );
    assert_eq!(metrics.events_received, 1);
    assert_eq!(replica.dispatcher.metrics().executions_failed, 1);

    let mut names: Vec<_> = replica
        .executor
        .runs()
        .into_iter()
        .map(|run| run.function_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["f1", "f2"]);

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_payload_and_identity_reach_runtime() {
    let shared = orders_tenant();
    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    let cmd = Command::new(MsgType::DbUpdated, "orders", "tok-t", auth("u42"))
        .with_data(serde_json::json!({ "id": "order-7", "total": 12 }));
    shared.bus.publish(SYSTEM_TOPIC, cmd).await;

    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 2).await);

    for run in replica.executor.runs() {
        assert_eq!(run.base_name, "T");
        assert_eq!(run.channel, "orders");
        assert_eq!(run.user_id, "u42");
        assert_eq!(run.data["id"], "order-7");
    }

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_cache_populated_after_first_event() {
    let shared = orders_tenant();
    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    for _ in 0..3 {
        shared
            .bus
            .publish(SYSTEM_TOPIC, db_event("tok-t", "orders"))
            .await;
    }
    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 6).await);

    let ids: Option<Vec<String>> = shared.cache.get_typed("T:orders").await.unwrap();
    assert_eq!(ids, Some(vec!["f1-id".to_owned(), "f2-id".to_owned()]));
    assert!(shared.cache.contains_key("fn_f1-id"));
    assert!(shared.cache.contains_key("fn_f2-id"));
    // Concurrent first events may each miss; afterwards the cache serves.
    assert!(shared.store.lookup_count() <= 3);

    let before = shared.store.lookup_count();
    shared
        .bus
        .publish(SYSTEM_TOPIC, db_event("tok-t", "orders"))
        .await;
    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 8).await);
    assert_eq!(shared.store.lookup_count(), before);

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_user_flood_limited_to_five() {
    let shared = Shared::new().with_tenant("tok-t", "T");
    shared
        .store
        .register("T", ExecData::new("chat-id", "on_chat", "chat", "ok()"));
    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    for _ in 0..7 {
        shared
            .bus
            .publish(SYSTEM_TOPIC, user_event("tok-t", "chat", "u1"))
            .await;
    }
    // A second user is unaffected
    shared
        .bus
        .publish(SYSTEM_TOPIC, user_event("tok-t", "chat", "u2"))
        .await;

    let dispatcher = replica.dispatcher.clone();
    assert!(eventually(move || dispatcher.metrics().events_received == 8).await);
    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 6).await);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(replica.executor.run_count(), 6);
    assert_eq!(replica.dispatcher.metrics().rate_limited, 2);

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_system_flood_never_limited() {
    let shared = orders_tenant();
    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    for i in 0..20 {
        let kind = match i % 4 {
            0 => MsgType::DbCreated,
            1 => MsgType::DbUpdated,
            2 => MsgType::DbDeleted,
            _ => MsgType::ChanOut,
        };
        let cmd = Command::new(kind, "orders", "tok-t", auth("u1"));
        shared.bus.publish(SYSTEM_TOPIC, cmd).await;
    }

    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 40).await);
    assert_eq!(replica.dispatcher.metrics().rate_limited, 0);

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_unknown_token_dropped_loop_survives() {
    let shared = orders_tenant();
    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    shared
        .bus
        .publish(SYSTEM_TOPIC, db_event("forged", "orders"))
        .await;
    let dispatcher = replica.dispatcher.clone();
    assert!(eventually(move || dispatcher.metrics().context_failures == 1).await);
    assert_eq!(replica.executor.run_count(), 0);
    assert_eq!(shared.store.lookup_count(), 0);

    shared
        .bus
        .publish(SYSTEM_TOPIC, db_event("tok-t", "orders"))
        .await;
    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 2).await);

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_tenant_without_store_dropped() {
    let shared = orders_tenant();
    // Token resolves, but the store has no such tenant database
    shared.resolver.add_account("ghost", "ghost");
    shared.resolver.add_token("tok-ghost", "ghost");

    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    shared
        .bus
        .publish(SYSTEM_TOPIC, db_event("tok-ghost", "orders"))
        .await;
    let dispatcher = replica.dispatcher.clone();
    assert!(eventually(move || dispatcher.metrics().resolution_failures == 1).await);
    assert!(!shared.cache.contains_key("ghost:orders"));

    shared.bus.close();
    running.await.unwrap();
}

#[tokio::test]
async fn test_new_function_visible_after_invalidation() {
    use trigger_dispatch::TriggerDispatchApi;

    let shared = orders_tenant();
    let replica = shared.replica(true, &[]);

    let outcome = replica
        .dispatcher
        .dispatch(db_event("tok-t", "orders"))
        .await
        .unwrap();
    assert_eq!(outcome.scheduled_count(), 2);

    shared
        .store
        .register("T", ExecData::new("f3-id", "f3", "orders", "ok()"));
    let stale = replica
        .dispatcher
        .dispatch(db_event("tok-t", "orders"))
        .await
        .unwrap();
    assert_eq!(stale.scheduled_count(), 2);

    replica
        .dispatcher
        .invalidate_trigger("T", "orders")
        .await
        .unwrap();
    let fresh = replica
        .dispatcher
        .dispatch(db_event("tok-t", "orders"))
        .await
        .unwrap();
    assert_eq!(fresh.scheduled_count(), 3);
}

#[tokio::test]
async fn test_other_topics_ignored() {
    let shared = orders_tenant();
    let replica = shared.replica(true, &[]);
    let running = replica.start();
    assert!(shared.subscribed(1).await);

    shared.bus.publish("chat", db_event("tok-t", "orders")).await;
    shared
        .bus
        .publish(SYSTEM_TOPIC, db_event("tok-t", "orders"))
        .await;

    let executor = replica.executor.clone();
    assert!(eventually(move || executor.run_count() == 2).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(replica.dispatcher.metrics().events_received, 1);

    shared.bus.close();
    running.await.unwrap();
}
