use pretty_assertions::assert_eq;
use reconcile_engine::fetch::mock::StaticFetcher;
use reconcile_engine::store::memory::MemoryStore;
use reconcile_engine::{
    CONFLICTS_KEY, ConflictEngine, EngineConfig, EngineError, EngineEvent, PREFERENCES_KEY,
};
use reconcile_types::{Operation, ResolvedBy, Severity};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;

struct Harness {
    engine: ConflictEngine,
    store: Arc<MemoryStore>,
    fetcher: Arc<StaticFetcher>,
}

fn harness(config: EngineConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(StaticFetcher::new());
    let engine = ConflictEngine::new(store.clone(), fetcher.clone(), config);
    Harness {
        engine,
        store,
        fetcher,
    }
}

fn drain(rx: &mut Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// An operation whose server copy is decisively newer (top suggestion is
/// `timestamp_wins` at 0.9, clearing the default auto-resolve bar).
fn decisive_setup(h: &Harness, entity_id: &str) -> Operation {
    h.fetcher.insert(
        "task",
        entity_id,
        json!({"title": format!("server {entity_id}"), "updatedAt": 200_000}),
    );
    Operation::update(
        "task",
        entity_id,
        json!({"title": format!("local {entity_id}"), "updatedAt": 1_000}),
        1_000,
    )
}

/// An operation whose server copy raced within the decisive gap (top
/// suggestion is `timestamp_wins` at 0.6, below the default bar).
fn racy_setup(h: &Harness, entity_id: &str) -> Operation {
    h.fetcher.insert(
        "task",
        entity_id,
        json!({"title": "server", "updatedAt": 30_000}),
    );
    Operation::update(
        "task",
        entity_id,
        json!({"title": "local", "updatedAt": 1_000}),
        1_000,
    )
}

// ── Detection ────────────────────────────────────────────────────

#[tokio::test]
async fn detect_creates_open_conflict_with_sorted_suggestions() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");

    let detected = h.engine.detect_conflicts(&[op]).await;
    assert_eq!(detected.len(), 1);

    let conflict = &detected[0];
    assert_eq!(conflict.fields, vec!["title"]);
    assert!(!conflict.suggestions.is_empty());
    for pair in conflict.suggestions.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    assert_eq!(conflict.top_suggestion().unwrap().strategy, "timestamp_wins");

    let open = h.engine.conflicts().await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, conflict.id);
}

#[tokio::test]
async fn detect_nothing_without_server_baseline() {
    let h = harness(EngineConfig::default());
    let op = Operation::update("task", "never-synced", json!({"title": "x"}), 1_000);

    let detected = h.engine.detect_conflicts(&[op]).await;
    assert!(detected.is_empty());
    assert!(h.engine.conflicts().await.is_empty());
}

#[tokio::test]
async fn detect_persists_open_conflicts() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");

    h.engine.detect_conflicts(&[op]).await;

    let persisted = h.store.get(CONFLICTS_KEY).unwrap();
    assert_eq!(persisted.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn detect_emits_conflicts_detected() {
    let h = harness(EngineConfig::default());
    let mut rx = h.engine.subscribe();
    let op = decisive_setup(&h, "t1");

    h.engine.detect_conflicts(&[op]).await;

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, EngineEvent::ConflictsDetected { conflicts } if conflicts.len() == 1)
    ));
}

#[tokio::test]
async fn fetch_failure_skips_operation_not_batch() {
    let h = harness(EngineConfig::default());
    let mut rx = h.engine.subscribe();

    let bad = decisive_setup(&h, "broken");
    let good = decisive_setup(&h, "healthy");
    h.fetcher.fail_entity("broken");

    let detected = h.engine.detect_conflicts(&[bad, good]).await;

    // The failing operation is skipped; the healthy one still classifies.
    assert_eq!(detected.len(), 1);
    assert_eq!(detected[0].operation.entity_id, "healthy");

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, EngineEvent::DetectionError { entity_id, .. } if entity_id == "broken")
    ));
}

// ── Explicit resolution ──────────────────────────────────────────

#[tokio::test]
async fn status_conflict_resolves_to_server() {
    let h = harness(EngineConfig::default());
    h.fetcher.insert(
        "task",
        "t1",
        json!({"status": "in_progress", "updatedAt": 200_000}),
    );
    let op = Operation::update(
        "task",
        "t1",
        json!({"status": "done", "updatedAt": 1_000}),
        1_000,
    );

    let detected = h.engine.detect_conflicts(&[op]).await;
    let conflict = &detected[0];
    assert!(conflict.fields.contains(&"status".to_string()));
    assert_eq!(conflict.severity, Severity::Critical);

    let resolution = h
        .engine
        .resolve_conflict(&conflict.id, Some("timestamp_wins"))
        .await
        .unwrap();
    assert_eq!(resolution.resolved_data["status"], json!("in_progress"));
    assert_eq!(resolution.resolved_by, ResolvedBy::User);
}

#[tokio::test]
async fn tags_resolve_to_set_union() {
    let h = harness(EngineConfig::default());
    h.fetcher.insert(
        "task",
        "t1",
        json!({"tags": ["b", "c"], "updatedAt": 200_000}),
    );
    let op = Operation::update(
        "task",
        "t1",
        json!({"tags": ["a", "b"], "updatedAt": 1_000}),
        1_000,
    );

    let detected = h.engine.detect_conflicts(&[op]).await;
    let resolution = h
        .engine
        .resolve_conflict(&detected[0].id, Some("union_merge"))
        .await
        .unwrap();

    let tags: HashSet<String> = resolution.resolved_data["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        tags,
        HashSet::from(["a".to_string(), "b".to_string(), "c".to_string()])
    );
}

#[tokio::test]
async fn resolve_removes_from_open_set_exactly_once_in_history() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;
    let id = detected[0].id.clone();

    h.engine
        .resolve_conflict(&id, Some("server_wins"))
        .await
        .unwrap();

    assert!(h.engine.conflicts().await.iter().all(|c| c.id != id));
    let matching = h
        .engine
        .history()
        .await
        .iter()
        .filter(|r| r.conflict_id == id)
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn resolve_manual_fails_and_leaves_conflict_open() {
    let h = harness(EngineConfig::default());
    let mut rx = h.engine.subscribe();
    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;
    let id = detected[0].id.clone();

    let err = h
        .engine
        .resolve_conflict(&id, Some("manual"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ManualResolutionRequired));

    // Still open, nothing recorded.
    assert_eq!(h.engine.conflicts().await.len(), 1);
    assert!(h.engine.history().await.is_empty());

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::ConflictResolutionError { strategy, .. } if strategy == "manual"
    )));
}

#[tokio::test]
async fn resolve_unknown_strategy_fails() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;

    let err = h
        .engine
        .resolve_conflict(&detected[0].id, Some("wishful_merge"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownStrategy(_)));
    assert_eq!(h.engine.conflicts().await.len(), 1);
}

#[tokio::test]
async fn resolve_unknown_conflict_fails() {
    let h = harness(EngineConfig::default());
    let err = h
        .engine
        .resolve_conflict(&"ghost-1".into(), Some("server_wins"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ConflictNotFound(_)));
}

#[tokio::test]
async fn resolve_uses_configured_default_strategy() {
    let h = harness(EngineConfig::default());
    h.engine.set_resolution_strategy("server_wins").await.unwrap();

    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;

    let resolution = h
        .engine
        .resolve_conflict(&detected[0].id, None)
        .await
        .unwrap();
    assert_eq!(resolution.strategy, "server_wins");
    assert_eq!(resolution.resolved_data, detected[0].server_data);
}

// ── Auto-resolution ──────────────────────────────────────────────

#[tokio::test]
async fn auto_resolve_applies_confident_top_suggestion() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;

    let resolutions = h.engine.auto_resolve_conflicts(&detected).await;
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].strategy, "timestamp_wins");
    assert_eq!(resolutions[0].resolved_by, ResolvedBy::Auto);
    assert!(h.engine.conflicts().await.is_empty());
}

#[tokio::test]
async fn auto_resolve_below_threshold_requests_manual() {
    let h = harness(EngineConfig::default());
    let mut rx = h.engine.subscribe();
    let op = racy_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;
    assert!(detected[0].top_suggestion().unwrap().confidence < 0.7);

    let resolutions = h.engine.auto_resolve_conflicts(&detected).await;

    assert!(resolutions.is_empty());
    assert_eq!(h.engine.conflicts().await.len(), 1);
    assert!(h.engine.history().await.is_empty());

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, EngineEvent::ConflictRequiresManualResolution { .. }))
    );
}

#[tokio::test]
async fn auto_resolve_disabled_requests_manual_for_everything() {
    let config = EngineConfig {
        auto_resolve: false,
        ..EngineConfig::default()
    };
    let h = harness(config);
    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;

    let resolutions = h.engine.auto_resolve_conflicts(&detected).await;
    assert!(resolutions.is_empty());
    assert_eq!(h.engine.conflicts().await.len(), 1);
}

#[tokio::test]
async fn auto_resolve_continues_past_failures() {
    let h = harness(EngineConfig::default());
    let first = decisive_setup(&h, "t1");
    let second = decisive_setup(&h, "t2");
    let detected = h.engine.detect_conflicts(&[first, second]).await;
    assert_eq!(detected.len(), 2);

    // Resolve the first out from under the batch; auto-resolving it again
    // fails with ConflictNotFound but must not stop the second.
    h.engine
        .resolve_conflict(&detected[0].id, Some("server_wins"))
        .await
        .unwrap();

    let mut rx = h.engine.subscribe();
    let resolutions = h.engine.auto_resolve_conflicts(&detected).await;

    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].conflict_id, detected[1].id);

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, EngineEvent::AutoResolveError { conflict_id, .. } if *conflict_id == detected[0].id))
    );
}

// ── History cap ──────────────────────────────────────────────────

#[tokio::test]
async fn history_keeps_newest_entries_fifo() {
    let config = EngineConfig {
        max_history: 5,
        ..EngineConfig::default()
    };
    let h = harness(config);

    let operations: Vec<Operation> = (0..10)
        .map(|i| decisive_setup(&h, &format!("t{i}")))
        .collect();
    let detected = h.engine.detect_conflicts(&operations).await;
    assert_eq!(detected.len(), 10);

    for conflict in &detected {
        h.engine
            .resolve_conflict(&conflict.id, Some("server_wins"))
            .await
            .unwrap();
    }

    let history = h.engine.history().await;
    assert_eq!(history.len(), 5);
    // The newest five survive, oldest first.
    let kept: Vec<_> = history.iter().map(|r| r.conflict_id.clone()).collect();
    let expected: Vec<_> = detected[5..].iter().map(|c| c.id.clone()).collect();
    assert_eq!(kept, expected);
}

// ── Persistence behavior ─────────────────────────────────────────

#[tokio::test]
async fn save_failure_is_non_fatal() {
    let h = harness(EngineConfig::default());
    let mut rx = h.engine.subscribe();
    let op = decisive_setup(&h, "t1");
    h.store.set_fail_saves(true);

    let detected = h.engine.detect_conflicts(&[op]).await;

    // In-memory state is authoritative even though the save failed.
    assert_eq!(detected.len(), 1);
    assert_eq!(h.engine.conflicts().await.len(), 1);

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, EngineEvent::StateSaveFailed { key, .. } if *key == CONFLICTS_KEY)
    ));
}

#[tokio::test]
async fn restore_rehydrates_state_from_store() {
    let store = Arc::new(MemoryStore::new());
    let fetcher = Arc::new(StaticFetcher::new());

    let first = ConflictEngine::new(store.clone(), fetcher.clone(), EngineConfig::default());
    fetcher.insert("task", "t1", json!({"title": "server", "updatedAt": 200_000}));
    let op = Operation::update("task", "t1", json!({"title": "local", "updatedAt": 1_000}), 1_000);
    let detected = first.detect_conflicts(&[op]).await;
    first.set_resolution_strategy("local_wins").await.unwrap();

    let second = ConflictEngine::new(store, fetcher, EngineConfig::default());
    second.restore().await;

    let open = second.conflicts().await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, detected[0].id);
    assert_eq!(second.default_strategy().await, "local_wins");
}

#[tokio::test]
async fn restore_starts_empty_on_load_failure() {
    let h = harness(EngineConfig::default());
    let mut rx = h.engine.subscribe();
    h.store.set_fail_loads(true);

    h.engine.restore().await;

    assert!(h.engine.conflicts().await.is_empty());
    assert!(h.engine.history().await.is_empty());

    let events = drain(&mut rx);
    let failed_keys: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::StateLoadFailed { key, .. } => Some(*key),
            _ => None,
        })
        .collect();
    assert_eq!(failed_keys.len(), 3);
}

// ── Preferences & introspection ──────────────────────────────────

#[tokio::test]
async fn clear_conflicts_empties_open_set() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");
    h.engine.detect_conflicts(&[op]).await;

    h.engine.clear_conflicts().await;

    assert!(h.engine.conflicts().await.is_empty());
    let persisted = h.store.get(CONFLICTS_KEY).unwrap();
    assert!(persisted.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn set_resolution_strategy_rejects_unknown() {
    let h = harness(EngineConfig::default());
    let err = h
        .engine
        .set_resolution_strategy("wishful_merge")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownStrategy(_)));
    assert_eq!(h.engine.default_strategy().await, "field_level_merge");
}

#[tokio::test]
async fn set_resolution_strategy_persists_preferences() {
    let h = harness(EngineConfig::default());
    h.engine.set_resolution_strategy("timestamp_wins").await.unwrap();

    let persisted = h.store.get(PREFERENCES_KEY).unwrap();
    assert_eq!(persisted["default_strategy"], json!("timestamp_wins"));
}

#[tokio::test]
async fn resolution_strategies_lists_baselines_and_catalog() {
    let h = harness(EngineConfig::default());
    let names = h.engine.resolution_strategies();

    for expected in [
        "local_wins",
        "server_wins",
        "manual",
        "timestamp_wins",
        "field_level_merge",
        "priority_merge",
        "concatenation_merge",
        "union_merge",
        "smart_merge",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
}

#[tokio::test]
async fn resolved_event_carries_full_resolution() {
    let h = harness(EngineConfig::default());
    let op = decisive_setup(&h, "t1");
    let detected = h.engine.detect_conflicts(&[op]).await;

    let mut rx = h.engine.subscribe();
    let resolution = h
        .engine
        .resolve_conflict(&detected[0].id, Some("local_wins"))
        .await
        .unwrap();
    assert_eq!(resolution.confidence, 0.9);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::ConflictResolved { resolution: r } if r.conflict_id == detected[0].id
    )));
}
