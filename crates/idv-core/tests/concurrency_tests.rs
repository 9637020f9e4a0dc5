//! Exclusión mutua por sujeto: a lo sumo una transición lógica por ráfaga de
//! submissions concurrentes (doble click, pestañas duplicadas).

use std::sync::Arc;

use idv_adapters::{default_graph, register_with_mocks, STANDARD_FLOW};
use idv_core::{IdvConfig, InMemoryEventSink, InMemorySessionStore, Overlap, SessionStore, StepExecutor, StepResult, SubmitError};
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_yield_one_advance_and_conflicts() {
    let mut executor = StepExecutor::new(default_graph(), InMemorySessionStore::new(), InMemoryEventSink::new());
    register_with_mocks(&mut executor);
    let executor = Arc::new(executor);
    let config = IdvConfig::default();
    executor.start(STANDARD_FLOW, "u1", Overlap::Resume, &config).unwrap();

    let payload = json!({
        "first_name": "José",
        "last_name": "One",
        "dob": "1970-01-01",
        "address1": "123 Main St",
        "city": "Nowhere",
        "state": "KS",
        "zipcode": "66044",
    });

    let mut handles = Vec::new();
    for _ in 0..8 {
        let executor = Arc::clone(&executor);
        let config = config.clone();
        let payload = payload.clone();
        handles.push(tokio::spawn(async move {
            executor.submit("u1", "profile", payload, &config).await
        }));
    }

    let mut advanced = 0;
    let mut conflicts = 0;
    let mut stale = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(StepResult::Advanced { next_step }) => {
                assert_eq!(next_step, "ssn");
                advanced += 1;
            }
            Err(SubmitError::Conflict) => conflicts += 1,
            // un perdedor que reintenta tras soltar el lock ve el paso ya
            // completado
            Err(SubmitError::StaleStep { .. }) => stale += 1,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(advanced, 1);
    assert_eq!(advanced + conflicts + stale, 8);

    // el paso quedó completado exactamente una vez
    let session = executor.store().load("u1").unwrap().unwrap();
    assert!(session.is_completed("profile"));
    assert_eq!(session.current_step, "ssn");
    assert_eq!(executor.sink().events_for_step("profile").len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_subjects_never_conflict() {
    let mut executor = StepExecutor::new(default_graph(), InMemorySessionStore::new(), InMemoryEventSink::new());
    register_with_mocks(&mut executor);
    let executor = Arc::new(executor);
    let config = IdvConfig::default();

    let mut handles = Vec::new();
    for i in 0..4 {
        let subject = format!("user-{}", i);
        executor.start(STANDARD_FLOW, &subject, Overlap::Resume, &config).unwrap();
        let executor = Arc::clone(&executor);
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            let payload = json!({
                "first_name": "José",
                "last_name": "One",
                "dob": "1970-01-01",
                "address1": "123 Main St",
                "city": "Nowhere",
                "state": "KS",
                "zipcode": "66044",
            });
            executor.submit(&subject, "profile", payload, &config).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(matches!(result, StepResult::Advanced { .. }));
    }
}
