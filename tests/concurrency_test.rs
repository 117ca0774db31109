use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashSet;
use tower::ServiceExt;
use webhook_sink::{create_server, AppState, PayloadPolicy};

async fn call(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

fn post(n: usize) -> Request<Body> {
    Request::post("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"caller": n, "body": "x".repeat(n % 17)}).to_string()))
        .unwrap()
}

fn query() -> Request<Body> {
    Request::get("/data").body(Body::empty()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_posts_get_distinct_sequential_ids() -> Result<()> {
    const N: usize = 250;
    let app = create_server(AppState::in_memory(PayloadPolicy::Reject), 1024 * 1024);

    let mut handles = Vec::with_capacity(N);
    for n in 0..N {
        let app = app.clone();
        handles.push(tokio::spawn(async move { call(app, post(n)).await }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let (status, body) = handle.await??;
        assert_eq!(status, StatusCode::OK);
        ids.insert(body["record_id"].as_u64().unwrap() as usize);
    }
    assert_eq!(ids, (1..=N).collect::<HashSet<_>>());

    let (_, body) = call(app, query()).await?;
    assert_eq!(body["count"], N);

    // Every caller's payload is present exactly once, at the position of its id
    let records = body["data"].as_array().unwrap();
    let mut callers = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record["id"], index + 1);
        assert!(callers.insert(record["payload"]["caller"].as_u64().unwrap()));
    }
    assert_eq!(callers.len(), N);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn queries_during_ingest_see_only_complete_records() -> Result<()> {
    const WRITES: usize = 200;
    const READS: usize = 50;
    let app = create_server(AppState::in_memory(PayloadPolicy::Reject), 1024 * 1024);

    let mut writers = Vec::new();
    for n in 0..WRITES {
        let app = app.clone();
        writers.push(tokio::spawn(async move { call(app, post(n)).await }));
    }

    let mut readers = Vec::new();
    for _ in 0..READS {
        let app = app.clone();
        readers.push(tokio::spawn(async move { call(app, query()).await }));
    }

    for reader in readers {
        let (status, body) = reader.await??;
        assert_eq!(status, StatusCode::OK);

        let count = body["count"].as_u64().unwrap() as usize;
        let records = body["data"].as_array().cloned().unwrap_or_default();
        assert_eq!(records.len(), count);

        // A snapshot is always a prefix of the log: ids 1..=count, all fields populated
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record["id"], index + 1);
            assert!(record["timestamp"].is_string());
            assert!(record["source_address"].is_string());
            assert!(record["payload"]["caller"].is_u64());
        }
    }

    for writer in writers {
        let (status, _) = writer.await??;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = call(app, query()).await?;
    assert_eq!(body["count"], WRITES);
    Ok(())
}
