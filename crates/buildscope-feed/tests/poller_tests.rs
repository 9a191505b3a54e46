//! Polling tests against a local `/log_stream` server.
#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use buildscope_feed::poller::{poll_log_stream, replay_log_file};
use buildscope_feed::{FeedError, FeedSource, LogStreamClient, PollOutcome, run_feed};
use buildscope_types::Event;
use serde_json::json;
use tokio::sync::{mpsc, watch};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str) -> LogStreamClient {
    LogStreamClient::new(base_url, Duration::from_secs(5)).unwrap()
}

/// Serves one plain batch, then a final batch ending in the sentinel.
fn two_batch_router() -> Router {
    let calls = Arc::new(AtomicUsize::new(0));
    Router::new().route(
        "/log_stream",
        get(move || {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Json(json!([
                        {"type": "StartupParams", "params": {}},
                        {"id": "1", "type": "CreateSystemCommandNode", "time_us": "5",
                         "outputs": ["a"], "inputs": []}
                    ]))
                } else {
                    Json(json!([
                        {"id": "1", "type": "ProcessingComplete", "time_us": "9"},
                        {"quit_key": " "}
                    ]))
                }
            }
        }),
    )
}

fn drain(rx: &mut mpsc::Receiver<Option<Vec<Event>>>) -> Vec<Option<usize>> {
    let mut seen = Vec::new();
    while let Ok(message) = rx.try_recv() {
        seen.push(message.map(|events| events.len()));
    }
    seen
}

#[tokio::test]
async fn polls_until_the_sentinel() {
    let base = serve(two_batch_router()).await;
    let (tx, mut rx) = mpsc::channel(8);
    let (_stop_tx, mut stop_rx) = watch::channel(false);

    let outcome = poll_log_stream(&client(&base), &tx, &mut stop_rx)
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Finished);
    assert_eq!(drain(&mut rx), vec![Some(2), Some(1), None]);
}

#[tokio::test]
async fn gone_means_finished() {
    let base = serve(Router::new().route("/log_stream", get(|| async { StatusCode::GONE }))).await;
    let (tx, mut rx) = mpsc::channel(8);
    let (_stop_tx, mut stop_rx) = watch::channel(false);

    let outcome = poll_log_stream(&client(&base), &tx, &mut stop_rx)
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Finished);
    assert_eq!(drain(&mut rx), vec![None]);
}

#[tokio::test]
async fn server_error_delivers_nothing() {
    let base = serve(Router::new().route(
        "/log_stream",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;
    let (tx, mut rx) = mpsc::channel(8);
    let (_stop_tx, mut stop_rx) = watch::channel(false);

    let result = poll_log_stream(&client(&base), &tx, &mut stop_rx).await;

    match result {
        Err(FeedError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn shutdown_abandons_a_pending_request() {
    let base = serve(Router::new().route(
        "/log_stream",
        get(|| async {
            std::future::pending::<()>().await;
            "[]"
        }),
    ))
    .await;
    let (tx, mut rx) = mpsc::channel(8);
    let (stop_tx, stop_rx) = watch::channel(false);

    let feed = tokio::spawn(run_feed(
        FeedSource::LogStream(client(&base)),
        tx,
        stop_rx,
        Duration::from_millis(10),
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(true).unwrap();

    let outcome = feed.await.unwrap().unwrap();
    assert_eq!(outcome, PollOutcome::Cancelled);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn supervisor_retries_after_transport_errors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new().route(
        "/log_stream",
        get(move || {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StatusCode::SERVICE_UNAVAILABLE)
                } else {
                    Ok(Json(json!([{"id": "1", "type": "ParsingStarting"}, {"quit_key": " "}])))
                }
            }
        }),
    );
    let base = serve(router).await;
    let (tx, mut rx) = mpsc::channel(8);
    let (_stop_tx, stop_rx) = watch::channel(false);

    let outcome = run_feed(
        FeedSource::LogStream(client(&base)),
        tx,
        stop_rx,
        Duration::from_millis(5),
    )
    .await
    .unwrap();

    assert_eq!(outcome, PollOutcome::Finished);
    assert_eq!(drain(&mut rx), vec![Some(1), None]);
}

#[tokio::test]
async fn log_file_is_one_batch_then_end_of_stream() {
    let path = std::env::temp_dir().join(format!("buildscope-feed-{}.log", std::process::id()));
    tokio::fs::write(
        &path,
        "{\"id\":\"1\",\"type\":\"CreateSystemCommandNode\",\"time_us\":\"1\",\"outputs\":[\"a\"],\"inputs\":[]},\n\
         {\"id\":\"1\",\"type\":\"ProcessingComplete\",\"time_us\":\"2\"},\n",
    )
    .await
    .unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let outcome = replay_log_file(&path, &tx).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(outcome, PollOutcome::Finished);
    assert_eq!(drain(&mut rx), vec![Some(2), None]);
}

#[tokio::test]
async fn unreadable_log_file_is_an_error() {
    let (tx, _rx) = mpsc::channel(8);
    let (_stop_tx, stop_rx) = watch::channel(false);
    let result = run_feed(
        FeedSource::LogFile("/definitely/not/here.log".into()),
        tx,
        stop_rx,
        Duration::from_millis(5),
    )
    .await;
    assert!(matches!(result, Err(FeedError::Io { .. })));
}
