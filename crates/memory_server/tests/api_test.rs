//! End-to-end tests driving the HTTP router in-process.

use std::sync::Arc;

use argon2::Params;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use memory_server::{AppState, Argon2Hasher, EventStore, router};
use memory_tiles::{FlipOutcome, MemoryGame, SymbolSet};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tower::ServiceExt;

fn setup_app() -> (NamedTempFile, Router) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = EventStore::open(db_path).expect("Failed to open store");
    let hasher = Argon2Hasher::new(Params::new(1024, 1, 1, None).expect("valid params"));
    (db_file, router(AppState::new(store, Arc::new(hasher))))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, None).await
}

async fn start(app: &Router, email: &str) -> String {
    let (status, body) = post(app, "/api/game/start", json!({"userEmail": email})).await;
    assert_eq!(status, StatusCode::CREATED);
    body["sessionId"].as_str().expect("sessionId").to_string()
}

#[tokio::test]
async fn test_register_play_and_win() {
    let (_db, app) = setup_app();
    let creds = json!({"email": "a@x.com", "password": "pw1"});

    let (status, body) = post(&app, "/api/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully.");

    let (status, _) = post(&app, "/api/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &app,
        "/api/auth/login",
        json!({"email": "a@x.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/api/auth/login", creds).await;
    assert_eq!(status, StatusCode::OK);

    let session_id = start(&app, "a@x.com").await;

    // Play a four-pair board to the end, posting every accepted click.
    let symbols = SymbolSet::first(4).expect("valid pair count");
    let mut game = MemoryGame::with_rng(symbols, &mut StdRng::seed_from_u64(11));
    let mut clicks = 0;
    let mut remaining: Vec<usize> = (0..game.board().len()).collect();
    while !game.is_won() {
        let first = remaining[0];
        let partner = remaining[1..]
            .iter()
            .copied()
            .find(|&i| game.board()[i].content == game.board()[first].content)
            .expect("partner exists");
        for (index, is_first_tile) in [(first, true), (partner, false)] {
            let outcome = game.flip(index);
            assert!(outcome.accepted());
            let tile = &game.board()[index];
            let (status, _) = post(
                &app,
                "/api/game/action",
                json!({
                    "sessionId": session_id,
                    "userEmail": "a@x.com",
                    "type": "tile_click",
                    "tile": tile.content.as_str(),
                    "tileId": index,
                    "isFirstTile": is_first_tile,
                }),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            clicks += 1;
            if !is_first_tile {
                assert!(matches!(outcome, FlipOutcome::Matched(..) | FlipOutcome::Won(..)));
            }
        }
        remaining.retain(|&i| i != first && i != partner);
    }
    assert_eq!(clicks, 8);
    assert_eq!(game.move_count(), 4);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let (status, _) = post(
        &app,
        "/api/game/end",
        json!({"sessionId": session_id, "outcome": "win"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = get(&app, "/api/analytics").await;
    assert_eq!(status, StatusCode::OK);
    let session = &report["recentSessions"][0];
    assert_eq!(session["sessionId"], session_id.as_str());
    assert_eq!(session["totalMoves"], 4);
    assert_eq!(session["outcome"], "win");
    assert!(session["durationSeconds"].as_f64().expect("duration") > 0.0);
    assert_eq!(report["summary"]["wins"], 1);
    assert_eq!(report["summary"]["winRate"], 100.0);

    let (status, log) = get(&app, &format!("/api/game/log/{}", session_id)).await;
    assert_eq!(status, StatusCode::OK);
    let log = log.as_array().expect("array");
    assert_eq!(log.len(), 8);
    assert_eq!(log[0]["details"]["isFirstTile"], true);
    assert_eq!(log[1]["details"]["isFirstTile"], false);
}

#[tokio::test]
async fn test_end_unknown_session_is_not_found() {
    let (_db, app) = setup_app();
    let (status, body) = post(
        &app,
        "/api/game/end",
        json!({"sessionId": "missing", "outcome": "win"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().expect("message").contains("missing"));

    let (status, _) = get(&app, "/api/game/log/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ending_twice_overwrites_outcome() {
    let (_db, app) = setup_app();
    let session_id = start(&app, "a@x.com").await;

    for outcome in ["win", "incomplete"] {
        let (status, _) = post(
            &app,
            "/api/game/end",
            json!({"sessionId": session_id, "outcome": outcome}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, report) = get(&app, "/api/analytics").await;
    assert_eq!(report["recentSessions"][0]["outcome"], "incomplete");
    assert_eq!(report["summary"]["totalGames"], 0);
}

#[tokio::test]
async fn test_hint_and_undo_bump_counters() {
    let (_db, app) = setup_app();
    let session_id = start(&app, "a@x.com").await;

    for kind in ["hint", "hint", "undo", "game_start"] {
        let (status, body) = post(
            &app,
            "/api/game/action",
            json!({"sessionId": session_id, "userEmail": "a@x.com", "type": kind}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Action recorded.");
    }

    let (_, report) = get(&app, "/api/analytics").await;
    let session = &report["recentSessions"][0];
    assert_eq!(session["hintsUsed"], 2);
    assert_eq!(session["undosUsed"], 1);
    assert_eq!(session["totalMoves"], 0);
}

#[tokio::test]
async fn test_malformed_input_is_a_validation_error() {
    let (_db, app) = setup_app();

    let (status, _) = post(
        &app,
        "/api/game/action",
        json!({"sessionId": "s", "userEmail": "a@x.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/game/action",
        json!({"sessionId": "s", "userEmail": "a@x.com", "type": "reset"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app, "/api/game/start", json!({"userEmail": " "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "userEmail is required.");

    let (status, _) = post(&app, "/api/auth/register", json!({"email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seed_once_then_refuse() {
    let (_db, app) = setup_app();

    let (status, _) = get(&app, "/api/seed-data").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "/api/seed-data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Database already contains data. Seeding aborted.");
}

#[tokio::test]
async fn test_health() {
    let (_db, app) = setup_app();
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
