mod common;

use ::common::{GameEvent, ShotOutcome};
use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use playback::{HttpSimulationClient, PlayRequest, PlaybackConfig, SimulationClient, SimulationError};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

async fn spawn_service(app: Router) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

fn config_for(addr: SocketAddr) -> Result<PlaybackConfig> {
    Ok(PlaybackConfig {
        sim_url: Url::parse(&format!("http://{}", addr))?,
        ..PlaybackConfig::default()
    })
}

fn request() -> PlayRequest {
    PlayRequest {
        offense: vec!["CURRY".to_string(), "GREEN".to_string()],
        defense: vec!["SENGUN".to_string()],
        ball_handler: "CURRY".to_string(),
    }
}

#[tokio::test]
async fn posts_the_question_and_decodes_the_reply() -> Result<()> {
    crate::common::init_tracing();
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let app = {
        let seen = seen.clone();
        Router::new().route(
            "/analyze",
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    *seen.lock().await = Some(body);
                    let events = r#"```json
{"events": [
  {"time": "00:20", "type": "PASS", "player": "CURRY", "details": {"to": "GREEN"}},
  {"time": "00:15", "type": "SHOT_ATTEMPT", "player": "GREEN", "details": {"distance": 23.5, "outcome": "MAKE"}}
]}
```"#;
                    Json(json!({ "response": events, "usage": { "total_tokens": 120 } }))
                }
            }),
        )
    };
    let addr = spawn_service(app).await?;
    let client = HttpSimulationClient::new(&config_for(addr)?)?;

    let events = client.simulate(&request()).await?;

    assert_eq!(
        events,
        vec![
            GameEvent::pass("CURRY", "GREEN").with_clock("00:20"),
            GameEvent::shot("GREEN", ShotOutcome::Make, 23.5).with_clock("00:15"),
        ]
    );
    let body = seen.lock().await.clone().expect("service was called");
    assert_eq!(body["question"], request().question());
    assert_eq!(body["max_tokens"], 500);
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_as_status() -> Result<()> {
    let app = Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model not loaded") }),
    );
    let addr = spawn_service(app).await?;
    let client = HttpSimulationClient::new(&config_for(addr)?)?;

    match client.simulate(&request()).await {
        Err(SimulationError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn garbage_reply_is_a_decode_error() -> Result<()> {
    let app = Router::new().route(
        "/analyze",
        post(|| async { Json(json!({ "response": "Sorry, I can't simulate that." })) }),
    );
    let addr = spawn_service(app).await?;
    let client = HttpSimulationClient::new(&config_for(addr)?)?;

    assert!(matches!(
        client.simulate(&request()).await,
        Err(SimulationError::Decode(_))
    ));
    Ok(())
}

#[tokio::test]
async fn health_check() -> Result<()> {
    let app = Router::new().route("/health", get(|| async { Json(json!({ "status": "healthy" })) }));
    let addr = spawn_service(app).await?;
    let client = HttpSimulationClient::new(&config_for(addr)?)?;

    assert!(client.health().await?);
    Ok(())
}

#[tokio::test]
async fn endpoints_stay_under_the_base_path() -> Result<()> {
    let app = Router::new()
        .route("/api/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .route(
            "/api/analyze",
            post(|| async { Json(json!({ "response": r#"[{"type": "REBOUND", "player": "LOONEY"}]"# })) }),
        );
    let addr = spawn_service(app).await?;
    let config = PlaybackConfig {
        sim_url: Url::parse(&format!("http://{}/api", addr))?,
        ..PlaybackConfig::default()
    };
    let client = HttpSimulationClient::new(&config)?;

    assert!(client.health().await?);
    assert_eq!(client.simulate(&request()).await?, vec![GameEvent::rebound("LOONEY")]);
    Ok(())
}
