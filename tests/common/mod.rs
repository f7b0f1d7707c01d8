#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use songscout::config::Config;
use songscout::{build_router, build_state};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Binds a router on an ephemeral local port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn shake_it_off() -> Value {
    json!({
        "id": 76376880,
        "readable": true,
        "title": "Shake It Off",
        "link": "https://www.deezer.com/track/76376880",
        "duration": 219,
        "rank": 812345,
        "preview": "https://cdns-preview.example/shake.mp3",
        "artist": { "id": 12246, "name": "Taylor Swift", "type": "artist" },
        "album": { "id": 7490862, "title": "1989", "cover_medium": "https://e-cdns.example/1989.jpg", "type": "album" },
        "type": "track"
    })
}

fn happy() -> Value {
    json!({
        "id": 3135556,
        "title": "Happy",
        "link": "https://www.deezer.com/track/3135556",
        "duration": 233,
        "preview": "",
        "artist": { "id": 1126, "name": "Pharrell Williams" },
        "album": { "id": 302127, "title": "G I R L" }
    })
}

#[derive(Default)]
pub struct CatalogStub {
    pub track_searches: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

/// Minimal Deezer lookalike. Artist ids 429/500/800 trigger the matching failure.
pub fn catalog_router(stub: Arc<CatalogStub>) -> Router {
    async fn search(
        State(stub): State<Arc<CatalogStub>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        stub.track_searches.fetch_add(1, Ordering::SeqCst);
        let q = params.get("q").cloned().unwrap_or_default();
        stub.queries.lock().unwrap().push(q.clone());

        let data = match q.as_str() {
            "Shake It Off Taylor Swift" => vec![shake_it_off()],
            "Happy Pharrell Williams" => vec![happy()],
            _ => vec![],
        };
        Json(json!({ "data": data, "total": data.len() }))
    }

    async fn search_artist(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let q = params.get("q").cloned().unwrap_or_default();
        Json(json!({ "data": [{ "id": 12246, "name": q, "type": "artist" }], "total": 1 }))
    }

    async fn albums(Path(artist_id): Path<u64>) -> Response {
        match artist_id {
            429 => StatusCode::TOO_MANY_REQUESTS.into_response(),
            500 => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
            800 => Json(json!({
                "error": { "type": "DataException", "message": "no data", "code": 800 }
            }))
            .into_response(),
            _ => Json(json!({
                "data": [{ "id": 7490862, "title": "1989", "release_date": "2014-10-27" }],
                "total": 1
            }))
            .into_response(),
        }
    }

    async fn genres() -> Json<Value> {
        Json(json!({ "data": [{ "id": 0, "name": "All" }, { "id": 132, "name": "Pop" }] }))
    }

    Router::new()
        .route("/search", get(search))
        .route("/search/artist", get(search_artist))
        .route("/artist/:id/albums", get(albums))
        .route("/genre", get(genres))
        .with_state(stub)
}

#[derive(Default)]
pub struct GenerationStub {
    pub prompts: Mutex<Vec<String>>,
}

fn reply(finish_reason: &str, text: &str) -> Response {
    Json(json!({
        "candidates": [{
            "finishReason": finish_reason,
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    }))
    .into_response()
}

/// Minimal Gemini lookalike that answers by inspecting the prompt text.
pub fn generation_router(stub: Arc<GenerationStub>) -> Router {
    async fn generate(
        State(stub): State<Arc<GenerationStub>>,
        Path(_call): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        let prompt = body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        stub.prompts.lock().unwrap().push(prompt.clone());

        if prompt.contains("List 20 popular songs") {
            let mut songs = vec![
                json!({ "title": "Happy", "artist": "Pharrell Williams" }),
                json!({ "title": "Shake It Off", "artist": "Taylor Swift" }),
            ];
            for i in 0..18 {
                songs.push(json!({ "title": format!("Obscure {}", i), "artist": "Nobody" }));
            }
            let text = format!("```json\n{}\n```", json!({ "songs": songs }));
            return reply("STOP", &text);
        }

        if prompt.contains("Random song") {
            return reply("STOP", "```json\n{\"title\":\"Shake It Off\",\"artist\":\"Taylor Swift\"}\n```");
        }

        if prompt.contains("slow down") {
            return (StatusCode::TOO_MANY_REQUESTS, "quota").into_response();
        }
        if prompt.contains("cut me off") {
            return reply("MAX_TOKENS", "{\"title\": \"Shake");
        }
        if prompt.contains("gibberish") {
            return reply("STOP", "{\"title\": \"Unknown\", \"artist\": \"Unknown\"}");
        }
        if prompt.contains("nowhere to be found") {
            return reply("STOP", "{\"title\": \"Lost Song\", \"artist\": \"Ghost\"}");
        }

        reply("STOP", "{\"title\": \"Shake It Off\", \"artist\": \"Taylor Swift\"}")
    }

    async fn models() -> Json<Value> {
        Json(json!({ "models": [{ "name": "models/gemini-2.5-flash" }] }))
    }

    Router::new()
        .route("/v1beta/models", get(models))
        .route("/v1beta/models/:call", post(generate))
        .with_state(stub)
}

pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<CatalogStub>,
    pub generation: Arc<GenerationStub>,
}

pub async fn test_app(with_ai: bool) -> TestApp {
    let catalog = Arc::new(CatalogStub::default());
    let generation = Arc::new(GenerationStub::default());

    let config = Config {
        gemini_api_key: with_ai.then(|| "test-key".to_string()),
        gemini_base_url: spawn(generation_router(generation.clone())).await,
        gemini_requests_per_minute: 1000,
        deezer_base_url: spawn(catalog_router(catalog.clone())).await,
        http_timeout_secs: 5,
        ..Config::default()
    };

    let state = build_state(&config).unwrap();

    TestApp {
        router: build_router(state, &config),
        catalog,
        generation,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get_raw(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
