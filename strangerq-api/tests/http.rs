use async_trait::async_trait;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use strangerq_api::{router, AppState};
use strangerq_entropy::{
    EntropyError, Provenance, QuantumSource, RandomDraw, RandomSource, SourceConfig,
};
use url::Url;

/// Deterministic byte source so handler output can be pinned exactly.
struct FixedSource {
    byte: u8,
    provenance: Provenance,
}

#[async_trait]
impl RandomSource for FixedSource {
    async fn fetch(&self, count: usize) -> Result<RandomDraw, EntropyError> {
        if count < 1 || count > 256 {
            return Err(EntropyError::InvalidCount { count, max: 256 });
        }
        Ok(RandomDraw {
            bytes: vec![self.byte; count],
            provenance: self.provenance,
        })
    }
}

fn fixed_state(byte: u8, provenance: Provenance) -> AppState {
    AppState {
        source: Arc::new(FixedSource { byte, provenance }),
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn otp_defaults_to_six_numeric_digits() {
    let base = serve(router(fixed_state(7, Provenance::Fallback))).await;
    let (status, body) = get_json(&format!("{base}/otp")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["otp"], "777777");
    assert_eq!(body["length"], 6);
    assert_eq!(body["type"], "numeric");
    assert_eq!(body["entropy"], "csprng");
    assert_eq!(body["source"], "CSPRNG fallback");
}

#[tokio::test]
async fn otp_clamps_length_and_honors_style() {
    let base = serve(router(fixed_state(11, Provenance::Quantum))).await;
    let (status, body) = get_json(&format!("{base}/otp?length=50&type=alphanumeric")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 20);
    let otp = body["otp"].as_str().unwrap();
    assert_eq!(otp.len(), 20);
    assert!(otp
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_eq!(body["entropy"], "quantum");
    assert_eq!(body["source"], "Stranger Q");
}

#[tokio::test]
async fn zero_length_is_a_validation_error() {
    let base = serve(router(fixed_state(0, Provenance::Fallback))).await;
    let (status, body) = get_json(&format!("{base}/otp?length=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("length"));
}

#[tokio::test]
async fn password_respects_class_toggles() {
    let base = serve(router(fixed_state(2, Provenance::Fallback))).await;
    let url = format!("{base}/password?uppercase=false&numbers=false&symbols=false");
    let (status, body) = get_json(&url).await;
    assert_eq!(status, StatusCode::OK);
    // Lowercase-only charset, byte 2 selects 'c' everywhere.
    assert_eq!(body["password"], "c".repeat(16));
    assert_eq!(body["strength"], "weak");
    assert_eq!(body["length"], 16);
}

#[tokio::test]
async fn uuid_is_canonical_v4() {
    let base = serve(router(fixed_state(0xFF, Provenance::Fallback))).await;
    let (status, body) = get_json(&format!("{base}/uuid")).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap();
    assert_eq!(id.len(), 36);
    for idx in [8, 13, 18, 23] {
        assert_eq!(id.as_bytes()[idx], b'-');
    }
    assert_eq!(id.as_bytes()[14], b'4');
    assert_eq!(body["format"], "uuid-v4");
}

#[tokio::test]
async fn token_carries_prefix_and_total_length() {
    let base = serve(router(fixed_state(1, Provenance::Fallback))).await;
    let (status, body) = get_json(&format!("{base}/token?length=8&prefix=sq_")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], "sq_11111111");
    assert_eq!(body["length"], 11);
}

#[tokio::test]
async fn pick_returns_subset_of_candidates() {
    let base = serve(router(fixed_state(3, Provenance::Fallback))).await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/pick"))
        .json(&json!({ "items": ["alpha", "beta", "gamma"], "count": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    let selected: Vec<String> = body["selected"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    for choice in &selected {
        assert!(["alpha", "beta", "gamma"].contains(&choice.as_str()));
    }
}

#[tokio::test]
async fn pick_rejects_empty_candidate_list() {
    let base = serve(router(fixed_state(3, Provenance::Fallback))).await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/pick"))
        .json(&json!({ "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn key_pipeline_exposes_intermediate_representations() {
    // Nine 0xFF bytes expand to 72 one-bits: twelve chunks of 63, each
    // mapping to BASE62[63 % 62] = '1'.
    let base = serve(router(fixed_state(0xFF, Provenance::Fallback))).await;
    let (status, body) = get_json(&format!("{base}/key")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "111111111111");
    assert_eq!(body["hex"], "ff".repeat(9));
    assert_eq!(body["bits"].as_str().unwrap().len(), 72);
    assert_eq!(body["length"], 12);
}

#[tokio::test]
async fn unknown_endpoint_lists_available_actions() {
    let base = serve(router(fixed_state(0, Provenance::Fallback))).await;
    let (status, body) = get_json(&format!("{base}/teleport")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let available: Vec<&str> = body["available"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(available.contains(&"pick"));
    assert!(available.contains(&"key"));
}

// --- end-to-end provenance through a stubbed QRNG endpoint ---

#[derive(serde::Deserialize)]
struct StubQuery {
    length: usize,
}

async fn healthy_stub(Query(query): Query<StubQuery>) -> Json<Value> {
    Json(json!({ "success": true, "data": vec![42u8; query.length] }))
}

async fn failing_stub() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn malformed_stub() -> Json<Value> {
    Json(json!({ "success": false, "data": [] }))
}

async fn sleepy_stub(Query(query): Query<StubQuery>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(600)).await;
    Json(json!({ "success": true, "data": vec![42u8; query.length] }))
}

async fn quantum_state(stub: Router, timeout: Duration) -> AppState {
    let stub_base = serve(stub).await;
    let source = QuantumSource::new(SourceConfig {
        endpoint: Url::parse(&format!("{stub_base}/API/jsonI.php")).unwrap(),
        timeout,
        max_bytes: 256,
    });
    AppState {
        source: Arc::new(source),
    }
}

#[tokio::test]
async fn healthy_remote_tags_results_quantum() {
    let stub = Router::new().route("/API/jsonI.php", get(healthy_stub));
    let base = serve(router(quantum_state(stub, Duration::from_secs(1)).await)).await;
    let (status, body) = get_json(&format!("{base}/token?length=4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entropy"], "quantum");
    assert_eq!(body["source"], "Stranger Q");
    // 42 % 62 = 42 -> BASE62[42] = 'g'.
    assert_eq!(body["token"], "gggg");
}

#[tokio::test]
async fn failing_remote_still_answers_with_fallback() {
    let stub = Router::new().route("/API/jsonI.php", get(failing_stub));
    let base = serve(router(quantum_state(stub, Duration::from_secs(1)).await)).await;
    let (status, body) = get_json(&format!("{base}/uuid")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entropy"], "csprng");
    assert_eq!(body["source"], "CSPRNG fallback");
}

#[tokio::test]
async fn slow_remote_times_out_into_fallback() {
    // Stub answers well-formed but only after 600 ms; with a 200 ms bound
    // the provider must give up and serve CSPRNG bytes instead of blocking.
    let stub = Router::new().route("/API/jsonI.php", get(sleepy_stub));
    let base = serve(router(quantum_state(stub, Duration::from_millis(200)).await)).await;
    let (status, body) = get_json(&format!("{base}/token?length=4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entropy"], "csprng");
    assert_eq!(body["source"], "CSPRNG fallback");
    assert_eq!(body["token"].as_str().unwrap().len(), 4);
}

#[tokio::test]
async fn malformed_remote_payload_falls_back() {
    let stub = Router::new().route("/API/jsonI.php", get(malformed_stub));
    let base = serve(router(quantum_state(stub, Duration::from_secs(1)).await)).await;
    let (status, body) = get_json(&format!("{base}/otp?length=8")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entropy"], "csprng");
    assert_eq!(body["otp"].as_str().unwrap().len(), 8);
}
