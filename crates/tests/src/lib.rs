//! In-process mock of the builder API, plus shared helpers for the
//! integration suite. The mock verifies signatures the way the real service
//! does: challenge signatures during registration, request signatures on
//! build, both over the canonical sign bytes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use quarry_signature::{
    Signature, SigningKey, VerifyingKey, default_scheme, validator_address, verify,
};
use quarry_types::{BuildBlockRequest, BuildBlockResponse, RegisterChallenge, serde_base64};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::Read,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tower_http::trace::TraceLayer;

/// Length of the challenge bytes the service issues on apply.
pub const CHALLENGE_LEN: usize = 10;

pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .try_init();
}

pub struct TestKey {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
    pub address: String,
}

/// Deterministic key material for a test validator.
pub fn test_key(seed: u8) -> TestKey {
    let signing_key = SigningKey::from_bytes_default(&[seed; 32]).unwrap();
    let verifying_key = VerifyingKey::from_signing_key(&signing_key);
    let address = validator_address(&verifying_key);
    TestKey {
        signing_key,
        verifying_key,
        address,
    }
}

/// What the mock service observed for the most recent build call.
#[derive(Clone)]
pub struct ObservedBuild {
    pub request: BuildBlockRequest,
    pub gzipped: bool,
}

#[derive(Clone, Default)]
pub struct MockBuilderApi {
    state: Arc<ApiState>,
}

#[derive(Default)]
struct ApiState {
    public_keys: Mutex<HashMap<String, VerifyingKey>>,
    challenges: Mutex<HashMap<String, PendingRegistration>>,
    validators: Mutex<HashMap<String, String>>,
    apply_count: AtomicUsize,
    register_count: AtomicUsize,
    build_count: AtomicUsize,
    last_challenge_len: Mutex<Option<usize>>,
    last_build: Mutex<Option<ObservedBuild>>,
}

struct PendingRegistration {
    chain_id: String,
    validator_address: String,
    payment_address: String,
    challenge: Vec<u8>,
}

impl MockBuilderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v0/register", post(handle_register))
            .route("/v0/build", post(handle_build))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub fn add_public_key(&self, chain_id: &str, address: &str, key: VerifyingKey) {
        self.state
            .public_keys
            .lock()
            .unwrap()
            .insert(validator_id(chain_id, address), key);
    }

    pub fn is_registered(&self, chain_id: &str, address: &str) -> bool {
        self.state
            .validators
            .lock()
            .unwrap()
            .contains_key(&validator_id(chain_id, address))
    }

    pub fn registered_payment_address(&self, chain_id: &str, address: &str) -> Option<String> {
        self.state
            .validators
            .lock()
            .unwrap()
            .get(&validator_id(chain_id, address))
            .cloned()
    }

    pub fn apply_count(&self) -> usize {
        self.state.apply_count.load(Ordering::SeqCst)
    }

    pub fn register_count(&self) -> usize {
        self.state.register_count.load(Ordering::SeqCst)
    }

    pub fn build_count(&self) -> usize {
        self.state.build_count.load(Ordering::SeqCst)
    }

    pub fn last_challenge_len(&self) -> Option<usize> {
        *self.state.last_challenge_len.lock().unwrap()
    }

    pub fn last_build(&self) -> Option<ObservedBuild> {
        self.state.last_build.lock().unwrap().clone()
    }
}

/// Serves the mock API on an ephemeral port in the background and returns
/// its base URL.
pub async fn start_builder_api(api: &MockBuilderApi) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = api.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn validator_id(chain_id: &str, address: &str) -> String {
    format!("{chain_id}:{address}")
}

/// Both registration phases post to the same endpoint; an empty challenge id
/// means apply.
#[derive(Deserialize)]
struct RegistrationBody {
    #[serde(default)]
    chain_id: String,
    #[serde(default)]
    validator_address: String,
    #[serde(default)]
    payment_address: String,
    #[serde(default)]
    challenge_id: String,
    #[serde(default, with = "serde_base64::bytes")]
    signature: Vec<u8>,
}

#[derive(Serialize)]
struct IssuedChallenge {
    challenge_id: String,
    #[serde(with = "serde_base64::bytes")]
    challenge: Vec<u8>,
}

async fn handle_register(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = match decode_body(&headers, &body) {
        Ok(body) => body,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, &format!("gzip: {error}")),
    };
    let request: RegistrationBody = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, &format!("decode: {error}")),
    };

    if request.challenge_id.is_empty() {
        state.apply_count.fetch_add(1, Ordering::SeqCst);

        let mut challenge = vec![0u8; CHALLENGE_LEN];
        rand::thread_rng().fill_bytes(&mut challenge);
        let mut id = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut id);
        let challenge_id = hex::encode(id);

        *state.last_challenge_len.lock().unwrap() = Some(challenge.len());
        state.challenges.lock().unwrap().insert(
            challenge_id.clone(),
            PendingRegistration {
                chain_id: request.chain_id,
                validator_address: request.validator_address,
                payment_address: request.payment_address,
                challenge: challenge.clone(),
            },
        );

        Json(IssuedChallenge {
            challenge_id,
            challenge,
        })
        .into_response()
    } else {
        state.register_count.fetch_add(1, Ordering::SeqCst);

        // Challenge ids are single use: consumed on the first attempt,
        // successful or not.
        let Some(pending) = state
            .challenges
            .lock()
            .unwrap()
            .remove(&request.challenge_id)
        else {
            return error_response(StatusCode::BAD_REQUEST, "no such challenge id");
        };

        let id = validator_id(&pending.chain_id, &pending.validator_address);
        let Some(key) = state.public_keys.lock().unwrap().get(&id).cloned() else {
            return error_response(StatusCode::BAD_REQUEST, &format!("no public key for {id}"));
        };

        let challenge = RegisterChallenge {
            bytes: pending.challenge,
            signature: Vec::new(),
        };
        let signature = Signature {
            bytes: request.signature,
            scheme: default_scheme(),
        };
        if verify(&key, &challenge.sign_bytes(), &signature).is_err() {
            return error_response(StatusCode::BAD_REQUEST, "bad signature");
        }

        state
            .validators
            .lock()
            .unwrap()
            .insert(id, pending.payment_address);
        Json(serde_json::json!({ "result": "success" })).into_response()
    }
}

async fn handle_build(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.build_count.fetch_add(1, Ordering::SeqCst);

    let gzipped = is_gzipped(&headers);
    let body = match decode_body(&headers, &body) {
        Ok(body) => body,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, &format!("gzip: {error}")),
    };
    let request: BuildBlockRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, &format!("decode: {error}")),
    };

    let id = validator_id(&request.chain_id, &request.validator_address);
    if !state.validators.lock().unwrap().contains_key(&id) {
        return error_response(StatusCode::BAD_REQUEST, &format!("unknown validator {id}"));
    }
    let Some(key) = state.public_keys.lock().unwrap().get(&id).cloned() else {
        return error_response(StatusCode::BAD_REQUEST, &format!("no public key for {id}"));
    };

    let signature = Signature {
        bytes: request.signature.clone(),
        scheme: default_scheme(),
    };
    if verify(&key, &request.sign_bytes(), &signature).is_err() {
        return error_response(StatusCode::BAD_REQUEST, "bad signature");
    }

    *state.last_build.lock().unwrap() = Some(ObservedBuild {
        request: request.clone(),
        gzipped,
    });

    Json(BuildBlockResponse {
        txs: request.txs.clone(),
        validator_payment: Some(format!("{} {} coins", request.txs.len(), request.chain_id)),
    })
    .into_response()
}

fn is_gzipped(headers: &HeaderMap) -> bool {
    headers
        .get("content-encoding")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("gzip"))
}

/// Mirrors the service's content-encoding handling: gzip bodies are
/// decompressed before JSON decoding.
fn decode_body(headers: &HeaderMap, body: &[u8]) -> std::io::Result<Vec<u8>> {
    if is_gzipped(headers) {
        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(body).read_to_end(&mut decoded)?;
        Ok(decoded)
    } else {
        Ok(body.to_vec())
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
