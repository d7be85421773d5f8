//! Integration tests for Plateful checkout.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p plateful-integration-tests
//! ```
//!
//! The tests drive the real REST clients against [`StubBackend`], an
//! in-process server speaking the ordering backend's wire surface with
//! canned responses. No external services are required.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to submitted order, end to end
//! - `schedule_slots` - Availability queries and stale-response handling
//! - `payment_methods` - Saved cards and two-phase card saving
//! - `profile_settings` - Account profile reads and updates

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use plateful_checkout::config::ApiConfig;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Bearer token the stub accepts. Anything else gets a 401.
pub const TEST_TOKEN: &str = "k9PqX2vR8mN4wL6tY3bZ7cJ5hF1dG0aS";

// =============================================================================
// Stub Backend
// =============================================================================

/// In-process ordering backend with canned responses.
///
/// Binds to an ephemeral local port; every test starts its own instance so
/// tests stay isolated. State mutators and failure toggles can be flipped
/// mid-test to script multi-step scenarios.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
}

#[derive(Debug)]
struct StubState {
    /// Full `Authorization` header value the stub expects.
    bearer: String,
    /// Slot labels keyed by `YYYY-MM-DD` date string.
    slots: Mutex<HashMap<String, Vec<String>>>,
    /// Saved cards in wire shape.
    cards: Mutex<Vec<Value>>,
    /// Profile in wire shape.
    profile: Mutex<Value>,
    /// Last order payload accepted by `POST /orders`.
    last_order: Mutex<Option<Value>>,
    /// Tokens the link endpoint has attached, in order.
    linked_tokens: Mutex<Vec<String>>,
    /// `"METHOD /path?query"` for every request received, in order.
    requests: Mutex<Vec<String>>,
    slots_fail: AtomicBool,
    vault_fail: AtomicBool,
    link_fail: AtomicBool,
    orders_fail: AtomicBool,
    vault_seq: AtomicU32,
    card_seq: AtomicU32,
    order_seq: AtomicU32,
}

impl StubState {
    fn new() -> Self {
        Self {
            bearer: format!("Bearer {TEST_TOKEN}"),
            slots: Mutex::new(HashMap::new()),
            cards: Mutex::new(Vec::new()),
            profile: Mutex::new(json!({})),
            last_order: Mutex::new(None),
            linked_tokens: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            slots_fail: AtomicBool::new(false),
            vault_fail: AtomicBool::new(false),
            link_fail: AtomicBool::new(false),
            orders_fail: AtomicBool::new(false),
            vault_seq: AtomicU32::new(1),
            card_seq: AtomicU32::new(1),
            order_seq: AtomicU32::new(1),
        }
    }
}

impl StubBackend {
    /// Start the stub on an ephemeral port and serve it in the background.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::new());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub backend");
        });

        Self { addr, state }
    }

    /// The address the stub is listening on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// An [`ApiConfig`] pointing the real clients at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the stub address does not form a valid URL.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(&format!("http://{}", self.addr)).expect("stub backend url"),
            auth_token: SecretString::from(TEST_TOKEN),
        }
    }

    /// Set the slot labels served for one calendar date.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    pub fn put_slots(&self, date: NaiveDate, labels: &[&str]) {
        let key = date.format("%Y-%m-%d").to_string();
        let labels = labels.iter().map(ToString::to_string).collect();
        self.state
            .slots
            .lock()
            .expect("state lock")
            .insert(key, labels);
    }

    /// Add a saved card in wire shape.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    pub fn put_card(&self, id: &str, masked_pan: &str, brand: &str, is_default: bool) {
        let card = json!({
            "_id": id,
            "data": {
                "masked_pan": masked_pan,
                "bin": { "brand": brand },
                "is_default": is_default,
            },
        });
        self.state.cards.lock().expect("state lock").push(card);
    }

    /// Replace the profile served by `GET /profile`.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    pub fn set_profile(&self, profile: Value) {
        *self.state.profile.lock().expect("state lock") = profile;
    }

    /// Make the schedule-list endpoint fail with a 500.
    pub fn fail_slots(&self, failing: bool) {
        self.state.slots_fail.store(failing, Ordering::SeqCst);
    }

    /// Make the card vault endpoint fail with a 502.
    pub fn fail_vault(&self, failing: bool) {
        self.state.vault_fail.store(failing, Ordering::SeqCst);
    }

    /// Make the profile link endpoint fail with a 500.
    pub fn fail_link(&self, failing: bool) {
        self.state.link_fail.store(failing, Ordering::SeqCst);
    }

    /// Make order placement fail with a 503.
    pub fn fail_orders(&self, failing: bool) {
        self.state.orders_fail.store(failing, Ordering::SeqCst);
    }

    /// Every request received so far, as `"METHOD /path?query"` lines.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().expect("state lock").clone()
    }

    /// The order payload last accepted by `POST /orders`.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    #[must_use]
    pub fn last_order(&self) -> Option<Value> {
        self.state.last_order.lock().expect("state lock").clone()
    }

    /// Ids of the cards currently on file, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    #[must_use]
    pub fn card_ids(&self) -> Vec<String> {
        self.state
            .cards
            .lock()
            .expect("state lock")
            .iter()
            .filter_map(|card| card.get("_id").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect()
    }

    /// Tokens the link endpoint has attached to the profile, in order.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    #[must_use]
    pub fn linked_tokens(&self) -> Vec<String> {
        self.state.linked_tokens.lock().expect("state lock").clone()
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/orders/{order_ref}/schedule-list", get(schedule_list))
        .route("/orders", post(submit_order))
        .route("/profile/payment-methods", get(list_cards).post(link_card))
        .route("/profile/payment-methods/{card_id}", delete(delete_card))
        .route("/payments/m/cof", post(vault_card))
        .route("/profile", get(get_profile).put(put_profile))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            record_and_authorize,
        ))
        .with_state(state)
}

/// Log the request line, then reject anything without the expected bearer.
async fn record_and_authorize(
    State(state): State<Arc<StubState>>,
    request: Request,
    next: Next,
) -> Response {
    let line = request.uri().path_and_query().map_or_else(
        || format!("{} {}", request.method(), request.uri().path()),
        |path_query| format!("{} {path_query}", request.method()),
    );
    state.requests.lock().expect("state lock").push(line);

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(state.bearer.as_str());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response();
    }

    next.run(request).await
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    mode: String,
    date: String,
}

async fn schedule_list(
    State(state): State<Arc<StubState>>,
    Path(_order_ref): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    if state.slots_fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "schedule source offline").into_response();
    }
    if query.mode != "pickup" && query.mode != "delivery" {
        return (StatusCode::BAD_REQUEST, "unknown mode").into_response();
    }

    let labels = state
        .slots
        .lock()
        .expect("state lock")
        .get(&query.date)
        .cloned()
        .unwrap_or_default();
    let slots: Vec<Value> = labels.iter().map(|st| json!({ "st": st })).collect();
    Json(json!({ "slots": slots })).into_response()
}

async fn list_cards(State(state): State<Arc<StubState>>) -> Json<Value> {
    let cards = state.cards.lock().expect("state lock").clone();
    Json(json!({ "cards": cards }))
}

async fn delete_card(
    State(state): State<Arc<StubState>>,
    Path(card_id): Path<String>,
) -> StatusCode {
    let mut cards = state.cards.lock().expect("state lock");
    let before = cards.len();
    cards.retain(|card| card.get("_id").and_then(Value::as_str) != Some(card_id.as_str()));
    if cards.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn vault_card(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    if state.vault_fail.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "card declined by vault").into_response();
    }
    if body.get("pan").and_then(Value::as_str).unwrap_or_default().is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "missing pan").into_response();
    }

    let n = state.vault_seq.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "token": format!("tok_{n}") })).into_response()
}

async fn link_card(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    if state.link_fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "profile link failed").into_response();
    }
    let Some(token) = body.get("token").and_then(Value::as_str) else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "missing token").into_response();
    };
    state
        .linked_tokens
        .lock()
        .expect("state lock")
        .push(token.to_string());

    let n = state.card_seq.fetch_add(1, Ordering::SeqCst);
    let card = json!({
        "_id": format!("card_{n}"),
        "data": {
            "masked_pan": "**** **** **** 4242",
            "bin": { "brand": "visa" },
            "is_default": false,
        },
    });
    state.cards.lock().expect("state lock").push(card.clone());
    Json(card).into_response()
}

async fn get_profile(State(state): State<Arc<StubState>>) -> Json<Value> {
    Json(state.profile.lock().expect("state lock").clone())
}

async fn put_profile(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Json<Value> {
    *state.profile.lock().expect("state lock") = body.clone();
    Json(body)
}

async fn submit_order(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    if state.orders_fail.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "kitchen offline").into_response();
    }
    *state.last_order.lock().expect("state lock") = Some(body);

    let n = state.order_seq.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "order_id": format!("ord_{n}"), "status": "received" })).into_response()
}
