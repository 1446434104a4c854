//! Stand-in for the Context.IO REST API, for integration tests.
//!
//! Every request must carry a valid two-legged OAuth signature for the
//! configured consumer credentials; anything else is answered with 401
//! before it reaches a handler.

pub mod auth;
pub mod store;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};

pub use auth::Credentials;
use store::{body_json, folder_json, message_json, OAuthProvider, Store, RESOURCE_ROOT};

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub credentials: Arc<Credentials>,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"type": "error", "value": message})))
}

/// Router over a freshly seeded store.
pub fn app(credentials: Credentials) -> Router {
    app_with_store(credentials, Store::seeded())
}

pub fn app_with_store(credentials: Credentials, store: Store) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(store)),
        credentials: Arc::new(credentials),
    };
    Router::new()
        .route("/oauth_providers", get(list_providers).post(create_provider))
        .route(
            "/oauth_providers/{key}",
            get(get_provider).delete(delete_provider),
        )
        .route("/users/{user}/email_accounts/{label}/folders", get(list_folders))
        .route(
            "/users/{user}/email_accounts/{label}/folders/{folder}",
            get(get_folder).post(create_folder),
        )
        .route(
            "/users/{user}/email_accounts/{label}/folders/{folder}/messages",
            get(list_messages),
        )
        .route(
            "/users/{user}/email_accounts/{label}/folders/{folder}/messages/{message}",
            get(get_message).put(move_message),
        )
        .route(
            "/users/{user}/email_accounts/{label}/folders/{folder}/messages/{message}/body",
            get(message_body),
        )
        .route("/discovery", get(discovery))
        .layer(middleware::from_fn_with_state(state.clone(), require_signature))
        .with_state(state)
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    serve(listener, app(credentials)).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn require_signature(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return api_error(StatusCode::BAD_REQUEST, "unreadable body").into_response(),
    };
    if let Err(reason) = auth::verify(&parts, &bytes, &state.credentials) {
        warn!(method = %parts.method, uri = %parts.uri, %reason, "rejected request");
        return api_error(StatusCode::UNAUTHORIZED, &reason).into_response();
    }
    debug!(method = %parts.method, uri = %parts.uri, "signature ok");
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

// --- oauth providers ---

#[derive(Deserialize)]
struct NewProvider {
    #[serde(rename = "type")]
    provider_type: String,
    provider_consumer_key: String,
    provider_consumer_secret: String,
}

async fn list_providers(State(state): State<AppState>) -> Json<Vec<OAuthProvider>> {
    let store = state.db.read().await;
    Json(store.providers.values().cloned().collect())
}

async fn create_provider(State(state): State<AppState>, Form(input): Form<NewProvider>) -> Json<Value> {
    let resource_url = format!("{RESOURCE_ROOT}/oauth_providers/{}", input.provider_consumer_key);
    let provider = OAuthProvider {
        provider_type: input.provider_type,
        provider_consumer_key: input.provider_consumer_key.clone(),
        provider_consumer_secret: input.provider_consumer_secret,
        resource_url: resource_url.clone(),
    };
    state
        .db
        .write()
        .await
        .providers
        .insert(input.provider_consumer_key.clone(), provider);
    Json(json!({
        "success": true,
        "provider_consumer_key": input.provider_consumer_key,
        "resource_url": resource_url,
    }))
}

async fn get_provider(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult {
    let store = state.db.read().await;
    let provider = store
        .providers
        .get(&key)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such oauth provider"))?;
    Ok(Json(json!(provider)))
}

async fn delete_provider(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult {
    let mut store = state.db.write().await;
    store
        .providers
        .remove(&key)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such oauth provider"))?;
    Ok(Json(json!({"success": true})))
}

// --- folders ---

#[derive(Deserialize)]
struct FoldersQuery {
    include_names_only: Option<String>,
}

async fn list_folders(
    State(state): State<AppState>,
    Path((user, label)): Path<(String, String)>,
    Query(query): Query<FoldersQuery>,
) -> ApiResult {
    let store = state.db.read().await;
    let account = store
        .account(&user, &label)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such email account"))?;
    let names_only = query.include_names_only.as_deref() == Some("1");
    let folders: Vec<Value> = account
        .folders
        .iter()
        .map(|(name, messages)| {
            if names_only {
                json!({"name": name})
            } else {
                folder_json(&user, &label, name, messages)
            }
        })
        .collect();
    Ok(Json(json!(folders)))
}

async fn get_folder(
    State(state): State<AppState>,
    Path((user, label, folder)): Path<(String, String, String)>,
) -> ApiResult {
    let store = state.db.read().await;
    let messages = store
        .account(&user, &label)
        .and_then(|account| account.folders.get(&folder))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such folder"))?;
    Ok(Json(folder_json(&user, &label, &folder, messages)))
}

async fn create_folder(
    State(state): State<AppState>,
    Path((user, label, folder)): Path<(String, String, String)>,
) -> ApiResult {
    let mut store = state.db.write().await;
    let account = store
        .account_mut(&user, &label)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such email account"))?;
    if account.folders.contains_key(&folder) {
        return Err(api_error(StatusCode::CONFLICT, "folder already exists"));
    }
    account.folders.insert(folder, Vec::new());
    Ok(Json(json!({"success": true})))
}

// --- messages ---

#[derive(Deserialize)]
struct MessagesQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn list_messages(
    State(state): State<AppState>,
    Path((user, label, folder)): Path<(String, String, String)>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult {
    let store = state.db.read().await;
    let messages = store
        .account(&user, &label)
        .and_then(|account| account.folders.get(&folder))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such folder"))?;
    let listed: Vec<Value> = messages
        .iter()
        .skip(query.offset.unwrap_or(0))
        .take(query.limit.unwrap_or(usize::MAX))
        .map(|m| message_json(&user, &label, &folder, m))
        .collect();
    Ok(Json(json!(listed)))
}

async fn get_message(
    State(state): State<AppState>,
    Path((user, label, folder, id)): Path<(String, String, String, String)>,
) -> ApiResult {
    let store = state.db.read().await;
    let message = store
        .account(&user, &label)
        .and_then(|account| account.folders.get(&folder))
        .and_then(|messages| messages.iter().find(|m| m.email_message_id == id))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such message"))?;
    Ok(Json(message_json(&user, &label, &folder, message)))
}

#[derive(Deserialize)]
struct MoveQuery {
    new_folder_id: String,
}

async fn move_message(
    State(state): State<AppState>,
    Path((user, label, folder, id)): Path<(String, String, String, String)>,
    Query(query): Query<MoveQuery>,
) -> ApiResult {
    let mut store = state.db.write().await;
    let account = store
        .account_mut(&user, &label)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such email account"))?;
    if !account.folders.contains_key(&query.new_folder_id) {
        return Err(api_error(StatusCode::NOT_FOUND, "no such target folder"));
    }
    let source = account
        .folders
        .get_mut(&folder)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such folder"))?;
    let index = source
        .iter()
        .position(|m| m.email_message_id == id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such message"))?;
    let message = source.remove(index);
    if let Some(target) = account.folders.get_mut(&query.new_folder_id) {
        target.push(message);
    }
    Ok(Json(json!({"success": true})))
}

#[derive(Deserialize)]
struct BodyQuery {
    #[serde(rename = "type")]
    body_type: Option<String>,
}

async fn message_body(
    State(state): State<AppState>,
    Path((user, label, folder, id)): Path<(String, String, String, String)>,
    Query(query): Query<BodyQuery>,
) -> ApiResult {
    let store = state.db.read().await;
    let message = store
        .account(&user, &label)
        .and_then(|account| account.folders.get(&folder))
        .and_then(|messages| messages.iter().find(|m| m.email_message_id == id))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no such message"))?;
    Ok(Json(json!(body_json(message, query.body_type.as_deref()))))
}

// --- discovery ---

#[derive(Deserialize)]
struct DiscoveryQuery {
    source_type: String,
    email: String,
}

async fn discovery(Query(query): Query<DiscoveryQuery>) -> ApiResult {
    if query.source_type != "IMAP" {
        return Err(api_error(StatusCode::BAD_REQUEST, "source_type must be IMAP"));
    }
    let domain = query.email.rsplit_once('@').map(|(_, d)| d).unwrap_or("");
    let found = domain.eq_ignore_ascii_case("gmail.com");
    let mut response = json!({
        "email": query.email,
        "found": found,
        "resource_url": "https://api.context.io/2.0/discovery",
        "documentation": [],
    });
    if found {
        response["type"] = json!("gmail");
        response["imap"] = json!({
            "server": "imap.gmail.com",
            "username": query.email,
            "use_ssl": true,
            "oauth": true,
            "port": 993,
        });
    }
    Ok(Json(response))
}
