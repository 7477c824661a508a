//! Command API
//!
//! Every request is a JSON object carrying a `command` field that selects an
//! operation; the rest of the object is that operation's parameters. The
//! HTTP layer is a single route — transport framing stops here, the handlers
//! below are the thin per-endpoint assembly.

pub mod categories;
pub mod consumers;
pub mod qrs;
pub mod users;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::core::{AppError, AppResult, AppState};
use crate::db::models::Account;
use crate::db::repository::AccountRepository;
use crate::store::{ContinuationKey, QueryOptions, cursor};

pub const STATUS_SUCCESS: &str = "Success";

/// Sentinel value returned for an unrecognized command (not an error).
pub const COMMAND_NOT_FOUND: &str = "Command not found";

/// Mutation acknowledgement.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub status: &'static str,
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            message: message.into(),
        }
    }
}

/// Listing response. `next_token` is omitted once the listing is exhausted —
/// never emitted empty.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    command: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/command", post(command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn command(
    State(state): State<AppState>,
    Json(request): Json<Value>,
) -> AppResult<Json<Value>> {
    dispatch(&state, request).await.map(Json)
}

/// Route a command envelope to its handler.
pub async fn dispatch(state: &AppState, request: Value) -> AppResult<Value> {
    let envelope: Envelope = parse(&request)?;
    match envelope.command.as_str() {
        "createUser" => respond(users::create(state, parse(&request)?).await?),
        "getCurrentUserDetails" => respond(users::current(state, parse(&request)?).await?),
        "listUsers" => respond(users::list(state, parse(&request)?).await?),
        "deleteUser" => respond(users::delete(state, parse(&request)?).await?),
        "createQrs" => respond(qrs::create(state, parse(&request)?).await?),
        "listQrs" => respond(qrs::list(state, parse(&request)?).await?),
        "tagQr" => respond(qrs::tag(state, parse(&request)?).await?),
        "untagQr" => respond(qrs::untag(state, parse(&request)?).await?),
        "updateTaggedQrDetails" => respond(qrs::update_tagged(state, parse(&request)?).await?),
        "getDefaultQrCost" => respond(qrs::default_cost(state).await?),
        "updateQrCost" => respond(qrs::update_default_cost(state, parse(&request)?).await?),
        "createCategory" => respond(categories::create(state, parse(&request)?).await?),
        "listCategories" => respond(categories::list(state, parse(&request)?).await?),
        "activeDeactiveCategory" => respond(categories::set_status(state, parse(&request)?).await?),
        "deleteCategory" => respond(categories::delete(state, parse(&request)?).await?),
        "listConsumerUsers" => respond(consumers::list_users(state, parse(&request)?).await?),
        "listConsumerQrs" => respond(consumers::list_qrs(state, parse(&request)?).await?),
        _ => Ok(Value::String(COMMAND_NOT_FOUND.to_string())),
    }
}

fn parse<T: serde::de::DeserializeOwned>(request: &Value) -> AppResult<T> {
    serde_json::from_value(request.clone())
        .map_err(|err| AppError::Validation(err.to_string()))
}

fn respond<T: Serialize>(response: T) -> AppResult<Value> {
    serde_json::to_value(response).map_err(|err| AppError::Internal(err.into()))
}

/// Resolve the acting account: must exist and be `ACTIVE`. Every mutating
/// command starts here.
pub(crate) async fn resolve_actor(state: &AppState, email: &str) -> AppResult<Account> {
    AccountRepository::new(state.store.clone())
        .find_active_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("active account with email {email} not found")))
}

/// Build paging options from a client-supplied token and page size.
pub(crate) fn page_options(token: Option<&str>, limit: Option<usize>) -> AppResult<QueryOptions> {
    Ok(QueryOptions {
        start_key: cursor::decode_optional(token)?,
        limit,
    })
}

/// Encode a page's continuation key for the response, if any.
pub(crate) fn encode_next_token(last_key: Option<ContinuationKey>) -> AppResult<Option<String>> {
    match last_key {
        Some(key) => Ok(Some(cursor::encode(&key)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::NoopIdentityProvider;
    use crate::{db, Config};
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            Config::default(),
            Arc::new(db::open_memory_store()),
            Arc::new(NoopIdentityProvider),
        )
    }

    #[tokio::test]
    async fn unknown_command_returns_the_sentinel() {
        let response = dispatch(&state(), json!({ "command": "mintNft" }))
            .await
            .unwrap();
        assert_eq!(response, json!(COMMAND_NOT_FOUND));
    }

    #[tokio::test]
    async fn missing_command_is_a_validation_error() {
        let err = dispatch(&state(), json!({})).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_required_field_is_a_validation_error() {
        let err = dispatch(
            &state(),
            json!({ "command": "createUser", "user_email_id": "   " }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
