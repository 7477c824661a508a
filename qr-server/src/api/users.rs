//! Operator Account Handlers

use serde::{Deserialize, Serialize};

use super::{Ack, ListResponse, encode_next_token, page_options, resolve_actor};
use crate::core::{AppError, AppResult, AppState, AssetConfig};
use crate::db::models::Account;
use crate::db::repository::AccountRepository;
use crate::utils::validation::{fold_email, required};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub user_email_id: String,
}

pub async fn create(state: &AppState, req: CreateUserRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let accounts = AccountRepository::new(state.store.clone());

    let account = Account::new(email.clone());
    accounts.create(&account).await?;

    // best-effort side channel; the account record stands either way
    if let Err(err) = state.identity.create_identity(&email).await {
        tracing::warn!(target: "identity", email = %email, error = %err, "identity creation failed");
    }

    tracing::info!(email = %email, "account created");
    Ok(Ack::new("account created"))
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserRequest {
    pub user_email_id: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub items: Vec<Account>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetConfig>,
}

pub async fn current(state: &AppState, req: CurrentUserRequest) -> AppResult<CurrentUserResponse> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let account = resolve_actor(state, &email).await?;
    Ok(CurrentUserResponse {
        items: vec![account],
        count: 1,
        assets: state.config.assets.clone(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ListUsersRequest {
    pub user_status: String,
    pub next_token: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list(state: &AppState, req: ListUsersRequest) -> AppResult<ListResponse<Account>> {
    let status = required("user_status", &req.user_status)?;
    let opts = page_options(req.next_token.as_deref(), req.limit)?;

    let mut page = AccountRepository::new(state.store.clone())
        .list_by_status(&status, opts)
        .await?;
    if page.count == 0 {
        return Err(AppError::NotFound("no accounts to list".to_string()));
    }
    page.items.sort_by(|a, b| a.email.cmp(&b.email));

    Ok(ListResponse {
        count: page.count,
        items: page.items,
        next_token: encode_next_token(page.last_key)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub user_email_id: String,
}

pub async fn delete(state: &AppState, req: DeleteUserRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    if email == fold_email(&state.config.root_account_email) {
        return Err(AppError::Conflict("the root account cannot be deleted".to_string()));
    }

    let accounts = AccountRepository::new(state.store.clone());
    let account = accounts
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account with email {email} not found")))?;
    accounts.delete(&account.account_id).await?;

    if let Err(err) = state.identity.delete_identity(&email).await {
        tracing::warn!(target: "identity", email = %email, error = %err, "identity deletion failed");
    }

    tracing::info!(email = %email, "account deleted");
    Ok(Ack::new("account deleted"))
}
