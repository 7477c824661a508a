//! Consumer-side Listings (read-only)

use serde::Deserialize;

use super::{ListResponse, encode_next_token, resolve_actor};
use crate::core::{AppError, AppResult, AppState};
use crate::db::models::{ConsumerAccount, QrCode};
use crate::db::repository::{ConsumerRepository, QrRepository};
use crate::store::QueryOptions;
use crate::utils::validation::{fold_email, required};

#[derive(Debug, Deserialize)]
pub struct ListConsumerUsersRequest {
    pub user_email_id: String,
}

pub async fn list_users(
    state: &AppState,
    req: ListConsumerUsersRequest,
) -> AppResult<ListResponse<ConsumerAccount>> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    resolve_actor(state, &email).await?;

    let mut page = ConsumerRepository::new(state.store.clone())
        .list_all(QueryOptions::default())
        .await?;
    if page.count == 0 {
        return Err(AppError::NotFound("no consumer accounts found".to_string()));
    }
    page.items.sort_by(|a, b| b.qrs_purchased.cmp(&a.qrs_purchased));

    Ok(ListResponse {
        count: page.count,
        items: page.items,
        next_token: encode_next_token(page.last_key)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct ListConsumerQrsRequest {
    pub user_email_id: String,
    pub consumer_user_email_id: String,
}

pub async fn list_qrs(
    state: &AppState,
    req: ListConsumerQrsRequest,
) -> AppResult<ListResponse<QrCode>> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let consumer_email = required("consumer_user_email_id", &req.consumer_user_email_id)?;

    resolve_actor(state, &email).await?;

    let consumer = ConsumerRepository::new(state.store.clone())
        .find_active_by_email(&consumer_email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "active consumer with email {consumer_email} not found"
            ))
        })?;

    let page = QrRepository::new(state.store.clone())
        .list_purchased_by(&consumer.email, QueryOptions::default())
        .await?;
    if page.count == 0 {
        return Err(AppError::NotFound("no purchased QRs to list".to_string()));
    }

    Ok(ListResponse {
        count: page.count,
        items: page.items,
        next_token: encode_next_token(page.last_key)?,
    })
}
