//! Category Handlers

use serde::Deserialize;

use super::{Ack, ListResponse, encode_next_token, page_options, resolve_actor};
use crate::core::{AppError, AppResult, AppState};
use crate::db::models::{Category, CategoryStatus};
use crate::db::repository::CategoryRepository;
use crate::utils::validation::{fold_email, optional, required};

const LIST_ALL: &str = "ALL";

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub user_email_id: String,
    pub category_name: String,
    pub category_image: Option<String>,
}

pub async fn create(state: &AppState, req: CreateCategoryRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let name = required("category_name", &req.category_name)?;
    let image = optional("category_image", req.category_image.as_deref())?;

    resolve_actor(state, &email).await?;

    let category = Category::new(name, email.clone(), image);
    CategoryRepository::new(state.store.clone())
        .create(&category)
        .await?;

    tracing::info!(category = %category.name, actor = %email, "category created");
    Ok(Ack::new("category created"))
}

#[derive(Debug, Deserialize)]
pub struct ListCategoriesRequest {
    pub category_status: String,
    pub next_token: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list(
    state: &AppState,
    req: ListCategoriesRequest,
) -> AppResult<ListResponse<Category>> {
    let status = required("category_status", &req.category_status)?;
    let opts = page_options(req.next_token.as_deref(), req.limit)?;

    let repo = CategoryRepository::new(state.store.clone());
    let mut page = if status == LIST_ALL {
        repo.list_all(opts).await?
    } else {
        repo.list_by_status(&status, opts).await?
    };
    if page.count == 0 {
        return Err(AppError::NotFound("no categories to list".to_string()));
    }
    page.items.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(ListResponse {
        count: page.count,
        items: page.items,
        next_token: encode_next_token(page.last_key)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct SetCategoryStatusRequest {
    pub user_email_id: String,
    pub category_id: String,
    pub action: String,
}

pub async fn set_status(state: &AppState, req: SetCategoryStatusRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let category_id = required("category_id", &req.category_id)?;
    let action = required("action", &req.action)?;

    resolve_actor(state, &email).await?;

    let repo = CategoryRepository::new(state.store.clone());
    let mut category = repo
        .find_by_id(&category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {category_id} not found")))?;

    match action.as_str() {
        "DEACTIVATE" => {
            // racy by accepted design: the count is read, not locked
            if category.assigned_qrs > 0 {
                return Err(AppError::Conflict(format!(
                    "cannot deactivate category {}: {} QRs still assigned",
                    category.name, category.assigned_qrs
                )));
            }
            if category.status != CategoryStatus::Active {
                return Err(AppError::Conflict(format!(
                    "category {} is not active",
                    category.name
                )));
            }
            category.status = CategoryStatus::Inactive;
            repo.save(&category).await?;
            tracing::info!(category = %category.name, actor = %email, "category deactivated");
            Ok(Ack::new("category deactivated"))
        }
        "ACTIVATE" => {
            if category.status != CategoryStatus::Inactive {
                return Err(AppError::Conflict(format!(
                    "category {} is already active",
                    category.name
                )));
            }
            category.status = CategoryStatus::Active;
            repo.save(&category).await?;
            tracing::info!(category = %category.name, actor = %email, "category activated");
            Ok(Ack::new("category activated"))
        }
        other => Err(AppError::Validation(format!("unknown action {other}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteCategoryRequest {
    pub user_email_id: String,
    pub category_id: String,
}

pub async fn delete(state: &AppState, req: DeleteCategoryRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let category_id = required("category_id", &req.category_id)?;

    resolve_actor(state, &email).await?;

    let repo = CategoryRepository::new(state.store.clone());
    let category = repo
        .find_by_id(&category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {category_id} not found")))?;
    if category.assigned_qrs > 0 {
        return Err(AppError::Conflict(format!(
            "cannot delete category {}: {} QRs still assigned",
            category.name, category.assigned_qrs
        )));
    }
    repo.delete(&category.category_id).await?;

    tracing::info!(category = %category.name, actor = %email, "category deleted");
    Ok(Ack::new("category deleted"))
}
