//! QR Lifecycle Handlers
//!
//! The state machine lives here: create (batch), tag, untag, update while
//! tagged, plus the default-price sentinel operations. Each transition
//! resolves the actor, validates the current state, commits the QR mutation,
//! and only then moves the dependent counters — there is no rollback if a
//! later step fails.

use std::time::Duration;

use serde::Deserialize;

use super::{Ack, ListResponse, encode_next_token, page_options, resolve_actor};
use crate::core::{AppError, AppResult, AppState};
use crate::db::models::qr::{CURRENCY, CURRENCY_SYMBOL, DEFAULT_PRICE_STATUS};
use crate::db::models::{DefaultPrice, QrCode, QrState, TagDetails};
use crate::db::repository::{CategoryRepository, QrRepository};
use crate::services::{CodeGenerator, Counter, CounterAdjuster};
use crate::utils::time::unix_now;
use crate::utils::validation::{fold_email, optional, required};

const LIST_ALL: &str = "ALL";

fn no_default_cost() -> AppError {
    AppError::NotFound("default QR cost is not configured".to_string())
}

#[derive(Debug, Deserialize)]
pub struct CreateQrsRequest {
    pub user_email_id: String,
    pub no_of_qrs: usize,
}

pub async fn create(state: &AppState, req: CreateQrsRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let actor = resolve_actor(state, &email).await?;

    let qrs = QrRepository::new(state.store.clone());
    let price = qrs.default_price().await?.ok_or_else(no_default_cost)?;

    let codes = CodeGenerator::new(state.store.clone())
        .generate_many(req.no_of_qrs)
        .await?;
    let batch: Vec<QrCode> = codes
        .into_iter()
        .map(|code| {
            QrCode::new(
                code,
                email.clone(),
                state.config.base_domain.clone(),
                price.cost,
            )
        })
        .collect();
    qrs.insert_batch(&batch).await?;

    CounterAdjuster::new(state.store.clone())
        .adjust(Counter::AccountQrsCreated, &actor.account_id, req.no_of_qrs as i64)
        .await;

    tracing::info!(count = req.no_of_qrs, actor = %email, "QR batch created");
    Ok(Ack::new(format!("created {} QR codes", req.no_of_qrs)))
}

#[derive(Debug, Deserialize)]
pub struct ListQrsRequest {
    pub qr_status: String,
    pub next_token: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list(state: &AppState, req: ListQrsRequest) -> AppResult<ListResponse<QrCode>> {
    let status = required("qr_status", &req.qr_status)?;
    if status == DEFAULT_PRICE_STATUS {
        // the sentinel is configuration, not a listable QR
        return Err(AppError::NotFound(format!("no {status} QRs to list")));
    }
    let opts = page_options(req.next_token.as_deref(), req.limit)?;

    let qrs = QrRepository::new(state.store.clone());
    let mut page = if status == LIST_ALL {
        qrs.list_all(opts).await?
    } else {
        qrs.list_by_status(&status, opts).await?
    };
    if page.count == 0 {
        return Err(AppError::NotFound(format!("no {status} QRs to list")));
    }

    if status == LIST_ALL {
        page.items.sort_by(|a, b| b.created_on.cmp(&a.created_on));
    } else {
        // purchased listings order by purchase time, everything else by age
        page.items.sort_by(|a, b| match (a.purchased_on(), b.purchased_on()) {
            (Some(a_on), Some(b_on)) => b_on.cmp(&a_on),
            _ => b.created_on.cmp(&a.created_on),
        });
    }

    Ok(ListResponse {
        count: page.count,
        items: page.items,
        next_token: encode_next_token(page.last_key)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct TagQrRequest {
    pub user_email_id: String,
    pub qr_id: String,
    pub category_id: String,
    pub qr_discount: Option<f64>,
    pub qr_artistic_image: Option<String>,
}

pub async fn tag(state: &AppState, req: TagQrRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let qr_id = required("qr_id", &req.qr_id)?;
    let category_id = required("category_id", &req.category_id)?;
    let artistic_image = optional("qr_artistic_image", req.qr_artistic_image.as_deref())?;

    let actor = resolve_actor(state, &email).await?;

    let qrs = QrRepository::new(state.store.clone());
    let mut qr = qrs
        .find_by_id(&qr_id)
        .await?
        .filter(|qr| qr.is_untagged())
        .ok_or_else(|| AppError::NotFound(format!("untagged QR {qr_id} not found")))?;

    let category = CategoryRepository::new(state.store.clone())
        .find_active_by_id(&category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("active category {category_id} not found")))?;

    let price = qrs.default_price().await?.ok_or_else(no_default_cost)?;

    // discount is accepted verbatim; the arithmetic is deliberately unclamped
    let discount = req.qr_discount.unwrap_or(0.0);
    qr.state = QrState::Tagged(TagDetails {
        category_id: category.category_id.clone(),
        category_name: category.name.clone(),
        discount,
        discounted_cost: price.cost - discount * price.cost / 100.0,
        currency: CURRENCY.to_string(),
        currency_symbol: CURRENCY_SYMBOL.to_string(),
        impressions: 0,
        tagged_by: email.clone(),
        tagged_by_id: actor.account_id.clone(),
        tagged_on: unix_now(),
        public_url: format!("{}/{}", state.config.base_domain, qr.code),
        artistic_image,
        updated_by: None,
    });
    qrs.save(&qr).await?;

    let counters = CounterAdjuster::new(state.store.clone());
    counters
        .adjust(Counter::CategoryAssignedQrs, &category.category_id, 1)
        .await;
    counters
        .adjust(Counter::AccountQrsTagged, &actor.account_id, 1)
        .await;

    tracing::info!(qr_id = %qr.qr_id, category = %category.name, actor = %email, "QR tagged");
    Ok(Ack::new("QR tagged"))
}

#[derive(Debug, Deserialize)]
pub struct UntagQrRequest {
    pub user_email_id: String,
    pub qr_id: String,
}

pub async fn untag(state: &AppState, req: UntagQrRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let qr_id = required("qr_id", &req.qr_id)?;

    let actor = resolve_actor(state, &email).await?;

    let qrs = QrRepository::new(state.store.clone());
    let mut qr = qrs
        .find_by_id(&qr_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tagged QR {qr_id} not found")))?;
    let QrState::Tagged(tag) = &qr.state else {
        return Err(AppError::NotFound(format!("tagged QR {qr_id} not found")));
    };

    // the category reference dies with the strip — capture it first
    let category_id = tag.category_id.clone();

    qr.state = QrState::Untagged;
    qrs.save(&qr).await?;

    let counters = CounterAdjuster::new(state.store.clone());
    counters
        .adjust(Counter::CategoryAssignedQrs, &category_id, -1)
        .await;
    counters
        .adjust(Counter::AccountQrsTagged, &actor.account_id, -1)
        .await;

    tracing::info!(qr_id = %qr.qr_id, actor = %email, "QR untagged");
    Ok(Ack::new("QR untagged"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaggedQrRequest {
    pub user_email_id: String,
    pub qr_id: String,
    pub category_id: Option<String>,
    pub qr_discount: Option<f64>,
}

pub async fn update_tagged(state: &AppState, req: UpdateTaggedQrRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    let qr_id = required("qr_id", &req.qr_id)?;
    let requested_category = optional("category_id", req.category_id.as_deref())?;

    let actor = resolve_actor(state, &email).await?;

    let qrs = QrRepository::new(state.store.clone());
    let mut qr = qrs
        .find_by_id(&qr_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("tagged QR {qr_id} not found")))?;
    let QrState::Tagged(mut tag) = qr.state.clone() else {
        return Err(AppError::NotFound(format!("tagged QR {qr_id} not found")));
    };

    let target_category_id = requested_category
        .clone()
        .unwrap_or_else(|| tag.category_id.clone());
    let category = CategoryRepository::new(state.store.clone())
        .find_active_by_id(&target_category_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("active category {target_category_id} not found"))
        })?;

    // recomputed from the QR's own base cost, not the current default
    let discount = req.qr_discount.unwrap_or(tag.discount);
    tag.discount = discount;
    tag.discounted_cost = qr.cost - discount * qr.cost / 100.0;
    if requested_category.is_some() {
        tag.category_name = category.name.clone();
    }
    tag.category_id = category.category_id.clone();
    tag.updated_by = Some(actor.email.clone());

    // recategorization moves no assigned_qrs counters; repeated moves drift
    // the totals until reconciled
    qr.state = QrState::Tagged(tag);
    qrs.save(&qr).await?;

    tracing::info!(qr_id = %qr.qr_id, actor = %email, "tagged QR updated");
    Ok(Ack::new("QR updated"))
}

pub async fn default_cost(state: &AppState) -> AppResult<ListResponse<DefaultPrice>> {
    let price = QrRepository::new(state.store.clone())
        .default_price()
        .await?
        .ok_or_else(no_default_cost)?;
    Ok(ListResponse {
        items: vec![price],
        count: 1,
        next_token: None,
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateQrCostRequest {
    pub user_email_id: String,
    pub qr_cost: f64,
}

pub async fn update_default_cost(state: &AppState, req: UpdateQrCostRequest) -> AppResult<Ack> {
    let email = fold_email(&required("user_email_id", &req.user_email_id)?);
    resolve_actor(state, &email).await?;

    let qrs = QrRepository::new(state.store.clone());
    let mut price = qrs.default_price().await?.ok_or_else(no_default_cost)?;
    price.cost = req.qr_cost;
    qrs.put_default_price(&price).await?;

    // settle window for cross-region index staleness, not a resource wait
    tokio::time::sleep(Duration::from_millis(state.config.cost_settle_ms)).await;

    tracing::info!(cost = req.qr_cost, actor = %email, "default QR cost updated");
    Ok(Ack::new("QR cost updated"))
}
