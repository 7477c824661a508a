//! QR lifecycle integration tests: create batches, tag, untag, update, and
//! the counters each transition moves.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use qr_server::api::dispatch;
use qr_server::core::AppError;
use qr_server::db;
use qr_server::db::models::{CategoryStatus, QrCode, QrState};
use qr_server::db::repository::{CategoryRepository, QrRepository};
use qr_server::store::{
    Document, KeyStore, MemoryStore, Page, QueryOptions, ScanFilter, StoreResult,
};
use serde_json::{Value, json};

use common::{fetch_account, fetch_category, seed_account, seed_category, seed_default_cost};

/// Store decorator counting physical batch-put calls.
struct CountingStore {
    inner: MemoryStore,
    batch_calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: db::open_memory_store(),
            batch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeyStore for CountingStore {
    async fn get(&self, collection: &str, pk: &str) -> StoreResult<Option<Document>> {
        self.inner.get(collection, pk).await
    }

    async fn query_index(
        &self,
        collection: &str,
        index: &str,
        key: &[&str],
        opts: QueryOptions,
    ) -> StoreResult<Page> {
        self.inner.query_index(collection, index, key, opts).await
    }

    async fn scan(
        &self,
        collection: &str,
        filter: Option<ScanFilter>,
        opts: QueryOptions,
    ) -> StoreResult<Page> {
        self.inner.scan(collection, filter, opts).await
    }

    async fn put(&self, collection: &str, doc: Document) -> StoreResult<()> {
        self.inner.put(collection, doc).await
    }

    async fn delete(&self, collection: &str, pk: &str) -> StoreResult<()> {
        self.inner.delete(collection, pk).await
    }

    async fn add(
        &self,
        collection: &str,
        pk: &str,
        attribute: &str,
        delta: i64,
    ) -> StoreResult<()> {
        self.inner.add(collection, pk, attribute, delta).await
    }

    async fn batch_put(&self, collection: &str, docs: Vec<Document>) -> StoreResult<()> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.batch_put(collection, docs).await
    }
}

async fn untagged_qrs(state: &qr_server::core::AppState) -> Vec<QrCode> {
    QrRepository::new(state.store.clone())
        .list_by_status("UNTAGGED", QueryOptions::default())
        .await
        .unwrap()
        .items
}

fn tag_request(email: &str, qr_id: &str, category_id: &str, discount: Option<f64>) -> Value {
    let mut request = json!({
        "command": "tagQr",
        "user_email_id": email,
        "qr_id": qr_id,
        "category_id": category_id,
    });
    if let Some(discount) = discount {
        request["qr_discount"] = json!(discount);
    }
    request
}

#[tokio::test]
async fn creating_30_qrs_issues_two_batch_calls_and_counts_them() {
    let counting = Arc::new(CountingStore::new());
    let state = common::state_with_store(counting.clone());
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;

    let response = dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 30 }),
    )
    .await
    .unwrap();
    assert_eq!(response["status"], "Success");

    // 30 records, chunked 25 + 5
    assert_eq!(counting.batch_calls.load(Ordering::SeqCst), 2);
    let qrs = untagged_qrs(&state).await;
    assert_eq!(qrs.len(), 30);
    assert!(qrs.iter().all(|qr| qr.cost == 100.0 && qr.is_untagged()));

    let account = fetch_account(&state, "maker@qr.test").await;
    assert_eq!(account.qrs_created, 30);
}

#[tokio::test]
async fn created_count_accumulates_across_batches() {
    let state = common::state();
    seed_default_cost(&state, 50.0).await;
    seed_account(&state, "maker@qr.test").await;

    for n in [3usize, 7, 5] {
        dispatch(
            &state,
            json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": n }),
        )
        .await
        .unwrap();
    }

    let account = fetch_account(&state, "maker@qr.test").await;
    assert_eq!(account.qrs_created, 15);
    assert_eq!(untagged_qrs(&state).await.len(), 15);
}

#[tokio::test]
async fn generated_codes_are_unique_across_the_collection() {
    let state = common::state();
    seed_default_cost(&state, 10.0).await;
    seed_account(&state, "maker@qr.test").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 40 }),
    )
    .await
    .unwrap();

    let qrs = untagged_qrs(&state).await;
    let mut codes: Vec<&str> = qrs.iter().map(|qr| qr.code.as_str()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 40);
    assert!(qrs.iter().all(|qr| qr.code.len() == 4));
}

#[tokio::test]
async fn create_requires_the_default_price_sentinel() {
    let state = common::state();
    seed_account(&state, "maker@qr.test").await;

    let err = dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn create_requires_an_active_account() {
    let state = common::state();
    seed_default_cost(&state, 10.0).await;

    let err = dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "ghost@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn tagging_computes_the_discounted_cost_and_moves_both_counters() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    let account = seed_account(&state, "maker@qr.test").await;
    let category = seed_category(&state, "Animals").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);

    let response = dispatch(
        &state,
        tag_request("maker@qr.test", &qr.qr_id, &category.category_id, Some(20.0)),
    )
    .await
    .unwrap();
    assert_eq!(response["status"], "Success");

    let tagged = QrRepository::new(state.store.clone())
        .find_by_id(&qr.qr_id)
        .await
        .unwrap()
        .unwrap();
    let tag = tagged.tag_details().expect("QR should be tagged");
    assert_eq!(tag.discounted_cost, 80.0);
    assert_eq!(tag.discount, 20.0);
    assert_eq!(tag.category_name, "Animals");
    assert_eq!(tag.impressions, 0);
    assert_eq!(tag.currency, "USD");
    assert_eq!(tag.tagged_by, "maker@qr.test");
    assert_eq!(tag.tagged_by_id, account.account_id);
    assert_eq!(
        tag.public_url,
        format!("https://qr.example.com/{}", tagged.code)
    );

    assert_eq!(fetch_category(&state, &category.category_id).await.assigned_qrs, 1);
    assert_eq!(fetch_account(&state, "maker@qr.test").await.qrs_tagged, 1);
}

#[tokio::test]
async fn tag_then_untag_restores_exactly_the_baseline_fields() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;
    let category = seed_category(&state, "Animals").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);
    let baseline: Document = state.store.get(db::QRS, &qr.qr_id).await.unwrap().unwrap();

    dispatch(
        &state,
        tag_request("maker@qr.test", &qr.qr_id, &category.category_id, Some(20.0)),
    )
    .await
    .unwrap();
    dispatch(
        &state,
        json!({ "command": "untagQr", "user_email_id": "maker@qr.test", "qr_id": qr.qr_id }),
    )
    .await
    .unwrap();

    let stripped: Document = state.store.get(db::QRS, &qr.qr_id).await.unwrap().unwrap();
    assert_eq!(stripped, baseline);
    assert_eq!(stripped["status"], "UNTAGGED");
    assert_eq!(stripped["code"], qr.code);
    assert_eq!(stripped["qr_id"], qr.qr_id);

    // counters return to their pre-tag values, category captured pre-strip
    assert_eq!(fetch_category(&state, &category.category_id).await.assigned_qrs, 0);
    assert_eq!(fetch_account(&state, "maker@qr.test").await.qrs_tagged, 0);
}

#[tokio::test]
async fn tagging_an_already_tagged_qr_is_not_found() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;
    let category = seed_category(&state, "Animals").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);
    let request = tag_request("maker@qr.test", &qr.qr_id, &category.category_id, None);

    dispatch(&state, request.clone()).await.unwrap();
    let err = dispatch(&state, request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn tagging_into_an_inactive_category_is_not_found() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;
    let mut category = seed_category(&state, "Animals").await;
    category.status = CategoryStatus::Inactive;
    CategoryRepository::new(state.store.clone())
        .save(&category)
        .await
        .unwrap();

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);

    let err = dispatch(
        &state,
        tag_request("maker@qr.test", &qr.qr_id, &category.category_id, None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn untagging_an_untagged_qr_is_not_found() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);

    let err = dispatch(
        &state,
        json!({ "command": "untagQr", "user_email_id": "maker@qr.test", "qr_id": qr.qr_id }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn updating_a_tagged_qr_recomputes_cost_and_moves_no_counters() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;
    let first = seed_category(&state, "Animals").await;
    let second = seed_category(&state, "Plants").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);

    dispatch(
        &state,
        tag_request("maker@qr.test", &qr.qr_id, &first.category_id, Some(20.0)),
    )
    .await
    .unwrap();

    dispatch(
        &state,
        json!({
            "command": "updateTaggedQrDetails",
            "user_email_id": "maker@qr.test",
            "qr_id": qr.qr_id,
            "category_id": second.category_id,
            "qr_discount": 50.0,
        }),
    )
    .await
    .unwrap();

    let updated = QrRepository::new(state.store.clone())
        .find_by_id(&qr.qr_id)
        .await
        .unwrap()
        .unwrap();
    let tag = updated.tag_details().unwrap();
    // recomputed from the QR's own base cost
    assert_eq!(tag.discounted_cost, 50.0);
    assert_eq!(tag.category_id, second.category_id);
    assert_eq!(tag.category_name, "Plants");
    assert_eq!(tag.updated_by.as_deref(), Some("maker@qr.test"));

    // recategorization does not move assigned_qrs — the documented drift
    assert_eq!(fetch_category(&state, &first.category_id).await.assigned_qrs, 1);
    assert_eq!(fetch_category(&state, &second.category_id).await.assigned_qrs, 0);
}

#[tokio::test]
async fn update_keeps_category_and_discount_when_omitted() {
    let state = common::state();
    seed_default_cost(&state, 200.0).await;
    seed_account(&state, "maker@qr.test").await;
    let category = seed_category(&state, "Animals").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    let qr = untagged_qrs(&state).await.remove(0);

    dispatch(
        &state,
        tag_request("maker@qr.test", &qr.qr_id, &category.category_id, Some(10.0)),
    )
    .await
    .unwrap();
    dispatch(
        &state,
        json!({
            "command": "updateTaggedQrDetails",
            "user_email_id": "maker@qr.test",
            "qr_id": qr.qr_id,
        }),
    )
    .await
    .unwrap();

    let updated = QrRepository::new(state.store.clone())
        .find_by_id(&qr.qr_id)
        .await
        .unwrap()
        .unwrap();
    let tag = updated.tag_details().unwrap();
    assert_eq!(tag.category_id, category.category_id);
    assert_eq!(tag.discount, 10.0);
    assert_eq!(tag.discounted_cost, 180.0);
}

#[tokio::test]
async fn default_cost_update_round_trips() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;

    dispatch(
        &state,
        json!({ "command": "updateQrCost", "user_email_id": "maker@qr.test", "qr_cost": 250.0 }),
    )
    .await
    .unwrap();

    let response = dispatch(&state, json!({ "command": "getDefaultQrCost" }))
        .await
        .unwrap();
    assert_eq!(response["items"][0]["cost"], 250.0);

    // new creations pick up the new cost; already-created QRs keep theirs
    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 1 }),
    )
    .await
    .unwrap();
    assert!(untagged_qrs(&state).await.iter().all(|qr| qr.cost == 250.0));
}

#[tokio::test]
async fn listing_all_qrs_excludes_the_sentinel() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;

    dispatch(
        &state,
        json!({ "command": "createQrs", "user_email_id": "maker@qr.test", "no_of_qrs": 3 }),
    )
    .await
    .unwrap();

    let response = dispatch(
        &state,
        json!({ "command": "listQrs", "qr_status": "ALL" }),
    )
    .await
    .unwrap();
    assert_eq!(response["count"], 3);
    let items = response["items"].as_array().unwrap();
    assert!(items.iter().all(|item| item["qr_id"] != "DEFAULT"));
}

#[tokio::test]
async fn purchased_qrs_sort_by_purchase_time_in_status_listings() {
    let state = common::state();
    seed_default_cost(&state, 100.0).await;
    seed_account(&state, "maker@qr.test").await;

    let repo = QrRepository::new(state.store.clone());
    for (code, purchased_on) in [("AAAA", 100), ("BBBB", 300), ("CCCC", 200)] {
        let mut qr = QrCode::new(
            code.to_string(),
            "maker@qr.test".to_string(),
            "https://qr.example.com".to_string(),
            100.0,
        );
        qr.state = purchased_state("buyer@shop.test", purchased_on);
        repo.save(&qr).await.unwrap();
    }

    let response = dispatch(
        &state,
        json!({ "command": "listQrs", "qr_status": "PURCHASED" }),
    )
    .await
    .unwrap();
    let codes: Vec<&str> = response["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["BBBB", "CCCC", "AAAA"]);
}

fn purchased_state(buyer: &str, purchased_on: i64) -> QrState {
    use qr_server::db::models::{PurchaseDetails, TagDetails};
    QrState::Purchased(PurchaseDetails {
        tag: TagDetails {
            category_id: "cat-1".to_string(),
            category_name: "Animals".to_string(),
            discount: 0.0,
            discounted_cost: 100.0,
            currency: "USD".to_string(),
            currency_symbol: "$".to_string(),
            impressions: 5,
            tagged_by: "maker@qr.test".to_string(),
            tagged_by_id: "acc-1".to_string(),
            tagged_on: 50,
            public_url: "https://qr.example.com/AAAA".to_string(),
            artistic_image: None,
            updated_by: None,
        },
        purchased_by: buyer.to_string(),
        purchased_on,
    })
}
