//! Counter Adjuster
//!
//! Aggregate counters live on records unrelated to the mutation that moves
//! them: the store has no cross-record transactions, so each adjustment is
//! one independent additive update issued after the triggering mutation has
//! already committed. A failed adjustment is logged and swallowed — the
//! committed mutation is never rolled back, and the counter drifts until an
//! operator reconciles it.

use std::sync::Arc;

use crate::db;
use crate::store::KeyStore;

/// The counters the lifecycle moves.
#[derive(Debug, Clone, Copy)]
pub enum Counter {
    /// `accounts.qrs_created` — +N on bulk creation
    AccountQrsCreated,
    /// `accounts.qrs_tagged` — +1 on tag, -1 on untag
    AccountQrsTagged,
    /// `categories.assigned_qrs` — +1 on tag, -1 on untag
    CategoryAssignedQrs,
}

impl Counter {
    fn collection(self) -> &'static str {
        match self {
            Counter::AccountQrsCreated | Counter::AccountQrsTagged => db::ACCOUNTS,
            Counter::CategoryAssignedQrs => db::CATEGORIES,
        }
    }

    fn attribute(self) -> &'static str {
        match self {
            Counter::AccountQrsCreated => "qrs_created",
            Counter::AccountQrsTagged => "qrs_tagged",
            Counter::CategoryAssignedQrs => "assigned_qrs",
        }
    }
}

#[derive(Clone)]
pub struct CounterAdjuster {
    store: Arc<dyn KeyStore>,
}

impl CounterAdjuster {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Apply one signed delta to one counter. Best-effort: errors are logged,
    /// never propagated.
    pub async fn adjust(&self, counter: Counter, entity_id: &str, delta: i64) {
        if let Err(err) = self
            .store
            .add(counter.collection(), entity_id, counter.attribute(), delta)
            .await
        {
            tracing::error!(
                target: "counters",
                counter = ?counter,
                entity_id,
                delta,
                error = %err,
                "counter adjustment failed"
            );
        }
    }
}
