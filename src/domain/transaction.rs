use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type TransactionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// A single observed transfer. Immutable once observed; `id` is the global
/// de-duplication key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub counterparty: String,
    pub amount: Decimal,
    pub direction: Direction,
    /// Unix seconds, as reported by the backend.
    pub timestamp: i64,
}

/// Append-only set of observed transactions, keyed by id.
///
/// Merging is union-only: a previously observed record is never dropped or
/// replaced, so the cache never shrinks and applying the same page twice is
/// a no-op. The materialized view is kept sorted newest-first.
#[derive(Debug, Clone, Default)]
pub struct TransactionCache {
    ids: HashSet<TransactionId>,
    records: Vec<TransactionRecord>,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Merges a fetched page and returns the ids that were not cached
    /// before, i.e. "new since the last sync".
    pub fn merge(&mut self, page: Vec<TransactionRecord>) -> Vec<TransactionId> {
        let mut fresh = Vec::new();
        for record in page {
            if self.ids.insert(record.id.clone()) {
                fresh.push(record.id.clone());
                self.records.push(record);
            }
        }
        if !fresh.is_empty() {
            // Timestamp descending; id as tie-breaker so the order is total.
            self.records
                .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        }
        fresh
    }

    /// Newest-first view of everything observed so far.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}
