//! Order reconciliation
//!
//! A record can drift from the directory it describes when children are
//! added or removed outside the engine. Reconciliation drops entries that are
//! no longer live, keeps the surviving entries in recorded order and appends
//! new children in default order. Drift is repaired silently.

use crate::cache::MetadataCache;
use crate::compare::Comparator;
use crate::error::OrderError;
use crate::types::{ChildEntry, DirectoryIdentity, OrderRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of reconciling a record against live children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub order: Vec<String>,
    /// Whether `order` differs from the record it was computed from.
    pub drifted: bool,
}

/// Reconcile `record` with `live`. Pure.
pub fn reconcile(record: &OrderRecord, live: &[ChildEntry], comparator: &Comparator) -> Reconciliation {
    let live_names: HashSet<&str> = live.iter().map(|c| c.name.as_str()).collect();
    let mut order: Vec<String> = record
        .names()
        .iter()
        .filter(|name| live_names.contains(name.as_str()))
        .cloned()
        .collect();

    let known: HashSet<&str> = record.names().iter().map(String::as_str).collect();
    let mut fresh: Vec<ChildEntry> = live
        .iter()
        .filter(|c| !known.contains(c.name.as_str()))
        .cloned()
        .collect();
    comparator.sort(&mut fresh);

    let mut seen: HashSet<String> = order.iter().cloned().collect();
    for child in fresh {
        if seen.insert(child.name.clone()) {
            order.push(child.name);
        }
    }

    let drifted = order.as_slice() != record.names();
    Reconciliation { order, drifted }
}

/// Produces effective orders and writes back drift corrections.
pub struct OrderReconciler {
    cache: Arc<MetadataCache>,
    comparator: Comparator,
}

impl OrderReconciler {
    pub fn new(cache: Arc<MetadataCache>, comparator: Comparator) -> Self {
        Self { cache, comparator }
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// Effective order of `identity` given its live children.
    ///
    /// With no record the live children are sorted by the comparator and
    /// nothing is written. With a record, drift is persisted; a reconciled
    /// order that ends up empty deletes the record. A failed write-back is
    /// logged and the reconciled order is still returned.
    pub async fn sync_with_disk(
        &self,
        identity: &DirectoryIdentity,
        live: &[ChildEntry],
    ) -> Result<Vec<String>, OrderError> {
        let record = match self.cache.get(identity).await? {
            Some(record) => record,
            None => return Ok(self.comparator.sorted_names(live)),
        };

        let Reconciliation { order, drifted } = reconcile(&record, live, &self.comparator);
        if !drifted {
            return Ok(order);
        }

        debug!(
            directory = %identity,
            recorded = record.len(),
            live = live.len(),
            "Order record drifted from directory contents"
        );
        let write_back = if order.is_empty() {
            self.cache.clear(identity).await
        } else {
            self.cache.set(identity, OrderRecord::new(order.clone())).await
        };
        if let Err(e) = write_back {
            warn!(directory = %identity, "Failed to persist reconciled order: {}", e);
        }
        Ok(order)
    }
}
