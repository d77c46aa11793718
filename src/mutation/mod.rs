//! Order mutations
//!
//! Every change is computed against a base order and yields a new order; the
//! base is never modified, so a rejected change leaves nothing half-applied.

mod lot;
mod single;

pub use lot::{add_lot, move_lot, remove_lot, update_lot};
pub use single::{add, move_item, remove, swap, update};

use crate::error::OrderError;
use std::collections::HashSet;

/// A single order-changing operation and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderChange {
    /// Insert `name` at `index`, clamped to the end of the order.
    Add { name: String, index: usize },
    Remove { index: usize },
    /// Replace the name at `index`; used after a rename.
    Update { name: String, index: usize },
    Swap { a: usize, b: usize },
    /// Move one entry; `to` is relative to the order with the entry taken out.
    Move { from: usize, to: usize },
    /// Insert `names[i]` so that it ends up at `indices[i]`.
    AddLot { names: Vec<String>, indices: Vec<usize> },
    /// Remove the entries at `indices`, all relative to the original order.
    RemoveLot { indices: Vec<usize> },
    UpdateLot { names: Vec<String>, indices: Vec<usize> },
    /// Move the entries at `indices` as one block, in their original relative
    /// order, to `destination` in the order with the block taken out.
    MoveLot { indices: Vec<usize>, destination: usize },
}

impl OrderChange {
    pub fn kind(&self) -> &'static str {
        match self {
            OrderChange::Add { .. } => "add",
            OrderChange::Remove { .. } => "remove",
            OrderChange::Update { .. } => "update",
            OrderChange::Swap { .. } => "swap",
            OrderChange::Move { .. } => "move",
            OrderChange::AddLot { .. } => "add_lot",
            OrderChange::RemoveLot { .. } => "remove_lot",
            OrderChange::UpdateLot { .. } => "update_lot",
            OrderChange::MoveLot { .. } => "move_lot",
        }
    }

    pub fn is_lot(&self) -> bool {
        matches!(
            self,
            OrderChange::AddLot { .. }
                | OrderChange::RemoveLot { .. }
                | OrderChange::UpdateLot { .. }
                | OrderChange::MoveLot { .. }
        )
    }

    /// Whether applying this change to a default-ordered directory leaves it
    /// in default order, so no record needs to be materialized.
    pub fn preserves_default_order(&self) -> bool {
        matches!(
            self,
            OrderChange::Remove { .. }
                | OrderChange::RemoveLot { .. }
                | OrderChange::Update { .. }
                | OrderChange::UpdateLot { .. }
        )
    }
}

/// Apply `change` to `order`, returning the new order.
pub fn apply(order: &[String], change: &OrderChange) -> Result<Vec<String>, OrderError> {
    match change {
        OrderChange::Add { name, index } => Ok(add(order, name, *index)),
        OrderChange::Remove { index } => remove(order, *index),
        OrderChange::Update { name, index } => update(order, name, *index),
        OrderChange::Swap { a, b } => swap(order, *a, *b),
        OrderChange::Move { from, to } => move_item(order, *from, *to),
        OrderChange::AddLot { names, indices } => add_lot(order, names, indices),
        OrderChange::RemoveLot { indices } => remove_lot(order, indices),
        OrderChange::UpdateLot { names, indices } => update_lot(order, names, indices),
        OrderChange::MoveLot {
            indices,
            destination,
        } => move_lot(order, indices, *destination),
    }
}

/// Apply several changes in sequence; the first failure aborts the lot.
pub fn apply_all(order: &[String], changes: &[OrderChange]) -> Result<Vec<String>, OrderError> {
    let mut current = order.to_vec();
    for change in changes {
        current = apply(&current, change)?;
    }
    Ok(current)
}

/// Drop entries that duplicate the name at a pinned position.
fn dedupe_around(order: Vec<String>, pinned: &HashSet<usize>) -> Vec<String> {
    let pinned_names: HashSet<String> = pinned.iter().map(|&i| order[i].clone()).collect();
    order
        .into_iter()
        .enumerate()
        .filter(|(i, name)| pinned.contains(i) || !pinned_names.contains(name))
        .map(|(_, name)| name)
        .collect()
}
