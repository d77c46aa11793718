//! Single-item operations.

use super::dedupe_around;
use crate::error::OrderError;
use std::collections::HashSet;

fn check_index(index: usize, len: usize) -> Result<(), OrderError> {
    if index >= len {
        return Err(OrderError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Insert `name` at `index` (clamped). An existing entry with the same name
/// is taken out first, so `index` is relative to the order without it.
pub fn add(order: &[String], name: &str, index: usize) -> Vec<String> {
    let mut out: Vec<String> = order.iter().filter(|n| n.as_str() != name).cloned().collect();
    let index = index.min(out.len());
    out.insert(index, name.to_string());
    out
}

pub fn remove(order: &[String], index: usize) -> Result<Vec<String>, OrderError> {
    check_index(index, order.len())?;
    let mut out = order.to_vec();
    out.remove(index);
    Ok(out)
}

/// Rename the entry at `index` in place. A stale entry already carrying the
/// new name elsewhere is dropped.
pub fn update(order: &[String], name: &str, index: usize) -> Result<Vec<String>, OrderError> {
    check_index(index, order.len())?;
    let mut out = order.to_vec();
    out[index] = name.to_string();
    Ok(dedupe_around(out, &HashSet::from([index])))
}

pub fn swap(order: &[String], a: usize, b: usize) -> Result<Vec<String>, OrderError> {
    check_index(a, order.len())?;
    check_index(b, order.len())?;
    let mut out = order.to_vec();
    out.swap(a, b);
    Ok(out)
}

/// Move the entry at `from` to `to`, where `to` (clamped) indexes the order
/// with the entry already taken out.
pub fn move_item(order: &[String], from: usize, to: usize) -> Result<Vec<String>, OrderError> {
    check_index(from, order.len())?;
    let mut out = order.to_vec();
    let item = out.remove(from);
    let to = to.min(out.len());
    out.insert(to, item);
    Ok(out)
}
