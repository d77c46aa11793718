//! Lot (batch) operations.
//!
//! Each lot is validated in full before anything is produced. Malformed lots
//! fail with [`OrderError::InvalidBatch`].

use super::dedupe_around;
use crate::error::OrderError;
use std::collections::HashSet;

fn check_indices(op: &str, indices: &[usize], len: usize) -> Result<(), OrderError> {
    if let Some(bad) = indices.iter().find(|&&i| i >= len) {
        return Err(OrderError::InvalidBatch(format!(
            "{} index {} out of range for order of length {}",
            op, bad, len
        )));
    }
    Ok(())
}

fn check_lengths(op: &str, names: &[String], indices: &[usize]) -> Result<(), OrderError> {
    if names.len() != indices.len() {
        return Err(OrderError::InvalidBatch(format!(
            "{} has {} names but {} indices",
            op,
            names.len(),
            indices.len()
        )));
    }
    Ok(())
}

fn check_unique_names(op: &str, names: &[String]) -> Result<(), OrderError> {
    let mut seen = HashSet::with_capacity(names.len());
    if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(OrderError::InvalidBatch(format!("{} repeats name {:?}", op, dup)));
    }
    Ok(())
}

/// Remove the entries at `indices` (positions in the original order).
///
/// Removal runs from the highest index down so earlier removals never shift
/// later ones. Repeated indices count once.
pub fn remove_lot(order: &[String], indices: &[usize]) -> Result<Vec<String>, OrderError> {
    check_indices("RemoveLot", indices, order.len())?;
    let mut descending = indices.to_vec();
    descending.sort_unstable_by(|a, b| b.cmp(a));
    descending.dedup();

    let mut out = order.to_vec();
    for index in descending {
        out.remove(index);
    }
    Ok(out)
}

/// Insert `names[i]` at `indices[i]`.
///
/// Indices are final positions in the returned order, not positions in the
/// base order: no offset is added for names inserted before them. Insertions run in ascending index order into the growing list, so each
/// name ends up at its requested index in the result. Names already present
/// are taken out of the base first.
pub fn add_lot(order: &[String], names: &[String], indices: &[usize]) -> Result<Vec<String>, OrderError> {
    check_lengths("AddLot", names, indices)?;
    check_unique_names("AddLot", names)?;

    let batch: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut out: Vec<String> = order
        .iter()
        .filter(|n| !batch.contains(n.as_str()))
        .cloned()
        .collect();

    let mut insertions: Vec<(usize, &String)> = indices.iter().copied().zip(names).collect();
    insertions.sort_by_key(|(index, _)| *index);
    for (index, name) in insertions {
        if index > out.len() {
            return Err(OrderError::InvalidBatch(format!(
                "AddLot index {} out of range for order of length {}",
                index,
                out.len()
            )));
        }
        out.insert(index, name.clone());
    }
    Ok(out)
}

/// Rename in place at each index. No reordering, no length change beyond
/// dropping stale duplicates of the new names.
pub fn update_lot(order: &[String], names: &[String], indices: &[usize]) -> Result<Vec<String>, OrderError> {
    check_lengths("UpdateLot", names, indices)?;
    check_unique_names("UpdateLot", names)?;
    check_indices("UpdateLot", indices, order.len())?;
    let pinned: HashSet<usize> = indices.iter().copied().collect();
    if pinned.len() != indices.len() {
        return Err(OrderError::InvalidBatch(
            "UpdateLot repeats an index".to_string(),
        ));
    }

    let mut out = order.to_vec();
    for (name, &index) in names.iter().zip(indices) {
        out[index] = name.clone();
    }
    Ok(dedupe_around(out, &pinned))
}

/// Move the entries at `indices` as a contiguous block.
///
/// The block keeps the entries' original relative order whatever order
/// `indices` come in. `destination` indexes the order with the block already
/// taken out and is clamped to its end.
pub fn move_lot(order: &[String], indices: &[usize], destination: usize) -> Result<Vec<String>, OrderError> {
    check_indices("MoveLot", indices, order.len())?;
    let moving: HashSet<usize> = indices.iter().copied().collect();
    if moving.is_empty() {
        return Ok(order.to_vec());
    }

    let (block, mut rest): (Vec<(usize, &String)>, Vec<(usize, &String)>) = order
        .iter()
        .enumerate()
        .partition(|(i, _)| moving.contains(i));
    let destination = destination.min(rest.len());
    let tail = rest.split_off(destination);

    Ok(rest
        .into_iter()
        .chain(block)
        .chain(tail)
        .map(|(_, name)| name.clone())
        .collect())
}
