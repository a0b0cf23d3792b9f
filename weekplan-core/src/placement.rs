//! Block placement: day expansion, conflict detection and direct edits.

use std::collections::{BTreeMap, HashSet};

use crate::models::meal_block::{span_fits_in_week, spans_overlap};
use crate::models::{DayMealEntry, MealBlock, DAYS_PER_WEEK, LAST_DAY_INDEX};
use crate::outcome::{EditOutcome, Rejection};

/// Map each occupied day index to what is eaten that day.
///
/// Days outside the week are skipped. Overlapping input is not rejected here:
/// a later block overwrites an earlier one on the shared day.
pub fn expand(blocks: &[MealBlock]) -> BTreeMap<u8, DayMealEntry> {
    let mut days = BTreeMap::new();
    for block in blocks {
        for offset in 0..block.duration_days {
            let day = u16::from(block.start_day_index) + u16::from(offset);
            if day > u16::from(LAST_DAY_INDEX) {
                continue;
            }
            days.insert(
                day as u8,
                DayMealEntry {
                    block_id: block.id.clone(),
                    recipe_id: block.recipe_id.clone(),
                    is_leftover_day: offset > 0,
                    day_offset: offset,
                },
            );
        }
    }
    days
}

/// Every block whose day range intersects `[start, start + duration - 1]`, in input order.
pub fn find_conflicts(blocks: &[MealBlock], start: u8, duration: u8) -> Vec<&MealBlock> {
    blocks
        .iter()
        .filter(|b| spans_overlap(start, duration, b.start_day_index, b.duration_days))
        .collect()
}

/// Longest duration a new block may have when cooked on `day`.
pub fn max_duration_at(day: u8) -> u8 {
    DAYS_PER_WEEK.saturating_sub(day)
}

/// Longest duration `block` may grow to without reaching the next block's
/// cook day or running past the end of the week.
pub fn max_duration_for(blocks: &[MealBlock], block: &MealBlock) -> u8 {
    let next_start = blocks
        .iter()
        .filter(|b| b.id != block.id && b.start_day_index > block.start_day_index)
        .map(|b| b.start_day_index)
        .min()
        .unwrap_or(DAYS_PER_WEEK);
    let to_week_end = max_duration_at(block.start_day_index);
    let to_next = next_start.saturating_sub(block.start_day_index);
    to_week_end.min(to_next).max(1)
}

/// Check that a span is a legal placement inside the week.
pub(crate) fn check_span(start: u8, duration: u8) -> Result<(), Rejection> {
    if duration == 0 {
        return Err(Rejection::InvalidDuration);
    }
    if start > LAST_DAY_INDEX {
        return Err(Rejection::DayOutOfRange { day: start });
    }
    if !span_fits_in_week(start, duration) {
        return Err(Rejection::PastWeekBoundary { start, duration });
    }
    Ok(())
}

/// Place a new block.
///
/// Without conflicts the block is appended directly. Otherwise the caller
/// gets the conflicting blocks and the set that would result from removing
/// them, and must confirm before committing.
pub fn place_block(blocks: &[MealBlock], new_block: MealBlock) -> EditOutcome {
    if let Err(reason) = check_span(new_block.start_day_index, new_block.duration_days) {
        tracing::debug!(block = %new_block.id, %reason, "placement rejected");
        return EditOutcome::rejected(reason);
    }
    if blocks.iter().any(|b| b.id == new_block.id) {
        return EditOutcome::rejected(Rejection::DuplicateBlockId { id: new_block.id });
    }

    let conflicts: Vec<MealBlock> = find_conflicts(
        blocks,
        new_block.start_day_index,
        new_block.duration_days,
    )
    .into_iter()
    .cloned()
    .collect();

    let mut proposed: Vec<MealBlock> = blocks
        .iter()
        .filter(|b| !conflicts.iter().any(|c| c.id == b.id))
        .cloned()
        .collect();
    proposed.push(new_block);

    tracing::debug!(conflicts = conflicts.len(), "placement computed");
    EditOutcome::from_conflicts(conflicts, proposed)
}

pub fn remove_block(blocks: &[MealBlock], block_id: &str) -> EditOutcome {
    if !blocks.iter().any(|b| b.id == block_id) {
        return EditOutcome::rejected(Rejection::BlockNotFound {
            id: block_id.to_string(),
        });
    }
    EditOutcome::committed(blocks.iter().filter(|b| b.id != block_id).cloned().collect())
}

/// Change a block's duration, clamped to `[1, max_duration_for(block)]`.
pub fn change_duration(blocks: &[MealBlock], block_id: &str, requested: u8) -> EditOutcome {
    let Some(block) = blocks.iter().find(|b| b.id == block_id) else {
        return EditOutcome::rejected(Rejection::BlockNotFound {
            id: block_id.to_string(),
        });
    };

    let max = max_duration_for(blocks, block);
    let duration = requested.clamp(1, max);
    if duration != requested {
        tracing::debug!(block = block_id, requested, duration, "duration clamped");
    }
    if duration == block.duration_days {
        return EditOutcome::Unchanged;
    }

    let updated = blocks
        .iter()
        .map(|b| {
            if b.id == block_id {
                MealBlock {
                    duration_days: duration,
                    ..b.clone()
                }
            } else {
                b.clone()
            }
        })
        .collect();
    EditOutcome::committed(updated)
}

/// Check the stored-set invariant: unique ids, every block inside the week,
/// no two overlapping.
pub fn validate_blocks(blocks: &[MealBlock]) -> Result<(), Rejection> {
    let mut seen = HashSet::new();
    for block in blocks {
        if !seen.insert(block.id.as_str()) {
            return Err(Rejection::DuplicateBlockId {
                id: block.id.clone(),
            });
        }
        check_span(block.start_day_index, block.duration_days)?;
    }
    for (i, a) in blocks.iter().enumerate() {
        if let Some(b) = blocks[i + 1..].iter().find(|b| a.overlaps(b)) {
            return Err(Rejection::Overlapping {
                first: a.id.clone(),
                second: b.id.clone(),
            });
        }
    }
    Ok(())
}
