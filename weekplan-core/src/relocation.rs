//! Drag-style relocation of a meal block within a week override.
//!
//! The source must be a block's cook day. Outcomes, in priority order:
//! dropping onto the block itself is a no-op; dropping onto another block
//! swaps the two (durations must match); dropping onto an empty day moves
//! the block there. Any third-party overlap comes back as a conflict report.

use crate::models::{MealBlock, LAST_DAY_INDEX};
use crate::outcome::{EditOutcome, Rejection};
use crate::placement::{expand, find_conflicts};

pub(crate) fn relocate(blocks: &[MealBlock], source_day: u8, target_day: u8) -> EditOutcome {
    for day in [source_day, target_day] {
        if day > LAST_DAY_INDEX {
            return EditOutcome::rejected(Rejection::DayOutOfRange { day });
        }
    }

    if source_day == target_day {
        return EditOutcome::Unchanged;
    }

    let days = expand(blocks);
    let Some(source_entry) = days.get(&source_day) else {
        return EditOutcome::rejected(Rejection::EmptySourceDay { day: source_day });
    };
    if !source_entry.is_cook_day() {
        return EditOutcome::rejected(Rejection::LeftoverSourceDay { day: source_day });
    }
    let Some(source) = find_block(blocks, &source_entry.block_id) else {
        return EditOutcome::rejected(Rejection::BlockNotFound {
            id: source_entry.block_id.clone(),
        });
    };

    let outcome = match days.get(&target_day) {
        Some(target) if target.block_id == source.id => EditOutcome::Unchanged,
        Some(target) => match find_block(blocks, &target.block_id) {
            Some(other) => {
                // The source lands on the exact day it was dropped on; for a
                // cook day that is the other block's start.
                let landing_day = if target.is_cook_day() {
                    other.start_day_index
                } else {
                    target_day
                };
                swap(blocks, source, other, landing_day)
            }
            None => EditOutcome::rejected(Rejection::BlockNotFound {
                id: target.block_id.clone(),
            }),
        },
        None => move_to_empty_day(blocks, source, target_day),
    };

    tracing::debug!(
        block = %source.id,
        source_day,
        target_day,
        outcome = outcome_label(&outcome),
        "relocation computed"
    );
    outcome
}

fn find_block<'a>(blocks: &'a [MealBlock], id: &str) -> Option<&'a MealBlock> {
    blocks.iter().find(|b| b.id == id)
}

/// Exchange two equal-length blocks, placing the source at `landing_day`.
fn swap(
    blocks: &[MealBlock],
    source: &MealBlock,
    other: &MealBlock,
    landing_day: u8,
) -> EditOutcome {
    if source.duration_days != other.duration_days {
        return EditOutcome::rejected(Rejection::DurationMismatch {
            source_days: source.duration_days,
            target_days: other.duration_days,
        });
    }

    let moved_other = other.moved_to(source.start_day_index);
    let mut moved_source = source.moved_to(landing_day);

    // Single correction: push the source to start right after the other block.
    if moved_source.overlaps(&moved_other) {
        let pushed = moved_other
            .start_day_index
            .saturating_add(moved_other.duration_days);
        tracing::debug!(
            block = %source.id,
            from = landing_day,
            to = pushed,
            "self-overlap corrected"
        );
        moved_source = source.moved_to(pushed);
    }
    if !moved_source.fits_in_week() {
        return EditOutcome::rejected(Rejection::PastWeekBoundary {
            start: moved_source.start_day_index,
            duration: moved_source.duration_days,
        });
    }

    let conflicts: Vec<MealBlock> = blocks
        .iter()
        .filter(|b| b.id != source.id && b.id != other.id && b.overlaps(&moved_source))
        .cloned()
        .collect();

    let proposed = rebuild(blocks, &conflicts, |b| {
        if b.id == source.id {
            moved_source.clone()
        } else if b.id == other.id {
            moved_other.clone()
        } else {
            b.clone()
        }
    });
    EditOutcome::from_conflicts(conflicts, proposed)
}

fn move_to_empty_day(blocks: &[MealBlock], source: &MealBlock, target_day: u8) -> EditOutcome {
    let moved = source.moved_to(target_day);
    if !moved.fits_in_week() {
        return EditOutcome::rejected(Rejection::PastWeekBoundary {
            start: target_day,
            duration: moved.duration_days,
        });
    }

    let others: Vec<MealBlock> = blocks.iter().filter(|b| b.id != source.id).cloned().collect();
    let conflicts: Vec<MealBlock> = find_conflicts(&others, target_day, moved.duration_days)
        .into_iter()
        .cloned()
        .collect();

    let proposed = rebuild(blocks, &conflicts, |b| {
        if b.id == source.id {
            moved.clone()
        } else {
            b.clone()
        }
    });
    EditOutcome::from_conflicts(conflicts, proposed)
}

/// New block set in original order with conflicts dropped and the rest mapped.
fn rebuild<F>(blocks: &[MealBlock], conflicts: &[MealBlock], map: F) -> Vec<MealBlock>
where
    F: Fn(&MealBlock) -> MealBlock,
{
    blocks
        .iter()
        .filter(|b| !conflicts.iter().any(|c| c.id == b.id))
        .map(map)
        .collect()
}

fn outcome_label(outcome: &EditOutcome) -> &'static str {
    match outcome {
        EditOutcome::Unchanged => "unchanged",
        EditOutcome::Committed { .. } => "committed",
        EditOutcome::NeedsConfirmation(_) => "needs_confirmation",
        EditOutcome::Rejected { .. } => "rejected",
    }
}
