//! Results of computing a block-set edit.
//!
//! Every edit operation is a pure function returning one of these values.
//! Nothing is persisted until the caller commits the resulting block set.

use serde::Serialize;
use thiserror::Error;

use crate::models::MealBlock;

/// Why an edit was refused. The original block set is always left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("No meal is planned on day {day}")]
    EmptySourceDay { day: u8 },

    #[error("Day {day} is a leftover day; move the meal from its cook day instead")]
    LeftoverSourceDay { day: u8 },

    #[error("Day index {day} is outside the week (0-6)")]
    DayOutOfRange { day: u8 },

    #[error("Duration must be at least 1 day")]
    InvalidDuration,

    #[error("Durations must match to swap meals ({source_days} vs {target_days} days)")]
    DurationMismatch { source_days: u8, target_days: u8 },

    #[error("A {duration}-day meal starting on day {start} would run past the end of the week")]
    PastWeekBoundary { start: u8, duration: u8 },

    #[error("Meal block not found: {id}")]
    BlockNotFound { id: String },

    #[error("Meal block id {id} is used more than once")]
    DuplicateBlockId { id: String },

    #[error("Meal blocks {first} and {second} overlap")]
    Overlapping { first: String, second: String },
}

/// Conflicting blocks that must be removed before a proposed set can be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    /// Existing blocks the edit would overwrite, in block-set order
    pub conflicts: Vec<MealBlock>,
    /// The complete block set to commit if the user confirms (conflicts removed)
    pub proposed_blocks: Vec<MealBlock>,
}

impl ConflictReport {
    /// The user accepted overwriting the conflicts.
    pub fn confirm(self) -> Vec<MealBlock> {
        self.proposed_blocks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    /// Nothing to do (e.g. a block dropped onto itself).
    Unchanged,
    /// Ready to persist as-is.
    Committed { blocks: Vec<MealBlock> },
    /// Requires explicit confirmation before the proposed set may be persisted.
    NeedsConfirmation(ConflictReport),
    Rejected { reason: Rejection },
}

impl EditOutcome {
    pub fn committed(blocks: Vec<MealBlock>) -> Self {
        EditOutcome::Committed { blocks }
    }

    pub fn rejected(reason: Rejection) -> Self {
        EditOutcome::Rejected { reason }
    }

    /// Build a committed or needs-confirmation outcome depending on `conflicts`.
    pub(crate) fn from_conflicts(
        conflicts: Vec<MealBlock>,
        proposed_blocks: Vec<MealBlock>,
    ) -> Self {
        if conflicts.is_empty() {
            EditOutcome::committed(proposed_blocks)
        } else {
            EditOutcome::NeedsConfirmation(ConflictReport {
                conflicts,
                proposed_blocks,
            })
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, EditOutcome::Committed { .. })
    }

    /// The block set to persist without further confirmation, if any.
    pub fn committed_blocks(&self) -> Option<&[MealBlock]> {
        match self {
            EditOutcome::Committed { blocks } => Some(blocks.as_slice()),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            EditOutcome::Rejected { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn conflict_report(&self) -> Option<&ConflictReport> {
        match self {
            EditOutcome::NeedsConfirmation(report) => Some(report),
            _ => None,
        }
    }
}
