//! Store error types.

use thiserror::Error;

use papergen_core::model::{BlueprintId, CourseId, PaperId};

/// Errors raised by the store and its blueprint registry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("outcome CO{number} not found for course {course_id}")]
    OutcomeNotFound { course_id: CourseId, number: u8 },

    #[error("blueprint not found: {0}")]
    BlueprintNotFound(BlueprintId),

    #[error("no default blueprint found and no blueprint id provided")]
    NoDefaultBlueprint,

    #[error("paper not found: {0}")]
    PaperNotFound(PaperId),

    /// Every violation the blueprint validator reported.
    #[error("invalid blueprint: {}", .0.join(", "))]
    InvalidBlueprint(Vec<String>),

    #[error("cannot delete the default blueprint")]
    DefaultBlueprintInUse,

    #[error("no valid fields to update")]
    NothingToUpdate,

    #[error("outcome number must be between 1 and 6, got {0}")]
    InvalidOutcome(u8),

    #[error("outcome CO{number} already exists for course {course_id}")]
    DuplicateOutcome { course_id: CourseId, number: u8 },

    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    #[error("paper {0} has no placements")]
    EmptyPaper(PaperId),

    #[error("placements reference paper {0}, which this transaction did not create")]
    UnknownPaper(PaperId),

    #[error(
        "paper {paper_id} has two placements at position {position} with option {option_label:?}"
    )]
    DuplicatePlacement {
        paper_id: PaperId,
        position: u8,
        option_label: Option<char>,
    },

    #[error(
        "data file was modified by another process since it was loaded \
         (revision {loaded}, now {found})"
    )]
    Conflict { loaded: u64, found: u64 },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns `true` for lookups that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CourseNotFound(_)
                | StoreError::OutcomeNotFound { .. }
                | StoreError::BlueprintNotFound(_)
                | StoreError::NoDefaultBlueprint
                | StoreError::PaperNotFound(_)
        )
    }
}
