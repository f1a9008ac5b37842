//! Error types for blueprint validation and paper generation.
//!
//! Insufficiency errors carry the exact outcome, mark value and counts so a
//! caller can explain the failure without looking at logs.

use thiserror::Error;

/// A blueprint document failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid blueprint: {}", .violations.join(", "))]
pub struct BlueprintError {
    /// Every violation found, in check order.
    pub violations: Vec<String>,
}

/// Errors that abort a paper generation.
///
/// None of these leave a partial paper behind.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The blueprint structure is not valid.
    #[error("invalid blueprint: {}", .0.join(", "))]
    InvalidBlueprint(Vec<String>),

    /// A Part A slot has no unused question for its outcome and mark value.
    #[error("insufficient questions for CO{co} with {marks} marks")]
    InsufficientPartA { position: u8, co: u8, marks: u32 },

    /// A Part B group has fewer unused questions than options it must offer.
    #[error(
        "insufficient questions for Q{group} (CO{co}, {marks} marks): \
         need {required}, only {available} available"
    )]
    InsufficientPartB {
        group: u8,
        co: u8,
        marks: u32,
        required: usize,
        available: usize,
    },

    /// The question repository or usage tracker failed.
    #[error("question repository failed: {0:#}")]
    Repository(anyhow::Error),

    /// The paper store failed while persisting the paper.
    #[error("paper store failed: {0:#}")]
    Store(anyhow::Error),
}

impl GenerationError {
    /// Returns `true` if the bank simply ran out of qualifying questions.
    ///
    /// Retrying such a failure is pointless until the pool changes.
    pub fn is_insufficiency(&self) -> bool {
        matches!(
            self,
            GenerationError::InsufficientPartA { .. } | GenerationError::InsufficientPartB { .. }
        )
    }
}

impl From<BlueprintError> for GenerationError {
    fn from(err: BlueprintError) -> Self {
        GenerationError::InvalidBlueprint(err.violations)
    }
}
