//! Collaborator traits consumed by the generation engine.
//!
//! The engine never talks to storage directly: questions, the usage record
//! and paper persistence all sit behind these async traits, implemented by
//! the `papergen-store` crate.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::model::{
    BlueprintId, CourseId, ExamType, Outcome, PaperHeader, PaperId, Placement, Question,
    QuestionId,
};

// ---------------------------------------------------------------------------
// Question repository
// ---------------------------------------------------------------------------

/// Read access to a course's question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Questions of `course_id` worth `marks` and tagged with outcome number
    /// `outcome`, in creation order.
    async fn fetch_candidates(
        &self,
        course_id: CourseId,
        marks: u32,
        outcome: u8,
    ) -> anyhow::Result<Vec<Question>>;

    /// The outcome row with the given course-scoped number, if the course has one.
    async fn find_outcome(
        &self,
        course_id: CourseId,
        number: u8,
    ) -> anyhow::Result<Option<Outcome>>;
}

// ---------------------------------------------------------------------------
// Usage tracker
// ---------------------------------------------------------------------------

/// Records which questions earlier papers have consumed.
#[async_trait]
pub trait UsageTracker: Send + Sync {
    /// Ids of every question placed on any paper generated for `course_id`.
    async fn used_question_ids(&self, course_id: CourseId) -> anyhow::Result<HashSet<QuestionId>>;
}

// ---------------------------------------------------------------------------
// Paper store
// ---------------------------------------------------------------------------

/// Persists generated papers.
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Start an atomic write. Nothing is visible until [`PaperTransaction::commit`].
    async fn begin(&self) -> anyhow::Result<Box<dyn PaperTransaction>>;
}

/// A pending paper write.
///
/// Dropping the transaction without committing discards everything staged.
#[async_trait]
pub trait PaperTransaction: Send {
    /// Stage a new paper header and return it with its assigned id.
    async fn persist_paper(
        &mut self,
        course_id: CourseId,
        blueprint_id: BlueprintId,
        exam_type: ExamType,
    ) -> anyhow::Result<PaperHeader>;

    /// Stage the placements of a paper staged earlier in this transaction.
    async fn persist_placements(
        &mut self,
        paper_id: PaperId,
        placements: &[Placement],
    ) -> anyhow::Result<()>;

    /// Apply every staged write at once, or none of them.
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}
