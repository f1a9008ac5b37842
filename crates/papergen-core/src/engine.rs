//! The paper generation engine.
//!
//! Fills Part A slot by slot and Part B group by group from a course's
//! question bank, never reusing a question any earlier paper for the course
//! has used, then persists the paper in one transaction. Any shortfall aborts
//! the whole generation before anything is written.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::blueprint::{PartA, PartBGroup, Structure};
use crate::error::GenerationError;
use crate::lock::CourseLocks;
use crate::model::{Blueprint, BlueprintId, CourseId, ExamType, OutcomeId, QuestionId};
use crate::paper::{GeneratedPaper, PartAEntry, PartBGroupEntry, PartBOption};
use crate::selection::{choose_many, choose_one, exclude_used, option_label};
use crate::traits::{PaperStore, QuestionRepository, UsageTracker};

/// Configuration for the paper generator.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Seed for the random source. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

/// Which half of the paper a requirement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperPart {
    A,
    B,
}

/// How well the bank covers one slot or group, checked in isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub part: PaperPart,
    /// Part A position or Part B group number.
    pub position: u8,
    pub co: u8,
    pub marks: u32,
    /// Questions the slot needs.
    pub required: usize,
    /// Matching questions in the bank.
    pub total: usize,
    /// Matching questions no earlier paper has used.
    pub unused: usize,
}

impl SlotAvailability {
    pub fn is_satisfied(&self) -> bool {
        self.unused >= self.required
    }
}

/// Result of a pre-flight coverage check.
///
/// Slots are checked independently, so a feasible report does not guarantee
/// success when slots draw from overlapping pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub slots: Vec<SlotAvailability>,
}

impl FeasibilityReport {
    pub fn is_feasible(&self) -> bool {
        self.slots.iter().all(SlotAvailability::is_satisfied)
    }

    pub fn shortfalls(&self) -> impl Iterator<Item = &SlotAvailability> {
        self.slots.iter().filter(|s| !s.is_satisfied())
    }
}

/// The generation engine.
pub struct PaperGenerator {
    questions: Arc<dyn QuestionRepository>,
    usage: Arc<dyn UsageTracker>,
    papers: Arc<dyn PaperStore>,
    locks: CourseLocks,
    rng: Mutex<StdRng>,
}

impl PaperGenerator {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        usage: Arc<dyn UsageTracker>,
        papers: Arc<dyn PaperStore>,
        config: GeneratorConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            questions,
            usage,
            papers,
            locks: CourseLocks::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Generate a paper from a stored blueprint.
    pub async fn generate_from(
        &self,
        course_id: CourseId,
        blueprint: &Blueprint,
        exam_type: ExamType,
    ) -> Result<GeneratedPaper, GenerationError> {
        self.generate(course_id, blueprint.id, &blueprint.structure, exam_type)
            .await
    }

    /// Generate and persist a paper for `course_id`.
    ///
    /// Holds the course's lock from the used-question snapshot through the
    /// commit. On error nothing has been persisted.
    pub async fn generate(
        &self,
        course_id: CourseId,
        blueprint_id: BlueprintId,
        structure: &Structure,
        exam_type: ExamType,
    ) -> Result<GeneratedPaper, GenerationError> {
        let _guard = self.locks.acquire(course_id).await;
        info!(%course_id, %blueprint_id, %exam_type, "generating paper");

        let mut used = self
            .usage
            .used_question_ids(course_id)
            .await
            .map_err(GenerationError::Repository)?;
        debug!(%course_id, used = used.len(), "loaded used questions");

        let mut outcomes = OutcomeCache::default();
        let part_a = self
            .fill_part_a(course_id, structure.part_a(), &mut used, &mut outcomes)
            .await?;
        let part_b = self
            .fill_part_b(course_id, &structure.groups_in_order(), &mut used, &mut outcomes)
            .await?;

        let mut tx = self.papers.begin().await.map_err(GenerationError::Store)?;
        let header = tx
            .persist_paper(course_id, blueprint_id, exam_type)
            .await
            .map_err(GenerationError::Store)?;

        let paper = GeneratedPaper {
            paper_id: header.id,
            course_id: header.course_id,
            blueprint_id: header.blueprint_id,
            exam_type: header.exam_type,
            generated_at: header.generated_at,
            part_a,
            part_b,
        };
        tx.persist_placements(header.id, &paper.placements())
            .await
            .map_err(GenerationError::Store)?;
        tx.commit().await.map_err(GenerationError::Store)?;

        info!(
            %course_id,
            paper_id = %paper.paper_id,
            questions = paper.question_count(),
            "paper generated"
        );
        Ok(paper)
    }

    /// Count, per slot and group, how many matching and unused questions exist.
    pub async fn check_feasibility(
        &self,
        course_id: CourseId,
        structure: &Structure,
    ) -> Result<FeasibilityReport, GenerationError> {
        let used = self
            .usage
            .used_question_ids(course_id)
            .await
            .map_err(GenerationError::Repository)?;

        let part_a = structure.part_a();
        let mut slots = Vec::new();
        for slot in part_a.slots() {
            let (total, unused) = self
                .availability(course_id, part_a.marks(), slot.co, &used)
                .await?;
            slots.push(SlotAvailability {
                part: PaperPart::A,
                position: slot.position,
                co: slot.co,
                marks: part_a.marks(),
                required: 1,
                total,
                unused,
            });
        }
        for group in structure.groups_in_order() {
            let (total, unused) = self
                .availability(course_id, group.marks, group.co, &used)
                .await?;
            slots.push(SlotAvailability {
                part: PaperPart::B,
                position: group.group,
                co: group.co,
                marks: group.marks,
                required: group.num_options,
                total,
                unused,
            });
        }

        Ok(FeasibilityReport { slots })
    }

    async fn availability(
        &self,
        course_id: CourseId,
        marks: u32,
        co: u8,
        used: &HashSet<QuestionId>,
    ) -> Result<(usize, usize), GenerationError> {
        let candidates = self
            .questions
            .fetch_candidates(course_id, marks, co)
            .await
            .map_err(GenerationError::Repository)?;
        let total = candidates.len();
        let unused = exclude_used(candidates, used).len();
        Ok((total, unused))
    }

    async fn fill_part_a(
        &self,
        course_id: CourseId,
        part_a: &PartA,
        used: &mut HashSet<QuestionId>,
        outcomes: &mut OutcomeCache,
    ) -> Result<Vec<PartAEntry>, GenerationError> {
        let marks = part_a.marks();
        let mut entries = Vec::new();

        for slot in part_a.slots() {
            let candidates = self
                .questions
                .fetch_candidates(course_id, marks, slot.co)
                .await
                .map_err(GenerationError::Repository)?;
            let candidates = exclude_used(candidates, used);
            debug!(
                position = slot.position,
                co = slot.co,
                available = candidates.len(),
                "filling Part A slot"
            );

            let Some(picked) = self.with_rng(|rng| choose_one(&candidates, rng).cloned()) else {
                warn!(%course_id, co = slot.co, marks, "no unused question for Part A slot");
                return Err(GenerationError::InsufficientPartA {
                    position: slot.position,
                    co: slot.co,
                    marks,
                });
            };
            used.insert(picked.id);

            entries.push(PartAEntry {
                question_id: picked.id,
                question_text: picked.text,
                co_id: outcomes.resolve(self.questions.as_ref(), course_id, slot.co).await?,
                co_number: slot.co,
                marks,
                position: slot.position,
            });
        }

        Ok(entries)
    }

    async fn fill_part_b(
        &self,
        course_id: CourseId,
        groups: &[PartBGroup],
        used: &mut HashSet<QuestionId>,
        outcomes: &mut OutcomeCache,
    ) -> Result<Vec<PartBGroupEntry>, GenerationError> {
        let mut entries = Vec::new();

        for group in groups {
            let candidates = self
                .questions
                .fetch_candidates(course_id, group.marks, group.co)
                .await
                .map_err(GenerationError::Repository)?;
            let candidates = exclude_used(candidates, used);
            debug!(
                group = group.group,
                co = group.co,
                available = candidates.len(),
                "filling Part B group"
            );

            if candidates.len() < group.num_options {
                warn!(
                    %course_id,
                    group = group.group,
                    required = group.num_options,
                    available = candidates.len(),
                    "not enough unused questions for Part B group"
                );
                return Err(GenerationError::InsufficientPartB {
                    group: group.group,
                    co: group.co,
                    marks: group.marks,
                    required: group.num_options,
                    available: candidates.len(),
                });
            }

            let picked: Vec<_> = self.with_rng(|rng| {
                choose_many(&candidates, group.num_options, rng)
                    .into_iter()
                    .cloned()
                    .collect()
            });
            let co_id = outcomes.resolve(self.questions.as_ref(), course_id, group.co).await?;

            let mut options = Vec::with_capacity(picked.len());
            for (index, question) in picked.into_iter().enumerate() {
                used.insert(question.id);
                options.push(PartBOption {
                    option: option_label(index),
                    question_id: question.id,
                    question_text: question.text,
                    co_id,
                    co_number: group.co,
                    marks: group.marks,
                });
            }

            entries.push(PartBGroupEntry {
                question_number: group.group,
                options,
            });
        }

        Ok(entries)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

/// Outcome ids looked up once per outcome number within a generation.
#[derive(Default)]
struct OutcomeCache {
    ids: HashMap<u8, Option<OutcomeId>>,
}

impl OutcomeCache {
    async fn resolve(
        &mut self,
        questions: &dyn QuestionRepository,
        course_id: CourseId,
        number: u8,
    ) -> Result<Option<OutcomeId>, GenerationError> {
        if let Some(id) = self.ids.get(&number) {
            return Ok(*id);
        }
        let id = questions
            .find_outcome(course_id, number)
            .await
            .map_err(GenerationError::Repository)?
            .map(|o| o.id);
        self.ids.insert(number, id);
        Ok(id)
    }
}
