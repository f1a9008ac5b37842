//! In-memory store implementing every engine collaborator.
//!
//! All state sits behind one lock. Paper writes are staged in a
//! [`MemoryTransaction`] and applied under a single write lock on commit, so
//! readers see either the whole paper or none of it.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use papergen_core::blueprint::{validate_blueprint, Structure, MAX_OUTCOME};
use papergen_core::model::{
    Blueprint, BlueprintId, Course, CourseId, Difficulty, ExamType, Outcome, PaperHeader, PaperId,
    Placement, Question, QuestionId, QuestionKind, Unit, UnitId,
};
use papergen_core::paper::{GeneratedPaper, PlacedQuestion};
use papergen_core::traits::{PaperStore, PaperTransaction, QuestionRepository, UsageTracker};

use crate::error::StoreError;
use crate::snapshot::{Snapshot, StoredPlacement};

/// A question to author, with outcomes given by course-scoped number.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub course_id: CourseId,
    pub text: String,
    pub kind: QuestionKind,
    pub marks: u32,
    pub difficulty: Difficulty,
    pub unit_id: UnitId,
    pub outcomes: Vec<u8>,
}

/// A paper header with its placement count, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperSummary {
    pub header: PaperHeader,
    pub blueprint_name: Option<String>,
    pub question_count: usize,
}

/// The in-memory store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<Snapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Load a store from a snapshot file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::from_snapshot(Snapshot::read(path)?))
    }

    /// Write the current state to a snapshot file.
    ///
    /// Fails with [`StoreError::Conflict`] when the file on disk carries a
    /// different revision from the one this store was loaded at. Callers that
    /// load, modify and save should hold a [`DataFileLock`] for the whole
    /// sequence so a conflict cannot arise in the first place.
    ///
    /// [`DataFileLock`]: crate::file_lock::DataFileLock
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let mut state = self.write();
        if path.exists() {
            let found = Snapshot::read_revision(path)?;
            if found != state.revision {
                warn!(
                    path = %path.display(),
                    loaded = state.revision,
                    found,
                    "data file changed on disk"
                );
                return Err(StoreError::Conflict {
                    loaded: state.revision,
                    found,
                });
            }
        }

        let mut next = state.clone();
        next.revision += 1;
        next.write(path)?;
        state.revision = next.revision;
        Ok(())
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // -----------------------------------------------------------------------
    // Authoring
    // -----------------------------------------------------------------------

    pub fn add_course(&self, code: &str, name: &str) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            code: code.trim().to_string(),
            name: name.trim().to_string(),
        };
        self.write().courses.push(course.clone());
        course
    }

    pub fn add_unit(
        &self,
        course_id: CourseId,
        unit_number: u32,
        content: &str,
    ) -> Result<Unit, StoreError> {
        let mut state = self.write();
        ensure_course(&state, course_id)?;
        let unit = Unit {
            id: Uuid::new_v4(),
            course_id,
            unit_number,
            content: content.to_string(),
        };
        state.units.push(unit.clone());
        Ok(unit)
    }

    /// Add outcome `number` (1..=6) to a course. Numbers are unique per course.
    pub fn add_outcome(
        &self,
        course_id: CourseId,
        number: u8,
        description: &str,
    ) -> Result<Outcome, StoreError> {
        if !(1..=MAX_OUTCOME).contains(&number) {
            return Err(StoreError::InvalidOutcome(number));
        }
        let mut state = self.write();
        ensure_course(&state, course_id)?;
        if outcome_in(&state, course_id, number).is_some() {
            return Err(StoreError::DuplicateOutcome { course_id, number });
        }
        let outcome = Outcome {
            id: Uuid::new_v4(),
            course_id,
            number,
            description: description.to_string(),
        };
        state.outcomes.push(outcome.clone());
        Ok(outcome)
    }

    pub fn add_question(&self, new: NewQuestion) -> Result<Question, StoreError> {
        if new.marks == 0 {
            return Err(StoreError::InvalidQuestion("marks must be positive".into()));
        }
        if new.text.trim().is_empty() {
            return Err(StoreError::InvalidQuestion("text is empty".into()));
        }

        let mut state = self.write();
        ensure_course(&state, new.course_id)?;
        let outcome_ids = new
            .outcomes
            .iter()
            .map(|&number| {
                outcome_in(&state, new.course_id, number)
                    .map(|o| o.id)
                    .ok_or(StoreError::OutcomeNotFound {
                        course_id: new.course_id,
                        number,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let question = Question {
            id: Uuid::new_v4(),
            course_id: new.course_id,
            text: new.text,
            kind: new.kind,
            marks: new.marks,
            difficulty: new.difficulty,
            unit_id: new.unit_id,
            outcome_ids,
            created_at: Utc::now(),
        };
        state.questions.push(question.clone());
        Ok(question)
    }

    pub fn course(&self, id: CourseId) -> Option<Course> {
        self.read().courses.iter().find(|c| c.id == id).cloned()
    }

    pub fn course_by_code(&self, code: &str) -> Option<Course> {
        self.read()
            .courses
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
            .cloned()
    }

    /// Find a course by UUID or by code.
    pub fn resolve_course(&self, key: &str) -> Result<Course, StoreError> {
        let found = match key.trim().parse::<Uuid>() {
            Ok(id) => self.course(id),
            Err(_) => self.course_by_code(key),
        };
        found.ok_or_else(|| StoreError::CourseNotFound(key.to_string()))
    }

    pub fn courses(&self) -> Vec<Course> {
        self.read().courses.clone()
    }

    pub fn questions_for_course(&self, course_id: CourseId) -> Vec<Question> {
        self.read()
            .questions
            .iter()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Blueprints
    // -----------------------------------------------------------------------

    /// Validate and store a new blueprint. New blueprints are never the default.
    pub fn create_blueprint(&self, name: &str, structure: &Value) -> Result<Blueprint, StoreError> {
        let violations = validate_blueprint(&json!({ "name": name, "structure": structure }));
        if !violations.is_empty() {
            return Err(StoreError::InvalidBlueprint(violations));
        }
        let structure =
            Structure::parse(structure).map_err(|e| StoreError::InvalidBlueprint(e.violations))?;

        let now = Utc::now();
        let blueprint = Blueprint {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            structure,
            is_default: false,
            created_at: now,
            updated_at: now,
        };
        self.write().blueprints.push(blueprint.clone());
        info!(blueprint_id = %blueprint.id, name = %blueprint.name, "blueprint created");
        Ok(blueprint)
    }

    /// Change a blueprint's name, structure, or both.
    pub fn update_blueprint(
        &self,
        id: BlueprintId,
        name: Option<&str>,
        structure: Option<&Value>,
    ) -> Result<Blueprint, StoreError> {
        let mut state = self.write();
        let existing = state
            .blueprints
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::BlueprintNotFound(id))?;

        if name.is_none() && structure.is_none() {
            return Err(StoreError::NothingToUpdate);
        }

        // The merged document goes through the same validator as a new blueprint.
        let name = name.unwrap_or(&existing.name);
        let doc = match structure {
            Some(doc) => doc.clone(),
            None => Value::from(existing.structure.clone()),
        };
        let violations = validate_blueprint(&json!({ "name": name, "structure": &doc }));
        if !violations.is_empty() {
            return Err(StoreError::InvalidBlueprint(violations));
        }
        let name = name.trim().to_string();
        let structure =
            Structure::parse(&doc).map_err(|e| StoreError::InvalidBlueprint(e.violations))?;

        let blueprint = state
            .blueprints
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::BlueprintNotFound(id))?;
        blueprint.name = name;
        blueprint.structure = structure;
        blueprint.updated_at = Utc::now();
        Ok(blueprint.clone())
    }

    pub fn blueprint(&self, id: BlueprintId) -> Result<Blueprint, StoreError> {
        self.read()
            .blueprints
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::BlueprintNotFound(id))
    }

    /// All blueprints, newest first.
    pub fn blueprints(&self) -> Vec<Blueprint> {
        let mut blueprints = self.read().blueprints.clone();
        blueprints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        blueprints
    }

    pub fn default_blueprint(&self) -> Option<Blueprint> {
        self.read().blueprints.iter().find(|b| b.is_default).cloned()
    }

    /// The blueprint with `id`, or the default one when `id` is `None`.
    pub fn resolve_blueprint(&self, id: Option<BlueprintId>) -> Result<Blueprint, StoreError> {
        match id {
            Some(id) => self.blueprint(id),
            None => self.default_blueprint().ok_or(StoreError::NoDefaultBlueprint),
        }
    }

    /// Make `id` the only default blueprint.
    ///
    /// Clearing the old flag and setting the new one happen under one write
    /// lock, so no reader ever sees zero or two defaults mid-swap.
    pub fn set_default_blueprint(&self, id: BlueprintId) -> Result<Blueprint, StoreError> {
        let mut state = self.write();
        if !state.blueprints.iter().any(|b| b.id == id) {
            return Err(StoreError::BlueprintNotFound(id));
        }

        let now = Utc::now();
        let mut chosen = None;
        for blueprint in state.blueprints.iter_mut() {
            let is_target = blueprint.id == id;
            if blueprint.is_default != is_target {
                blueprint.updated_at = now;
            }
            blueprint.is_default = is_target;
            if is_target {
                chosen = Some(blueprint.clone());
            }
        }
        info!(blueprint_id = %id, "default blueprint changed");
        chosen.ok_or(StoreError::BlueprintNotFound(id))
    }

    /// Delete a blueprint. The default blueprint cannot be deleted.
    pub fn delete_blueprint(&self, id: BlueprintId) -> Result<(), StoreError> {
        let mut state = self.write();
        let blueprint = state
            .blueprints
            .iter()
            .find(|b| b.id == id)
            .ok_or(StoreError::BlueprintNotFound(id))?;
        if blueprint.is_default {
            return Err(StoreError::DefaultBlueprintInUse);
        }
        state.blueprints.retain(|b| b.id != id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Papers
    // -----------------------------------------------------------------------

    /// Papers generated for a course, newest first.
    pub fn papers_for_course(&self, course_id: CourseId) -> Vec<PaperSummary> {
        let state = self.read();
        let mut papers: Vec<PaperSummary> = state
            .papers
            .iter()
            .filter(|p| p.course_id == course_id)
            .map(|header| PaperSummary {
                header: header.clone(),
                blueprint_name: state
                    .blueprints
                    .iter()
                    .find(|b| b.id == header.blueprint_id)
                    .map(|b| b.name.clone()),
                question_count: state
                    .placements
                    .iter()
                    .filter(|p| p.paper_id == header.id)
                    .count(),
            })
            .collect();
        papers.sort_by(|a, b| b.header.generated_at.cmp(&a.header.generated_at));
        papers
    }

    /// Re-assemble a stored paper.
    pub fn paper(&self, id: PaperId) -> Result<GeneratedPaper, StoreError> {
        let state = self.read();
        let header = state
            .papers
            .iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::PaperNotFound(id))?;
        let structure = state
            .blueprints
            .iter()
            .find(|b| b.id == header.blueprint_id)
            .map(|b| &b.structure);

        let rows: Vec<PlacedQuestion> = state
            .placements
            .iter()
            .filter(|p| p.paper_id == id)
            .filter_map(|row| {
                let question = state
                    .questions
                    .iter()
                    .find(|q| q.id == row.placement.question_id)?;
                let co_number = placed_outcome(&state, structure, question, row.placement.position);
                Some(PlacedQuestion {
                    placement: row.placement.clone(),
                    question_text: question.text.clone(),
                    marks: question.marks,
                    co_id: outcome_in(&state, header.course_id, co_number).map(|o| o.id),
                    co_number,
                })
            })
            .collect();

        Ok(GeneratedPaper::from_placements(header, &rows))
    }

    /// Delete a paper and all of its placements.
    ///
    /// Its questions become available to later generations again.
    pub fn delete_paper(&self, id: PaperId) -> Result<(), StoreError> {
        let mut state = self.write();
        if !state.papers.iter().any(|p| p.id == id) {
            return Err(StoreError::PaperNotFound(id));
        }
        state.papers.retain(|p| p.id != id);
        state.placements.retain(|p| p.paper_id != id);
        info!(paper_id = %id, "paper deleted");
        Ok(())
    }
}

fn ensure_course(state: &Snapshot, course_id: CourseId) -> Result<(), StoreError> {
    if state.courses.iter().any(|c| c.id == course_id) {
        Ok(())
    } else {
        Err(StoreError::CourseNotFound(course_id.to_string()))
    }
}

fn outcome_in(state: &Snapshot, course_id: CourseId, number: u8) -> Option<&Outcome> {
    state
        .outcomes
        .iter()
        .find(|o| o.course_id == course_id && o.number == number)
}

/// The outcome a placement was selected for.
///
/// Part A positions map to their own outcome number; Part B positions take
/// the group's outcome from the blueprint, falling back to the question's
/// lowest tagged outcome when the blueprint is gone.
fn placed_outcome(
    state: &Snapshot,
    structure: Option<&Structure>,
    question: &Question,
    position: u8,
) -> u8 {
    if position <= 5 {
        return position;
    }
    if let Some(group) = structure.and_then(|s| s.part_b().iter().find(|g| g.group == position)) {
        return group.co;
    }
    state
        .outcomes
        .iter()
        .filter(|o| question.outcome_ids.contains(&o.id))
        .map(|o| o.number)
        .min()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Engine collaborators
// ---------------------------------------------------------------------------

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn fetch_candidates(
        &self,
        course_id: CourseId,
        marks: u32,
        outcome: u8,
    ) -> anyhow::Result<Vec<Question>> {
        let state = self.read();
        let outcome_ids: HashSet<_> = state
            .outcomes
            .iter()
            .filter(|o| o.course_id == course_id && o.number == outcome)
            .map(|o| o.id)
            .collect();
        if outcome_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(state
            .questions
            .iter()
            .filter(|q| q.course_id == course_id && q.marks == marks)
            .filter(|q| q.outcome_ids.iter().any(|id| outcome_ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn find_outcome(
        &self,
        course_id: CourseId,
        number: u8,
    ) -> anyhow::Result<Option<Outcome>> {
        Ok(outcome_in(&self.read(), course_id, number).cloned())
    }
}

#[async_trait]
impl UsageTracker for InMemoryStore {
    async fn used_question_ids(&self, course_id: CourseId) -> anyhow::Result<HashSet<QuestionId>> {
        let state = self.read();
        let papers: HashSet<PaperId> = state
            .papers
            .iter()
            .filter(|p| p.course_id == course_id)
            .map(|p| p.id)
            .collect();
        Ok(state
            .placements
            .iter()
            .filter(|p| papers.contains(&p.paper_id))
            .map(|p| p.placement.question_id)
            .collect())
    }
}

#[async_trait]
impl PaperStore for InMemoryStore {
    async fn begin(&self) -> anyhow::Result<Box<dyn PaperTransaction>> {
        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            papers: Vec::new(),
            placements: Vec::new(),
        }))
    }
}

/// Staged paper writes, applied together on commit.
pub struct MemoryTransaction {
    state: Arc<RwLock<Snapshot>>,
    papers: Vec<PaperHeader>,
    placements: Vec<StoredPlacement>,
}

impl MemoryTransaction {
    /// Every staged paper needs placements, and no two placements of one
    /// paper may share a position and label.
    fn check(&self) -> Result<(), StoreError> {
        let mut seen: HashMap<PaperId, HashSet<(u8, Option<char>)>> = HashMap::new();
        for row in &self.placements {
            let key = (row.placement.position, row.placement.option_label);
            if !seen.entry(row.paper_id).or_default().insert(key) {
                return Err(StoreError::DuplicatePlacement {
                    paper_id: row.paper_id,
                    position: key.0,
                    option_label: key.1,
                });
            }
        }
        if let Some(empty) = self.papers.iter().find(|p| !seen.contains_key(&p.id)) {
            return Err(StoreError::EmptyPaper(empty.id));
        }
        Ok(())
    }
}

#[async_trait]
impl PaperTransaction for MemoryTransaction {
    async fn persist_paper(
        &mut self,
        course_id: CourseId,
        blueprint_id: BlueprintId,
        exam_type: ExamType,
    ) -> anyhow::Result<PaperHeader> {
        let header = PaperHeader {
            id: Uuid::new_v4(),
            course_id,
            blueprint_id,
            exam_type,
            generated_at: Utc::now(),
        };
        self.papers.push(header.clone());
        Ok(header)
    }

    async fn persist_placements(
        &mut self,
        paper_id: PaperId,
        placements: &[Placement],
    ) -> anyhow::Result<()> {
        if !self.papers.iter().any(|p| p.id == paper_id) {
            return Err(StoreError::UnknownPaper(paper_id).into());
        }
        self.placements
            .extend(placements.iter().cloned().map(|placement| StoredPlacement {
                paper_id,
                placement,
            }));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.check()?;

        let this = *self;
        let mut state = this.state.write().unwrap_or_else(|e| e.into_inner());
        debug!(
            papers = this.papers.len(),
            placements = this.placements.len(),
            "committing paper transaction"
        );
        state.papers.extend(this.papers);
        state.placements.extend(this.placements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_course() -> (InMemoryStore, Course, Unit) {
        let store = InMemoryStore::new();
        let course = store.add_course("CS101", "Data Structures");
        let unit = store.add_unit(course.id, 1, "Arrays").unwrap();
        for n in 1..=6 {
            store.add_outcome(course.id, n, &format!("Outcome {n}")).unwrap();
        }
        (store, course, unit)
    }

    fn question(course: &Course, unit: &Unit, marks: u32, outcomes: Vec<u8>) -> NewQuestion {
        NewQuestion {
            course_id: course.id,
            text: format!("{marks}-mark question on {outcomes:?}"),
            kind: QuestionKind::ShortAnswer,
            marks,
            difficulty: Difficulty::Easy,
            unit_id: unit.id,
            outcomes,
        }
    }

    fn default_doc() -> Value {
        serde_json::to_value(Structure::default_layout()).unwrap()
    }

    #[tokio::test]
    async fn candidates_match_course_marks_and_outcome() {
        let (store, course, unit) = store_with_course();
        let a = store.add_question(question(&course, &unit, 2, vec![1, 2])).unwrap();
        let b = store.add_question(question(&course, &unit, 2, vec![2])).unwrap();
        store.add_question(question(&course, &unit, 5, vec![2])).unwrap();
        store.add_question(question(&course, &unit, 2, vec![3])).unwrap();

        let other = store.add_course("CS102", "Other");
        store.add_outcome(other.id, 2, "Other CO2").unwrap();
        store
            .add_question(NewQuestion {
                course_id: other.id,
                ..question(&course, &unit, 2, vec![2])
            })
            .unwrap();

        let found = store.fetch_candidates(course.id, 2, 2).await.unwrap();
        let ids: Vec<_> = found.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn add_question_rejects_unknown_outcome() {
        let store = InMemoryStore::new();
        let course = store.add_course("CS101", "Data Structures");
        let unit = store.add_unit(course.id, 1, "Arrays").unwrap();
        let err = store.add_question(question(&course, &unit, 2, vec![4])).unwrap_err();
        assert!(matches!(err, StoreError::OutcomeNotFound { number: 4, .. }));
    }

    #[test]
    fn add_question_rejects_zero_marks() {
        let (store, course, unit) = store_with_course();
        let err = store.add_question(question(&course, &unit, 0, vec![1])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuestion(_)));
    }

    #[test]
    fn add_outcome_rejects_numbers_outside_one_to_six() {
        let store = InMemoryStore::new();
        let course = store.add_course("CS101", "Data Structures");
        for number in [0, 7, 200] {
            let err = store.add_outcome(course.id, number, "Out of range").unwrap_err();
            assert!(matches!(err, StoreError::InvalidOutcome(n) if n == number));
        }
        assert_eq!(
            store.add_outcome(course.id, 9, "Nine").unwrap_err().to_string(),
            "outcome number must be between 1 and 6, got 9"
        );
        assert!(store.snapshot().outcomes.is_empty());
    }

    #[test]
    fn add_outcome_rejects_duplicate_number_per_course() {
        let (store, course, _) = store_with_course();
        let err = store.add_outcome(course.id, 3, "Second CO3").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOutcome { number: 3, .. }));
        assert_eq!(store.snapshot().outcomes.len(), 6);

        let other = store.add_course("CS102", "Other");
        store.add_outcome(other.id, 3, "CO3 of another course").unwrap();
    }

    #[test]
    fn resolve_course_by_id_or_code() {
        let (store, course, _) = store_with_course();
        assert_eq!(store.resolve_course("cs101").unwrap().id, course.id);
        assert_eq!(store.resolve_course(&course.id.to_string()).unwrap().code, "CS101");
        assert!(store.resolve_course("MATH9").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn commit_makes_paper_visible() {
        let (store, course, unit) = store_with_course();
        let q = store.add_question(question(&course, &unit, 2, vec![1])).unwrap();

        let mut tx = store.begin().await.unwrap();
        let header = tx
            .persist_paper(course.id, Uuid::new_v4(), ExamType::MidTerm)
            .await
            .unwrap();
        tx.persist_placements(
            header.id,
            &[Placement {
                question_id: q.id,
                position: 1,
                option_label: None,
            }],
        )
        .await
        .unwrap();

        assert!(store.used_question_ids(course.id).await.unwrap().is_empty());
        tx.commit().await.unwrap();

        let used = store.used_question_ids(course.id).await.unwrap();
        assert!(used.contains(&q.id));
        assert_eq!(store.papers_for_course(course.id).len(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let (store, course, _) = store_with_course();
        {
            let mut tx = store.begin().await.unwrap();
            tx.persist_paper(course.id, Uuid::new_v4(), ExamType::Final)
                .await
                .unwrap();
        }
        assert!(store.snapshot().papers.is_empty());
    }

    #[tokio::test]
    async fn commit_rejects_empty_paper() {
        let (store, course, _) = store_with_course();
        let mut tx = store.begin().await.unwrap();
        tx.persist_paper(course.id, Uuid::new_v4(), ExamType::Final)
            .await
            .unwrap();
        let err = tx.commit().await.unwrap_err();
        assert!(err.to_string().contains("has no placements"));
        assert!(store.snapshot().papers.is_empty());
    }

    #[tokio::test]
    async fn commit_rejects_duplicate_position_and_label() {
        let (store, course, unit) = store_with_course();
        let q1 = store.add_question(question(&course, &unit, 8, vec![1])).unwrap();
        let q2 = store.add_question(question(&course, &unit, 8, vec![1])).unwrap();

        let mut tx = store.begin().await.unwrap();
        let header = tx
            .persist_paper(course.id, Uuid::new_v4(), ExamType::Final)
            .await
            .unwrap();
        let rows = [
            Placement { question_id: q1.id, position: 6, option_label: Some('a') },
            Placement { question_id: q2.id, position: 6, option_label: Some('a') },
        ];
        tx.persist_placements(header.id, &rows).await.unwrap();
        assert!(tx.commit().await.is_err());
        assert!(store.snapshot().placements.is_empty());
    }

    #[tokio::test]
    async fn placements_need_a_staged_paper() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = tx.persist_placements(Uuid::new_v4(), &[]).await.unwrap_err();
        assert!(err.to_string().contains("did not create"));
    }

    #[test]
    fn create_blueprint_validates_and_trims() {
        let store = InMemoryStore::new();
        let bp = store.create_blueprint("  Standard  ", &default_doc()).unwrap();
        assert_eq!(bp.name, "Standard");
        assert!(!bp.is_default);

        let mut bad = default_doc();
        bad["part_a"]["marks"] = json!(3);
        let err = store.create_blueprint("x", &bad).unwrap_err();
        match err {
            StoreError::InvalidBlueprint(violations) => assert_eq!(violations.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn set_default_keeps_exactly_one() {
        let store = InMemoryStore::new();
        let first = store.create_blueprint("First", &default_doc()).unwrap();
        let second = store.create_blueprint("Second", &default_doc()).unwrap();

        store.set_default_blueprint(first.id).unwrap();
        store.set_default_blueprint(second.id).unwrap();

        let defaults: Vec<_> = store.blueprints().into_iter().filter(|b| b.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second.id);
        assert_eq!(store.default_blueprint().unwrap().id, second.id);

        assert!(store.set_default_blueprint(Uuid::new_v4()).is_err());
        assert_eq!(store.default_blueprint().unwrap().id, second.id);
    }

    #[test]
    fn default_blueprint_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let bp = store.create_blueprint("Default", &default_doc()).unwrap();
        let other = store.create_blueprint("Other", &default_doc()).unwrap();
        store.set_default_blueprint(bp.id).unwrap();

        assert!(matches!(
            store.delete_blueprint(bp.id),
            Err(StoreError::DefaultBlueprintInUse)
        ));
        store.delete_blueprint(other.id).unwrap();
        assert_eq!(store.blueprints().len(), 1);
    }

    #[test]
    fn update_blueprint_fields() {
        let store = InMemoryStore::new();
        let bp = store.create_blueprint("Original", &default_doc()).unwrap();

        assert!(matches!(
            store.update_blueprint(bp.id, None, None),
            Err(StoreError::NothingToUpdate)
        ));
        assert!(store.update_blueprint(bp.id, Some("no"), None).is_err());

        let mut doc = default_doc();
        doc["part_b"][0]["co"] = json!(3);
        let updated = store.update_blueprint(bp.id, Some("Renamed"), Some(&doc)).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.structure.part_b()[0].co, 3);

        doc["part_b"][0]["co"] = json!(7);
        assert!(store.update_blueprint(bp.id, None, Some(&doc)).is_err());
        assert_eq!(store.blueprint(bp.id).unwrap().structure.part_b()[0].co, 3);
    }

    #[test]
    fn update_blueprint_name_checked_like_create() {
        let store = InMemoryStore::new();
        let bp = store.create_blueprint("Original", &default_doc()).unwrap();
        let long = "x".repeat(256);

        for name in ["no", "   ab   ", long.as_str()] {
            let created = store.create_blueprint(name, &default_doc()).unwrap_err();
            let updated = store.update_blueprint(bp.id, Some(name), None).unwrap_err();
            assert_eq!(updated.to_string(), created.to_string());
            assert_eq!(
                updated.to_string(),
                "invalid blueprint: Blueprint name must be between 3 and 255 characters"
            );
        }

        let renamed = store.update_blueprint(bp.id, Some("  Midterm  "), None).unwrap();
        assert_eq!(renamed.name, "Midterm");
        assert_eq!(renamed.structure, bp.structure);
    }

    #[test]
    fn resolve_blueprint_falls_back_to_default() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.resolve_blueprint(None),
            Err(StoreError::NoDefaultBlueprint)
        ));
        let bp = store.create_blueprint("Default", &default_doc()).unwrap();
        store.set_default_blueprint(bp.id).unwrap();
        assert_eq!(store.resolve_blueprint(None).unwrap().id, bp.id);
    }

    #[tokio::test]
    async fn delete_paper_removes_placements() {
        let (store, course, unit) = store_with_course();
        let q = store.add_question(question(&course, &unit, 2, vec![1])).unwrap();
        let mut tx = store.begin().await.unwrap();
        let header = tx
            .persist_paper(course.id, Uuid::new_v4(), ExamType::MidTerm)
            .await
            .unwrap();
        tx.persist_placements(
            header.id,
            &[Placement { question_id: q.id, position: 1, option_label: None }],
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        store.delete_paper(header.id).unwrap();
        assert!(store.snapshot().placements.is_empty());
        assert!(store.used_question_ids(course.id).await.unwrap().is_empty());
        assert!(matches!(
            store.delete_paper(header.id),
            Err(StoreError::PaperNotFound(_))
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let (store, course, unit) = store_with_course();
        store.add_question(question(&course, &unit, 2, vec![1])).unwrap();
        store.create_blueprint("Default", &default_doc()).unwrap();
        store.save(&path).unwrap();

        let loaded = InMemoryStore::load(&path).unwrap();
        assert_eq!(loaded.snapshot(), store.snapshot());
    }

    #[test]
    fn save_rejects_a_file_changed_since_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let (store, _, _) = store_with_course();
        store.save(&path).unwrap();

        let first = InMemoryStore::load(&path).unwrap();
        let second = InMemoryStore::load(&path).unwrap();
        first.add_course("CS102", "Algorithms");
        second.add_course("CS103", "Networks");

        first.save(&path).unwrap();
        let err = second.save(&path).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { loaded: 1, found: 2 }));

        let on_disk = InMemoryStore::load(&path).unwrap();
        assert!(on_disk.course_by_code("CS102").is_some());
        assert!(on_disk.course_by_code("CS103").is_none());

        first.add_course("CS104", "Compilers");
        first.save(&path).unwrap();
        assert_eq!(Snapshot::read_revision(&path).unwrap(), 3);
    }
}
