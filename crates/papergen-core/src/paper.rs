//! Assembled exam papers with JSON export.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    BlueprintId, CourseId, ExamType, OutcomeId, PaperHeader, PaperId, Placement, QuestionId,
};

/// A fully populated paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPaper {
    pub paper_id: PaperId,
    pub course_id: CourseId,
    pub blueprint_id: BlueprintId,
    pub exam_type: ExamType,
    pub generated_at: DateTime<Utc>,
    /// Part A entries ordered by position.
    pub part_a: Vec<PartAEntry>,
    /// Part B groups ordered by question number.
    pub part_b: Vec<PartBGroupEntry>,
}

/// A Part A question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartAEntry {
    pub question_id: QuestionId,
    pub question_text: String,
    /// Id of the outcome row, when the course has one for `co_number`.
    pub co_id: Option<OutcomeId>,
    pub co_number: u8,
    pub marks: u32,
    pub position: u8,
}

/// A Part B question number with its alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartBGroupEntry {
    pub question_number: u8,
    /// Alternatives ordered by label.
    pub options: Vec<PartBOption>,
}

/// One alternative of a Part B group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartBOption {
    pub option: char,
    pub question_id: QuestionId,
    pub question_text: String,
    pub co_id: Option<OutcomeId>,
    pub co_number: u8,
    pub marks: u32,
}

/// A stored placement joined with the question and outcome it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedQuestion {
    pub placement: Placement,
    pub question_text: String,
    pub marks: u32,
    pub co_id: Option<OutcomeId>,
    pub co_number: u8,
}

impl GeneratedPaper {
    /// Rebuild a paper from its header and stored placements.
    ///
    /// Rows with positions 1..=5 form Part A; rows sharing a position in
    /// 6..=9 form one Part B group.
    pub fn from_placements(header: &PaperHeader, rows: &[PlacedQuestion]) -> Self {
        let mut part_a: Vec<PartAEntry> = rows
            .iter()
            .filter(|r| (1..=5).contains(&r.placement.position))
            .map(|r| PartAEntry {
                question_id: r.placement.question_id,
                question_text: r.question_text.clone(),
                co_id: r.co_id,
                co_number: r.co_number,
                marks: r.marks,
                position: r.placement.position,
            })
            .collect();
        part_a.sort_by_key(|e| e.position);

        let part_b = (6..=9u8)
            .filter_map(|number| {
                let mut options: Vec<PartBOption> = rows
                    .iter()
                    .filter(|r| r.placement.position == number)
                    .map(|r| PartBOption {
                        option: r.placement.option_label.unwrap_or('a'),
                        question_id: r.placement.question_id,
                        question_text: r.question_text.clone(),
                        co_id: r.co_id,
                        co_number: r.co_number,
                        marks: r.marks,
                    })
                    .collect();
                if options.is_empty() {
                    return None;
                }
                options.sort_by_key(|o| o.option);
                Some(PartBGroupEntry {
                    question_number: number,
                    options,
                })
            })
            .collect();

        GeneratedPaper {
            paper_id: header.id,
            course_id: header.course_id,
            blueprint_id: header.blueprint_id,
            exam_type: header.exam_type,
            generated_at: header.generated_at,
            part_a,
            part_b,
        }
    }

    /// The rows to persist for this paper.
    pub fn placements(&self) -> Vec<Placement> {
        let part_a = self.part_a.iter().map(|e| Placement {
            question_id: e.question_id,
            position: e.position,
            option_label: None,
        });
        let part_b = self.part_b.iter().flat_map(|g| {
            g.options.iter().map(move |o| Placement {
                question_id: o.question_id,
                position: g.question_number,
                option_label: Some(o.option),
            })
        });
        part_a.chain(part_b).collect()
    }

    /// Every question id on the paper, Part A first.
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.placements().into_iter().map(|p| p.question_id).collect()
    }

    pub fn question_count(&self) -> usize {
        self.part_a.len() + self.part_b.iter().map(|g| g.options.len()).sum::<usize>()
    }

    /// Marks a candidate can score: all of Part A plus one alternative per group.
    pub fn total_marks(&self) -> u32 {
        let part_a: u32 = self.part_a.iter().map(|e| e.marks).sum();
        let part_b: u32 = self
            .part_b
            .iter()
            .filter_map(|g| g.options.first().map(|o| o.marks))
            .sum();
        part_a + part_b
    }

    /// Save the paper as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize paper")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write paper to {}", path.display()))?;
        Ok(())
    }

    /// Load a paper from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read paper from {}", path.display()))?;
        let paper: GeneratedPaper =
            serde_json::from_str(&content).context("failed to parse paper JSON")?;
        Ok(paper)
    }
}
