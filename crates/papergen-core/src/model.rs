//! Core data model types for papergen.
//!
//! Courses own units, outcomes and questions. Blueprints describe the shape of
//! an exam, and generated papers record which questions were placed where.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blueprint::Structure;

pub type CourseId = Uuid;
pub type UnitId = Uuid;
pub type OutcomeId = Uuid;
pub type QuestionId = Uuid;
pub type BlueprintId = Uuid;
pub type PaperId = Uuid;

/// A course that owns a question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    /// Short code such as "CS101".
    pub code: String,
    pub name: String,
}

/// A syllabus unit. Questions belong to exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub course_id: CourseId,
    pub unit_number: u32,
    #[serde(default)]
    pub content: String,
}

/// A course outcome (CO).
///
/// Blueprints address outcomes by their course-scoped `number`, never by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub course_id: CourseId,
    /// Sequence number within the course (1..=6).
    pub number: u8,
    #[serde(default)]
    pub description: String,
}

/// A question in a course's bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub course_id: CourseId,
    /// The question body.
    pub text: String,
    #[serde(default)]
    pub kind: QuestionKind,
    /// Mark value, always positive.
    pub marks: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub unit_id: UnitId,
    /// Outcomes this question is tagged with.
    #[serde(default)]
    pub outcome_ids: Vec<OutcomeId>,
    pub created_at: DateTime<Utc>,
}

/// Answer format. Informational only; selection ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    ShortAnswer,
    LongAnswer,
}

/// Difficulty tag. Informational only; selection ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// The kind of exam a paper is generated for.
///
/// Both kinds use the same selection logic; the tag is stored and returned
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    MidTerm,
    Final,
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::MidTerm => write!(f, "mid_term"),
            ExamType::Final => write!(f, "final"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mid_term" => Ok(ExamType::MidTerm),
            "final" => Ok(ExamType::Final),
            other => Err(format!(
                "unknown exam type: {other} (expected \"mid_term\" or \"final\")"
            )),
        }
    }
}

/// A stored blueprint. The structure has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: BlueprintId,
    pub name: String,
    pub structure: Structure,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The header row of a generated paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperHeader {
    pub id: PaperId,
    pub course_id: CourseId,
    pub blueprint_id: BlueprintId,
    pub exam_type: ExamType,
    pub generated_at: DateTime<Utc>,
}

/// One question placed on a paper.
///
/// Part A uses positions 1..=5 without a label. Part B uses the group number
/// (6..=9) as position and a letter to tell the alternatives apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub question_id: QuestionId,
    pub position: u8,
    #[serde(default)]
    pub option_label: Option<char>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_type_display_and_parse() {
        assert_eq!(ExamType::MidTerm.to_string(), "mid_term");
        assert_eq!(ExamType::Final.to_string(), "final");
        assert_eq!("mid_term".parse::<ExamType>().unwrap(), ExamType::MidTerm);
        assert_eq!("final".parse::<ExamType>().unwrap(), ExamType::Final);
        assert!("quiz".parse::<ExamType>().is_err());
        assert!("Final".parse::<ExamType>().is_err());
    }

    #[test]
    fn exam_type_serializes_snake_case() {
        let json = serde_json::to_string(&ExamType::MidTerm).unwrap();
        assert_eq!(json, "\"mid_term\"");
    }

    #[test]
    fn placement_label_defaults_to_none() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"question_id":"{id}","position":3}}"#);
        let placement: Placement = serde_json::from_str(&json).unwrap();
        assert_eq!(placement.position, 3);
        assert!(placement.option_label.is_none());
    }

    #[test]
    fn question_defaults_informational_tags() {
        let json = format!(
            r#"{{"id":"{}","course_id":"{}","text":"Define a stack.","marks":2,"unit_id":"{}","created_at":"2024-01-01T00:00:00Z"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let q: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(q.kind, QuestionKind::ShortAnswer);
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert!(q.outcome_ids.is_empty());
    }
}
