//! Blueprint documents: structural validation and the typed exam layout.
//!
//! A blueprint arrives as a loosely typed document (JSON or TOML). The
//! validator walks it and reports every violation in one pass; only a
//! document with no violations can become a [`Structure`].
//!
//! The exam format is fixed: Part A is always five 2-mark
//! questions testing outcomes 1 through 5 in order, and Part B is always four
//! groups of two alternatives.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::BlueprintError;

/// Number of Part A slots.
pub const PART_A_SLOTS: u8 = 5;
/// Mark value of every Part A slot.
pub const PART_A_MARKS: u32 = 2;
/// Number of Part B groups.
pub const PART_B_GROUPS: usize = 4;
/// Mark values a Part B group may carry.
pub const PART_B_MARKS: [u32; 3] = [5, 6, 8];
/// Alternatives offered per Part B group.
pub const PART_B_OPTIONS: usize = 2;
/// Highest course outcome number.
pub const MAX_OUTCOME: u8 = 6;

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 255;

/// The validated layout of an exam paper.
///
/// Deserializing runs the full validator; serializing produces the document
/// shape, including Part A's fixed `num_questions` and `co_distribution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Structure {
    part_a: PartA,
    part_b: Vec<PartBGroup>,
}

/// Part A: five single-answer slots; slot `i` tests outcome `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartA {
    marks: u32,
}

/// One Part A slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartASlot {
    /// Paper position (1..=5).
    pub position: u8,
    /// Outcome number the question must be tagged with.
    pub co: u8,
}

impl PartA {
    /// Mark value shared by every slot.
    pub fn marks(&self) -> u32 {
        self.marks
    }

    /// Slots in paper order.
    pub fn slots(&self) -> impl Iterator<Item = PartASlot> {
        (1..=PART_A_SLOTS).map(|n| PartASlot { position: n, co: n })
    }
}

/// A Part B group: `num_options` alternatives on one outcome and mark value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartBGroup {
    /// Question number on the paper (6..=9).
    pub group: u8,
    pub marks: u32,
    /// Outcome number every alternative must be tagged with.
    pub co: u8,
    pub num_options: usize,
}

impl Structure {
    /// Validate a structure document and build the typed layout.
    pub fn parse(doc: &Value) -> Result<Self, BlueprintError> {
        let violations = validate_structure(doc);
        if !violations.is_empty() {
            return Err(BlueprintError { violations });
        }

        // Every field below has just been checked.
        let marks = doc["part_a"]["marks"]
            .as_f64()
            .map(|m| m as u32)
            .unwrap_or(PART_A_MARKS);
        let part_b = doc["part_b"]
            .as_array()
            .map(|groups| {
                groups
                    .iter()
                    .map(|g| PartBGroup {
                        group: as_integer(&g["group"]).unwrap_or_default() as u8,
                        marks: as_integer(&g["marks"]).unwrap_or_default() as u32,
                        co: as_integer(&g["co"]).unwrap_or_default() as u8,
                        num_options: as_integer(&g["num_options"]).unwrap_or_default() as usize,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Structure {
            part_a: PartA { marks },
            part_b,
        })
    }

    /// Build a structure from its parts, running the same checks as [`Structure::parse`].
    pub fn new(part_a_marks: u32, part_b: Vec<PartBGroup>) -> Result<Self, BlueprintError> {
        Self::parse(&document(part_a_marks, &part_b))
    }

    /// The layout used when no blueprint has been authored yet.
    pub fn default_layout() -> Self {
        Structure {
            part_a: PartA {
                marks: PART_A_MARKS,
            },
            part_b: vec![
                PartBGroup { group: 6, marks: 8, co: 1, num_options: PART_B_OPTIONS },
                PartBGroup { group: 7, marks: 8, co: 2, num_options: PART_B_OPTIONS },
                PartBGroup { group: 8, marks: 6, co: 5, num_options: PART_B_OPTIONS },
                PartBGroup { group: 9, marks: 5, co: 6, num_options: PART_B_OPTIONS },
            ],
        }
    }

    pub fn part_a(&self) -> &PartA {
        &self.part_a
    }

    /// Part B groups as listed in the document.
    pub fn part_b(&self) -> &[PartBGroup] {
        &self.part_b
    }

    /// Part B groups in ascending group number, the order they are filled in.
    pub fn groups_in_order(&self) -> Vec<PartBGroup> {
        let mut groups = self.part_b.clone();
        groups.sort_by_key(|g| g.group);
        groups
    }

    /// Total number of questions a paper built from this layout contains.
    pub fn question_count(&self) -> usize {
        PART_A_SLOTS as usize + self.part_b.iter().map(|g| g.num_options).sum::<usize>()
    }
}

impl TryFrom<Value> for Structure {
    type Error = BlueprintError;

    fn try_from(doc: Value) -> Result<Self, Self::Error> {
        Structure::parse(&doc)
    }
}

impl From<Structure> for Value {
    fn from(structure: Structure) -> Self {
        document(structure.part_a.marks, &structure.part_b)
    }
}

fn document(part_a_marks: u32, part_b: &[PartBGroup]) -> Value {
    let distribution: Vec<u8> = (1..=PART_A_SLOTS).collect();
    json!({
        "part_a": {
            "num_questions": PART_A_SLOTS,
            "marks": part_a_marks,
            "co_distribution": distribution,
        },
        "part_b": part_b,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a full blueprint document (`{ "name": ..., "structure": ... }`).
///
/// Returns every violation found; an empty list means the document is valid.
pub fn validate_blueprint(doc: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let name = doc.get("name");
    if is_missing(name) {
        errors.push("Blueprint name is required".to_string());
    } else if let Some(name) = name.and_then(Value::as_str) {
        let len = name.trim().chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
            errors.push("Blueprint name must be between 3 and 255 characters".to_string());
        }
    } else {
        errors.push("Blueprint name must be a string".to_string());
    }

    let structure = doc.get("structure");
    if is_missing(structure) {
        errors.push("Blueprint structure is required".to_string());
    } else if let Some(structure) = structure.filter(|s| s.is_object()) {
        errors.extend(validate_structure(structure));
    } else {
        errors.push("Blueprint structure must be an object".to_string());
    }

    errors
}

/// Validate a structure document on its own.
pub fn validate_structure(structure: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if !structure.is_object() {
        errors.push("Blueprint structure must be an object".to_string());
        return errors;
    }

    let part_a = structure.get("part_a");
    match part_a {
        Some(part_a) if !is_missing(Some(part_a)) => errors.extend(validate_part_a(part_a)),
        _ => errors.push("Part A structure is required".to_string()),
    }

    let part_b = structure.get("part_b");
    if is_missing(part_b) {
        errors.push("Part B structure is required".to_string());
    } else if let Some(groups) = part_b.and_then(Value::as_array) {
        if groups.len() != PART_B_GROUPS {
            errors.push("Part B must have exactly 4 question groups".to_string());
        } else {
            for (index, group) in groups.iter().enumerate() {
                errors.extend(validate_part_b_group(group, index + 1));
            }
            errors.extend(duplicate_groups(groups));
        }
    } else {
        errors.push("Part B must be an array".to_string());
    }

    errors
}

fn validate_part_a(part_a: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if !part_a.is_object() {
        errors.push("Part A must be an object".to_string());
        return errors;
    }

    let num_questions = part_a.get("num_questions");
    if is_missing(num_questions) {
        errors.push("Part A: num_questions is required".to_string());
    } else if num_questions.and_then(as_integer) != Some(i64::from(PART_A_SLOTS)) {
        errors.push("Part A: num_questions must be 5".to_string());
    }

    let marks = part_a.get("marks");
    if is_missing(marks) {
        errors.push("Part A: marks is required".to_string());
    } else if marks.and_then(as_integer) != Some(i64::from(PART_A_MARKS)) {
        errors.push("Part A: marks must be 2".to_string());
    }

    let distribution = part_a.get("co_distribution");
    if is_missing(distribution) {
        errors.push("Part A: co_distribution is required".to_string());
    } else if let Some(cos) = distribution.and_then(Value::as_array) {
        if cos.len() != PART_A_SLOTS as usize {
            errors.push("Part A: co_distribution must have 5 COs (1-5)".to_string());
        } else {
            for (index, co) in cos.iter().enumerate() {
                let expected = index as i64 + 1;
                if as_integer(co) != Some(expected) {
                    errors.push(format!(
                        "Part A: co_distribution[{index}] must be {expected}"
                    ));
                }
            }
        }
    } else {
        errors.push("Part A: co_distribution must be an array".to_string());
    }

    errors
}

fn validate_part_b_group(group: &Value, n: usize) -> Vec<String> {
    let mut errors = Vec::new();

    if is_missing(Some(group)) {
        errors.push(format!("Part B Group {n}: group is missing"));
        return errors;
    }
    if !group.is_object() {
        errors.push(format!("Part B Group {n}: must be an object"));
        return errors;
    }

    let number = group.get("group");
    if is_missing(number) {
        errors.push(format!("Part B Group {n}: group is required"));
    } else if !number.is_some_and(Value::is_number) {
        errors.push(format!("Part B Group {n}: group must be a number"));
    } else if !number
        .and_then(as_integer)
        .is_some_and(|g| (6..=9).contains(&g))
    {
        errors.push(format!("Part B Group {n}: group must be between 6 and 9"));
    }

    let marks = group.get("marks");
    if is_missing(marks) {
        errors.push(format!("Part B Group {n}: marks is required"));
    } else if !marks.is_some_and(Value::is_number) {
        errors.push(format!("Part B Group {n}: marks must be a number"));
    } else if !marks
        .and_then(as_integer)
        .is_some_and(|m| PART_B_MARKS.iter().any(|&allowed| i64::from(allowed) == m))
    {
        errors.push(format!("Part B Group {n}: marks must be 5, 6, or 8"));
    }

    let options = group.get("num_options");
    if is_missing(options) {
        errors.push(format!("Part B Group {n}: num_options is required"));
    } else if options.and_then(as_integer) != Some(PART_B_OPTIONS as i64) {
        errors.push(format!("Part B Group {n}: num_options must be 2"));
    }

    let co = group.get("co");
    if is_missing(co) {
        errors.push(format!("Part B Group {n}: co is required"));
    } else if !co.is_some_and(Value::is_number) {
        errors.push(format!("Part B Group {n}: co must be a number"));
    } else if !co
        .and_then(as_integer)
        .is_some_and(|c| (1..=i64::from(MAX_OUTCOME)).contains(&c))
    {
        errors.push(format!("Part B Group {n}: co must be between 1 and 6"));
    }

    errors
}

/// Two groups sharing a number would collide on paper positions.
fn duplicate_groups(groups: &[Value]) -> Vec<String> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for number in groups.iter().filter_map(|g| g.get("group").and_then(as_integer)) {
        *counts.entry(number).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(number, _)| {
            format!("Part B: group numbers must be unique (duplicate group {number})")
        })
        .collect()
}

/// Absent, `null`, `false`, `0` and `""` all count as missing.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Whole numbers only; `5.0` counts, `5.5` and `"5"` do not.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

/// Read a blueprint document from a `.json` or `.toml` file.
///
/// The document is returned unvalidated so callers can report every
/// violation with [`validate_blueprint`].
pub fn read_blueprint_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read blueprint file: {}", path.display()))?;

    parse_blueprint_str(&content, path)
}

/// Parse blueprint text, choosing the format from the file extension.
pub fn parse_blueprint_str(content: &str, source_path: &Path) -> Result<Value> {
    if source_path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str::<Value>(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
    } else {
        serde_json::from_str::<Value>(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))
    }
}
