//! Canonical records — the output shapes of the normalizer.
//!
//! Every record is keyed by its `code` (the natural key of the dataset) and
//! carries only `Published` status by the time it reaches a result
//! collection; non-published records are computed transiently and discarded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{label::Labels, status::Status, title::Title};

// ─── Arity ───────────────────────────────────────────────────────────────────

/// Arity-collapsed field: absent when no published member exists, a scalar
/// when exactly one does, a list when more than one.
///
/// Serializes untagged — `None` as `null`, `One` as the bare value, `Many`
/// as an array — matching the dataset's own single-or-array convention.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum Arity<T> {
  #[default]
  None,
  One(T),
  Many(Vec<T>),
}

impl<T> Arity<T> {
  /// Collapse a list of published members into the canonical arity.
  pub fn from_vec(mut values: Vec<T>) -> Self {
    match values.len() {
      0 => Self::None,
      1 => Self::One(values.remove(0)),
      _ => Self::Many(values),
    }
  }

  pub fn is_none(&self) -> bool { matches!(self, Self::None) }

  pub fn len(&self) -> usize {
    match self {
      Self::None => 0,
      Self::One(_) => 1,
      Self::Many(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    match self {
      Self::None => [].iter(),
      Self::One(v) => std::slice::from_ref(v).iter(),
      Self::Many(v) => v.iter(),
    }
  }
}

// ─── Reference shapes ────────────────────────────────────────────────────────

/// A resolved reference to another entity: its natural key and canonical
/// title. This is the only form in which cross-entity references appear in
/// output — an unresolvable reference is omitted, never null-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntry {
  pub code:  String,
  pub title: Title,
}

/// A year-level entry. The wire wrapper key is preserved in output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearLevel {
  #[serde(rename = "Year Level")]
  pub year: String,
}

/// One row of the many-to-many join between subject codes and educational
/// subjects. Exists only when both endpoints are published.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
pub struct JoinRecord {
  pub subject_code:        String,
  pub educational_subject: String,
}

// ─── Curriculum classifications ──────────────────────────────────────────────

/// Structure classification of a curriculum document.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum CurriculumStructure {
  Vanlig,
  Modulstrukturert,
}

impl CurriculumStructure {
  pub fn from_raw(raw: &str) -> Option<Self> {
    match raw {
      "Vanlig" => Some(Self::Vanlig),
      "Modulstrukturert" => Some(Self::Modulstrukturert),
      _ => None,
    }
  }
}

/// Which historical dataset generation a curriculum (or goal set / goal)
/// belongs to. Decoded once from the record's ontology type tag.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum CurriculumType {
  #[serde(rename = "laereplan")]
  Legacy,
  #[serde(rename = "laereplan_lk20")]
  Lk20,
}

// ─── Canonical records ───────────────────────────────────────────────────────

/// A school-subject code (`fagkoder/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectCode {
  pub id:              Option<Uuid>,
  pub code:            String,
  pub title:           Title,
  pub status:          Status,
  pub last_changed:    Option<String>,
  pub labels:          Labels,
  pub subject_type:    Option<String>,
  pub education_level: Option<String>,
}

/// A broader subject grouping (`opplaeringsfag/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationalSubject {
  pub id:           Option<Uuid>,
  pub code:         String,
  pub title:        Title,
  pub status:       Status,
  pub last_changed: Option<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub subject_type: Arity<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub education_level: Arity<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub year_level: Arity<YearLevel>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub subject_code_reference: Arity<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub curriculum_reference: Arity<String>,
}

/// A named curriculum document (`laereplaner/` + `laereplaner-LK20/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
  pub code:                 String,
  pub title:                Title,
  pub status:               Status,
  pub last_changed:         Option<String>,
  pub curriculum_structure: Option<CurriculumStructure>,
  pub curriculum_type:      CurriculumType,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub subject_type: Arity<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub competence_goal_set_reference: Arity<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub educational_subject_reference: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub subject_code_reference: Arity<RefEntry>,
}

/// A grouping of competence goals (`kompetansemaalsett/` +
/// `kompetansemaalsett-lk20/`). Subject-code references are reached
/// transitively through its member educational subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetenceGoalSet {
  pub code:         String,
  pub title:        Title,
  pub status:       Status,
  pub last_changed: Option<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub competence_goal_reference: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub educational_subject_reference: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub subject_code_reference: Arity<RefEntry>,
}

/// The leaf unit (`kompetansemaal/` + `kompetansemaal-lk20/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetenceGoal {
  pub code:         String,
  pub title:        Title,
  pub status:       Status,
  pub last_changed: Option<String>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub competence_goal_set_reference: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub curriculum_reference: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub connected_cross_curricular_themes: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub connected_core_subjects: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub educational_subject_reference: Arity<RefEntry>,
  #[serde(default, skip_serializing_if = "Arity::is_none")]
  pub subject_code_reference: Arity<RefEntry>,
}
