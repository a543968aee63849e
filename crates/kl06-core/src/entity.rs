//! Entity kinds of the Grep/KL06 dataset.

use serde::{Deserialize, Serialize};

/// The kind of record a dump file describes.
///
/// [`CrossCurricularTheme`](EntityKind::CrossCurricularTheme) and
/// [`CoreSubject`](EntityKind::CoreSubject) are reference-only: they are read
/// while assembling competence goals but never independently emitted.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  SubjectCode,
  EducationalSubject,
  Curriculum,
  CompetenceGoalSet,
  CompetenceGoal,
  CrossCurricularTheme,
  CoreSubject,
}

impl EntityKind {
  /// The five kinds that produce output records, in processing order.
  /// Later kinds read the staged directories of earlier ones.
  pub const EMITTED: [EntityKind; 5] = [
    EntityKind::SubjectCode,
    EntityKind::EducationalSubject,
    EntityKind::Curriculum,
    EntityKind::CompetenceGoalSet,
    EntityKind::CompetenceGoal,
  ];
}

impl std::fmt::Display for EntityKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::SubjectCode => "subject code",
      Self::EducationalSubject => "educational subject",
      Self::Curriculum => "curriculum",
      Self::CompetenceGoalSet => "competence goal set",
      Self::CompetenceGoal => "competence goal",
      Self::CrossCurricularTheme => "cross-curricular theme",
      Self::CoreSubject => "core subject",
    };
    f.write_str(name)
  }
}
