//! Run output: the normalized snapshot and its per-kind report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  entity::EntityKind,
  record::{
    CompetenceGoal, CompetenceGoalSet, Curriculum, EducationalSubject,
    JoinRecord, SubjectCode,
  },
};

/// The complete output of one run over a dump: the five published record
/// collections plus the synthesized subject join, each sorted by natural key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
  pub subject_codes:        Vec<SubjectCode>,
  pub educational_subjects: Vec<EducationalSubject>,
  pub curricula:            Vec<Curriculum>,
  pub competence_goal_sets: Vec<CompetenceGoalSet>,
  pub competence_goals:     Vec<CompetenceGoal>,
  pub subject_joins:        Vec<JoinRecord>,
}

impl Snapshot {
  pub fn record_count(&self, kind: EntityKind) -> Option<usize> {
    match kind {
      EntityKind::SubjectCode => Some(self.subject_codes.len()),
      EntityKind::EducationalSubject => Some(self.educational_subjects.len()),
      EntityKind::Curriculum => Some(self.curricula.len()),
      EntityKind::CompetenceGoalSet => Some(self.competence_goal_sets.len()),
      EntityKind::CompetenceGoal => Some(self.competence_goals.len()),
      EntityKind::CrossCurricularTheme | EntityKind::CoreSubject => None,
    }
  }

  pub fn total_records(&self) -> usize {
    EntityKind::EMITTED
      .iter()
      .filter_map(|kind| self.record_count(*kind))
      .sum()
  }
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Counters for one entity kind in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindReport {
  /// Dump files read for this kind.
  pub files_seen: usize,
  /// Records that survived normalization with `Published` status.
  pub published:  usize,
  /// Records read successfully but excluded by status or type filters.
  pub excluded:   usize,
  /// Files skipped after a recoverable per-file error.
  pub skipped:    usize,
  /// Records discarded because an earlier file already claimed their code.
  pub duplicates: usize,
}

/// Per-kind counters for a whole run, for operator logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
  pub kinds:     BTreeMap<EntityKind, KindReport>,
  pub join_rows: usize,
}

impl RunReport {
  pub fn kind_mut(&mut self, kind: EntityKind) -> &mut KindReport {
    self.kinds.entry(kind).or_default()
  }

  /// Total files skipped across all kinds.
  pub fn total_skipped(&self) -> usize {
    self.kinds.values().map(|r| r.skipped).sum()
  }
}
