//! The `SnapshotSink` trait.
//!
//! Implemented by persistence backends (e.g. `kl06-store-sqlite`). The
//! pipeline and CLI depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  record::{
    CompetenceGoal, CompetenceGoalSet, Curriculum, EducationalSubject,
    JoinRecord, SubjectCode,
  },
  snapshot::Snapshot,
};

/// Abstraction over a snapshot persistence backend.
///
/// Writes are whole-collection replacements: each method replaces the
/// backend's previous contents for that kind, so re-running a dump is
/// idempotent. All methods return `Send` futures so the trait can be used
/// from multi-threaded async runtimes.
pub trait SnapshotSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn write_subject_codes<'a>(
    &'a self,
    records: &'a [SubjectCode],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn write_educational_subjects<'a>(
    &'a self,
    records: &'a [EducationalSubject],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn write_curricula<'a>(
    &'a self,
    records: &'a [Curriculum],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn write_competence_goal_sets<'a>(
    &'a self,
    records: &'a [CompetenceGoalSet],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn write_competence_goals<'a>(
    &'a self,
    records: &'a [CompetenceGoal],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn write_subject_joins<'a>(
    &'a self,
    rows: &'a [JoinRecord],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Persist a whole snapshot in dependency order.
pub async fn write_snapshot<S: SnapshotSink>(
  sink: &S,
  snapshot: &Snapshot,
) -> Result<(), S::Error> {
  sink.write_subject_codes(&snapshot.subject_codes).await?;
  sink
    .write_educational_subjects(&snapshot.educational_subjects)
    .await?;
  sink.write_curricula(&snapshot.curricula).await?;
  sink
    .write_competence_goal_sets(&snapshot.competence_goal_sets)
    .await?;
  sink.write_competence_goals(&snapshot.competence_goals).await?;
  sink.write_subject_joins(&snapshot.subject_joins).await?;
  Ok(())
}
