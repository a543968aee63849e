//! Run orchestration: the five kind batches in dependency order.
//!
//! Later kinds read into the directories of earlier ones (the assembler's
//! resolver and walks), so the order is fixed: subject codes, educational
//! subjects, curricula, goal sets, goals. All per-batch state lives in the
//! returned [`Snapshot`]; nothing is shared mutably between batches.

use std::collections::BTreeSet;

use kl06_core::{
  Result,
  entity::EntityKind,
  record::JoinRecord,
  snapshot::{RunReport, Snapshot},
};
use kl06_records::{
  Normalized, normalize_competence_goal, normalize_competence_goal_set,
  normalize_curriculum, normalize_educational_subject,
  normalize_subject_code,
};
use tracing::info;

use crate::{
  assembler::Assembler,
  batch::{self, DEFAULT_CONCURRENCY, FileOutcome},
  layout::DumpLayout,
};

pub struct Pipeline {
  layout:      DumpLayout,
  concurrency: usize,
}

impl Pipeline {
  pub fn new(layout: DumpLayout) -> Self {
    Self {
      layout,
      concurrency: DEFAULT_CONCURRENCY,
    }
  }

  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = concurrency;
    self
  }

  /// Process the whole dump: verify and stage the layout, run the five
  /// batches, filter the join records against the final published sets,
  /// and return the snapshot with its per-kind report.
  pub async fn run(&self) -> Result<(Snapshot, RunReport)> {
    self.layout.verify().await?;
    self.layout.stage().await?;

    let assembler = &Assembler::new(&self.layout);
    let mut report = RunReport::default();
    let mut joins: Vec<JoinRecord> = Vec::new();

    let kind = EntityKind::SubjectCode;
    let outcomes = batch::process_dir(
      &self.layout.dir(kind),
      kind,
      self.concurrency,
      |file, data| async move {
        let (normalized, file_joins) = normalize_subject_code(&file, &data)?;
        Ok(match normalized {
          Normalized::Published(record) => FileOutcome::Published {
            code: record.code.clone(),
            record,
            joins: file_joins,
          },
          Normalized::Excluded => FileOutcome::Excluded,
        })
      },
    )
    .await?;
    let (subject_codes, batch_joins) =
      batch::fold_outcomes(kind, outcomes, &mut report)?;
    joins.extend(batch_joins);
    info!(%kind, published = subject_codes.len(), "batch complete");

    let kind = EntityKind::EducationalSubject;
    let outcomes = batch::process_dir(
      &self.layout.dir(kind),
      kind,
      self.concurrency,
      |file, data| async move {
        let (normalized, file_joins) =
          normalize_educational_subject(&file, &data)?;
        Ok(match normalized {
          Normalized::Published(record) => FileOutcome::Published {
            code: record.code.clone(),
            record,
            joins: file_joins,
          },
          Normalized::Excluded => FileOutcome::Excluded,
        })
      },
    )
    .await?;
    let (educational_subjects, batch_joins) =
      batch::fold_outcomes(kind, outcomes, &mut report)?;
    joins.extend(batch_joins);
    info!(%kind, published = educational_subjects.len(), "batch complete");

    let kind = EntityKind::Curriculum;
    let outcomes = batch::process_dir(
      &self.layout.dir(kind),
      kind,
      self.concurrency,
      |file, data| async move {
        match normalize_curriculum(&file, &data)? {
          Normalized::Published(mut record) => {
            assembler.assemble_curriculum(&mut record).await;
            Ok(FileOutcome::Published {
              code:  record.code.clone(),
              record,
              joins: Vec::new(),
            })
          }
          Normalized::Excluded => Ok(FileOutcome::Excluded),
        }
      },
    )
    .await?;
    let (curricula, _) = batch::fold_outcomes(kind, outcomes, &mut report)?;
    info!(%kind, published = curricula.len(), "batch complete");

    let kind = EntityKind::CompetenceGoalSet;
    let outcomes = batch::process_dir(
      &self.layout.dir(kind),
      kind,
      self.concurrency,
      |file, data| async move {
        match normalize_competence_goal_set(&file, &data)? {
          Normalized::Published(parts) => {
            let record = assembler.assemble_goal_set(parts).await;
            Ok(FileOutcome::Published {
              code:  record.code.clone(),
              record,
              joins: Vec::new(),
            })
          }
          Normalized::Excluded => Ok(FileOutcome::Excluded),
        }
      },
    )
    .await?;
    let (competence_goal_sets, _) =
      batch::fold_outcomes(kind, outcomes, &mut report)?;
    info!(%kind, published = competence_goal_sets.len(), "batch complete");

    let kind = EntityKind::CompetenceGoal;
    let outcomes = batch::process_dir(
      &self.layout.dir(kind),
      kind,
      self.concurrency,
      |file, data| async move {
        match normalize_competence_goal(&file, &data)? {
          Normalized::Published(parts) => {
            let record = assembler.assemble_goal(parts).await?;
            Ok(FileOutcome::Published {
              code:  record.code.clone(),
              record,
              joins: Vec::new(),
            })
          }
          Normalized::Excluded => Ok(FileOutcome::Excluded),
        }
      },
    )
    .await?;
    let (competence_goals, _) =
      batch::fold_outcomes(kind, outcomes, &mut report)?;
    info!(%kind, published = competence_goals.len(), "batch complete");

    // A join row survives only when both endpoints made the published set.
    let subject_joins: Vec<JoinRecord> = joins
      .into_iter()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .filter(|join| {
        subject_codes.contains_key(&join.subject_code)
          && educational_subjects.contains_key(&join.educational_subject)
      })
      .collect();
    report.join_rows = subject_joins.len();
    info!(join_rows = report.join_rows, "subject joins filtered");

    let snapshot = Snapshot {
      subject_codes:        subject_codes.into_values().collect(),
      educational_subjects: educational_subjects.into_values().collect(),
      curricula:            curricula.into_values().collect(),
      competence_goal_sets: competence_goal_sets.into_values().collect(),
      competence_goals:     competence_goals.into_values().collect(),
      subject_joins,
    };
    Ok((snapshot, report))
  }
}
