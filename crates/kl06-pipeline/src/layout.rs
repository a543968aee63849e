//! Dump directory layout.
//!
//! Maps entity kinds to the extracted dump's directory names, and stages the
//! three kinds that span two dataset generations into combined directories
//! so downstream code (and cross-file reference reads) see one directory per
//! kind. Staging copies; the extracted sources are left untouched.

use std::path::{Path, PathBuf};

use kl06_core::{Error, Result, entity::EntityKind};
use tracing::debug;

/// The three kinds whose files live in two generation directories and are
/// staged into one.
const STAGED: [EntityKind; 3] = [
  EntityKind::Curriculum,
  EntityKind::CompetenceGoalSet,
  EntityKind::CompetenceGoal,
];

/// An extracted dump on disk.
#[derive(Debug, Clone)]
pub struct DumpLayout {
  root: PathBuf,
}

impl DumpLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  /// The dump directory name(s) a kind's files are extracted into.
  pub fn source_dirs(kind: EntityKind) -> &'static [&'static str] {
    match kind {
      EntityKind::SubjectCode => &["fagkoder"],
      EntityKind::EducationalSubject => &["opplaeringsfag"],
      EntityKind::Curriculum => &["laereplaner", "laereplaner-LK20"],
      EntityKind::CompetenceGoalSet => {
        &["kompetansemaalsett", "kompetansemaalsett-lk20"]
      }
      EntityKind::CompetenceGoal => &["kompetansemaal", "kompetansemaal-lk20"],
      EntityKind::CrossCurricularTheme => &["tverrfaglige-temaer-lk20"],
      EntityKind::CoreSubject => &["kjerneelementer-lk20"],
    }
  }

  /// The directory a kind is read from: the combined staging directory for
  /// two-generation kinds, the single source directory otherwise.
  pub fn dir(&self, kind: EntityKind) -> PathBuf {
    let name = match kind {
      EntityKind::Curriculum => "curricula",
      EntityKind::CompetenceGoalSet => "competence_goal_sets",
      EntityKind::CompetenceGoal => "competence_goals",
      other => Self::source_dirs(other)[0],
    };
    self.root.join(name)
  }

  /// Path of one record's file within its kind's read directory.
  pub fn record_path(&self, kind: EntityKind, code: &str) -> PathBuf {
    self.dir(kind).join(format!("{code}.json"))
  }

  /// Fail fast if any emitted kind's source directory is missing. The
  /// reference-only kinds are not required; their absence only leaves
  /// theme and core-element references unresolved.
  pub async fn verify(&self) -> Result<()> {
    for kind in EntityKind::EMITTED {
      for name in Self::source_dirs(kind) {
        let path = self.root.join(name);
        if !tokio::fs::try_exists(&path).await? {
          return Err(Error::MissingSourceDirectory { kind, path });
        }
      }
    }
    Ok(())
  }

  /// Stage the two-generation kinds into their combined directories.
  /// Re-staging over an existing combined directory overwrites file by
  /// file, so a re-run over the same dump is idempotent.
  pub async fn stage(&self) -> Result<()> {
    for kind in STAGED {
      let combined = self.dir(kind);
      tokio::fs::create_dir_all(&combined).await?;

      let mut copied = 0usize;
      for name in Self::source_dirs(kind) {
        let source = self.root.join(name);
        let mut entries = tokio::fs::read_dir(&source).await?;
        while let Some(entry) = entries.next_entry().await? {
          let path = entry.path();
          if path.extension().is_some_and(|ext| ext == "json")
            && let Some(file_name) = path.file_name()
          {
            tokio::fs::copy(&path, combined.join(file_name)).await?;
            copied += 1;
          }
        }
      }
      debug!(%kind, copied, "staged combined directory");
    }
    Ok(())
  }
}
