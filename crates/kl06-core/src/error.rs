//! Error taxonomy shared across the normalizer, resolver, assembler, and
//! batch orchestrator.
//!
//! Recovery policy: `MalformedRecord` and `UnreadableReference` are isolated
//! to the file or reference they describe; `UnexpectedReferenceShape` aborts
//! the batch it occurs in; `MissingSourceDirectory` aborts the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed {kind} record in {file}: {reason}")]
  MalformedRecord {
    kind:   EntityKind,
    file:   String,
    reason: String,
  },

  #[error("unreadable {kind} reference {code}: {reason}")]
  UnreadableReference {
    kind:   EntityKind,
    code:   String,
    reason: String,
  },

  #[error("unexpected reference shape on {kind} {code}: {detail}")]
  UnexpectedReferenceShape {
    kind:   EntityKind,
    code:   String,
    detail: String,
  },

  #[error("missing source directory for {kind}: {path}")]
  MissingSourceDirectory { kind: EntityKind, path: PathBuf },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether this error is confined to a single file's unit of work.
  /// Recoverable errors are logged and the file excluded; everything else
  /// escalates out of the batch.
  pub fn is_per_file(&self) -> bool {
    matches!(
      self,
      Self::MalformedRecord { .. } | Self::UnreadableReference { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
