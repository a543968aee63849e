//! Superseded-by reference resolution.
//!
//! The three redirecting kinds (curricula, educational subjects, subject
//! codes) may point at retired records whose `erstattes-av` edges name the
//! live replacement. Resolution follows those edges until a published record
//! is found. Purely read-only: safe to call concurrently and re-entrantly
//! while another kind's batch is in flight.

use std::collections::BTreeSet;

use futures::future::BoxFuture;
use kl06_core::{
  Error, Result, entity::EntityKind, record::RefEntry, status::Status,
};
use kl06_records::raw::RawResolvable;
use tracing::warn;

use crate::layout::DumpLayout;

pub struct Resolver<'a> {
  layout: &'a DumpLayout,
}

impl<'a> Resolver<'a> {
  pub fn new(layout: &'a DumpLayout) -> Self { Self { layout } }

  /// Resolve `code` to a currently published record of `kind`.
  ///
  /// Published records resolve to themselves. Retired records recurse
  /// through their `erstattes-av` edges in list order; the first edge that
  /// reaches a published record wins. Any other status, an unreadable or
  /// unparsable file, or a supersession cycle yields `None` — logged, never
  /// an error for the caller.
  pub async fn resolve(
    &self,
    kind: EntityKind,
    code: &str,
  ) -> Option<RefEntry> {
    let mut visited = BTreeSet::new();
    self.resolve_inner(kind, code, &mut visited).await
  }

  fn resolve_inner<'b>(
    &'b self,
    kind: EntityKind,
    code: &'b str,
    visited: &'b mut BTreeSet<String>,
  ) -> BoxFuture<'b, Option<RefEntry>> {
    Box::pin(async move {
      if !visited.insert(code.to_string()) {
        warn!(%kind, %code, "supersession cycle, reference left unresolved");
        return None;
      }

      let raw = match self.read(kind, code).await {
        Ok(raw) => raw,
        Err(err) => {
          warn!(error = %err, "reference left unresolved");
          return None;
        }
      };

      match raw.status.as_deref().and_then(Status::from_raw) {
        Some(Status::Published) => Some(RefEntry {
          code:  raw.kode,
          title: raw.tittel.assemble(),
        }),
        Some(Status::Retired) => {
          for edge in &raw.erstattes_av {
            if let Some(next) = edge.kode.as_deref()
              && let Some(hit) =
                self.resolve_inner(kind, next, visited).await
            {
              return Some(hit);
            }
          }
          None
        }
        _ => None,
      }
    })
  }

  async fn read(&self, kind: EntityKind, code: &str) -> Result<RawResolvable> {
    let path = self.layout.record_path(kind, code);
    let data = tokio::fs::read_to_string(&path).await.map_err(|e| {
      Error::UnreadableReference {
        kind,
        code: code.to_string(),
        reason: e.to_string(),
      }
    })?;
    serde_json::from_str(&data).map_err(|e| Error::UnreadableReference {
      kind,
      code: code.to_string(),
      reason: e.to_string(),
    })
  }
}
