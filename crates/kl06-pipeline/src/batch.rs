//! Bounded-concurrency batch execution over one kind's directory.

use std::{
  collections::{BTreeMap, btree_map::Entry},
  future::Future,
  path::Path,
};

use futures::{StreamExt, stream};
use kl06_core::{
  Error, Result, entity::EntityKind, record::JoinRecord, snapshot::RunReport,
};
use tracing::warn;

/// In-flight file ceiling when the caller does not override it.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// The result of processing one dump file.
pub(crate) enum FileOutcome<T> {
  Published {
    code:   String,
    record: T,
    joins:  Vec<JoinRecord>,
  },
  Excluded,
}

/// Run `f` over every `.json` file in `dir`, at most `concurrency` files in
/// flight. `buffer_unordered` yields outcomes in I/O-completion order, so
/// each outcome is tagged with its position in the sorted file listing and
/// the vector is restored to that order before it is returned — the fold's
/// "first" is always the lexicographically first path, independent of read
/// timing. Per-file errors are carried through in the result vector so the
/// fold can apply the recovery policy in one place.
pub(crate) async fn process_dir<T, F, Fut>(
  dir: &Path,
  kind: EntityKind,
  concurrency: usize,
  f: F,
) -> Result<Vec<Result<FileOutcome<T>>>>
where
  F: Fn(String, String) -> Fut,
  Fut: Future<Output = Result<FileOutcome<T>>>,
{
  let mut files = Vec::new();
  let mut entries = tokio::fs::read_dir(dir).await?;
  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    if path.extension().is_some_and(|ext| ext == "json") {
      files.push(path);
    }
  }
  files.sort();

  let f = &f;
  let mut results = stream::iter(files.into_iter().enumerate())
    .map(|(position, path)| async move {
      let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_default();
      let outcome = match tokio::fs::read_to_string(&path).await {
        Ok(data) => f(file, data).await,
        Err(e) => Err(Error::MalformedRecord {
          kind,
          file,
          reason: e.to_string(),
        }),
      };
      (position, outcome)
    })
    .buffer_unordered(concurrency.max(1))
    .collect::<Vec<_>>()
    .await;
  results.sort_by_key(|(position, _)| *position);
  Ok(results.into_iter().map(|(_, outcome)| outcome).collect())
}

/// Fold file outcomes into the kind's result map, keyed by code with
/// first-write-wins on collisions. Outcomes arrive in sorted path order, so
/// on a code collision the lexicographically first file's record survives.
/// Per-file errors are logged and counted; anything else escalates out of
/// the batch.
pub(crate) fn fold_outcomes<T>(
  kind: EntityKind,
  outcomes: Vec<Result<FileOutcome<T>>>,
  report: &mut RunReport,
) -> Result<(BTreeMap<String, T>, Vec<JoinRecord>)> {
  let mut map = BTreeMap::new();
  let mut joins = Vec::new();
  let stats = report.kind_mut(kind);
  stats.files_seen += outcomes.len();

  for outcome in outcomes {
    match outcome {
      Ok(FileOutcome::Published {
        code,
        record,
        joins: file_joins,
      }) => match map.entry(code) {
        Entry::Vacant(slot) => {
          slot.insert(record);
          stats.published += 1;
          joins.extend(file_joins);
        }
        Entry::Occupied(slot) => {
          warn!(%kind, code = %slot.key(), "duplicate code, keeping first record");
          stats.duplicates += 1;
        }
      },
      Ok(FileOutcome::Excluded) => stats.excluded += 1,
      Err(err) if err.is_per_file() => {
        warn!(%kind, error = %err, "skipping file");
        stats.skipped += 1;
      }
      Err(err) => return Err(err),
    }
  }
  Ok((map, joins))
}
