//! Publication status.

use serde::{Deserialize, Serialize};

/// URI namespace prefix carried by every raw status value.
pub const STATUS_URI_PREFIX: &str =
  "https://data.udir.no/kl06/v201906/status/status_";

/// The lifecycle status of a dataset entity.
///
/// Only [`Published`](Status::Published) entities appear in output. Retired
/// entities are still read during reference resolution: their superseded-by
/// edges are the mechanism for finding a live target.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Published,
  Retired,
  PendingRevision,
  Invalid,
  InProgress,
}

impl Status {
  /// Normalize a raw status value by stripping the URI prefix. Accepts the
  /// bare value too. Unknown values map to `None` and the record is excluded
  /// from the published set.
  pub fn from_raw(raw: &str) -> Option<Status> {
    let bare = raw.strip_prefix(STATUS_URI_PREFIX).unwrap_or(raw);
    match bare {
      "publisert" => Some(Status::Published),
      "utgaatt" => Some(Status::Retired),
      "til_revidering" => Some(Status::PendingRevision),
      "ugyldig" => Some(Status::Invalid),
      "under_arbeid" => Some(Status::InProgress),
      _ => None,
    }
  }

  pub fn is_published(self) -> bool { matches!(self, Status::Published) }

  pub fn is_retired(self) -> bool { matches!(self, Status::Retired) }
}

/// Whether a raw status field (as found on reference edges) marks the edge
/// as published.
pub fn raw_is_published(raw: Option<&str>) -> bool {
  raw
    .and_then(Status::from_raw)
    .is_some_and(Status::is_published)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_uri_prefix() {
    let raw = format!("{STATUS_URI_PREFIX}publisert");
    assert_eq!(Status::from_raw(&raw), Some(Status::Published));
  }

  #[test]
  fn accepts_bare_values() {
    assert_eq!(Status::from_raw("utgaatt"), Some(Status::Retired));
    assert_eq!(
      Status::from_raw("til_revidering"),
      Some(Status::PendingRevision)
    );
    assert_eq!(Status::from_raw("ugyldig"), Some(Status::Invalid));
    assert_eq!(Status::from_raw("under_arbeid"), Some(Status::InProgress));
  }

  #[test]
  fn unknown_maps_to_none() {
    assert_eq!(Status::from_raw("slettet"), None);
    assert_eq!(Status::from_raw(""), None);
  }
}
