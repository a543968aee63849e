//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Titles, labels, and arity-collapsed reference fields are stored as compact
//! JSON. Classifications are stored as the same short strings they serialize
//! to. UUIDs are stored as hyphenated lowercase strings.

use kl06_core::{
  label::Labels,
  record::{Arity, CurriculumStructure, CurriculumType},
  status::Status,
  title::Title,
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Option<Uuid>) -> Option<String> {
  id.map(|id| id.hyphenated().to_string())
}

pub fn decode_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  Ok(s.map(|s| Uuid::parse_str(&s)).transpose()?)
}

// ─── Title / labels ──────────────────────────────────────────────────────────

pub fn encode_title(title: &Title) -> Result<String> {
  Ok(serde_json::to_string(title)?)
}

pub fn decode_title(s: &str) -> Result<Title> { Ok(serde_json::from_str(s)?) }

pub fn encode_labels(labels: &Labels) -> Result<String> {
  Ok(serde_json::to_string(labels)?)
}

pub fn decode_labels(s: &str) -> Result<Labels> {
  Ok(serde_json::from_str(s)?)
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn encode_status(status: Status) -> &'static str {
  match status {
    Status::Published => "published",
    Status::Retired => "retired",
    Status::PendingRevision => "pending_revision",
    Status::Invalid => "invalid",
    Status::InProgress => "in_progress",
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "published" => Ok(Status::Published),
    "retired" => Ok(Status::Retired),
    "pending_revision" => Ok(Status::PendingRevision),
    "invalid" => Ok(Status::Invalid),
    "in_progress" => Ok(Status::InProgress),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── Curriculum classifications ──────────────────────────────────────────────

pub fn encode_structure(s: Option<CurriculumStructure>) -> Option<&'static str> {
  s.map(|s| match s {
    CurriculumStructure::Vanlig => "Vanlig",
    CurriculumStructure::Modulstrukturert => "Modulstrukturert",
  })
}

pub fn decode_structure(
  s: Option<String>,
) -> Result<Option<CurriculumStructure>> {
  match s.as_deref() {
    None => Ok(None),
    Some("Vanlig") => Ok(Some(CurriculumStructure::Vanlig)),
    Some("Modulstrukturert") => Ok(Some(CurriculumStructure::Modulstrukturert)),
    Some(other) => {
      Err(Error::Decode(format!("unknown curriculum structure: {other:?}")))
    }
  }
}

pub fn encode_curriculum_type(t: CurriculumType) -> &'static str {
  match t {
    CurriculumType::Legacy => "laereplan",
    CurriculumType::Lk20 => "laereplan_lk20",
  }
}

pub fn decode_curriculum_type(s: &str) -> Result<CurriculumType> {
  match s {
    "laereplan" => Ok(CurriculumType::Legacy),
    "laereplan_lk20" => Ok(CurriculumType::Lk20),
    other => Err(Error::Decode(format!("unknown curriculum type: {other:?}"))),
  }
}

// ─── Arity fields ────────────────────────────────────────────────────────────

/// `Arity::None` maps to SQL NULL so absent fields stay absent on the way
/// back out.
pub fn encode_arity<T: Serialize>(arity: &Arity<T>) -> Result<Option<String>> {
  if arity.is_none() {
    return Ok(None);
  }
  Ok(Some(serde_json::to_string(arity)?))
}

pub fn decode_arity<T: DeserializeOwned>(
  s: Option<String>,
) -> Result<Arity<T>> {
  match s {
    None => Ok(Arity::None),
    Some(s) => Ok(serde_json::from_str(&s)?),
  }
}
