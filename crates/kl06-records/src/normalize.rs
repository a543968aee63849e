//! Per-record normalization: one raw dump file in, one canonical record out.
//!
//! Pipeline per file:
//!   raw &str
//!     └─ decode()              → Raw* wire struct
//!          └─ status gate      → Excluded, or
//!               └─ field assembly → canonical record (+ join side channel)
//!
//! Everything here is pure and synchronous. Reference fields that require
//! reading *other* files (resolution, transitive walks) are left `None` and
//! filled in by the pipeline's assembler.

use kl06_core::{
  Error, Result,
  entity::EntityKind,
  label::{Label, Labels},
  record::{
    Arity, CompetenceGoal, CompetenceGoalSet, Curriculum, CurriculumStructure,
    CurriculumType, EducationalSubject, JoinRecord, RefEntry, SubjectCode,
    YearLevel,
  },
  status::{Status, raw_is_published},
  title::{Language, Title},
};
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

use crate::raw::{
  RawCompetenceGoal, RawCompetenceGoalSet, RawCurriculum,
  RawEducationalSubject, RawLabelPair, RawRef, RawSubjectCode,
  strip_ontology_prefix,
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The outcome of normalizing one well-formed file.
#[derive(Debug, Clone)]
pub enum Normalized<T> {
  /// The record is published and belongs in the output.
  Published(T),
  /// The record decoded fine but its status keeps it out of the output.
  /// It stays readable on disk for the reference resolver.
  Excluded,
}

impl<T> Normalized<T> {
  pub fn published(self) -> Option<T> {
    match self {
      Self::Published(v) => Some(v),
      Self::Excluded => None,
    }
  }
}

/// A published competence goal set plus the raw member edges the assembler
/// needs for the transitive subject-code walk.
#[derive(Debug, Clone)]
pub struct GoalSetParts {
  pub record:  CompetenceGoalSet,
  /// The set's `etter-fag` edges, unfiltered.
  pub members: Vec<RawRef>,
}

/// A published competence goal plus its raw form, which carries the
/// reference fields the assembler interprets.
#[derive(Debug, Clone)]
pub struct GoalParts {
  pub record: CompetenceGoal,
  pub raw:    RawCompetenceGoal,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn decode<T: DeserializeOwned>(
  kind: EntityKind,
  file: &str,
  data: &str,
) -> Result<T> {
  serde_json::from_str(data).map_err(|e| Error::MalformedRecord {
    kind,
    file: file.to_string(),
    reason: e.to_string(),
  })
}

/// Normalize the record's own status. `None` means unknown or absent, which
/// excludes the record from output.
fn record_status(raw: Option<&str>) -> Option<Status> {
  raw.and_then(Status::from_raw)
}

/// Parse a raw entity id, tolerating the `uuid:` prefix. Unparsable ids are
/// dropped rather than failing the record.
fn parse_id(raw: Option<&str>) -> Option<Uuid> {
  let bare = raw?.strip_prefix("uuid:").unwrap_or(raw?);
  Uuid::parse_str(bare).ok()
}

fn edge_published(edge: &RawRef) -> bool {
  raw_is_published(edge.status.as_deref())
}

/// Collect the target codes of published edges, in wire order.
fn published_codes(edges: &[RawRef]) -> Vec<String> {
  edges
    .iter()
    .filter(|e| edge_published(e))
    .filter_map(|e| e.kode.clone())
    .collect()
}

/// Fold raw label pairs into the canonical label map. An absent boolean
/// defaults to `true`; unknown label codes are logged and skipped.
fn fold_labels(pairs: &[RawLabelPair], file: &str) -> Labels {
  let mut labels = Labels::new();
  for pair in pairs {
    let Some(code) = pair.kode.as_deref() else {
      continue;
    };
    match Label::from_code(code) {
      Some(label) => {
        labels.insert(label, pair.verdi.unwrap_or(true));
      }
      None => warn!(%file, %code, "unknown label code, skipping"),
    }
  }
  labels
}

/// Wrap an embedded display string as a default-language title.
fn inline_title(text: Option<&str>) -> Title {
  Title::from_pairs(
    text
      .filter(|t| !t.is_empty())
      .map(|t| (Language::Default, t.to_string())),
  )
}

// ─── Subject codes ───────────────────────────────────────────────────────────

/// Normalize one `fagkoder/` file.
///
/// Side channel: when the record and an embedded `opplaeringsfag` edge are
/// both published, one [`JoinRecord`] per edge is emitted. The pipeline
/// deduplicates pairs and re-checks both endpoints against the final
/// published sets.
pub fn normalize_subject_code(
  file: &str,
  data: &str,
) -> Result<(Normalized<SubjectCode>, Vec<JoinRecord>)> {
  let raw: RawSubjectCode = decode(EntityKind::SubjectCode, file, data)?;

  let Some(status) = record_status(raw.status.as_deref()) else {
    return Ok((Normalized::Excluded, Vec::new()));
  };
  if !status.is_published() {
    return Ok((Normalized::Excluded, Vec::new()));
  }

  let joins = raw
    .opplaeringsfag
    .clone()
    .map(|edges| edges.into_vec())
    .unwrap_or_default()
    .iter()
    .filter(|e| edge_published(e))
    .filter_map(|e| e.kode.clone())
    .map(|educational_subject| JoinRecord {
      subject_code: raw.kode.clone(),
      educational_subject,
    })
    .collect();

  let record = SubjectCode {
    id:              parse_id(raw.id.as_deref()),
    code:            raw.kode,
    title:           raw.tittel.assemble(),
    status,
    last_changed:    raw.sist_endret,
    labels:          fold_labels(&raw.merkelapper, file),
    subject_type:    raw.fagtype,
    education_level: raw.opplaeringsnivaa,
  };
  Ok((Normalized::Published(record), joins))
}

// ─── Educational subjects ────────────────────────────────────────────────────

/// Normalize one `opplaeringsfag/` file. The join side channel mirrors the
/// subject-code one from the opposite end of the relation.
pub fn normalize_educational_subject(
  file: &str,
  data: &str,
) -> Result<(Normalized<EducationalSubject>, Vec<JoinRecord>)> {
  let raw: RawEducationalSubject =
    decode(EntityKind::EducationalSubject, file, data)?;

  let Some(status) = record_status(raw.status.as_deref()) else {
    return Ok((Normalized::Excluded, Vec::new()));
  };
  if !status.is_published() {
    return Ok((Normalized::Excluded, Vec::new()));
  }

  let subject_codes = published_codes(&raw.fagkode_referanser);
  let joins = subject_codes
    .iter()
    .map(|subject_code| JoinRecord {
      subject_code:        subject_code.clone(),
      educational_subject: raw.kode.clone(),
    })
    .collect();

  let year_level = Arity::from_vec(
    raw
      .for_aarstrinn
      .iter()
      .filter(|e| edge_published(e))
      .filter_map(|e| e.kode.clone())
      .map(|year| YearLevel { year })
      .collect(),
  );

  let record = EducationalSubject {
    id: parse_id(raw.id.as_deref()),
    code: raw.kode,
    title: raw.tittel.assemble(),
    status,
    last_changed: raw.sist_endret,
    subject_type: Arity::from_vec(published_codes(
      &raw.fagtype.map(|e| e.into_vec()).unwrap_or_default(),
    )),
    education_level: Arity::from_vec(published_codes(
      &raw.opplaeringsnivaa.map(|e| e.into_vec()).unwrap_or_default(),
    )),
    year_level,
    subject_code_reference: Arity::from_vec(subject_codes),
    curriculum_reference: Arity::from_vec(published_codes(
      &raw.laereplan_referanse,
    )),
  };
  Ok((Normalized::Published(record), joins))
}

// ─── Curricula ───────────────────────────────────────────────────────────────

/// Normalize one staged `curricula/` file. The educational-subject and
/// subject-code reference lists require reads into other kinds' directories
/// and are filled by the assembler.
pub fn normalize_curriculum(
  file: &str,
  data: &str,
) -> Result<Normalized<Curriculum>> {
  let raw: RawCurriculum = decode(EntityKind::Curriculum, file, data)?;

  let Some(status) = record_status(raw.status.as_deref()) else {
    return Ok(Normalized::Excluded);
  };
  if !status.is_published() {
    return Ok(Normalized::Excluded);
  }

  let curriculum_type = match strip_ontology_prefix(&raw.grep_type) {
    "laereplan" => CurriculumType::Legacy,
    "laereplan_lk20" => CurriculumType::Lk20,
    other => {
      return Err(Error::MalformedRecord {
        kind:   EntityKind::Curriculum,
        file:   file.to_string(),
        reason: format!("unknown curriculum grep-type `{other}`"),
      });
    }
  };

  let record = Curriculum {
    code: raw.kode,
    title: raw.tittel.assemble(),
    status,
    last_changed: raw.sist_endret,
    curriculum_structure: raw
      .laereplanstruktur
      .and_then(|s| s.tittel)
      .as_deref()
      .and_then(CurriculumStructure::from_raw),
    curriculum_type,
    subject_type: Arity::from_vec(published_codes(
      &raw.fagtype.map(|e| e.into_vec()).unwrap_or_default(),
    )),
    competence_goal_set_reference: Arity::from_vec(published_codes(
      &raw
        .kompetansemaal_kapittel
        .and_then(|c| c.kompetansemaalsett)
        .map(|e| e.into_vec())
        .unwrap_or_default(),
    )),
    educational_subject_reference: Arity::None,
    subject_code_reference: Arity::None,
  };
  Ok(Normalized::Published(record))
}

// ─── Competence goal sets ────────────────────────────────────────────────────

/// Normalize one staged `competence_goal_sets/` file. Member goal references
/// use the embedded display strings; the educational-subject and transitive
/// subject-code references are filled by the assembler from `members`.
pub fn normalize_competence_goal_set(
  file: &str,
  data: &str,
) -> Result<Normalized<GoalSetParts>> {
  let raw: RawCompetenceGoalSet =
    decode(EntityKind::CompetenceGoalSet, file, data)?;

  let Some(status) = record_status(raw.status.as_deref()) else {
    return Ok(Normalized::Excluded);
  };
  if !status.is_published() {
    return Ok(Normalized::Excluded);
  }

  let competence_goal_reference = Arity::from_vec(
    raw
      .kompetansemaal
      .iter()
      .filter(|e| edge_published(e))
      .filter_map(|e| {
        Some(RefEntry {
          code:  e.kode.clone()?,
          title: inline_title(e.tittel.as_deref()),
        })
      })
      .collect(),
  );

  let record = CompetenceGoalSet {
    code: raw.kode,
    title: raw.tittel.assemble(),
    status,
    last_changed: raw.sist_endret,
    competence_goal_reference,
    educational_subject_reference: Arity::None,
    subject_code_reference: Arity::None,
  };
  Ok(Normalized::Published(GoalSetParts {
    record,
    members: raw.etter_fag,
  }))
}

// ─── Competence goals ────────────────────────────────────────────────────────

/// Normalize one staged `competence_goals/` file. All six reference lists
/// require reads into other directories and are filled by the assembler,
/// which interprets the returned raw form.
pub fn normalize_competence_goal(
  file: &str,
  data: &str,
) -> Result<Normalized<GoalParts>> {
  let raw: RawCompetenceGoal = decode(EntityKind::CompetenceGoal, file, data)?;

  let Some(status) = record_status(raw.status.as_deref()) else {
    return Ok(Normalized::Excluded);
  };
  if !status.is_published() {
    return Ok(Normalized::Excluded);
  }

  let record = CompetenceGoal {
    code: raw.kode.clone(),
    title: raw.tittel.assemble(),
    status,
    last_changed: raw.sist_endret.clone(),
    competence_goal_set_reference: Arity::None,
    curriculum_reference: Arity::None,
    connected_cross_curricular_themes: Arity::None,
    connected_core_subjects: Arity::None,
    educational_subject_reference: Arity::None,
    subject_code_reference: Arity::None,
  };
  Ok(Normalized::Published(GoalParts { record, raw }))
}
