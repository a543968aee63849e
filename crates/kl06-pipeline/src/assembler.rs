//! Cross-reference assembly.
//!
//! Fills the reference fields that per-record normalization leaves empty:
//! everything that requires reading into other kinds' directories. Uses the
//! [`Resolver`] wherever a target kind can redirect through superseded-by
//! edges.
//!
//! Recovery contract: unreadable or unresolvable targets are logged and
//! omitted from the output lists; generation-contract violations (a
//! mis-shaped or mis-typed reference field) surface as
//! [`Error::UnexpectedReferenceShape`] and abort the record's batch.

use std::collections::BTreeSet;

use kl06_core::{
  Error, Result,
  entity::EntityKind,
  record::{Arity, CompetenceGoal, CompetenceGoalSet, Curriculum, RefEntry},
  status::{Status, raw_is_published},
};
use kl06_records::{
  GoalParts, GoalSetParts,
  raw::{
    CurriculumLink, OneOrMany, RawCompetenceGoalSet, RawConnectedRef,
    RawEducationalSubject, RawRef, RawReferenced,
  },
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{layout::DumpLayout, resolver::Resolver};

// ─── Reference accumulator ───────────────────────────────────────────────────

/// Collects resolved references in encounter order, deduplicating by code.
struct RefAccum {
  seen:    BTreeSet<String>,
  entries: Vec<RefEntry>,
}

impl RefAccum {
  fn new() -> Self {
    Self {
      seen:    BTreeSet::new(),
      entries: Vec::new(),
    }
  }

  fn push(&mut self, entry: RefEntry) {
    if self.seen.insert(entry.code.clone()) {
      self.entries.push(entry);
    }
  }

  fn into_arity(self) -> Arity<RefEntry> { Arity::from_vec(self.entries) }
}

// ─── Assembler ───────────────────────────────────────────────────────────────

pub struct Assembler<'a> {
  layout:   &'a DumpLayout,
  resolver: Resolver<'a>,
}

impl<'a> Assembler<'a> {
  pub fn new(layout: &'a DumpLayout) -> Self {
    Self {
      layout,
      resolver: Resolver::new(layout),
    }
  }

  /// Read and decode one record file, mapping failures to the per-file
  /// reference error.
  async fn read_record<T: DeserializeOwned>(
    &self,
    kind: EntityKind,
    code: &str,
  ) -> Result<T> {
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

  /// Like [`read_record`](Self::read_record), but logs and yields `None`
  /// instead of failing: the reference is simply omitted.
  async fn try_read<T: DeserializeOwned>(
    &self,
    kind: EntityKind,
    code: &str,
  ) -> Option<T> {
    match self.read_record(kind, code).await {
      Ok(value) => Some(value),
      Err(err) => {
        warn!(error = %err, "reference left unresolved");
        None
      }
    }
  }

  /// Walk a goal set's `etter-fag` member edges to educational subjects,
  /// and each resolved subject's `fagkode-referanser` on to subject codes.
  /// `require_published_edge` gates both hops on the edge's own recorded
  /// status. Both output lists deduplicate by code across the whole walk.
  async fn walk_members(
    &self,
    members: &[RawRef],
    require_published_edge: bool,
    edu: &mut RefAccum,
    subj: &mut RefAccum,
  ) {
    for edge in members {
      if let Some(gt) = edge.grep_type_bare()
        && gt != "opplaeringsfag"
      {
        continue;
      }
      if require_published_edge && !raw_is_published(edge.status.as_deref())
      {
        continue;
      }
      let Some(code) = edge.kode.as_deref() else {
        continue;
      };
      let Some(entry) = self
        .resolver
        .resolve(EntityKind::EducationalSubject, code)
        .await
      else {
        continue;
      };

      if let Some(raw) = self
        .try_read::<RawEducationalSubject>(
          EntityKind::EducationalSubject,
          &entry.code,
        )
        .await
      {
        for fagkode in &raw.fagkode_referanser {
          if require_published_edge
            && !raw_is_published(fagkode.status.as_deref())
          {
            continue;
          }
          if let Some(code) = fagkode.kode.as_deref()
            && let Some(subject) =
              self.resolver.resolve(EntityKind::SubjectCode, code).await
          {
            subj.push(subject);
          }
        }
      }
      edu.push(entry);
    }
  }

  /// Fill a curriculum's educational-subject and subject-code reference
  /// lists by walking its published goal sets.
  pub async fn assemble_curriculum(&self, record: &mut Curriculum) {
    let set_codes: Vec<String> = record
      .competence_goal_set_reference
      .iter()
      .cloned()
      .collect();

    let mut edu = RefAccum::new();
    let mut subj = RefAccum::new();
    for set_code in &set_codes {
      let Some(set) = self
        .try_read::<RawCompetenceGoalSet>(
          EntityKind::CompetenceGoalSet,
          set_code,
        )
        .await
      else {
        continue;
      };
      self.walk_members(&set.etter_fag, true, &mut edu, &mut subj).await;
    }
    record.educational_subject_reference = edu.into_arity();
    record.subject_code_reference = subj.into_arity();
  }

  /// Fill a goal set's educational-subject and transitive subject-code
  /// reference lists from its own member edges.
  pub async fn assemble_goal_set(
    &self,
    parts: GoalSetParts,
  ) -> CompetenceGoalSet {
    let GoalSetParts {
      mut record,
      members,
    } = parts;

    let mut edu = RefAccum::new();
    let mut subj = RefAccum::new();
    self.walk_members(&members, true, &mut edu, &mut subj).await;
    record.educational_subject_reference = edu.into_arity();
    record.subject_code_reference = subj.into_arity();
    record
  }

  /// Fill all six of a competence goal's reference lists.
  pub async fn assemble_goal(
    &self,
    parts: GoalParts,
  ) -> Result<CompetenceGoal> {
    let GoalParts { mut record, raw } = parts;

    // Direct goal-set membership; titles come from the staged set files.
    let mut sets = RefAccum::new();
    let set_edges = raw
      .tilhoerer_kompetansemaalsett
      .clone()
      .map(OneOrMany::into_vec)
      .unwrap_or_default();
    for edge in &set_edges {
      if !raw_is_published(edge.status.as_deref()) {
        continue;
      }
      let Some(code) = edge.kode.as_deref() else {
        continue;
      };
      if let Some(set) = self
        .try_read::<RawReferenced>(EntityKind::CompetenceGoalSet, code)
        .await
      {
        sets.push(RefEntry {
          code:  set.kode,
          title: set.tittel.assemble(),
        });
      }
    }
    record.competence_goal_set_reference = sets.into_arity();

    // Curriculum membership, by generation.
    let link = raw.curriculum_link()?;
    let mut curricula = RefAccum::new();
    match &link {
      CurriculumLink::Current(edges) => {
        for edge in edges {
          if !raw_is_published(edge.status.as_deref()) {
            continue;
          }
          let Some(code) = edge.kode.as_deref() else {
            continue;
          };
          if let Some(curriculum) = self
            .try_read::<RawReferenced>(EntityKind::Curriculum, code)
            .await
          {
            curricula.push(RefEntry {
              code:  curriculum.kode,
              title: curriculum.tittel.assemble(),
            });
          }
        }
      }
      CurriculumLink::Legacy(entries) => {
        for entry in entries {
          if entry.grep_type_bare() != Some("laereplan") {
            continue;
          }
          let retired = entry
            .status
            .as_deref()
            .and_then(Status::from_raw)
            .is_some_and(Status::is_retired);
          if !retired {
            continue;
          }
          let Some(code) = entry.kode.as_deref() else {
            continue;
          };
          if let Some(hit) =
            self.resolver.resolve(EntityKind::Curriculum, code).await
          {
            curricula.push(hit);
          }
        }
      }
      CurriculumLink::None => {}
    }
    record.curriculum_reference = curricula.into_arity();

    // Themes and core elements: LK20 generation only.
    record.connected_cross_curricular_themes = self
      .connected_refs(
        &record.code,
        raw.tilknyttede_tverrfaglige_temaer.as_ref(),
        EntityKind::CrossCurricularTheme,
        "tverrfaglig_tema",
      )
      .await?;
    record.connected_core_subjects = self
      .connected_refs(
        &record.code,
        raw.tilknyttede_kjerneelementer.as_ref(),
        EntityKind::CoreSubject,
        "kjerneelement",
      )
      .await?;

    // Transitive walk: goal → goal set → educational subject → subject
    // code. LK20 goals start from their direct set edges; legacy goals
    // start from the sets named inside the curriculum indirection.
    let mut edu = RefAccum::new();
    let mut subj = RefAccum::new();
    if !set_edges.is_empty() {
      for edge in &set_edges {
        let Some(code) = edge.kode.as_deref() else {
          continue;
        };
        if let Some(set) = self
          .try_read::<RawCompetenceGoalSet>(
            EntityKind::CompetenceGoalSet,
            code,
          )
          .await
        {
          self
            .walk_members(&set.etter_fag, true, &mut edu, &mut subj)
            .await;
        }
      }
    } else if let CurriculumLink::Legacy(entries) = &link {
      for entry in entries {
        let set_edges = entry
          .tilhoerende_kompetansemaalsett
          .clone()
          .map(OneOrMany::into_vec)
          .unwrap_or_default();
        for edge in &set_edges {
          let Some(code) = edge.kode.as_deref() else {
            continue;
          };
          if let Some(set) = self
            .try_read::<RawCompetenceGoalSet>(
              EntityKind::CompetenceGoalSet,
              code,
            )
            .await
          {
            self
              .walk_members(&set.etter_fag, false, &mut edu, &mut subj)
              .await;
          }
        }
      }
    }
    record.educational_subject_reference = edu.into_arity();
    record.subject_code_reference = subj.into_arity();

    Ok(record)
  }

  /// Resolve a goal's theme or core-element edges. Only the LK20 grep-type
  /// (`<legacy>_lk20`) with published status is accepted. A published
  /// legacy-typed edge, or a non-array field, violates the generation
  /// contract.
  async fn connected_refs(
    &self,
    goal_code: &str,
    field: Option<&OneOrMany<RawConnectedRef>>,
    kind: EntityKind,
    legacy_type: &str,
  ) -> Result<Arity<RefEntry>> {
    let entries = match field {
      None => return Ok(Arity::None),
      Some(OneOrMany::One(_)) => {
        return Err(Error::UnexpectedReferenceShape {
          kind:   EntityKind::CompetenceGoal,
          code:   goal_code.to_string(),
          detail: format!("{kind} reference list is not an array"),
        });
      }
      Some(OneOrMany::Many(entries)) => entries,
    };

    let lk20_type = format!("{legacy_type}_lk20");
    let mut accum = RefAccum::new();
    for entry in entries {
      let Some(edge) = entry.referanse.as_ref() else {
        continue;
      };
      if !raw_is_published(edge.status.as_deref()) {
        continue;
      }
      match edge.grep_type_bare() {
        Some(gt) if gt == lk20_type => {
          let Some(code) = edge.kode.as_deref() else {
            continue;
          };
          if let Some(referenced) =
            self.try_read::<RawReferenced>(kind, code).await
          {
            accum.push(RefEntry {
              code:  referenced.kode,
              title: referenced.tittel.assemble(),
            });
          }
        }
        Some(gt) if gt == legacy_type => {
          return Err(Error::UnexpectedReferenceShape {
            kind:   EntityKind::CompetenceGoal,
            code:   goal_code.to_string(),
            detail: format!("published legacy-generation {kind} reference"),
          });
        }
        _ => {}
      }
    }
    Ok(accum.into_arity())
  }
}
