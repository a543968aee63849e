//! Wire shapes of the dump's JSON records.
//!
//! Field names follow the dataset's Norwegian vocabulary; everything here is
//! a faithful serde mirror of what the files contain. Interpretation (status
//! filtering, arity collapsing, generation branching) happens in
//! [`normalize`](crate::normalize) and in the pipeline's assembler.

use kl06_core::{
  Error, Result,
  entity::EntityKind,
  title::{Language, Title},
};
use serde::Deserialize;

/// URI namespace prefix carried by every raw `grep-type` value.
pub const ONTOLOGY_PREFIX: &str = "http://psi.udir.no/ontologi/kl06/";

/// Strip the ontology prefix from a raw `grep-type` value. Accepts the bare
/// value too.
pub fn strip_ontology_prefix(raw: &str) -> &str {
  raw.strip_prefix(ONTOLOGY_PREFIX).unwrap_or(raw)
}

// ─── Generic wire helpers ────────────────────────────────────────────────────

/// The dataset's single-or-array convention: many reference fields hold
/// either one object or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  One(T),
  Many(Vec<T>),
}

impl<T> OneOrMany<T> {
  pub fn into_vec(self) -> Vec<T> {
    match self {
      Self::One(v) => vec![v],
      Self::Many(v) => v,
    }
  }

  pub fn is_array(&self) -> bool { matches!(self, Self::Many(_)) }
}

/// One `{spraak, verdi}` title pair. Either half may be absent in the wild;
/// incomplete pairs are skipped during assembly.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTitlePair {
  #[serde(default)]
  pub spraak: Option<String>,
  #[serde(default)]
  pub verdi:  Option<String>,
}

/// A raw title in either of its two wire shapes: the legacy generation's
/// flat pair array, or the LK20 generation's `{ "tekst": [pairs] }` wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTitle {
  Flat(Vec<RawTitlePair>),
  Nested { tekst: Vec<RawTitlePair> },
}

impl RawTitle {
  /// Fold the pairs into a canonical [`Title`]. Pairs with an unknown
  /// language code or a missing half are skipped; empty values are dropped.
  pub fn assemble(&self) -> Title {
    let pairs = match self {
      Self::Flat(pairs) => pairs,
      Self::Nested { tekst } => tekst,
    };
    Title::from_pairs(pairs.iter().filter_map(|pair| {
      let language = Language::from_code(pair.spraak.as_deref()?)?;
      Some((language, pair.verdi.clone()?))
    }))
  }
}

/// A generic reference edge: target code, the edge's own recorded status,
/// and (where the dataset provides it) the target's ontology type and an
/// embedded display title.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRef {
  #[serde(default)]
  pub kode:      Option<String>,
  #[serde(default)]
  pub status:    Option<String>,
  #[serde(default, rename = "grep-type")]
  pub grep_type: Option<String>,
  #[serde(default)]
  pub tittel:    Option<String>,
}

impl RawRef {
  pub fn grep_type_bare(&self) -> Option<&str> {
    self.grep_type.as_deref().map(strip_ontology_prefix)
  }
}

/// One `{kode, verdi}` label pair on a subject code.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLabelPair {
  #[serde(default)]
  pub kode:  Option<String>,
  #[serde(default)]
  pub verdi: Option<bool>,
}

// ─── Per-kind records ────────────────────────────────────────────────────────

/// `fagkoder/<code>.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSubjectCode {
  #[serde(default)]
  pub id:     Option<String>,
  pub kode:   String,
  pub tittel: RawTitle,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, rename = "sist-endret")]
  pub sist_endret: Option<String>,
  #[serde(default)]
  pub merkelapper: Vec<RawLabelPair>,
  #[serde(default)]
  pub opplaeringsfag: Option<OneOrMany<RawRef>>,
  #[serde(default)]
  pub fagtype: Option<String>,
  #[serde(default)]
  pub opplaeringsnivaa: Option<String>,
}

/// `opplaeringsfag/<code>.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEducationalSubject {
  #[serde(default)]
  pub id:     Option<String>,
  pub kode:   String,
  pub tittel: RawTitle,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, rename = "sist-endret")]
  pub sist_endret: Option<String>,
  #[serde(default)]
  pub fagtype: Option<OneOrMany<RawRef>>,
  #[serde(default)]
  pub opplaeringsnivaa: Option<OneOrMany<RawRef>>,
  #[serde(default, rename = "for-aarstrinn")]
  pub for_aarstrinn: Vec<RawRef>,
  #[serde(default, rename = "fagkode-referanser")]
  pub fagkode_referanser: Vec<RawRef>,
  #[serde(default, rename = "laereplan-referanse")]
  pub laereplan_referanse: Vec<RawRef>,
  #[serde(default, rename = "erstattes-av")]
  pub erstattes_av: Vec<RawRef>,
}

/// The `laereplanstruktur` wrapper on a curriculum.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStructure {
  #[serde(default)]
  pub tittel: Option<String>,
}

/// The `kompetansemaal-kapittel` wrapper on a curriculum.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGoalChapter {
  #[serde(default)]
  pub kompetansemaalsett: Option<OneOrMany<RawRef>>,
}

/// `curricula/<code>.json` (either generation, after staging).
#[derive(Debug, Clone, Deserialize)]
pub struct RawCurriculum {
  pub kode:   String,
  pub tittel: RawTitle,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, rename = "sist-endret")]
  pub sist_endret: Option<String>,
  #[serde(default)]
  pub laereplanstruktur: Option<RawStructure>,
  #[serde(default)]
  pub fagtype: Option<OneOrMany<RawRef>>,
  #[serde(rename = "grep-type")]
  pub grep_type: String,
  #[serde(default, rename = "kompetansemaal-kapittel")]
  pub kompetansemaal_kapittel: Option<RawGoalChapter>,
  #[serde(default, rename = "erstattes-av")]
  pub erstattes_av: Vec<RawRef>,
}

/// `competence_goal_sets/<code>.json` (either generation, after staging).
#[derive(Debug, Clone, Deserialize)]
pub struct RawCompetenceGoalSet {
  pub kode:   String,
  pub tittel: RawTitle,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, rename = "sist-endret")]
  pub sist_endret: Option<String>,
  #[serde(default)]
  pub kompetansemaal: Vec<RawRef>,
  #[serde(default, rename = "etter-fag")]
  pub etter_fag: Vec<RawRef>,
}

/// One entry of a legacy competence goal's `laereplan-referanser` list: a
/// pointer at a retired legacy curriculum, with the goal sets it belonged to.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLegacyCurriculumRef {
  #[serde(default)]
  pub kode:      Option<String>,
  #[serde(default)]
  pub status:    Option<String>,
  #[serde(default, rename = "grep-type")]
  pub grep_type: Option<String>,
  #[serde(default, rename = "tilhoerende-kompetansemaalsett")]
  pub tilhoerende_kompetansemaalsett: Option<OneOrMany<RawRef>>,
}

impl RawLegacyCurriculumRef {
  pub fn grep_type_bare(&self) -> Option<&str> {
    self.grep_type.as_deref().map(strip_ontology_prefix)
  }
}

/// One entry of a goal's theme / core-element list: the edge proper lives
/// one level down, under `referanse`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConnectedRef {
  #[serde(default)]
  pub referanse: Option<RawRef>,
}

/// `competence_goals/<code>.json` (either generation, after staging).
#[derive(Debug, Clone, Deserialize)]
pub struct RawCompetenceGoal {
  pub kode:   String,
  pub tittel: RawTitle,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, rename = "sist-endret")]
  pub sist_endret: Option<String>,
  #[serde(default, rename = "tilhoerer-kompetansemaalsett")]
  pub tilhoerer_kompetansemaalsett: Option<OneOrMany<RawRef>>,
  #[serde(default, rename = "tilhoerer-laereplan")]
  pub tilhoerer_laereplan: Option<OneOrMany<RawRef>>,
  #[serde(default, rename = "laereplan-referanser")]
  pub laereplan_referanser: Option<OneOrMany<RawLegacyCurriculumRef>>,
  #[serde(default, rename = "tilknyttede-tverrfaglige-temaer")]
  pub tilknyttede_tverrfaglige_temaer: Option<OneOrMany<RawConnectedRef>>,
  #[serde(default, rename = "tilknyttede-kjerneelementer")]
  pub tilknyttede_kjerneelementer: Option<OneOrMany<RawConnectedRef>>,
}

/// How a competence goal names its curriculum. The two dataset generations
/// use different fields; the branch is decided once here, not re-sniffed at
/// every use site.
#[derive(Debug, Clone)]
pub enum CurriculumLink {
  /// LK20 goals point directly at their curriculum via
  /// `tilhoerer-laereplan`.
  Current(Vec<RawRef>),
  /// Legacy goals point at retired curricula via `laereplan-referanser`;
  /// the live curriculum is found through each entry's superseded-by chain.
  Legacy(Vec<RawLegacyCurriculumRef>),
  /// Neither field present.
  None,
}

impl RawCompetenceGoal {
  /// Decide the goal's curriculum-link generation.
  ///
  /// `laereplan-referanser` takes precedence when present. The dataset
  /// contract requires it to be an array; a bare object there is a shape
  /// violation, as is an LK20-typed entry (LK20 goals must use
  /// `tilhoerer-laereplan` instead).
  pub fn curriculum_link(&self) -> Result<CurriculumLink> {
    match &self.laereplan_referanser {
      Some(OneOrMany::Many(entries)) => {
        for entry in entries {
          if entry.grep_type_bare() == Some("laereplan-lk20") {
            return Err(Error::UnexpectedReferenceShape {
              kind:   EntityKind::CompetenceGoal,
              code:   self.kode.clone(),
              detail: "laereplan-referanser entry has LK20 grep-type"
                .to_string(),
            });
          }
        }
        Ok(CurriculumLink::Legacy(entries.clone()))
      }
      Some(OneOrMany::One(_)) => Err(Error::UnexpectedReferenceShape {
        kind:   EntityKind::CompetenceGoal,
        code:   self.kode.clone(),
        detail: "laereplan-referanser is not an array".to_string(),
      }),
      None => match &self.tilhoerer_laereplan {
        Some(edges) => Ok(CurriculumLink::Current(edges.clone().into_vec())),
        None => Ok(CurriculumLink::None),
      },
    }
  }
}

/// The minimal shape the reference resolver needs from any redirecting
/// kind's file: status, title, and the superseded-by edges.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResolvable {
  pub kode:   String,
  pub tittel: RawTitle,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default, rename = "erstattes-av")]
  pub erstattes_av: Vec<RawRef>,
}

/// The shape read from theme and core-element files: code plus title.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReferenced {
  pub kode:   String,
  pub tittel: RawTitle,
}
