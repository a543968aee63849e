//! Integration tests for the pipeline against fixture dumps on disk.

use std::path::Path;

use kl06_core::{
  Error,
  entity::EntityKind,
  record::{Arity, CurriculumType, JoinRecord, RefEntry},
  status::STATUS_URI_PREFIX,
  title::{Language, Title},
};
use tempfile::TempDir;

use crate::{DumpLayout, Pipeline, Resolver};

fn published() -> String { format!("{STATUS_URI_PREFIX}publisert") }

fn retired() -> String { format!("{STATUS_URI_PREFIX}utgaatt") }

fn write(root: &Path, dir: &str, code: &str, json: &str) {
  let dir = root.join(dir);
  std::fs::create_dir_all(&dir).expect("fixture dir");
  std::fs::write(dir.join(format!("{code}.json")), json).expect("fixture");
}

/// Create every source directory the layout requires, all empty.
fn empty_dump() -> TempDir {
  let tmp = TempDir::new().expect("tempdir");
  for dir in [
    "fagkoder",
    "opplaeringsfag",
    "laereplaner",
    "laereplaner-LK20",
    "kompetansemaalsett",
    "kompetansemaalsett-lk20",
    "kompetansemaal",
    "kompetansemaal-lk20",
    "tverrfaglige-temaer-lk20",
    "kjerneelementer-lk20",
  ] {
    std::fs::create_dir_all(tmp.path().join(dir)).expect("fixture dir");
  }
  tmp
}

fn title_of(value: &str) -> Title {
  Title::from_pairs([(Language::Default, value.to_string())])
}

fn subject_code_json(code: &str, status: &str, extra: &str) -> String {
  format!(
    r#"{{
      "kode": "{code}",
      "tittel": [{{"spraak": "default", "verdi": "Fag {code}"}}],
      "status": "{status}"{extra}
    }}"#
  )
}

// ─── Resolver ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolver_returns_published_target_directly() {
  let tmp = empty_dump();
  write(
    tmp.path(),
    "fagkoder",
    "NOR1206",
    &subject_code_json("NOR1206", &published(), ""),
  );

  let layout = DumpLayout::new(tmp.path());
  let entry = Resolver::new(&layout)
    .resolve(EntityKind::SubjectCode, "NOR1206")
    .await
    .expect("resolved");
  assert_eq!(entry.code, "NOR1206");
  assert_eq!(entry.title, title_of("Fag NOR1206"));
}

#[tokio::test]
async fn resolver_follows_supersession_chain() {
  let tmp = empty_dump();
  let chain = format!(
    r#", "erstattes-av": [{{"kode": "B", "status": "{}"}}]"#,
    retired()
  );
  write(
    tmp.path(),
    "fagkoder",
    "A",
    &subject_code_json("A", &retired(), &chain),
  );
  let chain = format!(
    r#", "erstattes-av": [{{"kode": "C", "status": "{}"}}]"#,
    published()
  );
  write(
    tmp.path(),
    "fagkoder",
    "B",
    &subject_code_json("B", &retired(), &chain),
  );
  write(
    tmp.path(),
    "fagkoder",
    "C",
    &subject_code_json("C", &published(), ""),
  );

  let layout = DumpLayout::new(tmp.path());
  let entry = Resolver::new(&layout)
    .resolve(EntityKind::SubjectCode, "A")
    .await
    .expect("resolved through two hops");
  assert_eq!(entry.code, "C");
}

#[tokio::test]
async fn resolver_terminates_on_cycle() {
  let tmp = empty_dump();
  let to_b = r#", "erstattes-av": [{"kode": "B"}]"#;
  let to_a = r#", "erstattes-av": [{"kode": "A"}]"#;
  write(
    tmp.path(),
    "fagkoder",
    "A",
    &subject_code_json("A", &retired(), to_b),
  );
  write(
    tmp.path(),
    "fagkoder",
    "B",
    &subject_code_json("B", &retired(), to_a),
  );

  let layout = DumpLayout::new(tmp.path());
  let result = Resolver::new(&layout)
    .resolve(EntityKind::SubjectCode, "A")
    .await;
  assert!(result.is_none());
}

#[tokio::test]
async fn resolver_treats_missing_file_as_unresolved() {
  let tmp = empty_dump();
  let layout = DumpLayout::new(tmp.path());
  let result = Resolver::new(&layout)
    .resolve(EntityKind::SubjectCode, "NOPE")
    .await;
  assert!(result.is_none());
}

#[tokio::test]
async fn resolver_first_resolvable_replacement_wins() {
  let tmp = empty_dump();
  // First replacement is a dead end; the second resolves.
  let chain = r#", "erstattes-av": [{"kode": "DEAD"}, {"kode": "LIVE"}]"#;
  write(
    tmp.path(),
    "fagkoder",
    "A",
    &subject_code_json("A", &retired(), chain),
  );
  write(
    tmp.path(),
    "fagkoder",
    "LIVE",
    &subject_code_json("LIVE", &published(), ""),
  );

  let layout = DumpLayout::new(tmp.path());
  let entry = Resolver::new(&layout)
    .resolve(EntityKind::SubjectCode, "A")
    .await
    .expect("resolved");
  assert_eq!(entry.code, "LIVE");
}

// ─── Layout ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn staging_combines_both_generation_directories() {
  let tmp = empty_dump();
  write(tmp.path(), "laereplaner", "OLD1", "{}");
  write(tmp.path(), "laereplaner-LK20", "NEW1", "{}");

  let layout = DumpLayout::new(tmp.path());
  layout.stage().await.expect("stage");

  let combined = layout.dir(EntityKind::Curriculum);
  assert!(combined.join("OLD1.json").exists());
  assert!(combined.join("NEW1.json").exists());
}

#[tokio::test]
async fn missing_source_directory_aborts_the_run() {
  let tmp = empty_dump();
  std::fs::remove_dir(tmp.path().join("fagkoder")).expect("remove");

  let pipeline = Pipeline::new(DumpLayout::new(tmp.path()));
  let err = pipeline.run().await.unwrap_err();
  assert!(matches!(
    err,
    Error::MissingSourceDirectory {
      kind: EntityKind::SubjectCode,
      ..
    }
  ));
}

// ─── Batches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_file_is_skipped_not_fatal() {
  let tmp = empty_dump();
  write(
    tmp.path(),
    "fagkoder",
    "GOOD",
    &subject_code_json("GOOD", &published(), ""),
  );
  write(tmp.path(), "fagkoder", "BAD", "not json at all");

  let (snapshot, report) = Pipeline::new(DumpLayout::new(tmp.path()))
    .run()
    .await
    .expect("run succeeds");

  assert_eq!(snapshot.subject_codes.len(), 1);
  let stats = report.kinds[&EntityKind::SubjectCode];
  assert_eq!(stats.files_seen, 2);
  assert_eq!(stats.published, 1);
  assert_eq!(stats.skipped, 1);
}

#[tokio::test]
async fn duplicate_codes_keep_first_in_path_order() {
  let tmp = empty_dump();
  // Two files claiming the same code but with different content. The
  // record from the lexicographically first file must survive, no matter
  // which read completes first ("X1-copy.json" sorts before "X1.json").
  let file = |title: &str| {
    format!(
      r#"{{
        "kode": "X1",
        "tittel": [{{"spraak": "default", "verdi": "{title}"}}],
        "status": "{}"
      }}"#,
      published()
    )
  };
  write(tmp.path(), "fagkoder", "X1", &file("fra X1.json"));
  write(tmp.path(), "fagkoder", "X1-copy", &file("fra X1-copy.json"));

  let (snapshot, report) = Pipeline::new(DumpLayout::new(tmp.path()))
    .with_concurrency(4)
    .run()
    .await
    .expect("run succeeds");

  assert_eq!(snapshot.subject_codes.len(), 1);
  assert_eq!(snapshot.subject_codes[0].title, title_of("fra X1-copy.json"));
  let stats = report.kinds[&EntityKind::SubjectCode];
  assert_eq!(stats.published, 1);
  assert_eq!(stats.duplicates, 1);
}

#[tokio::test]
async fn retired_subject_code_edges_are_not_walked() {
  let tmp = empty_dump();
  let p = published();
  let r = retired();

  // Both subject codes are published, but OF-X's own edge to FK-RET is
  // marked retired: the walk must keep only FK-PUB.
  write(
    tmp.path(),
    "fagkoder",
    "FK-PUB",
    &subject_code_json("FK-PUB", &p, ""),
  );
  write(
    tmp.path(),
    "fagkoder",
    "FK-RET",
    &subject_code_json("FK-RET", &p, ""),
  );
  write(
    tmp.path(),
    "opplaeringsfag",
    "OF-X",
    &format!(
      r#"{{
        "kode": "OF-X",
        "tittel": [{{"spraak": "default", "verdi": "Fag X"}}],
        "status": "{p}",
        "fagkode-referanser": [
          {{"kode": "FK-PUB", "status": "{p}"}},
          {{"kode": "FK-RET", "status": "{r}"}}
        ]
      }}"#
    ),
  );
  write(
    tmp.path(),
    "kompetansemaalsett-lk20",
    "KMS1",
    &format!(
      r#"{{
        "kode": "KMS1",
        "tittel": {{"tekst": [{{"spraak": "default", "verdi": "Sett"}}]}},
        "status": "{p}",
        "etter-fag": [
          {{"kode": "OF-X", "status": "{p}",
            "grep-type": "http://psi.udir.no/ontologi/kl06/opplaeringsfag"}}
        ]
      }}"#
    ),
  );

  let (snapshot, _) = Pipeline::new(DumpLayout::new(tmp.path()))
    .run()
    .await
    .expect("run succeeds");

  assert_eq!(snapshot.competence_goal_sets.len(), 1);
  assert_eq!(
    snapshot.competence_goal_sets[0].subject_code_reference,
    Arity::One(RefEntry {
      code:  "FK-PUB".to_string(),
      title: title_of("Fag FK-PUB"),
    })
  );
}

#[tokio::test]
async fn shape_violation_aborts_the_goal_batch() {
  let tmp = empty_dump();
  let goal = format!(
    r#"{{
      "kode": "KM9",
      "tittel": [{{"spraak": "default", "verdi": "Mål"}}],
      "status": "{}",
      "laereplan-referanser": {{"kode": "NOR1-05"}}
    }}"#,
    published()
  );
  write(tmp.path(), "kompetansemaal", "KM9", &goal);

  let err = Pipeline::new(DumpLayout::new(tmp.path()))
    .run()
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnexpectedReferenceShape { .. }));
}

// ─── End to end ──────────────────────────────────────────────────────────────

/// A small but complete dump: one live subject code plus a retired one that
/// redirects to it, one educational subject, a retired legacy curriculum
/// superseded by a published LK20 one, one goal set, and one goal per
/// generation.
fn full_dump() -> TempDir {
  let tmp = empty_dump();
  let root = tmp.path();
  let p = published();
  let r = retired();

  let extra = format!(
    r#", "opplaeringsfag": [{{"kode": "OF-NOR", "status": "{p}"}}]"#
  );
  write(
    root,
    "fagkoder",
    "NOR1206",
    &subject_code_json("NOR1206", &p, &extra),
  );
  let extra = format!(
    r#", "erstattes-av": [{{"kode": "NOR1206", "status": "{p}"}}]"#
  );
  write(
    root,
    "fagkoder",
    "GML1-01",
    &subject_code_json("GML1-01", &r, &extra),
  );

  // The edge to GML1-01 is marked published even though the target is
  // retired: the join filter must drop that pair.
  write(
    root,
    "opplaeringsfag",
    "OF-NOR",
    &format!(
      r#"{{
        "kode": "OF-NOR",
        "tittel": [{{"spraak": "default", "verdi": "Norsk"}}],
        "status": "{p}",
        "for-aarstrinn": [{{"kode": "vg1", "status": "{p}"}}],
        "fagkode-referanser": [
          {{"kode": "NOR1206", "status": "{p}"}},
          {{"kode": "GML1-01", "status": "{p}"}}
        ]
      }}"#
    ),
  );

  write(
    root,
    "laereplaner",
    "NOR1-05",
    &format!(
      r#"{{
        "kode": "NOR1-05",
        "tittel": [{{"spraak": "default", "verdi": "Norsk (LK06)"}}],
        "status": "{r}",
        "grep-type": "http://psi.udir.no/ontologi/kl06/laereplan",
        "erstattes-av": [{{"kode": "NOR01-06", "status": "{p}"}}]
      }}"#
    ),
  );
  write(
    root,
    "laereplaner-LK20",
    "NOR01-06",
    &format!(
      r#"{{
        "kode": "NOR01-06",
        "tittel": {{"tekst": [{{"spraak": "default", "verdi": "Norsk"}}]}},
        "status": "{p}",
        "laereplanstruktur": {{"tittel": "Vanlig"}},
        "grep-type": "http://psi.udir.no/ontologi/kl06/laereplan_lk20",
        "kompetansemaal-kapittel": {{
          "kompetansemaalsett": [{{"kode": "KMS476", "status": "{p}"}}]
        }}
      }}"#
    ),
  );

  write(
    root,
    "kompetansemaalsett-lk20",
    "KMS476",
    &format!(
      r#"{{
        "kode": "KMS476",
        "tittel": {{"tekst": [{{"spraak": "default", "verdi": "Etter vg1"}}]}},
        "status": "{p}",
        "kompetansemaal": [
          {{"kode": "KM1", "status": "{p}", "tittel": "kunne lese"}}
        ],
        "etter-fag": [
          {{"kode": "OF-NOR", "status": "{p}",
            "grep-type": "http://psi.udir.no/ontologi/kl06/opplaeringsfag"}}
        ]
      }}"#
    ),
  );

  write(
    root,
    "kompetansemaal-lk20",
    "KM1",
    &format!(
      r#"{{
        "kode": "KM1",
        "tittel": {{"tekst": [{{"spraak": "default", "verdi": "kunne lese"}}]}},
        "status": "{p}",
        "tilhoerer-laereplan": {{"kode": "NOR01-06", "status": "{p}"}},
        "tilhoerer-kompetansemaalsett": {{"kode": "KMS476", "status": "{p}"}},
        "tilknyttede-tverrfaglige-temaer": [
          {{"referanse": {{"kode": "TT1", "status": "{p}",
            "grep-type": "http://psi.udir.no/ontologi/kl06/tverrfaglig_tema_lk20"}}}}
        ],
        "tilknyttede-kjerneelementer": [
          {{"referanse": {{"kode": "KE1", "status": "{p}",
            "grep-type": "http://psi.udir.no/ontologi/kl06/kjerneelement_lk20"}}}}
        ]
      }}"#
    ),
  );
  write(
    root,
    "kompetansemaal",
    "KM9",
    &format!(
      r#"{{
        "kode": "KM9",
        "tittel": [{{"spraak": "default", "verdi": "eldre mål"}}],
        "status": "{p}",
        "laereplan-referanser": [
          {{"kode": "NOR1-05", "status": "{r}",
            "grep-type": "http://psi.udir.no/ontologi/kl06/laereplan",
            "tilhoerende-kompetansemaalsett": [{{"kode": "KMS476"}}]}}
        ]
      }}"#
    ),
  );

  write(
    root,
    "tverrfaglige-temaer-lk20",
    "TT1",
    r#"{
      "kode": "TT1",
      "tittel": [{"spraak": "default", "verdi": "Demokrati og medborgerskap"}]
    }"#,
  );
  write(
    root,
    "kjerneelementer-lk20",
    "KE1",
    r#"{
      "kode": "KE1",
      "tittel": {"tekst": [{"spraak": "default", "verdi": "Tekst i kontekst"}]}
    }"#,
  );

  tmp
}

#[tokio::test]
async fn end_to_end_snapshot() {
  let tmp = full_dump();
  let (snapshot, report) = Pipeline::new(DumpLayout::new(tmp.path()))
    .with_concurrency(4)
    .run()
    .await
    .expect("run succeeds");

  // Published-only outputs; the retired subject code and curriculum are
  // gone.
  assert_eq!(snapshot.subject_codes.len(), 1);
  assert_eq!(snapshot.subject_codes[0].code, "NOR1206");
  assert_eq!(snapshot.curricula.len(), 1);
  assert_eq!(snapshot.curricula[0].code, "NOR01-06");
  assert_eq!(snapshot.curricula[0].curriculum_type, CurriculumType::Lk20);

  // Curriculum references walked through its goal set.
  assert_eq!(
    snapshot.curricula[0].educational_subject_reference,
    Arity::One(RefEntry {
      code:  "OF-NOR".to_string(),
      title: title_of("Norsk"),
    })
  );
  assert_eq!(
    snapshot.curricula[0].subject_code_reference,
    Arity::One(RefEntry {
      code:  "NOR1206".to_string(),
      title: title_of("Fag NOR1206"),
    })
  );

  // Goal set: member goal from the embedded title, subject references
  // transitively. GML1-01 resolves to NOR1206, deduplicated with the
  // direct reference.
  assert_eq!(snapshot.competence_goal_sets.len(), 1);
  let set = &snapshot.competence_goal_sets[0];
  assert_eq!(
    set.competence_goal_reference,
    Arity::One(RefEntry {
      code:  "KM1".to_string(),
      title: title_of("kunne lese"),
    })
  );
  assert_eq!(set.subject_code_reference.len(), 1);

  // Both goal generations made it.
  assert_eq!(snapshot.competence_goals.len(), 2);
  let km1 = snapshot
    .competence_goals
    .iter()
    .find(|g| g.code == "KM1")
    .expect("KM1");
  let km9 = snapshot
    .competence_goals
    .iter()
    .find(|g| g.code == "KM9")
    .expect("KM9");

  // LK20 goal: direct references plus themes and core elements.
  assert_eq!(
    km1.curriculum_reference,
    Arity::One(RefEntry {
      code:  "NOR01-06".to_string(),
      title: title_of("Norsk"),
    })
  );
  assert_eq!(
    km1.competence_goal_set_reference,
    Arity::One(RefEntry {
      code:  "KMS476".to_string(),
      title: title_of("Etter vg1"),
    })
  );
  assert_eq!(
    km1.connected_cross_curricular_themes,
    Arity::One(RefEntry {
      code:  "TT1".to_string(),
      title: title_of("Demokrati og medborgerskap"),
    })
  );
  assert_eq!(
    km1.connected_core_subjects,
    Arity::One(RefEntry {
      code:  "KE1".to_string(),
      title: title_of("Tekst i kontekst"),
    })
  );
  assert_eq!(km1.educational_subject_reference.len(), 1);
  assert_eq!(km1.subject_code_reference.len(), 1);

  // Legacy goal: curriculum found through the retired curriculum's
  // superseded-by edge, subjects through the indirection's goal set.
  assert_eq!(
    km9.curriculum_reference,
    Arity::One(RefEntry {
      code:  "NOR01-06".to_string(),
      title: title_of("Norsk"),
    })
  );
  assert_eq!(km9.educational_subject_reference.len(), 1);
  assert_eq!(
    km9.subject_code_reference,
    Arity::One(RefEntry {
      code:  "NOR1206".to_string(),
      title: title_of("Fag NOR1206"),
    })
  );

  // Joins: emitted from both sides, deduplicated, and the pair pointing
  // at the retired subject code dropped by the filter.
  assert_eq!(
    snapshot.subject_joins,
    vec![JoinRecord {
      subject_code:        "NOR1206".to_string(),
      educational_subject: "OF-NOR".to_string(),
    }]
  );
  assert_eq!(report.join_rows, 1);

  // Report: the retired records were seen and excluded.
  assert_eq!(report.kinds[&EntityKind::SubjectCode].excluded, 1);
  assert_eq!(report.kinds[&EntityKind::Curriculum].excluded, 1);
  assert_eq!(report.total_skipped(), 0);
}

#[tokio::test]
async fn reruns_are_idempotent() {
  let tmp = full_dump();
  let layout = DumpLayout::new(tmp.path());

  let (first, first_report) = Pipeline::new(layout.clone())
    .run()
    .await
    .expect("first run");
  let (second, second_report) =
    Pipeline::new(layout).run().await.expect("second run");

  assert_eq!(first, second);
  assert_eq!(first_report, second_report);
}
