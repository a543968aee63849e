//! Integration tests for `SqliteStore` against an in-memory database.

use kl06_core::{
  label::Label,
  record::{
    Arity, CompetenceGoal, CompetenceGoalSet, Curriculum, CurriculumType,
    EducationalSubject, JoinRecord, RefEntry, SubjectCode, YearLevel,
  },
  sink::{SnapshotSink, write_snapshot},
  snapshot::Snapshot,
  status::Status,
  title::{Language, Title},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn title(text: &str) -> Title {
  Title::from_pairs([(Language::Default, text.to_string())])
}

fn subject_code(code: &str) -> SubjectCode {
  SubjectCode {
    id:              Some(Uuid::new_v4()),
    code:            code.to_string(),
    title:           title("Norsk"),
    status:          Status::Published,
    last_changed:    Some("2020-08-01T12:00:00Z".to_string()),
    labels:          [(Label::Valgfag, true)].into_iter().collect(),
    subject_type:    Some("fellesfag".to_string()),
    education_level: Some("vgs".to_string()),
  }
}

fn educational_subject(code: &str) -> EducationalSubject {
  EducationalSubject {
    id:                     None,
    code:                   code.to_string(),
    title:                  title("Norsk"),
    status:                 Status::Published,
    last_changed:           None,
    subject_type:           Arity::One("fellesfag".to_string()),
    education_level:        Arity::None,
    year_level:             Arity::Many(vec![
      YearLevel {
        year: "vg1".to_string(),
      },
      YearLevel {
        year: "vg2".to_string(),
      },
    ]),
    subject_code_reference: Arity::One("NOR1206".to_string()),
    curriculum_reference:   Arity::None,
  }
}

fn sample_snapshot() -> Snapshot {
  Snapshot {
    subject_codes:        vec![subject_code("NOR1206")],
    educational_subjects: vec![educational_subject("OF-NOR")],
    curricula:            vec![Curriculum {
      code:                          "NOR01-06".to_string(),
      title:                         title("Læreplan i norsk"),
      status:                        Status::Published,
      last_changed:                  None,
      curriculum_structure:          None,
      curriculum_type:               CurriculumType::Lk20,
      subject_type:                  Arity::None,
      competence_goal_set_reference: Arity::One("KMS476".to_string()),
      educational_subject_reference: Arity::One(RefEntry {
        code:  "OF-NOR".to_string(),
        title: title("Norsk"),
      }),
      subject_code_reference:        Arity::None,
    }],
    competence_goal_sets: vec![CompetenceGoalSet {
      code:                          "KMS476".to_string(),
      title:                         title("Etter vg1"),
      status:                        Status::Published,
      last_changed:                  None,
      competence_goal_reference:     Arity::Many(vec![
        RefEntry {
          code:  "KM1".to_string(),
          title: title("utforske språklige virkemidler"),
        },
        RefEntry {
          code:  "KM2".to_string(),
          title: title("lese og tolke tekster"),
        },
      ]),
      educational_subject_reference: Arity::None,
      subject_code_reference:        Arity::None,
    }],
    competence_goals:     vec![CompetenceGoal {
      code:                              "KM1".to_string(),
      title:                             title(
        "utforske språklige virkemidler",
      ),
      status:                            Status::Published,
      last_changed:                      None,
      competence_goal_set_reference:     Arity::One(RefEntry {
        code:  "KMS476".to_string(),
        title: title("Etter vg1"),
      }),
      curriculum_reference:              Arity::None,
      connected_cross_curricular_themes: Arity::None,
      connected_core_subjects:           Arity::None,
      educational_subject_reference:     Arity::None,
      subject_code_reference:            Arity::None,
    }],
    subject_joins:        vec![JoinRecord {
      subject_code:        "NOR1206".to_string(),
      educational_subject: "OF-NOR".to_string(),
    }],
  }
}

// ─── Round trips ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_round_trips() {
  let s = store().await;
  let snapshot = sample_snapshot();
  write_snapshot(&s, &snapshot).await.unwrap();

  assert_eq!(s.subject_codes().await.unwrap(), snapshot.subject_codes);
  assert_eq!(
    s.educational_subjects().await.unwrap(),
    snapshot.educational_subjects
  );
  assert_eq!(s.curricula().await.unwrap(), snapshot.curricula);
  assert_eq!(
    s.competence_goal_sets().await.unwrap(),
    snapshot.competence_goal_sets
  );
  assert_eq!(s.competence_goals().await.unwrap(), snapshot.competence_goals);
  assert_eq!(s.subject_joins().await.unwrap(), snapshot.subject_joins);
}

#[tokio::test]
async fn absent_arity_fields_come_back_absent() {
  let s = store().await;
  s.write_educational_subjects(&[educational_subject("OF-ENG")])
    .await
    .unwrap();

  let read = s.educational_subjects().await.unwrap();
  assert_eq!(read.len(), 1);
  assert!(read[0].education_level.is_none());
  assert!(read[0].curriculum_reference.is_none());
  assert_eq!(read[0].year_level.len(), 2);
}

#[tokio::test]
async fn empty_snapshot_writes_cleanly() {
  let s = store().await;
  write_snapshot(&s, &Snapshot::default()).await.unwrap();
  assert!(s.subject_codes().await.unwrap().is_empty());
  assert!(s.subject_joins().await.unwrap().is_empty());
}

// ─── Replacement semantics ───────────────────────────────────────────────────

#[tokio::test]
async fn rewrite_replaces_previous_contents() {
  let s = store().await;
  write_snapshot(&s, &sample_snapshot()).await.unwrap();

  // A second run where NOR1206 disappeared and ENG1001 appeared.
  let mut next = sample_snapshot();
  next.subject_codes = vec![subject_code("ENG1001")];
  next.subject_joins = vec![];
  write_snapshot(&s, &next).await.unwrap();

  let codes = s.subject_codes().await.unwrap();
  assert_eq!(codes.len(), 1);
  assert_eq!(codes[0].code, "ENG1001");
  assert!(s.subject_joins().await.unwrap().is_empty());
}

#[tokio::test]
async fn rewriting_same_snapshot_is_idempotent() {
  let s = store().await;
  let snapshot = sample_snapshot();
  write_snapshot(&s, &snapshot).await.unwrap();
  write_snapshot(&s, &snapshot).await.unwrap();

  assert_eq!(s.subject_codes().await.unwrap().len(), 1);
  assert_eq!(s.subject_joins().await.unwrap().len(), 1);
}

#[tokio::test]
async fn persists_across_connections_on_disk() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("kl06.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    write_snapshot(&s, &sample_snapshot()).await.unwrap();
  }

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.subject_codes().await.unwrap().len(), 1);
  assert_eq!(reopened.competence_goals().await.unwrap().len(), 1);
}
