//! [`SqliteStore`] — the SQLite implementation of [`SnapshotSink`].

use std::path::Path;

use kl06_core::{
  record::{
    CompetenceGoal, CompetenceGoalSet, Curriculum, EducationalSubject,
    JoinRecord, SubjectCode,
  },
  sink::SnapshotSink,
};

use crate::{
  Error, Result,
  encode::{
    decode_arity, decode_curriculum_type, decode_labels, decode_status,
    decode_structure, decode_title, decode_uuid, encode_arity,
    encode_curriculum_type, encode_labels, encode_status, encode_structure,
    encode_title, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kl06 snapshot store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Replace a table's contents with pre-encoded rows, atomically.
  async fn replace_rows(
    &self,
    table: &'static str,
    insert: &'static str,
    rows: Vec<Vec<Option<String>>>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
          let mut stmt = tx.prepare(insert)?;
          for row in &rows {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Readback ──────────────────────────────────────────────────────────────

  /// All stored subject codes, ordered by code.
  pub async fn subject_codes(&self) -> Result<Vec<SubjectCode>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT code, id, title, status, last_changed, labels,
                  subject_type, education_level
           FROM subject_codes ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get::<_, String>(0)?,
              row.get::<_, Option<String>>(1)?,
              row.get::<_, String>(2)?,
              row.get::<_, String>(3)?,
              row.get::<_, Option<String>>(4)?,
              row.get::<_, String>(5)?,
              row.get::<_, Option<String>>(6)?,
              row.get::<_, Option<String>>(7)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(
        |(
          code,
          id,
          title,
          status,
          last_changed,
          labels,
          subject_type,
          education_level,
        )| {
          Ok(SubjectCode {
            id: decode_uuid(id)?,
            code,
            title: decode_title(&title)?,
            status: decode_status(&status)?,
            last_changed,
            labels: decode_labels(&labels)?,
            subject_type,
            education_level,
          })
        },
      )
      .collect()
  }

  /// All stored educational subjects, ordered by code.
  pub async fn educational_subjects(&self) -> Result<Vec<EducationalSubject>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT code, id, title, status, last_changed, subject_type,
                  education_level, year_level, subject_code_reference,
                  curriculum_reference
           FROM educational_subjects ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get::<_, String>(0)?,
              row.get::<_, Option<String>>(1)?,
              row.get::<_, String>(2)?,
              row.get::<_, String>(3)?,
              row.get::<_, Option<String>>(4)?,
              row.get::<_, Option<String>>(5)?,
              row.get::<_, Option<String>>(6)?,
              row.get::<_, Option<String>>(7)?,
              row.get::<_, Option<String>>(8)?,
              row.get::<_, Option<String>>(9)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(
        |(
          code,
          id,
          title,
          status,
          last_changed,
          subject_type,
          education_level,
          year_level,
          subject_code_reference,
          curriculum_reference,
        )| {
          Ok(EducationalSubject {
            id: decode_uuid(id)?,
            code,
            title: decode_title(&title)?,
            status: decode_status(&status)?,
            last_changed,
            subject_type: decode_arity(subject_type)?,
            education_level: decode_arity(education_level)?,
            year_level: decode_arity(year_level)?,
            subject_code_reference: decode_arity(subject_code_reference)?,
            curriculum_reference: decode_arity(curriculum_reference)?,
          })
        },
      )
      .collect()
  }

  /// All stored curricula, ordered by code.
  pub async fn curricula(&self) -> Result<Vec<Curriculum>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT code, title, status, last_changed, curriculum_structure,
                  curriculum_type, subject_type, competence_goal_set_reference,
                  educational_subject_reference, subject_code_reference
           FROM curricula ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get::<_, String>(0)?,
              row.get::<_, String>(1)?,
              row.get::<_, String>(2)?,
              row.get::<_, Option<String>>(3)?,
              row.get::<_, Option<String>>(4)?,
              row.get::<_, String>(5)?,
              row.get::<_, Option<String>>(6)?,
              row.get::<_, Option<String>>(7)?,
              row.get::<_, Option<String>>(8)?,
              row.get::<_, Option<String>>(9)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(
        |(
          code,
          title,
          status,
          last_changed,
          curriculum_structure,
          curriculum_type,
          subject_type,
          competence_goal_set_reference,
          educational_subject_reference,
          subject_code_reference,
        )| {
          Ok(Curriculum {
            code,
            title: decode_title(&title)?,
            status: decode_status(&status)?,
            last_changed,
            curriculum_structure: decode_structure(curriculum_structure)?,
            curriculum_type: decode_curriculum_type(&curriculum_type)?,
            subject_type: decode_arity(subject_type)?,
            competence_goal_set_reference: decode_arity(
              competence_goal_set_reference,
            )?,
            educational_subject_reference: decode_arity(
              educational_subject_reference,
            )?,
            subject_code_reference: decode_arity(subject_code_reference)?,
          })
        },
      )
      .collect()
  }

  /// All stored competence goal sets, ordered by code.
  pub async fn competence_goal_sets(&self) -> Result<Vec<CompetenceGoalSet>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT code, title, status, last_changed,
                  competence_goal_reference, educational_subject_reference,
                  subject_code_reference
           FROM competence_goal_sets ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get::<_, String>(0)?,
              row.get::<_, String>(1)?,
              row.get::<_, String>(2)?,
              row.get::<_, Option<String>>(3)?,
              row.get::<_, Option<String>>(4)?,
              row.get::<_, Option<String>>(5)?,
              row.get::<_, Option<String>>(6)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(
        |(
          code,
          title,
          status,
          last_changed,
          competence_goal_reference,
          educational_subject_reference,
          subject_code_reference,
        )| {
          Ok(CompetenceGoalSet {
            code,
            title: decode_title(&title)?,
            status: decode_status(&status)?,
            last_changed,
            competence_goal_reference: decode_arity(competence_goal_reference)?,
            educational_subject_reference: decode_arity(
              educational_subject_reference,
            )?,
            subject_code_reference: decode_arity(subject_code_reference)?,
          })
        },
      )
      .collect()
  }

  /// All stored competence goals, ordered by code.
  pub async fn competence_goals(&self) -> Result<Vec<CompetenceGoal>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT code, title, status, last_changed,
                  competence_goal_set_reference, curriculum_reference,
                  connected_cross_curricular_themes, connected_core_subjects,
                  educational_subject_reference, subject_code_reference
           FROM competence_goals ORDER BY code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get::<_, String>(0)?,
              row.get::<_, String>(1)?,
              row.get::<_, String>(2)?,
              row.get::<_, Option<String>>(3)?,
              row.get::<_, Option<String>>(4)?,
              row.get::<_, Option<String>>(5)?,
              row.get::<_, Option<String>>(6)?,
              row.get::<_, Option<String>>(7)?,
              row.get::<_, Option<String>>(8)?,
              row.get::<_, Option<String>>(9)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(
        |(
          code,
          title,
          status,
          last_changed,
          competence_goal_set_reference,
          curriculum_reference,
          connected_cross_curricular_themes,
          connected_core_subjects,
          educational_subject_reference,
          subject_code_reference,
        )| {
          Ok(CompetenceGoal {
            code,
            title: decode_title(&title)?,
            status: decode_status(&status)?,
            last_changed,
            competence_goal_set_reference: decode_arity(
              competence_goal_set_reference,
            )?,
            curriculum_reference: decode_arity(curriculum_reference)?,
            connected_cross_curricular_themes: decode_arity(
              connected_cross_curricular_themes,
            )?,
            connected_core_subjects: decode_arity(connected_core_subjects)?,
            educational_subject_reference: decode_arity(
              educational_subject_reference,
            )?,
            subject_code_reference: decode_arity(subject_code_reference)?,
          })
        },
      )
      .collect()
  }

  /// All stored join rows, ordered by (subject code, educational subject).
  pub async fn subject_joins(&self) -> Result<Vec<JoinRecord>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_code, educational_subject
           FROM subject_codes_to_educational_subjects
           ORDER BY subject_code, educational_subject",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(JoinRecord {
              subject_code:        row.get(0)?,
              educational_subject: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── SnapshotSink ────────────────────────────────────────────────────────────

impl SnapshotSink for SqliteStore {
  type Error = Error;

  async fn write_subject_codes(
    &self,
    records: &[SubjectCode],
  ) -> Result<(), Error> {
    let rows = records
      .iter()
      .map(|r| {
        Ok(vec![
          Some(r.code.clone()),
          encode_uuid(r.id),
          Some(encode_title(&r.title)?),
          Some(encode_status(r.status).to_owned()),
          r.last_changed.clone(),
          Some(encode_labels(&r.labels)?),
          r.subject_type.clone(),
          r.education_level.clone(),
        ])
      })
      .collect::<Result<Vec<_>>>()?;
    self
      .replace_rows(
        "subject_codes",
        "INSERT INTO subject_codes
           (code, id, title, status, last_changed, labels,
            subject_type, education_level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rows,
      )
      .await
  }

  async fn write_educational_subjects(
    &self,
    records: &[EducationalSubject],
  ) -> Result<(), Error> {
    let rows = records
      .iter()
      .map(|r| {
        Ok(vec![
          Some(r.code.clone()),
          encode_uuid(r.id),
          Some(encode_title(&r.title)?),
          Some(encode_status(r.status).to_owned()),
          r.last_changed.clone(),
          encode_arity(&r.subject_type)?,
          encode_arity(&r.education_level)?,
          encode_arity(&r.year_level)?,
          encode_arity(&r.subject_code_reference)?,
          encode_arity(&r.curriculum_reference)?,
        ])
      })
      .collect::<Result<Vec<_>>>()?;
    self
      .replace_rows(
        "educational_subjects",
        "INSERT INTO educational_subjects
           (code, id, title, status, last_changed, subject_type,
            education_level, year_level, subject_code_reference,
            curriculum_reference)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rows,
      )
      .await
  }

  async fn write_curricula(
    &self,
    records: &[Curriculum],
  ) -> Result<(), Error> {
    let rows = records
      .iter()
      .map(|r| {
        Ok(vec![
          Some(r.code.clone()),
          Some(encode_title(&r.title)?),
          Some(encode_status(r.status).to_owned()),
          r.last_changed.clone(),
          encode_structure(r.curriculum_structure).map(str::to_owned),
          Some(encode_curriculum_type(r.curriculum_type).to_owned()),
          encode_arity(&r.subject_type)?,
          encode_arity(&r.competence_goal_set_reference)?,
          encode_arity(&r.educational_subject_reference)?,
          encode_arity(&r.subject_code_reference)?,
        ])
      })
      .collect::<Result<Vec<_>>>()?;
    self
      .replace_rows(
        "curricula",
        "INSERT INTO curricula
           (code, title, status, last_changed, curriculum_structure,
            curriculum_type, subject_type, competence_goal_set_reference,
            educational_subject_reference, subject_code_reference)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rows,
      )
      .await
  }

  async fn write_competence_goal_sets(
    &self,
    records: &[CompetenceGoalSet],
  ) -> Result<(), Error> {
    let rows = records
      .iter()
      .map(|r| {
        Ok(vec![
          Some(r.code.clone()),
          Some(encode_title(&r.title)?),
          Some(encode_status(r.status).to_owned()),
          r.last_changed.clone(),
          encode_arity(&r.competence_goal_reference)?,
          encode_arity(&r.educational_subject_reference)?,
          encode_arity(&r.subject_code_reference)?,
        ])
      })
      .collect::<Result<Vec<_>>>()?;
    self
      .replace_rows(
        "competence_goal_sets",
        "INSERT INTO competence_goal_sets
           (code, title, status, last_changed, competence_goal_reference,
            educational_subject_reference, subject_code_reference)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rows,
      )
      .await
  }

  async fn write_competence_goals(
    &self,
    records: &[CompetenceGoal],
  ) -> Result<(), Error> {
    let rows = records
      .iter()
      .map(|r| {
        Ok(vec![
          Some(r.code.clone()),
          Some(encode_title(&r.title)?),
          Some(encode_status(r.status).to_owned()),
          r.last_changed.clone(),
          encode_arity(&r.competence_goal_set_reference)?,
          encode_arity(&r.curriculum_reference)?,
          encode_arity(&r.connected_cross_curricular_themes)?,
          encode_arity(&r.connected_core_subjects)?,
          encode_arity(&r.educational_subject_reference)?,
          encode_arity(&r.subject_code_reference)?,
        ])
      })
      .collect::<Result<Vec<_>>>()?;
    self
      .replace_rows(
        "competence_goals",
        "INSERT INTO competence_goals
           (code, title, status, last_changed, competence_goal_set_reference,
            curriculum_reference, connected_cross_curricular_themes,
            connected_core_subjects, educational_subject_reference,
            subject_code_reference)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rows,
      )
      .await
  }

  async fn write_subject_joins(
    &self,
    rows: &[JoinRecord],
  ) -> Result<(), Error> {
    let rows = rows
      .iter()
      .map(|r| {
        vec![
          Some(r.subject_code.clone()),
          Some(r.educational_subject.clone()),
        ]
      })
      .collect();
    self
      .replace_rows(
        "subject_codes_to_educational_subjects",
        "INSERT INTO subject_codes_to_educational_subjects
           (subject_code, educational_subject)
         VALUES (?1, ?2)",
        rows,
      )
      .await
  }
}
