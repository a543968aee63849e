//! SQL schema for the kl06 SQLite store.
//!
//! One table per emitted entity kind, keyed by the natural `code`, plus the
//! synthesized subject join. Structured fields (titles, labels, references)
//! are stored as JSON text; a NULL reference column means the field was
//! absent in the snapshot, not empty.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subject_codes (
    code            TEXT PRIMARY KEY,
    id              TEXT,            -- hyphenated UUID or NULL
    title           TEXT NOT NULL,   -- JSON language map
    status          TEXT NOT NULL,   -- always 'published' in practice
    last_changed    TEXT,
    labels          TEXT NOT NULL DEFAULT '{}',
    subject_type    TEXT,
    education_level TEXT
);

CREATE TABLE IF NOT EXISTS educational_subjects (
    code                   TEXT PRIMARY KEY,
    id                     TEXT,
    title                  TEXT NOT NULL,
    status                 TEXT NOT NULL,
    last_changed           TEXT,
    subject_type           TEXT,    -- JSON scalar or array
    education_level        TEXT,
    year_level             TEXT,
    subject_code_reference TEXT,
    curriculum_reference   TEXT
);

CREATE TABLE IF NOT EXISTS curricula (
    code                          TEXT PRIMARY KEY,
    title                         TEXT NOT NULL,
    status                        TEXT NOT NULL,
    last_changed                  TEXT,
    curriculum_structure          TEXT,            -- 'Vanlig' | 'Modulstrukturert'
    curriculum_type               TEXT NOT NULL,   -- 'laereplan' | 'laereplan_lk20'
    subject_type                  TEXT,
    competence_goal_set_reference TEXT,
    educational_subject_reference TEXT,
    subject_code_reference        TEXT
);

CREATE TABLE IF NOT EXISTS competence_goal_sets (
    code                          TEXT PRIMARY KEY,
    title                         TEXT NOT NULL,
    status                        TEXT NOT NULL,
    last_changed                  TEXT,
    competence_goal_reference     TEXT,
    educational_subject_reference TEXT,
    subject_code_reference        TEXT
);

CREATE TABLE IF NOT EXISTS competence_goals (
    code                              TEXT PRIMARY KEY,
    title                             TEXT NOT NULL,
    status                            TEXT NOT NULL,
    last_changed                      TEXT,
    competence_goal_set_reference     TEXT,
    curriculum_reference              TEXT,
    connected_cross_curricular_themes TEXT,
    connected_core_subjects           TEXT,
    educational_subject_reference     TEXT,
    subject_code_reference            TEXT
);

-- Many-to-many between subject codes and educational subjects. Rows exist
-- only when both endpoints made the published set of their run.
CREATE TABLE IF NOT EXISTS subject_codes_to_educational_subjects (
    subject_code        TEXT NOT NULL,
    educational_subject TEXT NOT NULL,
    PRIMARY KEY (subject_code, educational_subject)
);

PRAGMA user_version = 1;
";
