//! Raw-record decoding and per-record normalization for the kl06 dump.
//!
//! Converts the dump's Norwegian-keyed JSON files into [`kl06_core`]
//! canonical records. Pure synchronous; no filesystem or database
//! dependencies. Reference fields that need reads into other files are left
//! empty here and filled by the pipeline's assembler.
//!
//! # Quick start
//!
//! ```no_run
//! use kl06_records::normalize_subject_code;
//!
//! let data = std::fs::read_to_string("fagkoder/NOR1206.json").unwrap();
//! let (normalized, joins) =
//!   normalize_subject_code("NOR1206.json", &data).unwrap();
//! println!("published: {}, joins: {}", normalized.published().is_some(), joins.len());
//! ```

pub mod normalize;
pub mod raw;

pub use normalize::{
  GoalParts, GoalSetParts, Normalized, normalize_competence_goal,
  normalize_competence_goal_set, normalize_curriculum,
  normalize_educational_subject, normalize_subject_code,
};
