//! `kl06` — normalize an extracted kl06 curriculum dump.
//!
//! Reads `config.toml` (or the path specified with `--config`), runs the
//! normalization pipeline over the dump directory, and writes the resulting
//! snapshot to a SQLite database and/or a directory of per-kind JSON files.
//!
//! # Usage
//!
//! ```
//! kl06 --data-dir ./dump --db ./kl06.db
//! kl06 --config kl06.toml --json-out ./processed
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use kl06_core::{sink::write_snapshot, snapshot::Snapshot};
use kl06_pipeline::{DEFAULT_CONCURRENCY, DumpLayout, Pipeline};
use kl06_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "kl06 curriculum dump normalizer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Extracted dump directory (overrides the config file).
  #[arg(long)]
  data_dir: Option<PathBuf>,

  /// SQLite database to write the snapshot to.
  #[arg(long)]
  db: Option<PathBuf>,

  /// Directory to write per-kind JSON files to.
  #[arg(long)]
  json_out: Option<PathBuf>,

  /// Maximum number of dump files processed concurrently.
  #[arg(long)]
  concurrency: Option<usize>,
}

/// Resolved run configuration: config file, `KL06_` environment variables,
/// then command-line flags, in increasing precedence.
#[derive(Deserialize)]
struct RunConfig {
  data_dir:    PathBuf,
  db:          Option<PathBuf>,
  json_out:    Option<PathBuf>,
  #[serde(default = "default_concurrency")]
  concurrency: usize,
}

fn default_concurrency() -> usize { DEFAULT_CONCURRENCY }

fn path_override(path: Option<&PathBuf>) -> Option<String> {
  path.map(|p| p.display().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("KL06"))
    .set_override_option("data_dir", path_override(cli.data_dir.as_ref()))?
    .set_override_option("db", path_override(cli.db.as_ref()))?
    .set_override_option("json_out", path_override(cli.json_out.as_ref()))?
    .set_override_option(
      "concurrency",
      cli.concurrency.map(|c| c as i64),
    )?
    .build()
    .context("failed to read config")?;

  let run_cfg: RunConfig = settings
    .try_deserialize()
    .context("failed to deserialise run configuration (is data_dir set?)")?;

  // Run the pipeline.
  let pipeline = Pipeline::new(DumpLayout::new(&run_cfg.data_dir))
    .with_concurrency(run_cfg.concurrency);
  let (snapshot, report) = pipeline
    .run()
    .await
    .with_context(|| {
      format!("normalization failed for dump at {:?}", run_cfg.data_dir)
    })?;

  for (kind, counts) in &report.kinds {
    info!(
      %kind,
      files_seen = counts.files_seen,
      published = counts.published,
      excluded = counts.excluded,
      skipped = counts.skipped,
      duplicates = counts.duplicates,
      "kind processed"
    );
  }
  info!(
    records = snapshot.total_records(),
    join_rows = report.join_rows,
    skipped = report.total_skipped(),
    "run complete"
  );

  // Persist.
  if let Some(db) = &run_cfg.db {
    let store = SqliteStore::open(db)
      .await
      .with_context(|| format!("failed to open store at {db:?}"))?;
    write_snapshot(&store, &snapshot)
      .await
      .context("failed to write snapshot to store")?;
    info!(db = %db.display(), "snapshot written to sqlite");
  }

  if let Some(dir) = &run_cfg.json_out {
    write_json_files(dir, &snapshot).await?;
    info!(dir = %dir.display(), "snapshot written as json");
  }

  Ok(())
}

/// Write one pretty-printed JSON file per record collection.
async fn write_json_files(
  dir: &Path,
  snapshot: &Snapshot,
) -> anyhow::Result<()> {
  tokio::fs::create_dir_all(dir)
    .await
    .with_context(|| format!("failed to create output directory {dir:?}"))?;

  let files: [(&str, serde_json::Value); 6] = [
    ("subject_codes", serde_json::to_value(&snapshot.subject_codes)?),
    (
      "educational_subjects",
      serde_json::to_value(&snapshot.educational_subjects)?,
    ),
    ("curricula", serde_json::to_value(&snapshot.curricula)?),
    (
      "competence_goal_sets",
      serde_json::to_value(&snapshot.competence_goal_sets)?,
    ),
    ("competence_goals", serde_json::to_value(&snapshot.competence_goals)?),
    (
      "subject_codes_to_educational_subjects",
      serde_json::to_value(&snapshot.subject_joins)?,
    ),
  ];

  for (name, value) in files {
    let path = dir.join(format!("{name}.json"));
    let data = serde_json::to_vec_pretty(&value)?;
    tokio::fs::write(&path, data)
      .await
      .with_context(|| format!("failed to write {path:?}"))?;
  }
  Ok(())
}
