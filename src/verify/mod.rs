//! The pipeline: load → (extract ‖ execute) → compare → report.

use anyhow::{Context, Result};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::info;

use crate::{
    bank::{self, ExampleRecord},
    compare::ComparisonResult,
    config::Settings,
    execution::{EnvError, Executor, Toolchain},
    extract::MarkerSet,
    report::Report,
};

pub struct Verifier {
    markers: MarkerSet,
    executor: Executor,
    jobs: usize,
}

impl Verifier {
    /// Create the scratch directory and probe the compiler. Fails when the
    /// environment cannot run any example.
    pub async fn prepare(settings: &Settings) -> Result<Self> {
        let toolchain = Toolchain::new(&settings.compiler, settings.compiler_flags.clone());
        let executor = Executor::prepare(toolchain, &settings.scratch_dir, settings.timeout)
            .await
            .context("preparing the build environment")?;
        Ok(Self {
            markers: MarkerSet::with_extra(&settings.extra_markers),
            executor,
            jobs: settings.jobs.max(1),
        })
    }

    pub async fn verify_one(&self, record: &ExampleRecord) -> Result<ComparisonResult, EnvError> {
        let expected = self.markers.extract(&record.source);
        let outcome = self.executor.execute(record).await?;
        Ok(ComparisonResult::new(&expected, outcome))
    }

    /// Results come back in input order whatever the job count; the first
    /// environment failure aborts the run.
    pub async fn verify_all(&self, records: &[ExampleRecord]) -> Result<Report> {
        info!(examples = records.len(), jobs = self.jobs, scratch = %self.executor.scratch_dir().display(), "verifying");
        let comparisons: Vec<ComparisonResult> = stream::iter(records.iter().map(|r| self.verify_one(r)))
            .buffered(self.jobs)
            .try_collect()
            .await?;
        Ok(Report::new(comparisons))
    }
}

/// Load the bank, verify every example and persist the report.
pub async fn run(settings: &Settings) -> Result<Report> {
    let records = bank::load(&settings.bank)?;
    info!(bank = %settings.bank.display(), records = records.len(), "question bank loaded");
    let verifier = Verifier::prepare(settings).await?;
    let report = verifier.verify_all(&records).await?;
    report.write(&settings.report_path)?;
    Ok(report)
}
