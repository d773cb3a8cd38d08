use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::unbounded;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{JobOutcome, SkipReason, SymbolIdentity};
use crate::services::dump_syms::SymbolDumper;
use crate::services::generator::GenerateError;
use crate::services::tools::ToolError;
use crate::store::{read_identity, sidecar_candidates, StoreError, SymbolStore};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("dump_syms failed: {0}")]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One finished job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub binary: PathBuf,
    pub outcome: JobOutcome,
}

/// Every job outcome of a run, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerReport {
    pub records: Vec<JobRecord>,
}

impl SchedulerReport {
    pub fn outcome_for(&self, binary: &Path) -> Option<&JobOutcome> {
        self.records.iter().find(|r| r.binary == binary).map(|r| &r.outcome)
    }

    pub fn extracted(&self) -> usize {
        self.records.iter().filter(|r| r.outcome == JobOutcome::Extracted).count()
    }

    pub fn skipped(&self) -> usize {
        self.records.iter().filter(|r| matches!(r.outcome, JobOutcome::Skipped(_))).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    /// Turn accumulated job failures into a single error.
    pub fn into_result(self) -> Result<Self, GenerateError> {
        let failures: Vec<String> = self
            .failures()
            .filter_map(|r| match &r.outcome {
                JobOutcome::Failed(detail) => Some(detail.clone()),
                _ => None,
            })
            .collect();
        if failures.is_empty() {
            Ok(self)
        } else {
            Err(GenerateError::JobsFailed(failures))
        }
    }
}

/// Fixed-size worker pool running one symbol-dump job per binary.
///
/// All binaries are queued before any worker starts. Workers pull from a shared
/// FIFO channel and report `(binary, outcome)` pairs to the calling thread, which
/// is the only place records are collected and decisions are logged. A failing
/// job is recorded and never stops the other workers.
pub struct JobScheduler<'a> {
    store: &'a SymbolStore,
    dumper: Option<&'a dyn SymbolDumper>,
    jobs: usize,
}

impl<'a> JobScheduler<'a> {
    pub fn new(store: &'a SymbolStore, dumper: Option<&'a dyn SymbolDumper>, jobs: usize) -> Self {
        Self { store, dumper, jobs: jobs.max(1) }
    }

    /// Process every binary and block until all jobs have finished.
    pub fn run<I>(&self, binaries: I) -> SchedulerReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let (job_tx, job_rx) = unbounded::<PathBuf>();
        let (done_tx, done_rx) = unbounded::<JobRecord>();
        for binary in binaries {
            // The receiver lives until the end of this function.
            let _ = job_tx.send(binary);
        }
        drop(job_tx);

        let mut report = SchedulerReport::default();
        thread::scope(|scope| {
            for worker in 0..self.jobs {
                let jobs = job_rx.clone();
                let done = done_tx.clone();
                scope.spawn(move || {
                    for binary in jobs.iter() {
                        debug!("worker {} picked up {}", worker, binary.display());
                        let outcome = self.run_job(&binary);
                        if done.send(JobRecord { binary, outcome }).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for record in done_rx.iter() {
                match &record.outcome {
                    JobOutcome::Skipped(reason) => {
                        info!("Skipping {} ({})", record.binary.display(), reason)
                    }
                    JobOutcome::Extracted => {
                        info!("Generated symbols for {}", record.binary.display())
                    }
                    JobOutcome::Failed(detail) => debug!("job failed: {}", detail),
                }
                report.records.push(record);
            }
        });
        report
    }

    fn run_job(&self, binary: &Path) -> JobOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.process(binary))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => JobOutcome::Failed(format!("{}: {}", binary.display(), e)),
            Err(payload) => JobOutcome::Failed(format!(
                "{}: job panicked: {}",
                binary.display(),
                panic_message(payload.as_ref())
            )),
        }
    }

    /// Decide what to do with one binary; the first matching rule wins.
    fn process(&self, binary: &Path) -> Result<JobOutcome, JobError> {
        let Some(dumper) = self.dumper else {
            return Ok(JobOutcome::Skipped(SkipReason::ToolUnavailable));
        };

        let output = dumper.module_header(binary)?;
        let identity = match SymbolIdentity::parse(output.lines().next().unwrap_or_default()) {
            Ok(identity) => identity,
            Err(e) => {
                debug!("{}: {}", binary.display(), e);
                return Ok(JobOutcome::Skipped(SkipReason::HeaderUnparseable));
            }
        };

        if self.store.contains(&identity) {
            return Ok(JobOutcome::Skipped(SkipReason::AlreadyInStore));
        }

        for sidecar in sidecar_candidates(binary)? {
            match read_identity(&sidecar) {
                Ok(Ok(found)) if found == identity => {
                    self.store.import(&identity, &sidecar)?;
                    return Ok(JobOutcome::Skipped(SkipReason::LocalSidecarMatches));
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!("ignoring sidecar {}: {}", sidecar.display(), e),
                Err(e) => debug!("ignoring unreadable sidecar: {}", e),
            }
        }

        info!("Generating symbols for {}", binary.display());
        dumper.write_to_store(binary, self.store.root())?;
        Ok(JobOutcome::Extracted)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
