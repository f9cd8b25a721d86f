use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Toolchain step within a single volume rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildStep {
    Build,
    Push,
    Prune,
}

impl fmt::Display for RebuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Push => "push",
            Self::Prune => "prune",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeFailure {
    /// The mount directory file has no entry for the category.
    UnmappedCategory { category: String },
    /// A docker step exited unsuccessfully or could not start.
    Step {
        step: RebuildStep,
        detail: String,
        elapsed: Duration,
    },
}

impl fmt::Display for VolumeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedCategory { category } => {
                write!(f, "{category} not found in volume mounts file")
            }
            Self::Step {
                step,
                detail,
                elapsed,
            } => write!(
                f,
                "{step} failed after {} (MM:SS): {detail}",
                format_elapsed(*elapsed)
            ),
        }
    }
}

/// Per-archive outcome of the rebuild loop.
#[derive(Debug)]
struct VolumeOutcome {
    tarfile: String,
    result: std::result::Result<String, VolumeFailure>,
}

/// Collects the outcome of every rebuild entry; the batch status is
/// computed once by [`RebuildReport::finish`].
#[derive(Debug, Default)]
pub struct RebuildReport {
    outcomes: Vec<VolumeOutcome>,
}

impl RebuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&mut self, tarfile: &str, tag: &str) {
        self.outcomes.push(VolumeOutcome {
            tarfile: tarfile.to_owned(),
            result: Ok(tag.to_owned()),
        });
    }

    pub fn failed(&mut self, tarfile: &str, failure: VolumeFailure) {
        tracing::error!(%tarfile, %failure, "data volume rebuild failed");
        self.outcomes.push(VolumeOutcome {
            tarfile: tarfile.to_owned(),
            result: Err(failure),
        });
    }

    /// Tags created in this batch, or every failure if any entry failed.
    pub fn finish(self) -> std::result::Result<Vec<String>, BatchError> {
        let mut created = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome.result {
                Ok(tag) => created.push(tag),
                Err(failure) => failures.push((outcome.tarfile, failure)),
            }
        }

        if failures.is_empty() {
            Ok(created)
        } else {
            Err(BatchError { created, failures })
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(
    "{} of {} data volume(s) failed: {}",
    failures.len(),
    failures.len() + created.len(),
    failures.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>().join(", ")
)]
pub struct BatchError {
    pub created: Vec<String>,
    pub failures: Vec<(String, VolumeFailure)>,
}

/// `MM:SS`; minutes keep counting past the hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Sorted, de-duplicated union of existing and newly created tags.
pub fn known_volumes<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    created: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    existing
        .into_iter()
        .chain(created)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Write the comma-joined tag list consumed by later CI steps.
pub fn write_volume_list(path: &Path, tags: &[String]) -> Result<()> {
    tracing::info!(
        path = %path.display(),
        count = tags.len(),
        "writing list of data volumes"
    );
    std::fs::write(path, tags.join(",")).map_err(|e| Error::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
