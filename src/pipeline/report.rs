//! What a run did, for the closing summary and `--json`

use crate::core::error::Error;
use crate::symbols::SymbolReference;
use crate::tools::SkipReason;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Exit code used by `--strict` when a run left work undone
pub const EXIT_INCOMPLETE: i32 = 2;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Preflight decided there was nothing the tool could or should do
    Skipped { reason: SkipReason },
    /// Every watched PDB in the trace already had a symcache file
    NothingToDo,
    /// Uncached PDBs were found but none could be retrieved
    NothingCopied,
    /// All expected symcache files exist
    Converted,
    /// At least one expected symcache file is missing after the build
    VerificationFailed,
    /// A tool the scan depends on could not be run
    Aborted,
}

impl Outcome {
    /// Process exit code. Without `strict` every outcome exits 0.
    pub fn exit_code(&self, strict: bool) -> i32 {
        match self {
            Outcome::NothingCopied | Outcome::VerificationFailed | Outcome::Aborted if strict => {
                EXIT_INCOMPLETE
            }
            _ => 0,
        }
    }

    /// Short name used in the closing summary
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Skipped { .. } => "skipped",
            Outcome::NothingToDo => "nothing to do",
            Outcome::NothingCopied => "nothing copied",
            Outcome::Converted => "converted",
            Outcome::VerificationFailed => "verification failed",
            Outcome::Aborted => "aborted",
        }
    }
}

/// A watched PDB that had no symcache file when the run started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UncachedReference {
    #[serde(flatten)]
    pub reference: SymbolReference,
    pub symcache_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub trace: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub outcome: Outcome,
    pub uncached: Vec<UncachedReference>,
    /// PDB paths for which neither the symbol server nor the disk had a file
    pub failed_retrievals: Vec<String>,
    /// Locally built PDBs used instead of downloaded ones
    pub local_pdbs: Vec<PathBuf>,
    /// Stripped copies written by pdbcopy
    pub stripped: Vec<PathBuf>,
    /// Sources pdbcopy failed to produce a copy of
    pub strip_failures: Vec<PathBuf>,
    pub temp_dirs: Vec<PathBuf>,
    /// True when `temp_dirs` were left on disk for a manual rerun
    pub temp_dirs_retained: bool,
    pub generated: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    /// Set when the run was aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(trace: &Path) -> Self {
        Self {
            trace: trace.to_path_buf(),
            generated_at: Utc::now(),
            outcome: Outcome::NothingToDo,
            uncached: Vec::new(),
            failed_retrievals: Vec::new(),
            local_pdbs: Vec::new(),
            stripped: Vec::new(),
            strip_failures: Vec::new(),
            temp_dirs: Vec::new(),
            temp_dirs_retained: false,
            generated: Vec::new(),
            missing: Vec::new(),
            error: None,
        }
    }

    pub fn skipped(trace: &Path, reason: SkipReason) -> Self {
        Self {
            outcome: Outcome::Skipped { reason },
            ..Self::new(trace)
        }
    }

    pub fn aborted(trace: &Path, error: &Error) -> Self {
        Self {
            outcome: Outcome::Aborted,
            error: Some(error.to_string()),
            ..Self::new(trace)
        }
    }
}
