//! External tools the pipeline drives
//!
//! Everything that launches a process goes through [`Toolchain`], so the
//! pipeline can be exercised without xperf or the symbol tools installed.

pub mod external;
pub mod preflight;

pub use external::ExternalTools;
pub use preflight::{has_server_marker, Preflight, SkipReason};

use crate::core::error::Result;
use std::path::PathBuf;

/// Environment variable xperf and dbghelp search for symbols with
pub const SYMBOL_PATH_VAR: &str = "_NT_SYMBOL_PATH";

/// Resolved locations of the external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub xperf: PathBuf,
    pub retrieve_symbols: PathBuf,
    pub pdbcopy: PathBuf,
}

/// One call into an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// List the PDB signatures of every module in a trace
    EnumerateSymbols { trace: PathBuf },
    /// Download a PDB from the symbol server
    RetrieveSymbols {
        signature: String,
        age: u32,
        pdb_name: String,
    },
    /// Copy a PDB with private symbols removed
    StripPdb { source: PathBuf, dest: PathBuf },
    /// Load symbols for a trace and write symcache files.
    ///
    /// `symbol_path` replaces `_NT_SYMBOL_PATH` for this call only.
    BuildSymcache { trace: PathBuf, symbol_path: String },
}

/// Captured stdout of a finished tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub lines: Vec<String>,
    pub success: bool,
}

impl ToolOutput {
    pub fn from_stdout(stdout: &[u8], success: bool) -> Self {
        Self {
            lines: String::from_utf8_lossy(stdout)
                .lines()
                .map(str::to_string)
                .collect(),
            success,
        }
    }
}

/// Runs external tools to completion, one at a time
pub trait Toolchain {
    /// Command line as shown to the operator before running it
    fn command_line(&self, invocation: &Invocation) -> String;

    /// Run the tool and wait for it to exit
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput>;
}
