//! Checks that decide whether a run has anything to do

use super::ToolPaths;
use crate::core::config::Config;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Why a run stopped before scanning the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The Chromium symbol server is not configured, so WPA never sees full Chrome PDBs
    NoSymbolServer,
    PdbcopyMissing,
    RetrieveSymbolsMissing,
}

impl SkipReason {
    /// Line printed for the operator
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NoSymbolServer => {
                "Chromium symbol server is not in _NT_SYMBOL_PATH. No symbol stripping needed."
            }
            SkipReason::PdbcopyMissing => "pdbcopy.exe not found. No symbol stripping is possible.",
            SkipReason::RetrieveSymbolsMissing => {
                "RetrieveSymbols.exe not found. No symbol retrieval is possible."
            }
        }
    }
}

/// Result of the preflight checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    Ready(ToolPaths),
    Skip(SkipReason),
}

impl Preflight {
    /// Gate on the symbol path, stage support files and locate the tools.
    ///
    /// `symbol_path` is the current value of `_NT_SYMBOL_PATH`.
    pub fn check(symbol_path: Option<&str>, tool_dir: &Path, config: &Config) -> Self {
        if !has_server_marker(symbol_path, &config.symbols.server_marker) {
            return Preflight::Skip(SkipReason::NoSymbolServer);
        }

        stage_support_files(tool_dir, config);

        let pdbcopy = tool_dir.join(&config.tools.pdbcopy);
        if !pdbcopy.exists() {
            return Preflight::Skip(SkipReason::PdbcopyMissing);
        }

        let retrieve_symbols = tool_dir.join(&config.tools.retrieve_symbols);
        if !retrieve_symbols.exists() {
            return Preflight::Skip(SkipReason::RetrieveSymbolsMissing);
        }

        Preflight::Ready(ToolPaths {
            xperf: PathBuf::from(&config.tools.xperf),
            retrieve_symbols,
            pdbcopy,
        })
    }
}

/// Whether the symbol path references the Chromium symbol server
pub fn has_server_marker(symbol_path: Option<&str>, marker: &str) -> bool {
    symbol_path.is_some_and(|path| path.contains(marker))
}

/// Copy missing support files from the third-party directory.
///
/// RetrieveSymbols.exe needs dbghelp.dll and symsrv.dll beside it. Copy
/// failures are only logged; the existence checks that follow decide.
fn stage_support_files(tool_dir: &Path, config: &Config) {
    let source_dir = tool_dir.join(&config.tools.third_party_dir);
    for name in &config.tools.support_files {
        let dest = tool_dir.join(name);
        if dest.exists() {
            continue;
        }
        let source = source_dir.join(name);
        match fs::copy(&source, &dest) {
            Ok(_) => debug!(file = %name, from = %source.display(), "Copied support file"),
            Err(e) => warn!(
                file = %name,
                from = %source.display(),
                error = %e,
                "Failed to copy support file"
            ),
        }
    }
}
