//! Screen-scraping of external tool output
//!
//! The external tools have no machine-readable output, so this module is the
//! single place that knows their text formats. Both formats are unversioned;
//! the patterns below match the output of the Windows Performance Toolkit 10
//! `xperf` and of RetrieveSymbols.exe as shipped with UIforETW.
//!
//! Enumerator (`xperf -a symcache -dbgid`) lines of interest look like:
//!
//! ```text
//! "[RSDS] PdbSig: {be90dbc6-fe31-4842-9c72-7e2ea88f0adf}; Age: 1; Pdb: C:\b\build\src\out\Release\chrome.dll.pdb"
//! ```
//!
//! RetrieveSymbols.exe reports a successful download with:
//!
//! ```text
//! Found pdb file - placed it in c:\symbols\chrome.dll.pdb\BE90DBC6FE3148429C727E2EA88F0ADF1\chrome.dll.pdb
//! ```
//!
//! @module symbols/scrape

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// COMPILED REGEX PATTERNS
// =============================================================================

/// xperf `-dbgid` record for a PDB 7.0 (RSDS) debug directory entry
static RSDS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^"?\[RSDS\] PdbSig: \{([^}]*-[^}]*-[^}]*-[^}]*-[^}]*)\}; Age: (\d+); Pdb: (.+?)"?\s*$"#,
    )
    .expect("RSDS pattern is valid")
});

/// RetrieveSymbols.exe success marker
static RETRIEVED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Found .*file - placed it in (.+)$").expect("retrieval pattern is valid")
});

// =============================================================================
// SYMBOL REFERENCES
// =============================================================================

/// A PDB referenced by a module in the trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolReference {
    /// GUID exactly as printed by xperf, dashes included
    pub signature: String,
    pub age: u32,
    /// PDB path recorded in the binary at link time
    pub pdb_path: String,
}

impl SymbolReference {
    /// Signature with the dashes removed, as symbol servers and symcache names expect
    pub fn signature_hex(&self) -> String {
        self.signature.replace('-', "")
    }

    /// Final component of the recorded PDB path
    pub fn pdb_file_name(&self) -> &str {
        file_name_of(&self.pdb_path)
    }
}

/// Whether a line mentions one of the watched binaries anywhere.
///
/// This is plain substring containment, so a path that merely contains the
/// name also counts.
pub fn mentions_watched<S: AsRef<str>>(line: &str, watched: &[S]) -> bool {
    watched.iter().any(|name| line.contains(name.as_ref()))
}

/// Parse an xperf RSDS record
pub fn parse_rsds_line(line: &str) -> Option<SymbolReference> {
    let caps = RSDS_LINE.captures(line.trim())?;
    let age = caps[2].parse().ok()?;
    Some(SymbolReference {
        signature: caps[1].to_string(),
        age,
        pdb_path: caps[3].to_string(),
    })
}

/// Extract the download location from a RetrieveSymbols.exe success line
pub fn parse_retrieved_path(line: &str) -> Option<PathBuf> {
    let caps = RETRIEVED_LINE.captures(line.trim())?;
    Some(PathBuf::from(caps[1].trim()))
}

/// Last component of a path that may use either separator.
///
/// PDB paths come from Windows builds, so `\` has to be honored on every host.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

// =============================================================================
// TESTS
// =============================================================================
