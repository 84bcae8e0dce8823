//! Scan a trace, strip the PDBs it needs and rebuild their symcache files
//!
//! Runs strictly in order, one external tool at a time:
//! 1. enumerate the PDBs referenced by the trace
//! 2. for each watched PDB without a symcache file, retrieve it and strip it
//!    into its own temporary directory
//! 3. rebuild symcache files from the stripped copies
//! 4. verify the results and clean up
//!
//! A failure on one PDB never stops the others; it is reported and shows up
//! in the final [`Outcome`].
//!
//! @module pipeline

pub mod report;
pub mod workspace;

pub use report::{Outcome, RunReport, UncachedReference};

use crate::core::config::SymbolsConfig;
use crate::core::error::Result;
use crate::symbols::scrape::file_name_of;
use crate::symbols::{
    mentions_watched, parse_retrieved_path, parse_rsds_line, SymbolReference, SymcacheDir,
};
use crate::tools::{Invocation, Toolchain};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use workspace::{RenamedPdbs, StagingDirs};

/// Run the whole conversion for one trace
pub fn run<T: Toolchain, W: Write>(
    trace: &Path,
    symbols: &SymbolsConfig,
    tools: &mut T,
    out: &mut W,
) -> Result<RunReport> {
    let mut conversion = Conversion {
        symbols,
        symcache: SymcacheDir::new(&symbols.symcache_dir),
        tools,
        out,
        staging: StagingDirs::new(),
        local_pdbs: Vec::new(),
        expected: Vec::new(),
        report: RunReport::new(trace),
    };

    writeln!(
        conversion.out,
        "Pre-translating chrome symbols from stripped PDBs to avoid 10-15 minute translation times."
    )?;

    let found_uncached = conversion.scan(trace)?;

    if conversion.staging.is_empty() {
        let (message, outcome) = if found_uncached {
            ("No PDBs copied, nothing to do.", Outcome::NothingCopied)
        } else {
            ("No uncached PDBS found, nothing to do.", Outcome::NothingToDo)
        };
        writeln!(conversion.out, "{}", message)?;
        conversion.report.outcome = outcome;
        return Ok(conversion.report);
    }

    conversion.rebuild(trace)
}

/// State accumulated while a trace is processed
struct Conversion<'a, T, W> {
    symbols: &'a SymbolsConfig,
    symcache: SymcacheDir,
    tools: &'a mut T,
    out: &'a mut W,
    staging: StagingDirs,
    /// Locally built PDBs that must be hidden during the rebuild
    local_pdbs: Vec<PathBuf>,
    /// Symcache files the rebuild has to produce
    expected: Vec<PathBuf>,
    report: RunReport,
}

impl<'a, T: Toolchain, W: Write> Conversion<'a, T, W> {
    /// Enumerate the trace's PDBs and stage a stripped copy of each uncached one.
    ///
    /// Returns whether any uncached watched PDB was found.
    fn scan(&mut self, trace: &Path) -> Result<bool> {
        let invocation = Invocation::EnumerateSymbols {
            trace: trace.to_path_buf(),
        };
        writeln!(self.out, "> {}", self.tools.command_line(&invocation))?;
        let output = self.tools.run(&invocation)?;
        debug!(lines = output.lines.len(), "Enumerated trace symbols");

        let mut found_uncached = false;
        let mut scheduled = HashSet::new();

        for line in &output.lines {
            if !mentions_watched(line, &self.symbols.watched_binaries) {
                continue;
            }
            let Some(reference) = parse_rsds_line(line) else {
                continue;
            };

            let symcache_file = self.symcache.path_for(&reference);
            if self.symcache.contains(&reference) {
                debug!(file = %symcache_file.display(), "Symcache file already exists");
                continue;
            }
            if !scheduled.insert(symcache_file.clone()) {
                debug!(file = %symcache_file.display(), "PDB listed twice in trace");
                continue;
            }

            found_uncached = true;
            self.convert(reference, symcache_file)?;
        }

        Ok(found_uncached)
    }

    fn convert(&mut self, reference: SymbolReference, symcache_file: PathBuf) -> Result<()> {
        writeln!(
            self.out,
            "Found uncached reference to {}: {} - {}",
            reference.pdb_file_name(),
            reference.signature_hex(),
            reference.age
        )?;
        self.expected.push(symcache_file.clone());

        match self.retrieve(&reference)? {
            Some(source) => self.strip(&source)?,
            None => {
                writeln!(
                    self.out,
                    "Failed to retrieve symbols. Check for RetrieveSymbols.exe and support files."
                )?;
                self.report.failed_retrievals.push(reference.pdb_path.clone());
            }
        }

        self.report.uncached.push(UncachedReference {
            reference,
            symcache_file,
        });
        Ok(())
    }

    /// Download a PDB, falling back to a locally built one
    fn retrieve(&mut self, reference: &SymbolReference) -> Result<Option<PathBuf>> {
        let invocation = Invocation::RetrieveSymbols {
            signature: reference.signature_hex(),
            age: reference.age,
            pdb_name: reference.pdb_file_name().to_string(),
        };
        writeln!(self.out, "> {}", self.tools.command_line(&invocation))?;

        let mut retrieved = None;
        match self.tools.run(&invocation) {
            Ok(output) => {
                for line in &output.lines {
                    writeln!(self.out, "{}", line.trim())?;
                    if let Some(path) = parse_retrieved_path(line) {
                        retrieved = Some(path);
                    }
                }
            }
            Err(e) => warn!(error = %e, pdb = %reference.pdb_path, "Symbol retrieval did not run"),
        }

        if retrieved.is_none() {
            let local = PathBuf::from(&reference.pdb_path);
            if local.exists() {
                info!(pdb = %local.display(), "Using locally built PDB");
                if !self.local_pdbs.contains(&local) {
                    self.local_pdbs.push(local.clone());
                    self.report.local_pdbs.push(local.clone());
                }
                retrieved = Some(local);
            }
        }

        Ok(retrieved)
    }

    /// Copy a stripped version of `source` into a new staging directory
    fn strip(&mut self, source: &Path) -> Result<()> {
        let dir = self.staging.create()?;
        let dest = dir.join(file_name_of(&source.to_string_lossy()));
        writeln!(self.out, "Copying PDB to {}", dest.display())?;

        let invocation = Invocation::StripPdb {
            source: source.to_path_buf(),
            dest: dest.clone(),
        };
        debug!(command = %self.tools.command_line(&invocation), "Stripping PDB");

        let succeeded = match self.tools.run(&invocation) {
            Ok(output) => {
                for line in &output.lines {
                    writeln!(self.out, "{}", line.trim())?;
                }
                output.success
            }
            Err(e) => {
                warn!(error = %e, "pdbcopy did not run");
                false
            }
        };

        if succeeded && dest.exists() {
            self.report.stripped.push(dest);
        } else {
            writeln!(
                self.out,
                "Warning: failed to strip {}; {} was not created.",
                source.display(),
                dest.display()
            )?;
            self.report.strip_failures.push(source.to_path_buf());
        }
        Ok(())
    }

    /// Convert the staged PDBs to symcache files, verify and clean up
    fn rebuild(mut self, trace: &Path) -> Result<RunReport> {
        let symbol_path = self.staging.symbol_path();
        self.report.temp_dirs = self.staging.paths();
        writeln!(
            self.out,
            "Stripped PDBs are in {}. Converting to symcache files now.",
            symbol_path
        )?;

        let renamed = RenamedPdbs::rename_all(&self.local_pdbs, &mut *self.out)?;

        let invocation = Invocation::BuildSymcache {
            trace: trace.to_path_buf(),
            symbol_path,
        };
        writeln!(self.out, "> {}", self.tools.command_line(&invocation))?;
        let build = self.tools.run(&invocation);

        renamed.restore()?;

        // xperf's build output is noise; only the files on disk matter
        match build {
            Ok(output) => debug!(
                lines = output.lines.len(),
                success = output.success,
                "Symcache build finished"
            ),
            Err(e) => {
                warn!(error = %e, "Symcache build did not run");
                writeln!(self.out, "Error: {}", e)?;
            }
        }

        for file in &self.expected {
            if file.exists() {
                writeln!(self.out, "{} generated.", file.display())?;
                self.report.generated.push(file.clone());
            } else {
                writeln!(self.out, "Error: {} not generated.", file.display())?;
                self.report.missing.push(file.clone());
            }
        }

        if self.report.missing.is_empty() {
            self.staging.remove();
            self.report.outcome = Outcome::Converted;
        } else {
            writeln!(
                self.out,
                "Retaining PDBs to allow rerunning xperf command-line."
            )?;
            self.report.temp_dirs = self.staging.retain();
            self.report.temp_dirs_retained = true;
            self.report.outcome = Outcome::VerificationFailed;
        }

        info!(
            outcome = ?self.report.outcome,
            generated = self.report.generated.len(),
            missing = self.report.missing.len(),
            "Conversion finished"
        );
        Ok(self.report)
    }
}
