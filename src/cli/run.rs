//! Run command implementation

use crate::cli::Cli;
use crate::core::config::{Config, DEFAULT_SERVER_MARKER};
use crate::core::error::Result;
use crate::output;
use crate::pipeline::{self, RunReport};
use crate::tools::{
    has_server_marker, ExternalTools, Preflight, SkipReason, ToolPaths, SYMBOL_PATH_VAR,
};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, error, info};

/// Run the tool and return the process exit code
pub fn run(args: Cli) -> Result<i32> {
    let symbol_path = env::var(SYMBOL_PATH_VAR).ok();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&args, symbol_path.as_deref(), &mut out)
}

/// Run against an explicit symbol path, writing operator output to `out`
pub fn execute<W: Write>(args: &Cli, symbol_path: Option<&str>, out: &mut W) -> Result<i32> {
    let Some(trace) = args.trace.as_deref() else {
        writeln!(out, "Usage: symstrip trace.etl")?;
        return Ok(0);
    };

    // The marker gate comes first so a broken config cannot fail a run
    // that has nothing to do.
    let config = Config::load(args.config.as_deref());
    let marker = config
        .as_ref()
        .map_or(DEFAULT_SERVER_MARKER, |c| c.symbols.server_marker.as_str());

    let report = if !has_server_marker(symbol_path, marker) {
        if let Err(e) = &config {
            debug!(error = %e, "Ignoring config error, symbol server not in use");
        }
        skip(trace, SkipReason::NoSymbolServer, out)?
    } else {
        let config = config?;
        let tool_dir = config.tool_dir(args.tool_dir.as_deref())?;
        match Preflight::check(symbol_path, &tool_dir, &config) {
            Preflight::Skip(reason) => skip(trace, reason, out)?,
            Preflight::Ready(paths) => {
                info!(tool_dir = %tool_dir.display(), trace = %trace.display(), "Converting symbols");
                convert(trace, &config, paths, out)
            }
        }
    };

    write!(out, "{}", output::human::format(&report))?;

    if let Some(path) = &args.json {
        fs::write(path, output::json::format(&report)?)?;
        info!(path = %path.display(), "Wrote JSON report");
    }

    Ok(report.outcome.exit_code(args.strict))
}

fn skip<W: Write>(trace: &Path, reason: SkipReason, out: &mut W) -> Result<RunReport> {
    writeln!(out, "{}", reason.message())?;
    Ok(RunReport::skipped(trace, reason))
}

/// Run the pipeline; an error that stops it becomes an aborted report
fn convert<W: Write>(trace: &Path, config: &Config, paths: ToolPaths, out: &mut W) -> RunReport {
    let mut tools = ExternalTools::new(paths);
    match pipeline::run(trace, &config.symbols, &mut tools, out) {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Conversion aborted");
            RunReport::aborted(trace, &e)
        }
    }
}
