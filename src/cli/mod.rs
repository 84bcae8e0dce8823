//! CLI definition and handler

pub mod run;

use clap::Parser;
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
WPA takes 10-20 minutes to load the full PDBs of chrome.dll and
chrome_child.dll. Stripped PDBs load in seconds, so this tool converts them
ahead of time:

    1. xperf lists the PDBs referenced by the trace
    2. missing ones are fetched with RetrieveSymbols.exe (or taken from a
       local build) and stripped with pdbcopy.exe
    3. xperf turns the stripped PDBs into .symcache files that WPA loads
       directly

Nothing happens unless _NT_SYMBOL_PATH contains chromium-browser-symsrv.

ENVIRONMENT:
    _NT_SYMBOL_PATH    Must reference the Chromium symbol server
    SYMSTRIP_HOME      Directory holding config.toml
    SYMSTRIP_LOG       Log filter, e.g. "symstrip=debug"

EXAMPLES:
    symstrip trace.etl                  Convert symbols for a trace
    symstrip trace.etl --json out.json  Also write a JSON report
    symstrip trace.etl --strict         Exit 2 if any symcache file is missing
"#;

/// Pre-translate Chrome symbols for an ETW trace
#[derive(Parser, Debug)]
#[command(name = "symstrip")]
#[command(author, version)]
#[command(about = "Pre-translate Chrome symbols for an ETW trace")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    /// ETW trace (.etl) to convert symbols for
    pub trace: Option<PathBuf>,

    /// Configuration file (default: $SYMSTRIP_HOME/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding RetrieveSymbols.exe and pdbcopy.exe
    #[arg(long)]
    pub tool_dir: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Exit with status 2 when symbols could not be converted
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trace_is_optional() {
        let cli = Cli::try_parse_from(["symstrip"]).unwrap();
        assert!(cli.trace.is_none());
        assert!(cli.json.is_none());
        assert!(!cli.strict);
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "symstrip",
            "trace.etl",
            "--config",
            "c.toml",
            "--tool-dir",
            "bin",
            "--json",
            "report.json",
            "--strict",
        ])
        .unwrap();
        assert_eq!(cli.trace, Some(PathBuf::from("trace.etl")));
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert_eq!(cli.tool_dir, Some(PathBuf::from("bin")));
        assert_eq!(cli.json, Some(PathBuf::from("report.json")));
        assert!(cli.strict);
    }
}
