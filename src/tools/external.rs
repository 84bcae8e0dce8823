//! Process-backed toolchain

use super::{Invocation, ToolOutput, ToolPaths, Toolchain, SYMBOL_PATH_VAR};
use crate::core::error::{Error, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs xperf, RetrieveSymbols.exe and pdbcopy.exe as child processes
#[derive(Debug, Clone)]
pub struct ExternalTools {
    paths: ToolPaths,
}

impl ExternalTools {
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }

    fn program(&self, invocation: &Invocation) -> &Path {
        match invocation {
            Invocation::EnumerateSymbols { .. } | Invocation::BuildSymcache { .. } => {
                &self.paths.xperf
            }
            Invocation::RetrieveSymbols { .. } => &self.paths.retrieve_symbols,
            Invocation::StripPdb { .. } => &self.paths.pdbcopy,
        }
    }

    fn args(invocation: &Invocation) -> Vec<OsString> {
        match invocation {
            Invocation::EnumerateSymbols { trace } => {
                let mut args = vec![OsString::from("-i"), trace.as_os_str().to_owned()];
                args.extend(["-tle", "-tti", "-a", "symcache", "-dbgid"].map(OsString::from));
                args
            }
            Invocation::BuildSymcache { trace, .. } => {
                let mut args = vec![OsString::from("-i"), trace.as_os_str().to_owned()];
                args.extend(
                    ["-symbols", "-tle", "-tti", "-a", "symcache", "-build"].map(OsString::from),
                );
                args
            }
            Invocation::RetrieveSymbols {
                signature,
                age,
                pdb_name,
            } => vec![
                OsString::from(signature),
                OsString::from(age.to_string()),
                OsString::from(pdb_name),
            ],
            Invocation::StripPdb { source, dest } => vec![
                source.as_os_str().to_owned(),
                dest.as_os_str().to_owned(),
                OsString::from("-p"),
            ],
        }
    }
}

impl Toolchain for ExternalTools {
    fn command_line(&self, invocation: &Invocation) -> String {
        // xperf takes the trace right after -i; it is quoted since trace names often hold spaces
        let quoted_index = match invocation {
            Invocation::EnumerateSymbols { .. } | Invocation::BuildSymcache { .. } => Some(1),
            _ => None,
        };

        let mut line = self.program(invocation).display().to_string();
        for (index, arg) in Self::args(invocation).iter().enumerate() {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if Some(index) == quoted_index {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(&arg);
            }
        }
        line
    }

    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput> {
        let program = self.program(invocation);
        let mut command = Command::new(program);
        command
            .args(Self::args(invocation))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Invocation::BuildSymcache { symbol_path, .. } = invocation {
            command.env(SYMBOL_PATH_VAR, symbol_path);
        }

        debug!(program = %program.display(), "Launching tool");
        let output = command.output().map_err(|source| Error::ToolLaunch {
            tool: program.display().to_string(),
            source,
        })?;

        if !output.stderr.is_empty() {
            debug!(
                program = %program.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "Tool wrote to stderr"
            );
        }
        debug!(program = %program.display(), status = %output.status, "Tool exited");

        Ok(ToolOutput::from_stdout(
            &output.stdout,
            output.status.success(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tools() -> ExternalTools {
        ExternalTools::new(ToolPaths {
            xperf: PathBuf::from("xperf"),
            retrieve_symbols: PathBuf::from("RetrieveSymbols.exe"),
            pdbcopy: PathBuf::from("pdbcopy.exe"),
        })
    }

    #[test]
    fn test_enumerate_command_line() {
        let line = tools().command_line(&Invocation::EnumerateSymbols {
            trace: PathBuf::from("trace.etl"),
        });
        assert_eq!(line, r#"xperf -i "trace.etl" -tle -tti -a symcache -dbgid"#);
    }

    #[test]
    fn test_build_command_line() {
        let line = tools().command_line(&Invocation::BuildSymcache {
            trace: PathBuf::from("trace.etl"),
            symbol_path: "a;b".to_string(),
        });
        assert_eq!(
            line,
            r#"xperf -i "trace.etl" -symbols -tle -tti -a symcache -build"#
        );
    }

    #[test]
    fn test_retrieve_command_line() {
        let line = tools().command_line(&Invocation::RetrieveSymbols {
            signature: "AAAABBBB".to_string(),
            age: 3,
            pdb_name: "chrome.dll.pdb".to_string(),
        });
        assert_eq!(line, "RetrieveSymbols.exe AAAABBBB 3 chrome.dll.pdb");
    }

    #[test]
    fn test_strip_command_line() {
        let line = tools().command_line(&Invocation::StripPdb {
            source: PathBuf::from("in.pdb"),
            dest: PathBuf::from("out.pdb"),
        });
        assert_eq!(line, "pdbcopy.exe in.pdb out.pdb -p");
    }

    #[test]
    fn test_missing_tool_reports_launch_error() {
        let mut tools = ExternalTools::new(ToolPaths {
            xperf: PathBuf::from("definitely-not-a-real-xperf-binary"),
            retrieve_symbols: PathBuf::from("RetrieveSymbols.exe"),
            pdbcopy: PathBuf::from("pdbcopy.exe"),
        });
        let result = tools.run(&Invocation::EnumerateSymbols {
            trace: PathBuf::from("trace.etl"),
        });
        assert!(matches!(result, Err(Error::ToolLaunch { .. })));
    }
}
