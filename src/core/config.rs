//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Substring of `_NT_SYMBOL_PATH` that signals Chrome symbols are in use
pub const DEFAULT_SERVER_MARKER: &str = "chromium-browser-symsrv";

/// Where xperf writes its symcache files unless told otherwise
pub const DEFAULT_SYMCACHE_DIR: &str = r"c:\symcache";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub symbols: SymbolsConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Marker that must appear in _NT_SYMBOL_PATH for any work to happen
    pub server_marker: String,
    /// Binary names whose PDBs get stripped
    pub watched_binaries: Vec<String>,
    /// Directory xperf reads and writes symcache files in
    pub symcache_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Directory holding RetrieveSymbols.exe and friends
    pub dir: Option<PathBuf>,
    /// Trace-symbol enumerator, resolved through PATH
    pub xperf: String,
    pub retrieve_symbols: String,
    pub pdbcopy: String,
    /// Files copied next to the tools when missing
    pub support_files: Vec<String>,
    /// Source of the support files, relative to the tool directory
    pub third_party_dir: PathBuf,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            server_marker: DEFAULT_SERVER_MARKER.to_string(),
            watched_binaries: vec!["chrome.dll".to_string(), "chrome_child.dll".to_string()],
            symcache_dir: PathBuf::from(DEFAULT_SYMCACHE_DIR),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            xperf: "xperf".to_string(),
            retrieve_symbols: "RetrieveSymbols.exe".to_string(),
            pdbcopy: "pdbcopy.exe".to_string(),
            support_files: vec![
                "pdbcopy.exe".to_string(),
                "dbghelp.dll".to_string(),
                "symsrv.dll".to_string(),
            ],
            third_party_dir: Path::new("..").join("third_party"),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::ConfigError {
                        message: format!("Config file not found: {}", p.display()),
                    });
                }
                p.to_path_buf()
            }
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.symbols.watched_binaries.is_empty() {
            return Err(Error::ConfigError {
                message: "symbols.watched_binaries must name at least one binary".to_string(),
            });
        }
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::symstrip_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the symstrip home directory
    pub fn symstrip_home() -> Result<PathBuf> {
        // Check SYMSTRIP_HOME env var first
        if let Ok(home) = std::env::var("SYMSTRIP_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "symstrip", "symstrip")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine symstrip home directory".to_string(),
            })
    }

    /// Directory the external tools live in.
    ///
    /// An explicit override wins, then the config file, then the directory of
    /// the running executable.
    pub fn tool_dir(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_override.or(self.tools.dir.as_deref()) {
            return Ok(dir.to_path_buf());
        }
        let exe = std::env::current_exe()?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::ConfigError {
                message: format!("Executable has no parent directory: {}", exe.display()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_chrome_setup() {
        let config = Config::default();
        assert_eq!(config.symbols.server_marker, "chromium-browser-symsrv");
        assert_eq!(
            config.symbols.watched_binaries,
            vec!["chrome.dll", "chrome_child.dll"]
        );
        assert_eq!(config.symbols.symcache_dir, PathBuf::from(r"c:\symcache"));
        assert_eq!(
            config.tools.support_files,
            vec!["pdbcopy.exe", "dbghelp.dll", "symsrv.dll"]
        );
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[symbols]
symcache_dir = 'd:\cache'
"#,
        )
        .unwrap();
        assert_eq!(config.symbols.symcache_dir, PathBuf::from(r"d:\cache"));
        assert_eq!(config.symbols.server_marker, DEFAULT_SERVER_MARKER);
        assert_eq!(config.tools.xperf, "xperf");
    }

    #[test]
    fn test_empty_watch_list_rejected() {
        let result = Config::parse("[symbols]\nwatched_binaries = []\n");
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = Config::parse("[symbols\n");
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[tools]\npdbcopy = \"pdbcopy64.exe\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tools.pdbcopy, "pdbcopy64.exe");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_tool_dir_override_wins() {
        let mut config = Config::default();
        config.tools.dir = Some(PathBuf::from("from-config"));
        assert_eq!(
            config.tool_dir(Some(Path::new("from-cli"))).unwrap(),
            PathBuf::from("from-cli")
        );
        assert_eq!(config.tool_dir(None).unwrap(), PathBuf::from("from-config"));
    }
}
