//! Temporary directories and renamed PDBs owned by a run

use crate::core::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// One temporary directory per stripped PDB.
///
/// Separate directories let several Chrome versions, whose PDBs all share a
/// file name, be converted in the same run.
#[derive(Debug, Default)]
pub struct StagingDirs {
    dirs: Vec<TempDir>,
}

impl StagingDirs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh directory and return its path
    pub fn create(&mut self) -> Result<PathBuf> {
        let dir = tempfile::Builder::new().prefix("symstrip-").tempdir()?;
        let path = dir.path().to_path_buf();
        self.dirs.push(dir);
        Ok(path)
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.dirs.iter().map(|d| d.path().to_path_buf()).collect()
    }

    /// Value for `_NT_SYMBOL_PATH` that searches only the staged PDBs
    pub fn symbol_path(&self) -> String {
        self.dirs
            .iter()
            .map(|d| d.path().display().to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Delete every directory. Failures are logged and skipped.
    pub fn remove(self) {
        for dir in self.dirs {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(dir = %path.display(), error = %e, "Failed to delete temporary directory");
            }
        }
    }

    /// Keep every directory on disk and return their paths
    pub fn retain(self) -> Vec<PathBuf> {
        self.dirs.into_iter().map(TempDir::keep).collect()
    }
}

/// Local PDBs renamed out of xperf's way for the duration of a symcache build.
///
/// Dropping the guard puts every file back, so an early return cannot leave
/// a developer's PDB renamed.
#[derive(Debug)]
pub struct RenamedPdbs {
    renamed: Vec<(PathBuf, PathBuf)>,
}

impl RenamedPdbs {
    /// Rename each `x.pdb` to `x.pdbx`, reporting every rename on `out`
    pub fn rename_all<W: Write>(pdbs: &[PathBuf], out: &mut W) -> Result<Self> {
        let mut guard = Self {
            renamed: Vec::with_capacity(pdbs.len()),
        };
        for original in pdbs {
            let hidden = hidden_name(original);
            writeln!(
                out,
                "Renaming {} to {} to stop unstripped PDBs from being used.",
                original.display(),
                hidden.display()
            )?;
            fs::rename(original, &hidden).map_err(|source| Error::Rename {
                from: original.clone(),
                to: hidden.clone(),
                source,
            })?;
            guard.renamed.push((original.clone(), hidden));
        }
        Ok(guard)
    }

    /// Put every file back under its original name.
    ///
    /// All renames are attempted; the first failure is returned.
    pub fn restore(mut self) -> Result<()> {
        let mut first_error = None;
        for (original, hidden) in self.renamed.drain(..) {
            if let Err(source) = fs::rename(&hidden, &original) {
                warn!(file = %original.display(), error = %source, "Failed to restore PDB");
                first_error.get_or_insert(Error::Rename {
                    from: hidden,
                    to: original,
                    source,
                });
            } else {
                debug!(file = %original.display(), "Restored PDB");
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for RenamedPdbs {
    fn drop(&mut self) {
        for (original, hidden) in self.renamed.drain(..) {
            if let Err(e) = fs::rename(&hidden, &original) {
                warn!(file = %original.display(), error = %e, "Failed to restore PDB");
            }
        }
    }
}

/// `chrome.dll.pdb` becomes `chrome.dll.pdbx`
fn hidden_name(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push("x");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_dirs_removed() {
        let mut staging = StagingDirs::new();
        let first = staging.create().unwrap();
        let second = staging.create().unwrap();
        assert_ne!(first, second);
        assert!(first.is_dir() && second.is_dir());
        assert_eq!(
            staging.symbol_path(),
            format!("{};{}", first.display(), second.display())
        );

        staging.remove();
        assert!(!first.exists());
        assert!(!second.exists());
    }

    #[test]
    fn test_staging_dirs_retained() {
        let mut staging = StagingDirs::new();
        let dir = staging.create().unwrap();
        std::fs::write(dir.join("chrome.dll.pdb"), b"pdb").unwrap();

        let kept = staging.retain();
        assert_eq!(kept, vec![dir.clone()]);
        assert!(dir.join("chrome.dll.pdb").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rename_and_restore() {
        let temp = TempDir::new().unwrap();
        let pdb = temp.path().join("chrome.dll.pdb");
        std::fs::write(&pdb, b"pdb").unwrap();

        let mut out = Vec::new();
        let renamed = RenamedPdbs::rename_all(&[pdb.clone()], &mut out).unwrap();
        assert!(!pdb.exists());
        assert!(temp.path().join("chrome.dll.pdbx").exists());
        assert!(String::from_utf8(out).unwrap().starts_with("Renaming "));

        renamed.restore().unwrap();
        assert!(pdb.exists());
        assert!(!temp.path().join("chrome.dll.pdbx").exists());
    }

    #[test]
    fn test_drop_restores() {
        let temp = TempDir::new().unwrap();
        let pdb = temp.path().join("chrome_child.dll.pdb");
        std::fs::write(&pdb, b"pdb").unwrap();

        {
            let _renamed = RenamedPdbs::rename_all(&[pdb.clone()], &mut std::io::sink()).unwrap();
            assert!(!pdb.exists());
        }
        assert!(pdb.exists());
    }

    #[test]
    fn test_failed_rename_restores_earlier_files() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("chrome.dll.pdb");
        std::fs::write(&present, b"pdb").unwrap();
        let absent = temp.path().join("missing.pdb");

        let result = RenamedPdbs::rename_all(&[present.clone(), absent], &mut std::io::sink());
        assert!(matches!(result, Err(Error::Rename { .. })));
        assert!(present.exists());
    }
}
