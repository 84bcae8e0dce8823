//! Symcache file naming and lookup

use super::scrape::SymbolReference;
use std::path::PathBuf;

/// xperf names the cache after chrome.dll for both watched binaries
const SYMCACHE_PREFIX: &str = "chrome.dll-";
const SYMCACHE_SUFFIX: &str = "v2.symcache";

/// Name of the symcache file xperf produces for a PDB signature and age.
///
/// Dashes are dropped from the signature; nothing else is normalized.
pub fn symcache_file_name(signature: &str, age: u32) -> String {
    format!(
        "{}{}{}{}",
        SYMCACHE_PREFIX,
        signature.replace('-', ""),
        age,
        SYMCACHE_SUFFIX
    )
}

/// The directory xperf keeps its symcache files in
#[derive(Debug, Clone)]
pub struct SymcacheDir {
    root: PathBuf,
}

impl SymcacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Expected cache file for a reference
    pub fn path_for(&self, reference: &SymbolReference) -> PathBuf {
        self.root
            .join(symcache_file_name(&reference.signature, reference.age))
    }

    /// Whether the cache file for a reference already exists
    pub fn contains(&self, reference: &SymbolReference) -> bool {
        self.path_for(reference).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::scrape::parse_rsds_line;
    use std::path::Path;
    use tempfile::TempDir;

    const SAMPLE: &str = r"[RSDS] PdbSig: {AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}; Age: 3; Pdb: C:\x\chrome.dll.pdb";

    #[test]
    fn test_file_name_strips_dashes_and_appends_age() {
        assert_eq!(
            symcache_file_name("AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE", 3),
            "chrome.dll-AAAAAAAABBBBCCCCDDDDEEEEEEEEEEEE3v2.symcache"
        );
    }

    #[test]
    fn test_file_name_keeps_case() {
        assert_eq!(
            symcache_file_name("be90dbc6-fe31-4842-9c72-7e2ea88f0adf", 10),
            "chrome.dll-be90dbc6fe3148429c727e2ea88f0adf10v2.symcache"
        );
    }

    #[test]
    fn test_chrome_child_uses_same_prefix() {
        let reference =
            parse_rsds_line(r"[RSDS] PdbSig: {1-2-3-4-5}; Age: 1; Pdb: C:\x\chrome_child.dll.pdb")
                .unwrap();
        let dir = SymcacheDir::new("cache");
        assert_eq!(
            dir.path_for(&reference),
            Path::new("cache").join("chrome.dll-123451v2.symcache")
        );
    }

    #[test]
    fn test_default_root_holds_expected_name() {
        let reference = parse_rsds_line(SAMPLE).unwrap();
        let expected_name = "chrome.dll-AAAAAAAABBBBCCCCDDDDEEEEEEEEEEEE3v2.symcache";
        let dir = SymcacheDir::new(crate::core::config::DEFAULT_SYMCACHE_DIR);
        let path = dir.path_for(&reference);

        assert_eq!(symcache_file_name(&reference.signature, reference.age), expected_name);
        assert!(path.ends_with(expected_name));
        assert!(path.starts_with(crate::core::config::DEFAULT_SYMCACHE_DIR));
    }

    #[cfg(windows)]
    #[test]
    fn test_default_root_path() {
        let reference = parse_rsds_line(SAMPLE).unwrap();
        let dir = SymcacheDir::new(crate::core::config::DEFAULT_SYMCACHE_DIR);
        assert_eq!(
            dir.path_for(&reference),
            PathBuf::from(r"c:\symcache\chrome.dll-AAAAAAAABBBBCCCCDDDDEEEEEEEEEEEE3v2.symcache")
        );
    }

    #[test]
    fn test_contains_checks_disk() {
        let temp = TempDir::new().unwrap();
        let dir = SymcacheDir::new(temp.path());
        let reference = parse_rsds_line(SAMPLE).unwrap();

        assert!(!dir.contains(&reference));
        std::fs::write(dir.path_for(&reference), b"").unwrap();
        assert!(dir.contains(&reference));
    }
}
