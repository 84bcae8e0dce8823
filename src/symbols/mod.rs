//! Symbol references found in traces and the symcache files derived from them

pub mod scrape;
pub mod symcache;

pub use scrape::{mentions_watched, parse_retrieved_path, parse_rsds_line, SymbolReference};
pub use symcache::{symcache_file_name, SymcacheDir};
