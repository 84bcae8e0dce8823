//! symstrip - pre-translate Chrome symbols for WPA
//!
//! WPA converts PDBs to `.symcache` files before it can use them, and for the
//! full chrome.dll and chrome_child.dll PDBs that takes many minutes. This
//! crate finds the Chrome PDBs a trace needs, strips them with pdbcopy.exe
//! and has xperf build the symcache files from the stripped copies.

pub mod cli;
pub mod core;
pub mod output;
pub mod pipeline;
pub mod symbols;
pub mod tools;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use pipeline::{Outcome, RunReport};
