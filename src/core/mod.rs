//! Configuration and error handling shared by every stage

pub mod config;
pub mod error;
