//! Output formatting

pub mod human;
pub mod json;
