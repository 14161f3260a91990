//! Report output
//!
//! - `text`: Markdown report for the console
//! - `json`: every computed view, for downstream tooling

pub mod json;
pub mod text;
