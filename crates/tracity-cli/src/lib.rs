//! Tracity command line tool.
//!
//! Lists, imports, filters and summarizes the dataset collections stored
//! by the Tracity server.

pub mod config;
pub mod import;

pub use config::{Command, Config, version_info};
pub use import::{parse_documents, read_documents};
