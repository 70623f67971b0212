//! CLI commands module.

mod analyze;
mod config;
mod enroll;
mod fuse;
mod util;

pub use analyze::AnalyzeCommand;
pub use config::ConfigCommand;
pub use enroll::EnrollCommand;
pub use fuse::FuseCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
