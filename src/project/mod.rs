//! Loading schema sources from the file system.

pub mod file_loader;
mod source_loader;

pub use source_loader::{LoadError, SourceLoader};
