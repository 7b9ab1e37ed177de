//! Persistence backends for the rental catalog.
//!
//! - [`JsonFileStore`] keeps one JSON document per collection in a directory.
//! - [`MemoryStore`] keeps everything in process, for tests and demos.

mod error;
mod json_file;
mod memory;

pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
