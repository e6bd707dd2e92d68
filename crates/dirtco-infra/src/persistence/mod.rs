//! Persistence implementations
//!
//! File-based implementations of the domain repository traits.

mod file_record_repo;

pub use file_record_repo::FileRecordRepository;
