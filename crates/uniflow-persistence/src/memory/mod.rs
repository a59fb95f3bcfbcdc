//! In-Memory Repository Implementations
//!
//! Thread-safe in-memory implementations of domain repository interfaces.
//! Used for development, tests, and as the default backend.

mod task_repository;

pub use task_repository::InMemoryTaskRepository;
