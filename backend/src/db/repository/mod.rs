//! Repository trait definitions for the exposure record store.
//!
//! - [`error`]: Error types for repository operations
//! - [`exposure`]: The [`ExposureRepository`] contract implemented by every backend

pub mod error;
pub mod exposure;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use exposure::ExposureRepository;
