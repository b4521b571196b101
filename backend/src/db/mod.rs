//! Record store access for exposure events.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer (axum handlers)                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services: aggregation, options, drilldown, dashboard   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ &dyn ExposureRepository
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository trait (repository/exposure.rs)              │
//! └──────────┬─────────────────────────────────┬────────────┘
//!            │                                 │
//!   ┌────────▼─────────┐             ┌─────────▼────────┐
//!   │ LocalRepository  │             │ PostgresRepository│
//!   │   (in-memory)    │             │  (Diesel + r2d2)  │
//!   └──────────────────┘             └──────────────────┘
//! ```
//!
//! There is no process-wide repository handle. The binary builds one through
//! [`RepositoryFactory`] and passes it down explicitly.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{ErrorContext, ExposureRepository, RepositoryError, RepositoryResult};
