//! Turn storage implementations for Daybook.
//!
//! The backend is chosen from the connection URL at startup:
//! `sqlite://...` for the embedded file engine, `postgres://...` for a
//! networked server. Both expose identical ordering and atomicity
//! guarantees through the [`TurnStore`] trait.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use std::sync::Arc;

use daybook_core::error::StoreError;
use daybook_core::store::TurnStore;

/// Connect to a turn store, selecting the backend from the URL scheme.
pub async fn connect(url: &str) -> Result<Arc<dyn TurnStore>, StoreError> {
    if url.starts_with("sqlite:") {
        #[cfg(feature = "sqlite")]
        {
            return Ok(Arc::new(SqliteStore::new(url).await?));
        }
        #[cfg(not(feature = "sqlite"))]
        return Err(StoreError::UnsupportedUrl(
            "built without the 'sqlite' feature".into(),
        ));
    }

    if url.starts_with("postgres:") || url.starts_with("postgresql:") {
        #[cfg(feature = "postgres")]
        {
            return Ok(Arc::new(PostgresStore::connect(url).await?));
        }
        #[cfg(not(feature = "postgres"))]
        return Err(StoreError::UnsupportedUrl(
            "built without the 'postgres' feature".into(),
        ));
    }

    Err(StoreError::UnsupportedUrl(url.into()))
}
