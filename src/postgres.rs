//! Connection pooling shared by the `PostgreSQL` adapters.
//!
//! Diesel is synchronous, so every adapter offloads its queries to the
//! blocking thread pool through [`run_blocking`].

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;
use tokio::task::JoinError;

/// `PostgreSQL` connection pool type used by every adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Failure to obtain a connection or to join the blocking task.
#[derive(Debug, Error)]
pub enum BlockingError {
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// The blocking task panicked or was cancelled.
    #[error("blocking task join error: {0}")]
    Join(#[from] JoinError),
}

/// Builds a pool for the given database URL.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be established.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn run_blocking<F, T, E>(pool: &PgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<BlockingError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(|err| E::from(BlockingError::from(err)))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| E::from(BlockingError::from(err)))?
}
