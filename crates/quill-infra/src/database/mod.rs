//! Post and user persistence.

mod memory;
mod pool;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use memory::{InMemoryPostRepository, InMemoryUserRepository};
pub use pool::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use pool::DatabasePool;
#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresPostRepository, PostgresUserRepository};
