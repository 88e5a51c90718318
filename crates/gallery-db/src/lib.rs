//! Gallery metadata store
//!
//! Media, user and album records live behind the [`MediaMetadataStore`] trait.
//! Postgres is the production backend; the in-memory store backs local
//! development and tests.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryMetadataStore;
pub use postgres::{connect, run_migrations, PgMetadataStore};
pub use traits::MediaMetadataStore;
