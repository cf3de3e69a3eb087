#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # subwatch-store
//!
//! Persistence for the stickied posts each sub had when it was last flagged.
//!
//! - [`StateStore`]: the get/overwrite seam the reconciler depends on
//! - [`SurrealStateStore`]: SurrealDB backend (`rocksdb://` on disk, `mem://`
//!   in tests)
//! - [`InMemoryStateStore`]: map-backed backend for tests
//!
//! ## Example
//!
//! ```ignore
//! use subwatch_store::{StateStore, StoreConfig, SurrealStateStore};
//!
//! let store = SurrealStateStore::connect(StoreConfig::in_memory()).await?;
//! store.health_check().await?;
//! let prior = store.get(&"r/pics".parse()?).await?;
//! ```

pub mod client;
pub mod error;
pub mod memory;
pub mod state_store;

pub use client::{Credentials, StoreConfig, SurrealStateStore};
pub use error::{PersistenceError, PersistenceResult, from_surrealdb_error};
pub use memory::InMemoryStateStore;
pub use state_store::{STATE_TABLE, StateStore, SubStateRecord};
