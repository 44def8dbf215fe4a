mod memory;
mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{Mutation, QueryState, Snapshot};

#[cfg(feature = "postgres")]
pub use crate::infrastructure::db::PgStore;

use brat_errors::AppError;
use tokio::sync::watch;

/// Realtime collection of creations and votes.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    #[cfg(feature = "postgres")]
    Postgres(PgStore),
}

impl Store {
    pub fn in_memory() -> Self {
        Store::Memory(MemoryStore::new())
    }

    /// Latest complete snapshot, or the reason there is none.
    pub async fn query(&self) -> Result<Snapshot, AppError> {
        match self {
            Store::Memory(store) => store.query(),
            #[cfg(feature = "postgres")]
            Store::Postgres(store) => store.query(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        match self {
            Store::Memory(store) => store.subscribe(),
            #[cfg(feature = "postgres")]
            Store::Postgres(store) => store.subscribe(),
        }
    }

    /// Applies every mutation or none of them.
    pub async fn transact(&self, mutations: Vec<Mutation>) -> Result<(), AppError> {
        let count = mutations.len();
        let result = match self {
            Store::Memory(store) => store.transact(mutations),
            #[cfg(feature = "postgres")]
            Store::Postgres(store) => store.transact(mutations).await,
        };
        match &result {
            Ok(()) => tracing::debug!("Committed transaction with {} mutation(s)", count),
            Err(e) => tracing::warn!("Transaction rejected: {}", e),
        }
        result
    }
}
