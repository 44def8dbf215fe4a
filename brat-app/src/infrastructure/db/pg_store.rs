use super::entities::{creation, vote, BratCreation, Vote};
use crate::domain;
use crate::infrastructure::store::{MemoryStore, Mutation, QueryState, Snapshot};
use brat_errors::AppError;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

fn unavailable(e: DbErr) -> AppError {
    tracing::error!("Database error: {}", e);
    AppError::RemoteUnavailable(e.to_string())
}

/// Postgres-backed store. Reads are served from the last loaded snapshot,
/// which is reloaded after every committed transaction.
#[derive(Clone)]
pub struct PgStore {
    db: DatabaseConnection,
    live: MemoryStore,
    reloads: Arc<AtomicU64>,
}

impl PgStore {
    pub async fn connect(db: DatabaseConnection) -> Self {
        let store = Self {
            db,
            live: MemoryStore::with_state(QueryState::Loading),
            reloads: Arc::new(AtomicU64::new(0)),
        };
        store.refresh().await;
        store
    }

    pub fn query(&self) -> Result<Snapshot, AppError> {
        self.live.query()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.live.subscribe()
    }

    /// Reloads both collections and publishes the result. The version is
    /// taken before loading, so a reload that started after a later commit
    /// always wins over one that started before it.
    pub async fn refresh(&self) {
        let version = self.reloads.fetch_add(1, Ordering::SeqCst) + 1;
        match self.load().await {
            Ok(snapshot) => {
                tracing::debug!(
                    "Loaded {} creation(s), {} vote(s)",
                    snapshot.creations.len(),
                    snapshot.votes.len()
                );
                self.live.publish(version, QueryState::Ready(snapshot));
            }
            Err(e) => {
                self.live.publish(version, QueryState::Failed(e));
            }
        }
    }

    async fn load(&self) -> Result<Snapshot, AppError> {
        let creations: Vec<domain::Creation> = BratCreation::find()
            .order_by_asc(creation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(unavailable)?
            .into_iter()
            .map(Into::into)
            .collect();

        let votes = Vote::find()
            .all(&self.db)
            .await
            .map_err(unavailable)?
            .into_iter()
            .map(domain::Vote::try_from)
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Snapshot { creations, votes })
    }

    pub async fn transact(&self, mutations: Vec<Mutation>) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(unavailable)?;

        // Dropping `txn` on an early return rolls everything back.
        for mutation in mutations {
            match mutation {
                Mutation::InsertCreation(c) => {
                    let active = creation::ActiveModel {
                        id: Set(c.id),
                        text: Set(c.text),
                        preset: Set(c.preset),
                        created_at: Set(c.created_at),
                        created_by: Set(c.created_by),
                    };
                    active.insert(&txn).await.map_err(unavailable)?;
                }
                Mutation::InsertVote(v) => {
                    let active = vote::ActiveModel {
                        id: Set(v.id),
                        created_user_id: Set(v.created_user_id),
                        created_at: Set(v.created_at),
                        brat_creation_id: Set(v.brat_creation_id),
                        orientation: Set(v.orientation.as_str().to_string()),
                    };
                    active.insert(&txn).await.map_err(unavailable)?;
                }
                Mutation::UpdateVote { id, orientation } => {
                    let existing = Vote::find_by_id(id)
                        .one(&txn)
                        .await
                        .map_err(unavailable)?
                        .ok_or(AppError::NotFound)?;
                    let mut active: vote::ActiveModel = existing.into();
                    active.orientation = Set(orientation.as_str().to_string());
                    active.update(&txn).await.map_err(unavailable)?;
                }
                Mutation::DeleteVote { id } => {
                    let result = Vote::delete_by_id(id)
                        .exec(&txn)
                        .await
                        .map_err(unavailable)?;
                    if result.rows_affected == 0 {
                        return Err(AppError::NotFound);
                    }
                }
            }
        }

        txn.commit().await.map_err(unavailable)?;
        self.refresh().await;
        Ok(())
    }
}
