use super::vote_aggregator::{apply_vote, tally};
use crate::domain::{now_millis, Orientation, Viewer, VoteChange, VoteTally};
use crate::infrastructure::store::{Mutation, Store};
use brat_errors::AppError;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub change: VoteChange,
    pub tally: VoteTally,
}

pub struct CastVote {
    store: Store,
    // Serializes read-decide-write so two quick clicks can't both insert.
    write_lock: Mutex<()>,
}

impl CastVote {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn execute(
        &self,
        viewer: &Viewer,
        creation_id: Uuid,
        orientation: Orientation,
    ) -> Result<VoteOutcome, AppError> {
        if viewer.id().is_none() {
            tracing::info!("Anonymous vote on {} rejected", creation_id);
            return Err(AppError::AuthRequired);
        }

        let _guard = self.write_lock.lock().await;

        let snapshot = self.store.query().await?;
        let change = apply_vote(&snapshot.votes, viewer, creation_id, orientation, now_millis())?;
        self.store.transact(vec![Mutation::from(&change)]).await?;

        let votes = change.apply(snapshot.votes);
        let tally = tally(creation_id, &votes, viewer);

        tracing::info!(
            "Vote {} on {}: {} (score {})",
            change.kind(),
            creation_id,
            orientation,
            tally.score()
        );
        Ok(VoteOutcome { change, tally })
    }
}
