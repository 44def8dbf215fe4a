use super::snapshot::{Mutation, QueryState, Snapshot};
use brat_errors::AppError;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// In-process live store. Every committed transaction is pushed to subscribers.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<watch::Sender<QueryState>>,
    // Version of the last state handed to `publish`.
    published: Arc<Mutex<u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_state(QueryState::Ready(Snapshot::default()))
    }

    pub fn with_state(state: QueryState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            state: Arc::new(tx),
            published: Arc::new(Mutex::new(0)),
        }
    }

    pub fn query(&self) -> Result<Snapshot, AppError> {
        self.state.borrow().ready().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Replaces whatever subscribers see with a reloaded state. Versions
    /// must grow with load start time; a state older than the one already
    /// published is dropped and `false` is returned.
    pub fn publish(&self, version: u64, state: QueryState) -> bool {
        let mut published = self
            .published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if version <= *published {
            tracing::debug!("Dropped stale reload {} (have {})", version, *published);
            return false;
        }
        *published = version;
        self.state.send_replace(state);
        true
    }

    pub fn transact(&self, mutations: Vec<Mutation>) -> Result<(), AppError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| {
            let current = match state {
                QueryState::Ready(snapshot) => snapshot,
                other => {
                    outcome = other.ready().map(|_| ());
                    return false;
                }
            };

            let mut next = current.clone();
            for mutation in &mutations {
                if let Err(e) = next.apply(mutation) {
                    outcome = Err(e);
                    return false;
                }
            }
            *current = next;
            true
        });
        outcome
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Creation, Orientation, Vote};

    #[test]
    fn test_transact_is_all_or_nothing() {
        let store = MemoryStore::new();
        let vote = Vote::new("a".into(), uuid::Uuid::nil(), Orientation::Upvote, 1);

        let result = store.transact(vec![
            Mutation::InsertVote(vote.clone()),
            Mutation::DeleteVote {
                id: uuid::Uuid::new_v4(),
            },
        ]);

        assert_eq!(result, Err(AppError::NotFound));
        assert!(store.query().unwrap().votes.is_empty());
    }

    #[test]
    fn test_subscribers_see_commits() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let creation = Creation::new("hi".into(), "brat".into(), "u".into());
        store
            .transact(vec![Mutation::InsertCreation(creation.clone())])
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.ready().unwrap().creations, vec![creation]);
    }

    #[test]
    fn test_rejected_transaction_does_not_notify() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        let _ = store.transact(vec![Mutation::DeleteVote {
            id: uuid::Uuid::new_v4(),
        }]);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_publish_drops_out_of_order_reloads() {
        let store = MemoryStore::with_state(QueryState::Loading);
        let older = Creation::new("first".into(), "brat".into(), "u".into());
        let newer = Creation::new("second".into(), "brat".into(), "u".into());

        // Reload 2 started after both commits and finishes first.
        let both = Snapshot {
            creations: vec![older.clone(), newer],
            votes: vec![],
        };
        let only_first = Snapshot {
            creations: vec![older],
            votes: vec![],
        };
        assert!(store.publish(2, QueryState::Ready(both.clone())));
        assert!(!store.publish(1, QueryState::Ready(only_first)));

        assert_eq!(store.query().unwrap(), both);
    }

    #[test]
    fn test_publish_replaces_failed_state() {
        let store = MemoryStore::with_state(QueryState::Loading);
        assert!(store.publish(1, QueryState::Failed(AppError::RemoteUnavailable("down".into()))));
        assert!(store.query().is_err());
        assert!(store.publish(2, QueryState::Ready(Snapshot::default())));
        assert_eq!(store.query().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_loading_store_rejects_reads_and_writes() {
        let store = MemoryStore::with_state(QueryState::Loading);
        assert!(matches!(store.query(), Err(AppError::RemoteUnavailable(_))));
        let result = store.transact(vec![]);
        assert!(matches!(result, Err(AppError::RemoteUnavailable(_))));
    }
}
