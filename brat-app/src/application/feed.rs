use super::vote_aggregator::{rank, FeedView, RankedCreation};
use crate::domain::Viewer;
use crate::infrastructure::store::{QueryState, Store};
use brat_errors::AppError;

pub struct LoadFeed {
    store: Store,
}

impl LoadFeed {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn execute(&self, view: FeedView, viewer: &Viewer) -> Result<Vec<RankedCreation>, AppError> {
        let snapshot = self.store.query().await?;
        Ok(rank(view, &snapshot.creations, &snapshot.votes, viewer))
    }

    /// Ranks whatever a live subscription currently holds. Loading and failed
    /// states gate the whole feed.
    pub fn from_state(state: &QueryState, view: FeedView, viewer: &Viewer) -> Result<Vec<RankedCreation>, AppError> {
        let snapshot = state.ready()?;
        Ok(rank(view, &snapshot.creations, &snapshot.votes, viewer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Creation;
    use crate::infrastructure::store::{MemoryStore, Mutation, Snapshot};

    #[tokio::test]
    async fn test_feed_orders_by_view() {
        let mut older = Creation::new("older".into(), "brat".into(), "u".into());
        older.created_at = 1;
        let mut newer = Creation::new("newer".into(), "crash".into(), "u".into());
        newer.created_at = 2;

        let store = Store::in_memory();
        store
            .transact(vec![
                Mutation::InsertCreation(older.clone()),
                Mutation::InsertCreation(newer.clone()),
            ])
            .await
            .unwrap();

        let feed = LoadFeed::new(store);
        let rows = feed.execute(FeedView::Recent, &Viewer::anonymous()).await.unwrap();
        assert_eq!(rows[0].creation.id, newer.id);
        assert_eq!(rows[1].position, 2);
    }

    #[tokio::test]
    async fn test_loading_store_gates_feed() {
        let store = Store::Memory(MemoryStore::with_state(QueryState::Loading));
        let result = LoadFeed::new(store).execute(FeedView::Top, &Viewer::anonymous()).await;
        assert!(matches!(result, Err(AppError::RemoteUnavailable(_))));
    }

    #[test]
    fn test_failed_state_surfaces_error() {
        let state = QueryState::Failed(AppError::RemoteUnavailable("gone".into()));
        let result = LoadFeed::from_state(&state, FeedView::Recent, &Viewer::anonymous());
        assert_eq!(result, Err(AppError::RemoteUnavailable("gone".into())));

        let ready = QueryState::Ready(Snapshot::default());
        assert!(LoadFeed::from_state(&ready, FeedView::Recent, &Viewer::anonymous())
            .unwrap()
            .is_empty());
    }
}
