use crate::application::{CastVote, LoadFeed, SaveCreation};
use crate::config::Config;
use crate::infrastructure::auth::{CodeDelivery, MagicCodeAuth};
use crate::infrastructure::snapshot::{FontBook, NativeShare, SnapshotExporter};
use crate::infrastructure::store::Store;
use brat_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Store,
    pub load_feed: Arc<LoadFeed>,
    pub cast_vote: Arc<CastVote>,
    pub save_creation: Arc<SaveCreation>,
    pub exporter: SnapshotExporter,
    pub share: NativeShare,
    pub auth: Arc<MagicCodeAuth>,
}

impl AppContext {
    pub fn new(config: Config, store: Store, exporter: SnapshotExporter, auth: MagicCodeAuth) -> Self {
        let share = match &config.share_dir {
            Some(dir) => NativeShare::Directory(dir.clone()),
            None => NativeShare::Unsupported,
        };

        Self {
            load_feed: Arc::new(LoadFeed::new(store.clone())),
            cast_vote: Arc::new(CastVote::new(store.clone())),
            save_creation: Arc::new(SaveCreation::new(store.clone())),
            config: Arc::new(config),
            store,
            exporter,
            share,
            auth: Arc::new(auth),
        }
    }

    /// In-memory store, outbox code delivery and no fonts. Used by tests.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Store::in_memory(),
            SnapshotExporter::new(FontBook::empty()),
            MagicCodeAuth::new(CodeDelivery::outbox()),
        )
    }

    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let fonts = match &config.font_path {
            Some(path) => FontBook::from_file(path)?,
            None => FontBook::system(),
        };
        let store = Self::connect_store(&config).await?;

        Ok(Self::new(
            config,
            store,
            SnapshotExporter::new(fonts),
            MagicCodeAuth::new(CodeDelivery::Log),
        ))
    }

    #[cfg(feature = "postgres")]
    async fn connect_store(config: &Config) -> Result<Store, AppError> {
        use crate::infrastructure::db::{create_connection, run_migrations, PgStore};

        let Some(url) = &config.database_url else {
            tracing::info!("Using in-memory store");
            return Ok(Store::in_memory());
        };

        let db = create_connection(url, &config.db_pool)
            .await
            .map_err(|e| AppError::RemoteUnavailable(e.to_string()))?;
        run_migrations(&db)
            .await
            .map_err(|e| AppError::RemoteUnavailable(e.to_string()))?;
        tracing::info!("Using Postgres store");
        Ok(Store::Postgres(PgStore::connect(db).await))
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_store(config: &Config) -> Result<Store, AppError> {
        if config.database_url.is_some() {
            tracing::warn!("DATABASE_URL is set but Postgres support is not compiled in");
        }
        tracing::info!("Using in-memory store");
        Ok(Store::in_memory())
    }
}
