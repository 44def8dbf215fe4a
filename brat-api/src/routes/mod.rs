mod auth;
mod creations;
mod snapshot;

use axum::routing::{get, post};
use axum::Router;
use brat_app::AppContext;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

pub const SESSION_COOKIE: &str = "brat.sid";

pub fn create_router(ctx: AppContext) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(ctx.config.secure_cookies);

    Router::new()
        .route("/api/presets", get(snapshot::presets))
        .route("/api/creations", get(creations::list).post(creations::save))
        .route("/api/creations/stream", get(creations::stream))
        .route("/api/creations/{id}/vote", post(creations::vote))
        .route("/api/creations/{id}/thumbnail.png", get(snapshot::thumbnail))
        .route("/api/snapshot.png", get(snapshot::download))
        .route("/api/share", post(snapshot::share))
        .route("/auth/send-code", post(auth::send_code))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .layer(sessions)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
