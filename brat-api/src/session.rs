use brat_app::domain::{AuthSession, Viewer};
use brat_errors::AppError;
use tower_sessions::Session;

const SESSION_USER_KEY: &str = "auth";

fn session_error(e: tower_sessions::session::Error) -> AppError {
    tracing::error!("Session store error: {}", e);
    AppError::Internal("session unavailable".to_string())
}

pub async fn current_user(session: &Session) -> Result<Option<AuthSession>, AppError> {
    session
        .get::<AuthSession>(SESSION_USER_KEY)
        .await
        .map_err(session_error)
}

pub async fn current_viewer(session: &Session) -> Result<Viewer, AppError> {
    Ok(current_user(session)
        .await?
        .as_ref()
        .map(Viewer::from)
        .unwrap_or_default())
}

pub async fn sign_in(session: &Session, user: &AuthSession) -> Result<(), AppError> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(session_error)
}

pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.flush().await.map_err(session_error)
}
