use crate::session;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use brat_app::domain::AuthSession;
use brat_app::AppContext;
use brat_errors::AppError;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct SendCodeRequest {
    email: String,
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    email: String,
    code: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    authenticated: bool,
    user: Option<AuthSession>,
}

pub async fn send_code(
    State(ctx): State<AppContext>,
    Json(req): Json<SendCodeRequest>,
) -> Result<StatusCode, AppError> {
    ctx.auth.send_code(&req.email)?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn verify(
    State(ctx): State<AppContext>,
    session: Session,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let user = match ctx.auth.verify_code(&req.email, &req.code) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Sign-in failed for {}: {}", req.email, e);
            return Err(e);
        }
    };
    session::sign_in(&session, &user).await?;
    Ok(Json(user))
}

pub async fn me(session: Session) -> Result<Json<MeResponse>, AppError> {
    let user = session::current_user(&session).await?;
    Ok(Json(MeResponse {
        authenticated: user.is_some(),
        user,
    }))
}

pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    session::sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
