use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use brat_app::domain::{ColorPreset, EditState, COLOR_PRESETS};
use brat_app::infrastructure::security::InputSanitizer;
use brat_app::infrastructure::snapshot::{Download, PngImage, ShareMetadata, StyleFilter};
use brat_app::AppContext;
use brat_errors::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const THUMBNAIL_WIDTH: u32 = 240;

#[derive(Deserialize)]
pub struct SnapshotQuery {
    text: Option<String>,
    preset: Option<String>,
    width: Option<u32>,
}

#[derive(Deserialize)]
pub struct ShareRequest {
    text: String,
    preset: String,
    width: Option<u32>,
}

#[derive(Serialize)]
pub struct ShareResponse {
    shared: bool,
    filename: String,
}

pub async fn presets() -> Json<&'static [ColorPreset]> {
    Json(COLOR_PRESETS.as_slice())
}

/// Rasterizes on the blocking pool; encoding a large surface takes a while.
async fn rasterize(
    ctx: &AppContext,
    state: EditState,
    width: u32,
    filter: StyleFilter,
) -> Result<PngImage, AppError> {
    let exporter = ctx.exporter.clone();
    tokio::task::spawn_blocking(move || exporter.snapshot(&state, width, filter))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
}

fn png_response(download: Download) -> Response {
    (
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, download.content_disposition()),
        ],
        download.bytes,
    )
        .into_response()
}

pub async fn download(
    State(ctx): State<AppContext>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Response, AppError> {
    // Same text rule as saving, so a download shows what would be stored.
    let text = query
        .text
        .map(|t| InputSanitizer::sanitize_text(&t))
        .transpose()?;
    let state = EditState::from_query(text, query.preset.as_deref());
    let width = query.width.unwrap_or(ctx.config.snapshot_width);
    let image = rasterize(&ctx, state, width, StyleFilter::EXPORT).await?;
    Ok(png_response(Download::new(image)))
}

pub async fn thumbnail(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let snapshot = ctx.store.query().await?;
    let creation = snapshot
        .creations
        .into_iter()
        .find(|c| c.id == id)
        .ok_or(AppError::NotFound)?;

    let state = EditState::new(creation.text, Some(creation.preset.as_str()));
    let image = rasterize(&ctx, state, THUMBNAIL_WIDTH, StyleFilter::THUMBNAIL).await?;
    let response = png_response(Download::named(image, &format!("{}.png", id)));
    Ok(response)
}

pub async fn share(
    State(ctx): State<AppContext>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, AppError> {
    if !ctx.share.is_supported() {
        return Err(AppError::CapabilityAbsent);
    }

    let text = InputSanitizer::sanitize_text(&req.text)?;
    let state = EditState::new(text, Some(req.preset.as_str()));
    let width = req.width.unwrap_or(ctx.config.snapshot_width);
    let image = rasterize(&ctx, state, width, StyleFilter::EXPORT).await?;

    let metadata = ShareMetadata::default();
    let target = ctx.share.clone();
    let shared = metadata.clone();
    tokio::task::spawn_blocking(move || target.share(image, &shared))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    tracing::info!("Shared snapshot as {}", metadata.filename);
    Ok(Json(ShareResponse {
        shared: true,
        filename: metadata.filename,
    }))
}
