use crate::session::current_viewer;
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use brat_app::application::{FeedView, LoadFeed, RankedCreation, VoteOutcome};
use brat_app::domain::{Creation, Orientation};
use brat_app::AppContext;
use brat_errors::AppError;
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;
use tower_sessions::Session;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct FeedQuery {
    view: Option<String>,
}

impl FeedQuery {
    fn view(&self) -> Result<FeedView, AppError> {
        self.view
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

#[derive(Deserialize)]
pub struct SaveRequest {
    text: String,
    preset: String,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    orientation: Orientation,
}

pub async fn list(
    State(ctx): State<AppContext>,
    session: Session,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<RankedCreation>>, AppError> {
    let viewer = current_viewer(&session).await?;
    let rows = ctx.load_feed.execute(query.view()?, &viewer).await?;
    Ok(Json(rows))
}

/// Pushes the ranked feed again every time the store changes.
pub async fn stream(
    State(ctx): State<AppContext>,
    session: Session,
    Query(query): Query<FeedQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let viewer = current_viewer(&session).await?;
    let view = query.view()?;
    let rx = ctx.store.subscribe();

    let events = stream::unfold((rx, true), move |(mut rx, first)| {
        let viewer = viewer.clone();
        async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let state = rx.borrow_and_update().clone();
            let event = match LoadFeed::from_state(&state, view, &viewer) {
                Ok(rows) => Event::default().event("feed").json_data(&rows).unwrap_or_else(|e| {
                    tracing::error!("Failed to serialize feed: {}", e);
                    Event::default().event("error").data("serialization failed")
                }),
                Err(e) => Event::default().event("error").data(e.user_message()),
            };
            Some((Ok(event), (rx, false)))
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn save(
    State(ctx): State<AppContext>,
    session: Session,
    Json(req): Json<SaveRequest>,
) -> Result<Json<Creation>, AppError> {
    let viewer = current_viewer(&session).await?;
    let creation = ctx.save_creation.execute(&viewer, &req.text, &req.preset).await?;
    Ok(Json(creation))
}

pub async fn vote(
    State(ctx): State<AppContext>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteOutcome>, AppError> {
    let viewer = current_viewer(&session).await?;
    let outcome = ctx.cast_vote.execute(&viewer, id, req.orientation).await?;
    Ok(Json(outcome))
}
