use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    Json,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{
    get_overflowing_sections, move_item_in_layout, on_add_page, on_remove_page, on_reset_layout,
    HeightMap, Layout, Locator, OverflowResult, Pagination,
};
use crate::session::editor::EditorSession;
use crate::session::protocol::{InboundMessage, OutboundMessage};
use crate::session::store::{load_layout, save_layout};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MoveRequest {
    pub from: Locator,
    pub to: Locator,
}

#[derive(Deserialize, Default)]
pub struct AddPageRequest {
    #[serde(default)]
    pub main: Vec<String>,
    #[serde(default)]
    pub sidebar: Vec<String>,
    #[serde(default)]
    pub heights: HeightMap,
}

#[derive(Deserialize)]
pub struct OverflowRequest {
    pub heights: HeightMap,
    /// Overrides the configured column budget.
    pub max_height_px: Option<f32>,
}

/// GET /api/v1/resumes/:id/layout
pub async fn handle_get_layout(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Layout>, AppError> {
    let layout = load_layout(state.store.as_ref(), resume_id).await?;
    Ok(Json(layout))
}

/// POST /api/v1/resumes/:id/layout/move
pub async fn handle_move_section(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Layout>, AppError> {
    let _guard = state.locks.acquire(resume_id).await;
    let current = Arc::new(load_layout(state.store.as_ref(), resume_id).await?);
    let next = move_item_in_layout(req.from, req.to, &current);
    if !Arc::ptr_eq(&current, &next) {
        save_layout(state.store.as_ref(), resume_id, &next).await?;
    }
    Ok(Json(Layout::clone(&next)))
}

/// POST /api/v1/resumes/:id/layout/pages
/// Without a body (or with empty lists) appends a blank page.
pub async fn handle_add_page(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    body: Option<Json<AddPageRequest>>,
) -> Result<Json<Pagination>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let overflow = OverflowResult {
        main: req.main,
        sidebar: req.sidebar,
    };

    let _guard = state.locks.acquire(resume_id).await;
    let layout = load_layout(state.store.as_ref(), resume_id).await?;
    let pagination = on_add_page(
        &layout,
        Some(&overflow),
        &req.heights,
        &state.config.pagination_options(),
    );
    save_layout(state.store.as_ref(), resume_id, &pagination.layout).await?;
    Ok(Json(pagination))
}

/// DELETE /api/v1/resumes/:id/layout/pages/:index
pub async fn handle_remove_page(
    State(state): State<AppState>,
    Path((resume_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<Layout>, AppError> {
    if index == 0 {
        return Err(AppError::Validation(
            "The first page cannot be removed".to_string(),
        ));
    }
    let _guard = state.locks.acquire(resume_id).await;
    let layout = load_layout(state.store.as_ref(), resume_id).await?;
    let next = on_remove_page(&layout, index)?;
    save_layout(state.store.as_ref(), resume_id, &next).await?;
    Ok(Json(next))
}

/// POST /api/v1/resumes/:id/layout/reset
pub async fn handle_reset_layout(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<Layout>, AppError> {
    let _guard = state.locks.acquire(resume_id).await;
    let layout = load_layout(state.store.as_ref(), resume_id).await?;
    let next = on_reset_layout(&layout);
    save_layout(state.store.as_ref(), resume_id, &next).await?;
    Ok(Json(next))
}

/// POST /api/v1/resumes/:id/layout/overflow
/// Classifies the last page's sections against the column budget. Read-only.
pub async fn handle_check_overflow(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(req): Json<OverflowRequest>,
) -> Result<Json<OverflowResult>, AppError> {
    let layout = load_layout(state.store.as_ref(), resume_id).await?;
    let budget = req
        .max_height_px
        .unwrap_or_else(|| state.config.page.column_budget_px());
    Ok(Json(get_overflowing_sections(
        layout.last_page(),
        budget,
        &req.heights,
    )))
}

/// GET /api/v1/resumes/:id/layout/ws
pub async fn handle_layout_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Response {
    ws.on_upgrade(move |socket| run_editor_socket(state, resume_id, socket))
}

/// Drives one editor session: inbound frames are applied in order, outbound messages
/// are flushed as they are queued.
async fn run_editor_socket(state: AppState, resume_id: Uuid, mut socket: WebSocket) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMessage>();

    let mut session = match EditorSession::open(
        resume_id,
        state.store.clone(),
        state.locks.clone(),
        state.config.pagination_options(),
        tx,
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!(%resume_id, error = %e, "Could not open editor session");
            let (_, code, message) = e.parts();
            let frame = OutboundMessage::Error {
                code: code.to_string(),
                message,
            };
            if let Ok(text) = serde_json::to_string(&frame) {
                let _ = socket.send(Message::Text(text)).await;
            }
            return;
        }
    };

    loop {
        tokio::select! {
            Some(outbound) = rx.recv() => {
                let text = match serde_json::to_string(&outbound) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode outbound message");
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<InboundMessage>(&text) {
                            Ok(message) => {
                                if let Err(e) = session.handle(message).await {
                                    session.report(&e);
                                }
                            }
                            Err(e) => debug!(error = %e, "Ignoring malformed inbound message"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!(%resume_id, "Editor session closed");
}
