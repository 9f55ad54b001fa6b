//! One live editing session: the drag state machine and the outbound channel to the
//! rendering surface, plus the last layout snapshot it announced.
//!
//! A session is driven by a single task. Each mutation takes the resume's write lock,
//! reloads the stored layout (REST calls or other sessions may have written since), applies
//! the operation to it and writes the result through before announcing it.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::model::OverflowResult;
use crate::layout::{
    get_overflowing_sections, on_add_page, on_remove_page, on_reset_layout, DragController,
    HeightMap, Layout, PaginationOptions,
};
use crate::session::locks::LayoutLocks;
use crate::session::protocol::{InboundMessage, OutboundMessage};
use crate::session::store::{load_layout, save_layout, MetadataStore};

pub struct EditorSession {
    resume_id: Uuid,
    layout: Arc<Layout>,
    drag: DragController,
    options: PaginationOptions,
    store: Arc<dyn MetadataStore>,
    locks: LayoutLocks,
    outbox: UnboundedSender<OutboundMessage>,
}

impl EditorSession {
    /// Loads the resume's layout and announces it on the outbox.
    pub async fn open(
        resume_id: Uuid,
        store: Arc<dyn MetadataStore>,
        locks: LayoutLocks,
        options: PaginationOptions,
        outbox: UnboundedSender<OutboundMessage>,
    ) -> Result<Self, AppError> {
        let layout = Arc::new(load_layout(store.as_ref(), resume_id).await?);
        let session = EditorSession {
            resume_id,
            layout,
            drag: DragController::new(),
            options,
            store,
            locks,
            outbox,
        };
        info!(%resume_id, pages = session.layout.page_count(), "Editor session opened");
        session.announce();
        Ok(session)
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub async fn handle(&mut self, message: InboundMessage) -> Result<(), AppError> {
        match message {
            InboundMessage::AddPage {
                main,
                sidebar,
                heights,
            } => {
                let overflow = OverflowResult { main, sidebar };
                let options = self.options;
                self.update(|_, layout| {
                    let pagination = on_add_page(layout, Some(&overflow), &heights, &options);
                    Ok(Some(Arc::new(pagination.layout)))
                })
                .await?;
                // Fire-and-forget: any remaining overflow returns as a later `addPage`.
                self.send(OutboundMessage::CheckOverflow);
            }
            InboundMessage::Measure { heights } => {
                let _guard = self.locks.acquire(self.resume_id).await;
                if self.refresh().await? {
                    self.announce();
                }
                let overflow = self.measure(&heights);
                self.send(OutboundMessage::Overflow(overflow));
            }
            InboundMessage::DragStart { id } => self.drag.on_drag_start(id),
            InboundMessage::DragOver { active, over } => {
                self.update(|drag, layout| Ok(drag.on_drag_over(&active, over.as_ref(), layout)))
                    .await?;
            }
            InboundMessage::DragEnd { active, over } => {
                let announced = self
                    .update(|drag, layout| Ok(drag.on_drag_end(&active, over.as_ref(), layout)))
                    .await?;
                if !announced {
                    // Clears `activeId` on the surface.
                    self.announce();
                }
            }
            InboundMessage::DragCancel => {
                self.drag.on_drag_cancel();
                // Lets the surface drop its overlay and snap back to the committed state.
                self.announce();
            }
            InboundMessage::RemovePage { page } => {
                if page == 0 {
                    return Err(AppError::Validation("The first page cannot be removed".into()));
                }
                self.update(|_, layout| Ok(Some(Arc::new(on_remove_page(layout, page)?))))
                    .await?;
            }
            InboundMessage::ResetLayout => {
                self.update(|_, layout| Ok(Some(Arc::new(on_reset_layout(layout)))))
                    .await?;
            }
        }
        Ok(())
    }

    /// Overflow of the last page for the given heights.
    pub fn measure(&self, heights: &HeightMap) -> OverflowResult {
        get_overflowing_sections(self.layout.last_page(), self.options.max_height_px, heights)
    }

    /// Sends an error frame for a failed inbound message.
    pub fn report(&self, error: &AppError) {
        let (_, code, message) = error.parts();
        self.send(OutboundMessage::Error {
            code: code.to_string(),
            message,
        });
    }

    /// Applies `op` to the latest stored layout under the resume's write lock and commits
    /// the result. `op` returning `None` or the current snapshot leaves the store alone.
    ///
    /// Returns true if a layout announcement was sent.
    async fn update<F>(&mut self, op: F) -> Result<bool, AppError>
    where
        F: FnOnce(&mut DragController, &Arc<Layout>) -> Result<Option<Arc<Layout>>, AppError>,
    {
        let _guard = self.locks.acquire(self.resume_id).await;
        let refreshed = self.refresh().await?;

        match op(&mut self.drag, &self.layout)? {
            Some(next) if !Arc::ptr_eq(&self.layout, &next) => {
                save_layout(self.store.as_ref(), self.resume_id, &next).await?;
                self.layout = next;
                let pages = self.layout.page_count();
                debug!(resume_id = %self.resume_id, pages, "Layout committed");
                self.announce();
                Ok(true)
            }
            _ => {
                if refreshed {
                    self.announce();
                }
                Ok(refreshed)
            }
        }
    }

    /// Adopts the stored layout if it changed since the last snapshot. Callers hold the
    /// resume's write lock.
    async fn refresh(&mut self) -> Result<bool, AppError> {
        let stored = load_layout(self.store.as_ref(), self.resume_id).await?;
        if stored == *self.layout {
            return Ok(false);
        }
        debug!(resume_id = %self.resume_id, "Picked up layout written elsewhere");
        self.layout = Arc::new(stored);
        Ok(true)
    }

    fn announce(&self) {
        self.send(OutboundMessage::Layout {
            layout: Layout::clone(&self.layout),
            active_id: self.drag.active_id().map(str::to_string),
        });
    }

    fn send(&self, message: OutboundMessage) {
        if self.outbox.send(message).is_err() {
            debug!(resume_id = %self.resume_id, "Outbox closed, dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::locator::SortablePayload;
    use crate::layout::DragNode;
    use crate::session::store::memory::MemoryStore;
    use crate::session::store::LAYOUT_PATH;
    use serde_json::json;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    const OPTIONS: PaginationOptions = PaginationOptions {
        max_height_px: 1000.0,
        max_passes: 8,
    };

    async fn open_with(
        layout: serde_json::Value,
    ) -> (EditorSession, Arc<MemoryStore>, UnboundedReceiver<OutboundMessage>, Uuid) {
        let id = Uuid::new_v4();
        let store = Arc::new(MemoryStore::with_resume(id));
        store.set_value(id, LAYOUT_PATH, layout).await.unwrap();
        let (tx, mut rx) = unbounded_channel();
        let session = EditorSession::open(id, store.clone(), LayoutLocks::new(), OPTIONS, tx)
            .await
            .unwrap();
        // Drain the initial announcement.
        assert!(matches!(rx.try_recv(), Ok(OutboundMessage::Layout { .. })));
        (session, store, rx, id)
    }

    fn drain(rx: &mut UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn node(id: &str, container: &str, index: usize) -> DragNode {
        DragNode {
            id: id.to_string(),
            data: Some(SortablePayload {
                container_id: container.to_string(),
                index,
            }),
        }
    }

    #[tokio::test]
    async fn test_add_page_commits_then_requests_remeasure() {
        let (mut session, store, mut rx, id) =
            open_with(json!([[["profile", "projects"], []]])).await;

        session
            .handle(InboundMessage::AddPage {
                main: vec!["projects".to_string()],
                sidebar: vec![],
                heights: HeightMap::new(),
            })
            .await
            .unwrap();

        assert_eq!(
            store.raw(id, LAYOUT_PATH),
            Some(json!([[["profile"], []], [["projects"], []]]))
        );
        let sent = drain(&mut rx);
        assert!(matches!(sent[0], OutboundMessage::Layout { .. }));
        assert_eq!(sent.last(), Some(&OutboundMessage::CheckOverflow));
    }

    #[tokio::test]
    async fn test_drag_session_commits_live_moves() {
        let (mut session, store, mut rx, id) =
            open_with(json!([[["summary", "experience"], ["skills"]]])).await;

        session
            .handle(InboundMessage::DragStart { id: "skills".into() })
            .await
            .unwrap();
        session
            .handle(InboundMessage::DragOver {
                active: node("skills", "0.1", 0),
                over: Some(node("experience", "0.0", 1)),
            })
            .await
            .unwrap();

        assert_eq!(
            store.raw(id, LAYOUT_PATH),
            Some(json!([[["summary", "skills", "experience"], []]]))
        );
        match drain(&mut rx).last() {
            Some(OutboundMessage::Layout { active_id, .. }) => {
                assert_eq!(active_id.as_deref(), Some("skills"))
            }
            other => panic!("expected layout announcement, got {other:?}"),
        }

        session.handle(InboundMessage::DragCancel).await.unwrap();
        // Cancel does not roll back the live move.
        assert_eq!(session.layout().pages()[0].main(), ["summary", "skills", "experience"]);
    }

    #[tokio::test]
    async fn test_drag_end_without_target_clears_active_id() {
        let (mut session, _store, mut rx, _id) =
            open_with(json!([[["summary"], ["skills"]]])).await;
        session
            .handle(InboundMessage::DragStart { id: "summary".into() })
            .await
            .unwrap();
        session
            .handle(InboundMessage::DragEnd {
                active: node("summary", "0.0", 0),
                over: None,
            })
            .await
            .unwrap();
        match drain(&mut rx).last() {
            Some(OutboundMessage::Layout { active_id, .. }) => assert!(active_id.is_none()),
            other => panic!("expected layout announcement, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_first_page_is_rejected() {
        let (mut session, _store, _rx, _id) =
            open_with(json!([[["summary"], []], [["awards"], ["languages"]]])).await;
        assert!(matches!(
            session.handle(InboundMessage::RemovePage { page: 0 }).await,
            Err(AppError::Validation(_))
        ));

        session.handle(InboundMessage::RemovePage { page: 1 }).await.unwrap();
        assert_eq!(session.layout().page_count(), 1);
        assert_eq!(session.layout().pages()[0].main(), ["summary", "awards"]);
        assert_eq!(session.layout().pages()[0].sidebar(), ["languages"]);
    }

    #[tokio::test]
    async fn test_reset_keeps_custom_sections() {
        let (mut session, _store, _rx, _id) =
            open_with(json!([[["skills"], ["custom.abc"]]])).await;
        session.handle(InboundMessage::ResetLayout).await.unwrap();
        let main = session.layout().pages()[0].main();
        assert_eq!(main.last().map(String::as_str), Some("custom.abc"));
    }

    #[tokio::test]
    async fn test_measure_reports_overflow_without_committing() {
        let (mut session, store, mut rx, id) =
            open_with(json!([[["summary", "experience"], []]])).await;
        let heights = HeightMap::new().with("summary", 400.0).with("experience", 700.0);

        session
            .handle(InboundMessage::Measure { heights })
            .await
            .unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![OutboundMessage::Overflow(OverflowResult {
                main: vec!["experience".to_string()],
                sidebar: vec![],
            })]
        );
        assert_eq!(
            store.raw(id, LAYOUT_PATH),
            Some(json!([[["summary", "experience"], []]]))
        );
    }

    #[tokio::test]
    async fn test_report_sends_error_frame() {
        let (session, _store, mut rx, _id) = open_with(json!([[["summary"], []]])).await;
        session.report(&AppError::Validation("nope".into()));
        match drain(&mut rx).pop() {
            Some(OutboundMessage::Error { code, message }) => {
                assert_eq!(code, "VALIDATION_ERROR");
                assert_eq!(message, "nope");
            }
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_drag_applies_to_layout_written_elsewhere() {
        let (mut session, store, mut rx, id) =
            open_with(json!([[["summary", "experience"], ["skills"]]])).await;

        // Another writer appends a page while the session is open.
        store
            .set_value(
                id,
                LAYOUT_PATH,
                json!([[["summary", "experience"], ["skills"]], [["custom.x"], []]]),
            )
            .await
            .unwrap();

        session
            .handle(InboundMessage::DragStart { id: "skills".into() })
            .await
            .unwrap();
        session
            .handle(InboundMessage::DragOver {
                active: node("skills", "0.1", 0),
                over: Some(node("experience", "0.0", 1)),
            })
            .await
            .unwrap();

        assert_eq!(
            store.raw(id, LAYOUT_PATH),
            Some(json!([[["summary", "skills", "experience"], []], [["custom.x"], []]]))
        );
        match drain(&mut rx).last() {
            Some(OutboundMessage::Layout { layout, .. }) => assert_eq!(layout.page_count(), 2),
            other => panic!("expected layout announcement, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_page_builds_on_layout_written_elsewhere() {
        let (mut session, store, _rx, id) =
            open_with(json!([[["profile", "projects"], []]])).await;
        store
            .set_value(id, LAYOUT_PATH, json!([[["profile", "projects"], ["custom.y"]]]))
            .await
            .unwrap();

        session
            .handle(InboundMessage::AddPage {
                main: vec!["projects".to_string()],
                sidebar: vec![],
                heights: HeightMap::new(),
            })
            .await
            .unwrap();

        assert_eq!(
            store.raw(id, LAYOUT_PATH),
            Some(json!([[["profile"], ["custom.y"]], [["projects"], []]]))
        );
    }
}
