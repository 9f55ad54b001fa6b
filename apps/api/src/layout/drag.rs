//! Drag-and-drop state machine: Idle → Dragging → Idle.
//!
//! Moves are committed live on every `drag_over`, so the list visibly reorders during
//! the gesture. Cancelling only clears the overlay state; moves already committed by
//! `drag_over` stay applied.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::locator::{decode_column_id, parse_layout_locator, SortablePayload};
use crate::layout::model::{Layout, Locator, SectionId};
use crate::layout::move_engine::move_item_in_layout;

/// A node taking part in a drag gesture: either a sortable section (with payload) or a
/// droppable column container (keyed by its container id, no payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragNode {
    pub id: String,
    #[serde(default)]
    pub data: Option<SortablePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { active_id: SectionId },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Id of the section being dragged, for overlay rendering.
    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { active_id } => Some(active_id),
            DragState::Idle => None,
        }
    }

    pub fn on_drag_start(&mut self, active_id: impl Into<SectionId>) {
        let active_id = active_id.into();
        debug!(%active_id, "Drag started");
        self.state = DragState::Dragging { active_id };
    }

    /// Live move while hovering. Returns the snapshot to commit, or `None` for a no-op.
    pub fn on_drag_over(
        &mut self,
        active: &DragNode,
        over: Option<&DragNode>,
        layout: &Arc<Layout>,
    ) -> Option<Arc<Layout>> {
        resolve_move(active, over, layout)
    }

    /// Final move on release. Clears the active id whether or not anything moved.
    pub fn on_drag_end(
        &mut self,
        active: &DragNode,
        over: Option<&DragNode>,
        layout: &Arc<Layout>,
    ) -> Option<Arc<Layout>> {
        let committed = resolve_move(active, over, layout);
        self.state = DragState::Idle;
        committed
    }

    pub fn on_drag_cancel(&mut self) {
        debug!("Drag cancelled");
        self.state = DragState::Idle;
    }
}

/// Shared resolution for `drag_over` / `drag_end`.
fn resolve_move(
    active: &DragNode,
    over: Option<&DragNode>,
    layout: &Arc<Layout>,
) -> Option<Arc<Layout>> {
    let over = over?;

    let current = match parse_layout_locator(active.data.as_ref()) {
        Ok(loc) => loc,
        Err(e) => {
            debug!(error = %e, active = %active.id, "Ignoring drag: active item has no locator");
            return None;
        }
    };

    let target = match &over.data {
        // Dropped on a column container rather than an item.
        None => match decode_column_id(&over.id) {
            Ok((page, column)) => Locator::new(page, column, 0),
            Err(e) => {
                debug!(error = %e, "Ignoring drag: drop target is not a column");
                return None;
            }
        },
        Some(payload) => match parse_layout_locator(Some(payload)) {
            Ok(loc) => loc,
            Err(e) => {
                debug!(error = %e, over = %over.id, "Ignoring drag: malformed drop target");
                return None;
            }
        },
    };

    Some(move_item_in_layout(current, target, layout))
}
