//! Messages exchanged with the rendering surface over the editor socket.
//!
//! Every message is a JSON object tagged by `type`:
//! - inbound `{"type": "addPage", "main": [...], "sidebar": [...]}` runs pagination;
//! - outbound `{"type": "checkOverflow"}` asks the surface to re-measure.
//!
//! Drag events, page removal, reset and measurement travel over the same socket.

use serde::{Deserialize, Serialize};

use crate::layout::model::SectionId;
use crate::layout::{DragNode, HeightMap, Layout, OverflowResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Overflow reported by the surface for the last page.
    AddPage {
        #[serde(default)]
        main: Vec<SectionId>,
        #[serde(default)]
        sidebar: Vec<SectionId>,
        /// Section heights, used to re-check the pages pagination creates.
        #[serde(default)]
        heights: HeightMap,
    },
    /// Fresh heights; answered with an `overflow` message for the last page.
    Measure { heights: HeightMap },
    DragStart { id: SectionId },
    DragOver {
        active: DragNode,
        #[serde(default)]
        over: Option<DragNode>,
    },
    DragEnd {
        active: DragNode,
        #[serde(default)]
        over: Option<DragNode>,
    },
    DragCancel,
    RemovePage { page: usize },
    ResetLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Please re-measure; any overflow comes back later as a new `addPage`.
    CheckOverflow,
    /// Current snapshot, sent on connect and after every commit.
    Layout {
        layout: Layout,
        #[serde(rename = "activeId")]
        active_id: Option<SectionId>,
    },
    Overflow(OverflowResult),
    Error { code: String, message: String },
}
