//! Restores the default template layout without losing user-authored sections.

use tracing::info;

use crate::layout::model::{is_custom_section, ColumnKind, Layout, SectionId};
use crate::layout::templates::default_layout;

/// Resets `previous` to the default template.
///
/// Built-in sections revert to their template placement unconditionally. Every
/// `custom.` section found in `previous` (page-major, then column-major) is appended to
/// page 0's main column, in encounter order.
pub fn on_reset_layout(previous: &Layout) -> Layout {
    let custom: Vec<SectionId> = previous
        .section_ids()
        .filter(|id| is_custom_section(id))
        .cloned()
        .collect();

    let mut next = default_layout();
    next.pages_mut()[0]
        .column_mut(ColumnKind::Main)
        .extend(custom.iter().cloned());

    info!(custom_sections = custom.len(), "Layout reset to template");
    next
}
