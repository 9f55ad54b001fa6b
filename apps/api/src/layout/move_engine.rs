//! Relocates a single section within a layout snapshot.

use std::sync::Arc;

use tracing::warn;

use crate::layout::model::{Layout, LayoutError, Locator};

/// Moves the section at `current` into `target`'s column at `target.section`.
///
/// Returns the same `Arc` when `current == target`, or when the move cannot be resolved
/// (stale drag reference). A stale locator is logged and otherwise ignored.
pub fn move_item_in_layout(current: Locator, target: Locator, layout: &Arc<Layout>) -> Arc<Layout> {
    if current == target {
        return Arc::clone(layout);
    }

    match try_move_item(current, target, layout) {
        Ok(moved) => Arc::new(moved),
        Err(e) => {
            warn!(error = %e, ?current, ?target, "Abandoning move: locator no longer resolves");
            Arc::clone(layout)
        }
    }
}

/// Fallible form of [`move_item_in_layout`]. Always works on a copy.
///
/// The insertion index is clamped to the target column's length, so dropping past the
/// end (or onto an empty column) appends.
pub fn try_move_item(
    current: Locator,
    target: Locator,
    layout: &Layout,
) -> Result<Layout, LayoutError> {
    let unresolved = |loc: Locator| LayoutError::LocatorResolution {
        page: loc.page,
        column: loc.column.into(),
        section: loc.section,
    };

    // Target page must exist before anything is removed.
    if layout.page(target.page).is_none() {
        return Err(unresolved(target));
    }

    let mut next = layout.clone();
    let pages = next.pages_mut();

    let source = pages
        .get_mut(current.page)
        .map(|p| p.column_mut(current.column))
        .ok_or_else(|| unresolved(current))?;
    if current.section >= source.len() {
        return Err(unresolved(current));
    }
    let id = source.remove(current.section);

    let dest = pages[target.page].column_mut(target.column);
    let at = target.section.min(dest.len());
    dest.insert(at, id);

    Ok(next)
}
