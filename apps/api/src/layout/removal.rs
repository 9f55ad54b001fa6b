//! Collapses a page back into the first page.

use tracing::info;

use crate::layout::model::{ColumnKind, Layout, LayoutError};

/// Removes page `page_index`, appending its main column to page 0's main column and its
/// sidebar to page 0's sidebar. Later pages shift down by one.
///
/// Refusing to remove page 0 is the caller's job. Removing the only page fails with
/// `PageOutOfRange`, so a layout always keeps at least one page.
pub fn on_remove_page(layout: &Layout, page_index: usize) -> Result<Layout, LayoutError> {
    // The last remaining page has nowhere to merge into.
    if page_index >= layout.page_count() || layout.page_count() == 1 {
        return Err(LayoutError::PageOutOfRange {
            index: page_index,
            len: layout.page_count(),
        });
    }

    let mut next = layout.clone();
    let pages = next.pages_mut();
    let removed = pages.remove(page_index);

    if let Some(first) = pages.first_mut() {
        for kind in ColumnKind::ALL {
            first
                .column_mut(kind)
                .extend(removed.column(kind).iter().cloned());
        }
    }

    info!(page_index, remaining = pages.len(), "Page removed");
    Ok(next)
}
