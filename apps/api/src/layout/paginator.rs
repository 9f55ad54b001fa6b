//! Pagination: grows the page count and redistributes overflowing sections.
//!
//! # Feedback loop
//! 1. The rendering surface measures the last page and reports its overflow (`addPage`).
//! 2. `on_add_page` moves the overflowing sections onto new pages, re-checking both the
//!    pages they were pulled from and each new page with the same heights, and returns
//!    the new snapshot.
//! 3. The caller commits it and asks the surface to re-measure (`checkOverflow`). Any
//!    remaining overflow arrives later as a fresh `addPage`.
//!
//! # Termination
//! A section taller than a whole column overflows every page it lands on. When a page's
//! overflow starts at the first section of a column, that section stays put and
//! only the sections after it are carried on, so every pass places at least one pending
//! section. `max_passes` caps the loop on top of that.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::layout::model::{ColumnKind, Layout, OverflowResult, Page, SectionId};
use crate::layout::overflow::{get_overflowing_sections, Measurer};

pub const DEFAULT_MAX_PASSES: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaginationOptions {
    /// Height budget of one column, in pixels.
    pub max_height_px: f32,
    pub max_passes: u8,
}

/// Outcome of one `on_add_page` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub layout: Layout,
    pub pages_added: usize,
    /// Redistribution passes run (0 for a manual add).
    pub passes: u8,
    /// Sections taller than a full column, left alone at the top of their page.
    pub oversized: Vec<SectionId>,
    /// False if `max_passes` was hit with overflow still pending.
    pub converged: bool,
}

/// Adds pages to `layout`.
///
/// Without overflow (manual "add page", or an empty report) a single empty page is
/// appended. Otherwise the pending sections are pulled, in the order given, onto a new
/// page. The pages they came from and the new page are re-checked until nothing is
/// pending.
pub fn on_add_page(
    layout: &Layout,
    overflow: Option<&OverflowResult>,
    measurer: &dyn Measurer,
    options: &PaginationOptions,
) -> Pagination {
    let mut next = layout.clone();

    let mut pending = match overflow {
        Some(o) if !o.is_empty() => o.clone(),
        _ => {
            next.push_page(Page::default());
            return Pagination {
                layout: next,
                pages_added: 1,
                passes: 0,
                oversized: Vec::new(),
                converged: true,
            };
        }
    };

    let mut passes = 0u8;
    let mut oversized = Vec::new();
    let mut converged = true;

    while !pending.is_empty() {
        if passes >= options.max_passes {
            warn!(
                passes,
                main = pending.main.len(),
                sidebar = pending.sidebar.len(),
                "Pagination: overflow still pending after max passes"
            );
            converged = false;
            break;
        }
        passes += 1;

        let new_index = next.push_page(Page::default());
        let mut sources = BTreeSet::new();
        for kind in ColumnKind::ALL {
            for id in pending.column(kind) {
                match next.take_section(id) {
                    Some(from) => {
                        sources.insert(from.page);
                        next.pages_mut()[new_index].column_mut(kind).push(id.clone());
                    }
                    None => debug!(section = %id, "Pagination: overflowing section not in layout"),
                }
            }
        }

        // Pulling sections off a page can leave it over budget, and the new page can be
        // over budget too. Both feed the next pass, in page order.
        sources.insert(new_index);
        let mut detected = OverflowResult::default();
        for page_index in sources {
            let page = &next.pages()[page_index];
            let mut overflow = get_overflowing_sections(page, options.max_height_px, measurer);
            for kind in ColumnKind::ALL {
                let starts_at_top = overflow.column(kind).first() == page.column(kind).first();
                let carried = overflow.column_mut(kind);
                if starts_at_top && !carried.is_empty() {
                    let stuck = carried.remove(0);
                    if !oversized.contains(&stuck) {
                        warn!(
                            section = %stuck,
                            page = page_index,
                            max_height_px = options.max_height_px,
                            "Pagination: section is taller than a full column"
                        );
                        oversized.push(stuck);
                    }
                }
                detected.column_mut(kind).append(carried);
            }
        }

        pending = detected;
    }

    let pages_added = next.page_count() - layout.page_count();
    info!(pages_added, passes, converged, "Pagination complete");

    Pagination {
        layout: next,
        pages_added,
        passes,
        oversized,
        converged,
    }
}
