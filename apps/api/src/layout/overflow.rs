//! Overflow detection: classifies sections that do not fit a column's height budget.
//!
//! Heights come from an injected [`Measurer`]. In production the rendering surface
//! reports per-section pixel heights (collected into a [`HeightMap`]); tests use fixed
//! heights.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layout::model::{ColumnKind, OverflowResult, Page, SectionId};

/// Source of rendered section heights, in pixels.
pub trait Measurer {
    /// Rendered height of a section, or `None` if it has not been rendered.
    fn measure(&self, id: &str) -> Option<f32>;
}

/// Heights reported by the rendering surface, keyed by section id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeightMap(pub HashMap<SectionId, f32>);

impl HeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<SectionId>, height_px: f32) -> Self {
        self.0.insert(id.into(), height_px);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Measurer for HeightMap {
    fn measure(&self, id: &str) -> Option<f32> {
        self.0.get(id).copied()
    }
}

/// Unmeasured sections occupy no space.
fn height_of(measurer: &dyn Measurer, id: &str) -> f32 {
    measurer.measure(id).unwrap_or(0.0).max(0.0)
}

fn column_total(column: &[SectionId], measurer: &dyn Measurer) -> f32 {
    column.iter().map(|id| height_of(measurer, id)).sum()
}

/// Returns the sections of `page` that overflow `max_height_px`, per column.
///
/// Skips the scan entirely unless at least one column's total exceeds the budget. Within
/// a column, the first section that pushes the running total over the budget and every
/// section after it are overflowing.
pub fn get_overflowing_sections(
    page: &Page,
    max_height_px: f32,
    measurer: &dyn Measurer,
) -> OverflowResult {
    let mut result = OverflowResult::default();

    let any_over = ColumnKind::ALL
        .iter()
        .any(|&kind| column_total(page.column(kind), measurer) > max_height_px);
    if !any_over {
        return result;
    }

    for kind in ColumnKind::ALL {
        let column = page.column(kind);
        let mut running = 0.0_f32;
        if let Some(first_over) = column.iter().position(|id| {
            running += height_of(measurer, id);
            running > max_height_px
        }) {
            *result.column_mut(kind) = column[first_over..].to_vec();
        }
    }

    result
}
