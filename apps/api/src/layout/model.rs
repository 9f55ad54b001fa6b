//! Paginated two-column layout: pages, columns, locators and overflow results.
//!
//! A `Layout` is an immutable snapshot. Every engine operation takes a snapshot and
//! returns a brand-new one; callers share snapshots behind `Arc<Layout>` so that a
//! no-op can hand back the very same allocation.
//!
//! # Persisted shape
//! ```text
//! [                                  // pages
//!   [ ["summary", "experience"],     // column 0 (main)
//!     ["skills"] ],                  // column 1 (sidebar)
//!   ...
//! ]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier of one resume section instance.
pub type SectionId = String;

/// Namespace prefix for user-authored sections (`custom.<uuid>`).
pub const CUSTOM_SECTION_PREFIX: &str = "custom.";

/// True if the section was authored by the user rather than being a built-in kind.
pub fn is_custom_section(id: &str) -> bool {
    id.starts_with(CUSTOM_SECTION_PREFIX)
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("malformed drag payload: {0}")]
    MalformedPayload(String),

    #[error("invalid column container id '{0}'")]
    InvalidColumnId(String),

    #[error("locator page {page}, column {column}, section {section} does not resolve")]
    LocatorResolution {
        page: usize,
        column: u8,
        section: usize,
    },

    #[error("page {index} is out of range (layout has {len} pages)")]
    PageOutOfRange { index: usize, len: usize },

    #[error("layout must contain at least one page")]
    EmptyLayout,

    #[error("section '{0}' appears more than once in the layout")]
    DuplicateSection(SectionId),
}

// ────────────────────────────────────────────────────────────────────────────
// Columns
// ────────────────────────────────────────────────────────────────────────────

/// One of the two columns on a page. Serialized as its index (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ColumnKind {
    Main,
    Sidebar,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 2] = [ColumnKind::Main, ColumnKind::Sidebar];

    pub fn index(self) -> usize {
        match self {
            ColumnKind::Main => 0,
            ColumnKind::Sidebar => 1,
        }
    }
}

impl TryFrom<u8> for ColumnKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColumnKind::Main),
            1 => Ok(ColumnKind::Sidebar),
            other => Err(format!("column must be 0 or 1, got {other}")),
        }
    }
}

impl From<ColumnKind> for u8 {
    fn from(kind: ColumnKind) -> u8 {
        kind.index() as u8
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pages and layout
// ────────────────────────────────────────────────────────────────────────────

/// A printable page: exactly two columns, main then sidebar. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page(pub [Vec<SectionId>; 2]);

impl Page {
    pub fn new(main: Vec<SectionId>, sidebar: Vec<SectionId>) -> Self {
        Page([main, sidebar])
    }

    pub fn column(&self, kind: ColumnKind) -> &[SectionId] {
        &self.0[kind.index()]
    }

    pub fn column_mut(&mut self, kind: ColumnKind) -> &mut Vec<SectionId> {
        &mut self.0[kind.index()]
    }

    pub fn main(&self) -> &[SectionId] {
        self.column(ColumnKind::Main)
    }

    pub fn sidebar(&self) -> &[SectionId] {
        self.column(ColumnKind::Sidebar)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Vec::is_empty)
    }
}

/// Full paginated placement of every section. Always holds at least one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Page>", into = "Vec<Page>")]
pub struct Layout {
    pages: Vec<Page>,
}

impl Layout {
    /// Builds a layout, enforcing the non-empty and unique-section invariants.
    pub fn new(pages: Vec<Page>) -> Result<Self, LayoutError> {
        if pages.is_empty() {
            return Err(LayoutError::EmptyLayout);
        }
        let mut seen = HashSet::new();
        for id in pages.iter().flat_map(|p| p.0.iter().flatten()) {
            if !seen.insert(id.as_str()) {
                return Err(LayoutError::DuplicateSection(id.clone()));
            }
        }
        Ok(Layout { pages })
    }

    /// Convenience constructor from the persisted `[[[id]]]` shape.
    pub fn from_columns<S: Into<String>>(
        pages: Vec<[Vec<S>; 2]>,
    ) -> Result<Self, LayoutError> {
        Layout::new(
            pages
                .into_iter()
                .map(|[main, sidebar]| {
                    Page::new(
                        main.into_iter().map(Into::into).collect(),
                        sidebar.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        )
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn last_page(&self) -> &Page {
        // Non-empty by construction.
        &self.pages[self.pages.len() - 1]
    }

    /// Iterates every section id, page-major then column-major.
    pub fn section_ids(&self) -> impl Iterator<Item = &SectionId> {
        self.pages.iter().flat_map(|p| p.0.iter().flatten())
    }

    /// Finds where a section currently lives.
    pub fn locate(&self, id: &str) -> Option<Locator> {
        self.pages.iter().enumerate().find_map(|(page, p)| {
            ColumnKind::ALL.iter().find_map(|&column| {
                p.column(column)
                    .iter()
                    .position(|s| s == id)
                    .map(|section| Locator {
                        page,
                        column,
                        section,
                    })
            })
        })
    }

    // Mutation is crate-private: only engine operations working on their own copy
    // may touch pages directly.

    pub(crate) fn pages_mut(&mut self) -> &mut Vec<Page> {
        &mut self.pages
    }

    pub(crate) fn push_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    /// Removes a section wherever it is, returning where it was.
    pub(crate) fn take_section(&mut self, id: &str) -> Option<Locator> {
        let loc = self.locate(id)?;
        self.pages[loc.page].column_mut(loc.column).remove(loc.section);
        Some(loc)
    }
}

/// A single empty page.
impl Default for Layout {
    fn default() -> Self {
        Layout {
            pages: vec![Page::default()],
        }
    }
}

impl TryFrom<Vec<Page>> for Layout {
    type Error = LayoutError;

    fn try_from(pages: Vec<Page>) -> Result<Self, Self::Error> {
        Layout::new(pages)
    }
}

impl From<Layout> for Vec<Page> {
    fn from(layout: Layout) -> Self {
        layout.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Locators and overflow
// ────────────────────────────────────────────────────────────────────────────

/// Logical address of one slot in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub page: usize,
    pub column: ColumnKind,
    pub section: usize,
}

impl Locator {
    pub fn new(page: usize, column: ColumnKind, section: usize) -> Self {
        Locator {
            page,
            column,
            section,
        }
    }
}

/// Sections of the last page that exceed their column's height budget, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowResult {
    #[serde(default)]
    pub main: Vec<SectionId>,
    #[serde(default)]
    pub sidebar: Vec<SectionId>,
}

impl OverflowResult {
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.sidebar.is_empty()
    }

    pub fn column(&self, kind: ColumnKind) -> &[SectionId] {
        match kind {
            ColumnKind::Main => &self.main,
            ColumnKind::Sidebar => &self.sidebar,
        }
    }

    pub(crate) fn column_mut(&mut self, kind: ColumnKind) -> &mut Vec<SectionId> {
        match kind {
            ColumnKind::Main => &mut self.main,
            ColumnKind::Sidebar => &mut self.sidebar,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
