// Layout engine: two-column, multi-page placement of resume sections.
// Implements: locator codec, moves, drag state machine, overflow detection,
// pagination, reset and page removal. Every operation is pure over `Layout` snapshots.

pub mod drag;
pub mod locator;
pub mod model;
pub mod move_engine;
pub mod overflow;
pub mod paginator;
pub mod removal;
pub mod reset;
pub mod templates;

// Re-export the public API consumed by the session layer.
pub use drag::{DragController, DragNode};
pub use model::{Layout, LayoutError, Locator, OverflowResult};
pub use move_engine::move_item_in_layout;
pub use overflow::{get_overflowing_sections, HeightMap, Measurer};
pub use paginator::{on_add_page, Pagination, PaginationOptions};
pub use removal::on_remove_page;
pub use reset::on_reset_layout;
pub use templates::{default_layout, PageFormat, PageGeometry};
