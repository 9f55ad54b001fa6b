//! Built-in default layout and physical page geometry.

use serde::{Deserialize, Serialize};

use crate::layout::model::{Layout, Page, SectionId};

/// Millimetre → CSS pixel factor used by the rendering surface.
pub const MM_TO_PX: f32 = 3.78;

const DEFAULT_MAIN: &[&str] = &[
    "profiles",
    "summary",
    "experience",
    "education",
    "projects",
    "volunteer",
    "references",
];

const DEFAULT_SIDEBAR: &[&str] = &[
    "skills",
    "interests",
    "certifications",
    "awards",
    "publications",
    "languages",
];

/// The template layout every new resume starts from: one page, every built-in section.
pub fn default_layout() -> Layout {
    let to_ids =
        |ids: &[&str]| -> Vec<SectionId> { ids.iter().map(|s| s.to_string()).collect() };
    // Built-in ids are unique.
    Layout::new(vec![Page::new(to_ids(DEFAULT_MAIN), to_ids(DEFAULT_SIDEBAR))])
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    pub fn height_mm(self) -> f32 {
        match self {
            PageFormat::A4 => 297.0,
            PageFormat::Letter => 279.4,
        }
    }

    pub fn height_px(self) -> f32 {
        self.height_mm() * MM_TO_PX
    }
}

impl std::str::FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            other => Err(format!("unknown page format '{other}' (expected a4 or letter)")),
        }
    }
}

/// Physical page used for the overflow budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub format: PageFormat,
    /// Top and bottom page margin, each, in pixels.
    pub margin_px: f32,
}

impl PageGeometry {
    /// Height available to one column of sections.
    pub fn column_budget_px(&self) -> f32 {
        (self.format.height_px() - 2.0 * self.margin_px).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            format: PageFormat::A4,
            margin_px: 18.0,
        }
    }
}
