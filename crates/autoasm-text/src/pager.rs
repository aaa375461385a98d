#![forbid(unsafe_code)]

//! Virtual display spanning a vertical stack of identical panels.
//!
//! The display is `PANEL_ROWS × panel_count` rows tall and either
//! [`NARROW_COLUMNS`] or [`WIDE_COLUMNS`] wide. Formatted output is wrapped
//! to the column count, cut into per-panel pages of `PANEL_ROWS` lines, and
//! each line gets a one-space margin on both sides. Raw output skips all of
//! that and goes verbatim to the first panel.
//!
//! The row and column presets are what fits a standard panel at the
//! [`PANEL_FONT_SIZE`] font, margins excluded.

use crate::wrap::wrap_text;

/// Text rows that fit on one panel.
pub const PANEL_ROWS: usize = 19;

/// Columns on a regular panel.
pub const NARROW_COLUMNS: usize = 25;

/// Columns on a wide panel.
pub const WIDE_COLUMNS: usize = 55;

/// Font size panels are switched to before writing.
pub const PANEL_FONT_SIZE: f32 = 0.928;

/// How the buffer is put on the panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Wrap, paginate and pad.
    #[default]
    Formatted,
    /// Whole buffer verbatim on the first panel.
    Raw,
}

/// Size of the virtual display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub panel_count: usize,
    pub rows_per_panel: usize,
    pub columns: usize,
}

impl Geometry {
    /// Standard geometry for `panel_count` panels of the given width preset.
    #[must_use]
    pub fn for_panels(panel_count: usize, wide: bool) -> Self {
        Self {
            panel_count,
            rows_per_panel: PANEL_ROWS,
            columns: if wide { WIDE_COLUMNS } else { NARROW_COLUMNS },
        }
    }

    /// Total rows across all panels.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows_per_panel * self.panel_count
    }
}

/// Renders an output buffer into per-panel text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualDisplay {
    geometry: Geometry,
    mode: RenderMode,
}

impl VirtualDisplay {
    #[must_use]
    pub fn new(geometry: Geometry, mode: RenderMode) -> Self {
        Self { geometry, mode }
    }

    /// Display for discovered panels, as flagged by the naming convention.
    #[must_use]
    pub fn for_panels(panel_count: usize, wide: bool, raw: bool) -> Self {
        let mode = if raw {
            RenderMode::Raw
        } else {
            RenderMode::Formatted
        };
        Self::new(Geometry::for_panels(panel_count, wide), mode)
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.geometry.rows()
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.geometry.columns
    }

    /// Text for each panel, in panel order.
    ///
    /// Raw mode yields a single entry for the first panel. Formatted mode
    /// yields one entry per panel; panels past the end of the text get an
    /// empty string. With no panels the result is empty.
    #[must_use]
    pub fn render(&self, buffer: &str) -> Vec<String> {
        if self.geometry.panel_count == 0 {
            return Vec::new();
        }
        match self.mode {
            RenderMode::Raw => vec![buffer.to_string()],
            RenderMode::Formatted => {
                let lines = wrap_text(buffer, self.geometry.columns);
                self.paginate(&lines)
                    .into_iter()
                    .map(|page| page.iter().map(|line| pad_line(line)).collect())
                    .collect()
            }
        }
    }

    /// Split wrapped lines into per-panel pages.
    ///
    /// Always returns `panel_count` pages. Lines that do not fit on the last
    /// panel are dropped.
    #[must_use]
    pub fn paginate<'a>(&self, lines: &'a [String]) -> Vec<&'a [String]> {
        let rows = self.geometry.rows_per_panel;
        let pages: Vec<&[String]> = (0..self.geometry.panel_count)
            .map(|panel| {
                let start = (panel * rows).min(lines.len());
                let end = ((panel + 1) * rows).min(lines.len());
                &lines[start..end]
            })
            .collect();

        let capacity = self.geometry.rows();
        if lines.len() > capacity {
            tracing::debug!(
                lines = lines.len(),
                capacity,
                dropped = lines.len() - capacity,
                "output exceeds virtual display"
            );
        }
        pages
    }
}

/// One-space margin on both sides plus the line terminator.
fn pad_line(line: &str) -> String {
    let mut padded = String::with_capacity(line.len() + 3);
    padded.push(' ');
    padded.push_str(line);
    padded.push(' ');
    padded.push('\n');
    padded
}
