#![forbid(unsafe_code)]

//! Text layout for character panels.
//!
//! - [`wrap`] - greedy word wrap counted in grapheme clusters
//! - [`pager`] - virtual display geometry, pagination, raw passthrough
//! - [`number`] - compact count formatting
//!
//! # Example
//! ```
//! use autoasm_text::VirtualDisplay;
//!
//! // Two narrow panels, formatted mode.
//! let display = VirtualDisplay::for_panels(2, false, false);
//! let panels = display.render("status ok\n");
//! assert_eq!(panels, vec![" status ok \n".to_string(), String::new()]);
//! ```

pub mod number;
pub mod pager;
pub mod wrap;

pub use number::format_count;
pub use pager::{
    Geometry, NARROW_COLUMNS, PANEL_FONT_SIZE, PANEL_ROWS, RenderMode, VirtualDisplay,
    WIDE_COLUMNS,
};
pub use wrap::{display_width, wrap_text};
