//! # Trellis
//!
//! A layout engine that turns a tree of tables, rows, cells and shapes into
//! absolutely positioned SVG.
//!
//! Nodes never carry coordinates. A node is configured through parameters
//! that cascade down the tree: a `font` set on a table reaches every text
//! box inside it unless a row, cell or the text box itself overrides it.
//! Sizes are computed bottom-up (text wrapping, shape scaling, column width
//! unification) and positions top-down, when the tree is drawn.
//!
//! ## Architecture
//!
//! ```text
//! Input (builder API or JSON)
//!       ↓
//!   [model]    : Document: a table tree as data
//!       ↓
//!   [table]    : Table / Row / Cell layout
//!   [element]  : Text boxes and shapes, measured against [params]
//!       ↓
//!   [surface]  : Recorded drawing commands
//!       ↓
//!   [svg]      : Serialize to an SVG document
//! ```
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use trellis::params::param_map;
//! use trellis::table::Table;
//!
//! let mut table = Table::new(param_map(json!({ "columns": 2, "font": "Arial" })))?;
//! table.text_row(["Name", "Value"], param_map(json!({ "borders": ["bottom"] })))?;
//! table.row(param_map(json!({})), |row| {
//!     row.text_cell("Radius", param_map(json!({})))?
//!         .circle_cell((6.0, 6.0), 6.0, param_map(json!({ "fill": "red" })))?;
//!     Ok(())
//! })?;
//! let svg = trellis::render(&table)?;
//! assert!(svg.contains("<svg"));
//! # Ok::<(), trellis::error::TrellisError>(())
//! ```

pub mod border;
pub mod element;
pub mod error;
pub mod font;
pub mod geometry;
pub mod image_loader;
pub mod model;
pub mod params;
pub mod surface;
pub mod svg;
pub mod table;
pub mod text;

pub use element::{Element, Incomplete, Size};
pub use error::{Result, TrellisError};
pub use model::Document;
pub use params::{param_map, ParamMap};
pub use surface::RenderOptions;
pub use table::Table;

use geometry::Transform;
use surface::{Canvas, DrawList};

/// Render a table to an SVG document.
pub fn render(table: &Table) -> Result<String> {
    render_with(table, &RenderOptions::default())
}

/// Render a table to an SVG document with explicit options.
///
/// Fails with [`TrellisError::ElementIncomplete`] before anything is drawn
/// when any node of the tree is not ready.
pub fn render_with(table: &Table, options: &RenderOptions) -> Result<String> {
    let list = draw(table, options)?;
    let size = table.measure()?;
    svg::write_svg(list.commands(), size.width, size.height)
}

/// Record the drawing commands for a table without serializing them.
pub fn draw(table: &Table, options: &RenderOptions) -> Result<DrawList> {
    let mut list = DrawList::new();
    let mut canvas = Canvas::new(&mut list, *options);
    table.render(&mut canvas, Transform::IDENTITY)?;
    tracing::debug!(commands = list.commands().len(), "drew table");
    Ok(list)
}

/// Render a document described as JSON to an SVG document.
pub fn render_json(json: &str) -> Result<String> {
    let document = Document::from_json(json)?;
    let table = document.build()?;
    render_with(&table, &document.render_options())
}
