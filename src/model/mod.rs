//! # Document Model
//!
//! A table tree described as data. Documents are plain JSON:
//!
//! ```json
//! {
//!   "table": {
//!     "params": { "columns": 2, "font": "Arial" },
//!     "rows": [
//!       { "type": "row", "cells": [
//!         { "content": { "type": "text_box", "text": "Name" } },
//!         { "params": { "border": true },
//!           "content": { "type": "circle", "center": [5, 5], "radius": 5 } }
//!       ] },
//!       { "type": "blank", "params": { "height": 10 } }
//!     ]
//!   }
//! }
//! ```
//!
//! Every node takes an optional `params` object, handled exactly as the
//! builder API handles a `ParamMap`. [`Document::build`] turns the model
//! into a [`Table`] ready to render.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::{Circle, Element, Image, Line, Multipolyline, Path, Polyline, TextBox};
use crate::error::Result;
use crate::font::{FontMetrics, FontTable};
use crate::params::ParamMap;
use crate::surface::RenderOptions;
use crate::table::{Cell, Row, Table};

/// A complete document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub table: TableNode,

    /// Extra font metrics, merged over the built-in table for every text
    /// box in the document.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fonts: HashMap<String, FontMetrics>,

    /// Draw un-requested border sides invisibly.
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableNode {
    #[serde(default)]
    pub params: ParamMap,
    #[serde(default)]
    pub rows: Vec<RowNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowNode {
    Row {
        #[serde(default)]
        params: ParamMap,
        #[serde(default)]
        cells: Vec<CellNode>,
    },
    /// A spacer; needs a `height` or the table's `row_height`.
    Blank {
        #[serde(default)]
        params: ParamMap,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellNode {
    #[serde(default)]
    pub params: ParamMap,
    /// Absent content leaves the cell (and the document) incomplete.
    #[serde(default)]
    pub content: Option<ContentNode>,
}

/// What a cell holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    TextBox {
        text: String,
        #[serde(default)]
        params: ParamMap,
    },
    Polyline {
        points: Vec<f64>,
        #[serde(default)]
        params: ParamMap,
    },
    Line {
        points: Vec<f64>,
        #[serde(default)]
        params: ParamMap,
    },
    Multipolyline {
        strokes: Vec<Vec<f64>>,
        #[serde(default)]
        params: ParamMap,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        #[serde(default)]
        params: ParamMap,
    },
    Path {
        components: Vec<String>,
        #[serde(default)]
        params: ParamMap,
    },
    /// `src` is a data URI, file path or raw base64 payload. The raw size
    /// is probed unless `img_width` and `img_height` are given.
    Image {
        src: String,
        #[serde(default)]
        params: ParamMap,
    },
    /// A nested table.
    Table(TableNode),
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { debug: self.debug }
    }

    /// The font table text boxes measure against.
    pub fn font_table(&self) -> Arc<FontTable> {
        let mut table = FontTable::new();
        for (name, metrics) in &self.fonts {
            table.register(name, metrics.clone());
        }
        Arc::new(table)
    }

    /// Build the table tree. Construction errors (missing required
    /// parameters, mismatched widths, too many cells) surface here;
    /// incompleteness surfaces when the table is measured or rendered.
    pub fn build(&self) -> Result<Table> {
        let builder = Builder {
            fonts: self.font_table(),
        };
        builder.table(&self.table)
    }
}

struct Builder {
    fonts: Arc<FontTable>,
}

impl Builder {
    fn table(&self, node: &TableNode) -> Result<Table> {
        let mut table = Table::new(node.params.clone())?;
        for row in &node.rows {
            match row {
                RowNode::Row { params, cells } => {
                    table.row(params.clone(), |r| self.cells(r, cells))?;
                }
                RowNode::Blank { params } => {
                    table.blank_row(params.clone())?;
                }
            }
        }
        tracing::debug!(rows = node.rows.len(), "built table from document");
        Ok(table)
    }

    fn cells(&self, row: &mut Row, cells: &[CellNode]) -> Result<()> {
        for node in cells {
            row.cell(node.params.clone(), |cell| match &node.content {
                Some(content) => self.content(cell, content),
                None => Ok(()),
            })?;
        }
        Ok(())
    }

    fn content(&self, cell: &mut Cell, node: &ContentNode) -> Result<()> {
        let element: Box<dyn Element> = match node {
            ContentNode::TextBox { text, params } => {
                Box::new(TextBox::new(text, params.clone())?.with_fonts(self.fonts.clone()))
            }
            ContentNode::Polyline { points, params } => {
                Box::new(Polyline::new(points.clone(), params.clone())?)
            }
            ContentNode::Line { points, params } => {
                Box::new(Line::new(points.clone(), params.clone())?)
            }
            ContentNode::Multipolyline { strokes, params } => {
                Box::new(Multipolyline::new(strokes.clone(), params.clone())?)
            }
            ContentNode::Circle {
                center,
                radius,
                params,
            } => Box::new(Circle::new(*center, *radius, params.clone())?),
            ContentNode::Path { components, params } => {
                return cell.path(components.clone(), params.clone());
            }
            ContentNode::Image { src, params } => {
                let sized = params.contains_key("img_width") && params.contains_key("img_height");
                if sized || src.starts_with("http://") || src.starts_with("https://") {
                    return cell.image(src, params.clone());
                }
                Box::new(Image::from_source(src, params.clone())?)
            }
            ContentNode::Table(node) => Box::new(self.table(node)?),
        };
        cell.set_content(element)
    }
}
