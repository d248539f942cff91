//! # Tables
//!
//! A [`Table`] owns rows, a [`Row`] owns cells, a [`Cell`] owns one
//! content element. Rendering is two-pass:
//!
//! 1. Measure. Every row reports its cells' own widths; the table takes the
//!    column-wise maximum over all rows (`max_col_widths`).
//! 2. Draw. Each row is drawn at the running sum of the heights above it,
//!    and each cell at the running sum of the unified column widths to its
//!    left, so columns line up even when the cells disagree.
//!
//! Explicit column widths come from `col_widths` or from an even split of
//! the table `width`; when both are given they must agree.

pub mod blank_row;
pub mod cell;
pub mod row;

pub use blank_row::BlankRow;
pub use cell::Cell;
pub use row::Row;

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::border;
use crate::element::{at_least, first_incomplete, group_names, Element, Incomplete, Memo, Size};
use crate::error::{DimensionMismatch, Result, TrellisError};
use crate::geometry::Transform;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::Canvas;

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("table")
            .requires(&["columns"])
            .special(&["height", "row_height"])
            .defaults(json!({ "col_widths": null }))
    })
}

/// Explicit per-column widths for a node with `columns`, `width` and
/// `col_widths` parameters. `None` when neither width is given (columns
/// size to their content).
pub fn column_widths(params: &Params) -> Result<Option<Vec<f64>>> {
    let explicit = params.opt_f64_list("col_widths")?;
    let width = params.opt_f64("width")?;
    let columns = params.usize("columns")?;

    match (explicit, width) {
        (None, None) => Ok(None),
        (Some(col_widths), width) => {
            if col_widths.len() != columns {
                return Err(TrellisError::DimensionMismatch(DimensionMismatch::Count {
                    col_widths,
                    columns,
                }));
            }
            if let Some(width) = width {
                let sum: f64 = col_widths.iter().sum();
                if (sum - width).abs() > 1e-9 {
                    return Err(TrellisError::DimensionMismatch(DimensionMismatch::Sum {
                        col_widths,
                        width,
                    }));
                }
            }
            Ok(Some(col_widths))
        }
        (None, Some(width)) => {
            if columns == 0 {
                return Ok(Some(Vec::new()));
            }
            Ok(Some(vec![width / columns as f64; columns]))
        }
    }
}

/// A table row slot: cells, or a spacer.
#[derive(Debug)]
pub enum TableRow {
    Cells(Row),
    Blank(BlankRow),
}

impl TableRow {
    fn element(&self) -> &dyn Element {
        match self {
            TableRow::Cells(row) => row,
            TableRow::Blank(blank) => blank,
        }
    }

    fn element_mut(&mut self) -> &mut dyn Element {
        match self {
            TableRow::Cells(row) => row,
            TableRow::Blank(blank) => blank,
        }
    }

    pub fn cell_widths(&self) -> Result<Vec<f64>> {
        match self {
            TableRow::Cells(row) => row.cell_widths(),
            TableRow::Blank(blank) => blank.cell_widths(),
        }
    }

    pub fn height(&self) -> Result<f64> {
        self.element().height()
    }

    fn draw_columns(&self, canvas: &mut Canvas<'_>, at: Transform, widths: &[f64]) -> Result<()> {
        match self {
            TableRow::Cells(row) => row.draw_columns(canvas, at, widths),
            TableRow::Blank(blank) => blank.draw(canvas, at),
        }
    }
}

#[derive(Debug)]
pub struct Table {
    params: Params,
    rows: Vec<TableRow>,
    memo: Memo,
}

impl Table {
    pub fn new(params: ParamMap) -> Result<Self> {
        let params = Params::new(spec(), params)?;
        // reject inconsistent widths up front
        column_widths(&params)?;
        Ok(Self {
            params,
            rows: Vec::new(),
            memo: Memo::default(),
        })
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn col_widths(&self) -> Result<Option<Vec<f64>>> {
        column_widths(&self.params)
    }

    /// What every row inherits: the child map plus `height = row_height`.
    fn row_params(&self) -> Result<ParamMap> {
        let mut params = self.params.child_params().clone();
        if let Some(row_height) = self.params.opt_f64("row_height")? {
            params.insert("height".to_string(), Value::from(row_height));
        }
        Ok(params)
    }

    fn push(&mut self, row: TableRow) -> &mut Self {
        self.rows.push(row);
        self.memo.clear();
        self
    }

    /// Append a row built by `build`.
    pub fn row(
        &mut self,
        params: ParamMap,
        build: impl FnOnce(&mut Row) -> Result<()>,
    ) -> Result<&mut Self> {
        let mut row = Row::with_inherited(params, &self.row_params()?)?;
        build(&mut row)?;
        Ok(self.push(TableRow::Cells(row)))
    }

    /// Append a row built elsewhere.
    pub fn add_row(&mut self, mut row: Row) -> Result<&mut Self> {
        row.inherit(&self.row_params()?)?;
        Ok(self.push(TableRow::Cells(row)))
    }

    /// One text cell per entry.
    pub fn text_row<I, S>(&mut self, texts: I, params: ParamMap) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.row(params, |r| {
            for text in texts {
                r.text_cell(text.as_ref(), ParamMap::new())?;
            }
            Ok(())
        })
    }

    pub fn polyline_row(&mut self, points: Vec<f64>, params: ParamMap) -> Result<&mut Self> {
        self.row(params, |r| r.polyline_cell(points, ParamMap::new()).map(|_| ()))
    }

    pub fn multipolyline_row(
        &mut self,
        strokes: Vec<Vec<f64>>,
        params: ParamMap,
    ) -> Result<&mut Self> {
        self.row(params, |r| {
            r.multipolyline_cell(strokes, ParamMap::new()).map(|_| ())
        })
    }

    pub fn line_row(&mut self, points: Vec<f64>, params: ParamMap) -> Result<&mut Self> {
        self.row(params, |r| r.line_cell(points, ParamMap::new()).map(|_| ()))
    }

    pub fn path_row(&mut self, components: Vec<String>, params: ParamMap) -> Result<&mut Self> {
        self.row(params, |r| r.path_cell(components, ParamMap::new()).map(|_| ()))
    }

    /// A row with a single cell holding a nested table built by `build`.
    /// `params` are the nested table's.
    pub fn sub_table_row(
        &mut self,
        params: ParamMap,
        build: impl FnOnce(&mut Table) -> Result<()>,
    ) -> Result<&mut Self> {
        let mut sub = Table::new(params)?;
        build(&mut sub)?;
        self.row(ParamMap::new(), |r| {
            r.cell(ParamMap::new(), |c| c.set_content(Box::new(sub)))
                .map(|_| ())
        })
    }

    /// A spacer row. Needs a height, from `params` or the table's
    /// `row_height`.
    pub fn blank_row(&mut self, params: ParamMap) -> Result<&mut Self> {
        let has_height = params
            .get("height")
            .map(crate::params::truthy)
            .unwrap_or(false);
        if !has_height && !self.params.has_value("row_height") {
            return Err(TrellisError::MissingParameter {
                element: "blank_row",
                name: "height".to_string(),
            });
        }
        let blank = BlankRow::with_inherited(params, &self.row_params()?)?;
        Ok(self.push(TableRow::Blank(blank)))
    }

    /// Column-wise maximum of every row's cell widths.
    pub fn max_col_widths(&self) -> Result<Vec<f64>> {
        let mut max: Vec<f64> = Vec::new();
        for row in &self.rows {
            for (idx, width) in row.cell_widths()?.into_iter().enumerate() {
                match max.get_mut(idx) {
                    Some(current) => *current = current.max(width),
                    None => max.push(width),
                }
            }
        }
        tracing::debug!(?max, "unified column widths");
        Ok(max)
    }
}

impl Element for Table {
    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.params.inherit(parent)?;
        let row_params = self.row_params()?;
        for row in &mut self.rows {
            row.element_mut().inherit(&row_params)?;
        }
        self.memo.clear();
        Ok(())
    }

    fn update(&mut self, own: ParamMap) -> Result<()> {
        self.params.update(own)?;
        column_widths(&self.params)?;
        self.inherit(&ParamMap::new())
    }

    fn measure(&self) -> Result<Size> {
        self.memo.get_or_measure(|| {
            crate::element::ensure_complete(self)?;
            let explicit: f64 = self.col_widths()?.map(|w| w.iter().sum()).unwrap_or(0.0);
            let unified: f64 = self.max_col_widths()?.iter().sum();
            let rows_h = self
                .rows
                .iter()
                .map(|r| r.height())
                .sum::<Result<f64>>()?;
            let size = Size {
                width: explicit.max(unified),
                height: at_least(self.params.opt_f64("height")?, rows_h),
            };
            tracing::debug!(rows = self.rows.len(), ?size, "measured table");
            Ok(size)
        })
    }

    fn incomplete(&self) -> Option<Incomplete> {
        if self.rows.is_empty() {
            return Some(Incomplete::new(&self.params, "no rows"));
        }
        first_incomplete(self.rows.iter().map(TableRow::element))
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let size = self.measure()?;
        let widths = self.max_col_widths()?;
        let (class, id) = group_names(&self.params)?;

        canvas.group(class.as_deref(), id.as_deref(), at, |c| -> Result<()> {
            border::draw_for(c, &self.params, size.width, size.height)?;
            let mut y = 0.0;
            for row in &self.rows {
                row.draw_columns(c, Transform::translate(0.0, y), &widths)?;
                y += row.height()?;
            }
            Ok(())
        })
    }
}
