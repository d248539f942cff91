//! A table row: a fixed number of cells laid out left to right.

use std::sync::OnceLock;

use serde_json::Value;

use crate::border;
use crate::element::{at_least, first_incomplete, group_names, Element, Incomplete, Memo, Size};
use crate::error::{Result, TrellisError};
use crate::geometry::Transform;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::Canvas;

use super::cell::Cell;
use super::column_widths;

pub(super) fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("row")
            .requires(&["columns"])
            .special(&["width", "columns", "col_widths"])
    })
}

#[derive(Debug)]
pub struct Row {
    params: Params,
    cells: Vec<Cell>,
    memo: Memo,
}

impl Row {
    /// A standalone row; `columns` must be among `params`.
    pub fn new(params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
            cells: Vec::new(),
            memo: Memo::default(),
        })
    }

    pub(crate) fn with_inherited(params: ParamMap, inherited: &ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::with_inherited(spec(), params, inherited)?,
            cells: Vec::new(),
            memo: Memo::default(),
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn columns(&self) -> Result<usize> {
        self.params.usize("columns")
    }

    /// Explicit column widths, from `col_widths` or an even split of
    /// `width`.
    pub fn col_widths(&self) -> Result<Option<Vec<f64>>> {
        column_widths(&self.params)
    }

    /// What the cell in column `idx` inherits: the row's child map plus
    /// that column's width, when known.
    fn cell_params(&self, idx: usize) -> Result<ParamMap> {
        let mut params = self.params.child_params().clone();
        if let Some(width) = self.col_widths()?.and_then(|widths| widths.get(idx).copied()) {
            params.insert("width".to_string(), Value::from(width));
        }
        Ok(params)
    }

    /// Append a cell built by `build`. Fails once every column is filled.
    pub fn cell(
        &mut self,
        params: ParamMap,
        build: impl FnOnce(&mut Cell) -> Result<()>,
    ) -> Result<&mut Self> {
        let columns = self.columns()?;
        if self.cells.len() >= columns {
            return Err(TrellisError::TooManyCells { columns });
        }
        let mut cell = Cell::with_inherited(params, &self.cell_params(self.cells.len())?)?;
        build(&mut cell)?;
        self.cells.push(cell);
        self.memo.clear();
        Ok(self)
    }

    /// Append a cell built elsewhere.
    pub fn add_cell(&mut self, mut cell: Cell) -> Result<&mut Self> {
        let columns = self.columns()?;
        if self.cells.len() >= columns {
            return Err(TrellisError::TooManyCells { columns });
        }
        cell.inherit(&self.cell_params(self.cells.len())?)?;
        self.cells.push(cell);
        self.memo.clear();
        Ok(self)
    }

    pub fn text_cell(&mut self, text: &str, params: ParamMap) -> Result<&mut Self> {
        self.cell(params, |c| c.text_box(text, ParamMap::new()))
    }

    pub fn polyline_cell(&mut self, points: Vec<f64>, params: ParamMap) -> Result<&mut Self> {
        self.cell(params, |c| c.polyline(points, ParamMap::new()))
    }

    pub fn line_cell(&mut self, points: Vec<f64>, params: ParamMap) -> Result<&mut Self> {
        self.cell(params, |c| c.line(points, ParamMap::new()))
    }

    pub fn multipolyline_cell(
        &mut self,
        strokes: Vec<Vec<f64>>,
        params: ParamMap,
    ) -> Result<&mut Self> {
        self.cell(params, |c| c.multipolyline(strokes, ParamMap::new()))
    }

    pub fn circle_cell(
        &mut self,
        center: (f64, f64),
        radius: f64,
        params: ParamMap,
    ) -> Result<&mut Self> {
        self.cell(params, |c| c.circle(center, radius, ParamMap::new()))
    }

    pub fn path_cell(&mut self, components: Vec<String>, params: ParamMap) -> Result<&mut Self> {
        self.cell(params, |c| c.path(components, ParamMap::new()))
    }

    pub fn image_cell(&mut self, href: &str, params: ParamMap) -> Result<&mut Self> {
        self.cell(params, |c| c.image(href, ParamMap::new()))
    }

    /// Each cell's own width, in column order.
    pub fn cell_widths(&self) -> Result<Vec<f64>> {
        self.ensure_complete()?;
        self.cells.iter().map(|c| c.width()).collect()
    }

    pub fn cell_heights(&self) -> Result<Vec<f64>> {
        self.ensure_complete()?;
        self.cells.iter().map(|c| c.height()).collect()
    }

    fn ensure_complete(&self) -> Result<()> {
        crate::element::ensure_complete(self)
    }

    /// Draw with the table-wide column widths: every cell is placed at the
    /// running sum of the widths before it and bordered at its column's
    /// width.
    pub(crate) fn draw_columns(
        &self,
        canvas: &mut Canvas<'_>,
        at: Transform,
        col_widths: &[f64],
    ) -> Result<()> {
        let height = self.height()?;
        let (class, id) = group_names(&self.params)?;
        canvas.group(class.as_deref(), id.as_deref(), at, |c| -> Result<()> {
            border::draw_for(c, &self.params, col_widths.iter().sum(), height)?;
            let mut x = 0.0;
            for (cell, &width) in self.cells.iter().zip(col_widths) {
                cell.draw_sized(c, Transform::translate(x, 0.0), width, height)?;
                x += width;
            }
            Ok(())
        })
    }
}

impl Element for Row {
    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.params.inherit(parent)?;
        for idx in 0..self.cells.len() {
            let params = self.cell_params(idx)?;
            self.cells[idx].inherit(&params)?;
        }
        self.memo.clear();
        Ok(())
    }

    fn measure(&self) -> Result<Size> {
        self.memo.get_or_measure(|| {
            let widths = self.cell_widths()?;
            let heights = self.cell_heights()?;
            let content_h = heights.iter().copied().fold(0.0, f64::max);
            Ok(Size {
                width: at_least(self.params.opt_f64("width")?, widths.iter().sum()),
                height: at_least(self.params.opt_f64("height")?, content_h),
            })
        })
    }

    fn incomplete(&self) -> Option<Incomplete> {
        let columns = self.params.usize("columns").unwrap_or(0);
        if self.cells.len() != columns {
            return Some(Incomplete::new(
                &self.params,
                format!("has {} of {} cells", self.cells.len(), columns),
            ));
        }
        first_incomplete(&self.cells)
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let widths = self.cell_widths()?;
        self.draw_columns(canvas, at, &widths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::param_map;
    use crate::surface::{DrawList, RenderOptions};
    use serde_json::json;

    fn row(params: serde_json::Value) -> Row {
        Row::new(param_map(params)).unwrap()
    }

    fn bar(row: &mut Row, width: f64, height: f64) {
        row.polyline_cell(
            vec![0.0, 0.0, width, height],
            param_map(json!({ "size": 0 })),
        )
        .unwrap();
    }

    #[test]
    fn test_requires_columns() {
        assert!(matches!(
            Row::new(ParamMap::new()),
            Err(TrellisError::MissingParameter { element: "row", .. })
        ));
    }

    #[test]
    fn test_complete_only_with_all_cells() {
        let mut r = row(json!({ "columns": 2 }));
        assert!(r.incomplete().is_some());
        bar(&mut r, 10.0, 10.0);
        assert_eq!(r.incomplete().unwrap().reason, "has 1 of 2 cells");
        bar(&mut r, 10.0, 10.0);
        assert!(r.incomplete().is_none());
    }

    #[test]
    fn test_too_many_cells() {
        let mut r = row(json!({ "columns": 1 }));
        bar(&mut r, 1.0, 1.0);
        assert!(matches!(
            r.text_cell("x", ParamMap::new()),
            Err(TrellisError::TooManyCells { columns: 1 })
        ));
    }

    #[test]
    fn test_size_from_cells() {
        let mut r = row(json!({ "columns": 3, "height": 5 }));
        bar(&mut r, 10.0, 4.0);
        bar(&mut r, 20.0, 12.0);
        bar(&mut r, 30.0, 8.0);
        assert_eq!(r.cell_widths().unwrap(), vec![10.0, 20.0, 30.0]);
        assert_eq!(r.width().unwrap(), 60.0);
        assert_eq!(r.height().unwrap(), 12.0);
    }

    #[test]
    fn test_cells_get_column_widths() {
        let mut r = row(json!({ "columns": 2, "col_widths": [40, 60] }));
        r.text_cell("a", ParamMap::new()).unwrap();
        r.text_cell("b", ParamMap::new()).unwrap();
        assert_eq!(r.cell_widths().unwrap(), vec![40.0, 60.0]);
        // width and col_widths stay with the row
        assert!(!r.cells()[0].params().child_params().contains_key("col_widths"));
    }

    #[test]
    fn test_even_split_of_width() {
        let mut r = row(json!({ "columns": 4, "width": 100 }));
        for _ in 0..4 {
            r.text_cell("a", ParamMap::new()).unwrap();
        }
        assert_eq!(r.cell_widths().unwrap(), vec![25.0; 4]);
    }

    #[test]
    fn test_cells_placed_at_running_offsets() {
        let mut r = row(json!({ "columns": 3 }));
        bar(&mut r, 1.0, 1.0);
        bar(&mut r, 1.0, 1.0);
        bar(&mut r, 1.0, 1.0);

        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        r.draw_columns(&mut canvas, Transform::IDENTITY, &[10.0, 30.0, 5.0])
            .unwrap();
        let xs: Vec<f64> = list
            .groups_with_class("cell")
            .iter()
            .map(|t| t.tx)
            .collect();
        assert_eq!(xs, vec![0.0, 10.0, 40.0]);
    }

    #[test]
    fn test_added_cell_is_rebound() {
        let mut r = row(json!({ "columns": 1, "col_widths": [70], "font": "Arial" }));
        let mut cell = Cell::new(ParamMap::new()).unwrap();
        cell.text_box("a", ParamMap::new()).unwrap();
        r.add_cell(cell).unwrap();
        let content = r.cells()[0].content().unwrap();
        assert_eq!(content.params().str("font").unwrap(), "Arial");
        assert_eq!(r.width().unwrap(), 70.0);
    }
}
