//! Spacer rows.

use std::sync::OnceLock;

use crate::border;
use crate::element::{group_names, Element, Incomplete, Size};
use crate::error::Result;
use crate::geometry::Transform;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::{Attrs, Canvas};

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| ParamSpec::new("blank_row").requires(&["columns", "width", "height"]))
}

/// A row with no cells and an explicit size. It adds nothing to the
/// column widths and draws only its border.
#[derive(Debug)]
pub struct BlankRow {
    params: Params,
}

impl BlankRow {
    pub fn new(params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
        })
    }

    pub(crate) fn with_inherited(params: ParamMap, inherited: &ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::with_inherited(spec(), params, inherited)?,
        })
    }

    /// One zero per column.
    pub fn cell_widths(&self) -> Result<Vec<f64>> {
        Ok(vec![0.0; self.params.usize("columns")?])
    }
}

impl Element for BlankRow {
    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.params.inherit(parent)
    }

    fn measure(&self) -> Result<Size> {
        Ok(Size {
            width: self.params.f64("width")?,
            height: self.params.f64("height")?,
        })
    }

    fn incomplete(&self) -> Option<Incomplete> {
        None
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let size = self.measure()?;
        let (class, id) = group_names(&self.params)?;
        let invisible = Attrs::new().with("fill", "none").with("stroke", "none");
        canvas.group(class.as_deref(), id.as_deref(), at, |c| -> Result<()> {
            border::draw_for(c, &self.params, size.width, size.height)?;
            c.surface()
                .rect(0.0, 0.0, size.width, size.height, &invisible);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrellisError;
    use crate::params::param_map;
    use crate::surface::{DrawCommand, DrawList, RenderOptions};
    use serde_json::json;

    #[test]
    fn test_requires_size() {
        let err = BlankRow::new(param_map(json!({ "columns": 2, "width": 10 }))).unwrap_err();
        assert!(matches!(err, TrellisError::MissingParameter { ref name, .. } if name == "height"));
    }

    #[test]
    fn test_zero_cell_widths() {
        let blank =
            BlankRow::new(param_map(json!({ "columns": 3, "width": 90, "height": 8 }))).unwrap();
        assert_eq!(blank.cell_widths().unwrap(), vec![0.0; 3]);
        assert_eq!(blank.height().unwrap(), 8.0);
    }

    #[test]
    fn test_draws_invisible_rect_and_border() {
        let blank = BlankRow::new(param_map(json!({
            "columns": 1,
            "width": 90,
            "height": 8,
            "borders": ["bottom"],
        })))
        .unwrap();
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        blank.render(&mut canvas, Transform::IDENTITY).unwrap();

        let mut lines = 0;
        let mut rects = 0;
        for placed in list.commands() {
            match &placed.command {
                DrawCommand::Line { from, .. } => {
                    lines += 1;
                    assert_eq!(*from, (90.0, 8.0));
                }
                DrawCommand::Rect { style, .. } => {
                    rects += 1;
                    assert_eq!(style.get("stroke"), Some("none"));
                }
                _ => {}
            }
        }
        assert_eq!((lines, rects), (1, 1));
        // the row group and its border group
        assert_eq!(list.groups_with_class("blank_row").len(), 2);
    }
}
