//! A table cell: one content element, an optional border.

use std::sync::OnceLock;

use crate::border;
use crate::element::{
    at_least, group_names, Circle, Element, Image, Incomplete, Line, Memo, Multipolyline, Path,
    Polyline, Size, TextBox,
};
use crate::error::{Result, TrellisError};
use crate::geometry::Transform;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::Canvas;

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| ParamSpec::new("cell"))
}

/// Holds exactly one content element. Size is the larger of the explicit
/// size and the content's.
#[derive(Debug)]
pub struct Cell {
    params: Params,
    content: Option<Box<dyn Element>>,
    memo: Memo,
}

impl Cell {
    pub fn new(params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
            content: None,
            memo: Memo::default(),
        })
    }

    pub(crate) fn with_inherited(params: ParamMap, inherited: &ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::with_inherited(spec(), params, inherited)?,
            content: None,
            memo: Memo::default(),
        })
    }

    pub fn content(&self) -> Option<&dyn Element> {
        self.content.as_deref()
    }

    /// Set the content, binding it to this cell's parameters. Replaces any
    /// previous content.
    pub fn set_content(&mut self, mut element: Box<dyn Element>) -> Result<()> {
        element.inherit(self.params.child_params())?;
        self.content = Some(element);
        self.memo.clear();
        Ok(())
    }

    pub fn text_box(&mut self, text: &str, params: ParamMap) -> Result<()> {
        self.set_content(Box::new(TextBox::new(text, params)?))
    }

    pub fn polyline(&mut self, points: Vec<f64>, params: ParamMap) -> Result<()> {
        self.set_content(Box::new(Polyline::new(points, params)?))
    }

    pub fn line(&mut self, points: Vec<f64>, params: ParamMap) -> Result<()> {
        self.set_content(Box::new(Line::new(points, params)?))
    }

    pub fn multipolyline(&mut self, strokes: Vec<Vec<f64>>, params: ParamMap) -> Result<()> {
        self.set_content(Box::new(Multipolyline::new(strokes, params)?))
    }

    pub fn circle(&mut self, center: (f64, f64), radius: f64, params: ParamMap) -> Result<()> {
        self.set_content(Box::new(Circle::new(center, radius, params)?))
    }

    pub fn path(&mut self, components: Vec<String>, params: ParamMap) -> Result<()> {
        let path = Path::with_inherited(components, params, self.params.child_params())?;
        self.set_content(Box::new(path))
    }

    pub fn image(&mut self, href: &str, params: ParamMap) -> Result<()> {
        let image = Image::with_inherited(href, params, self.params.child_params())?;
        self.set_content(Box::new(image))
    }

    fn content_or_incomplete(&self) -> Result<&dyn Element> {
        self.content
            .as_deref()
            .ok_or_else(|| TrellisError::ElementIncomplete(self.empty()))
    }

    fn empty(&self) -> Incomplete {
        Incomplete::new(&self.params, "no content")
    }

    /// Draw with the given box size: the column's unified width and the
    /// row's height, so bordered cells line up as a grid.
    pub(crate) fn draw_sized(
        &self,
        canvas: &mut Canvas<'_>,
        at: Transform,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let content = self.content_or_incomplete()?;
        let (class, id) = group_names(&self.params)?;
        canvas.group(class.as_deref(), id.as_deref(), at, |c| -> Result<()> {
            border::draw_for(c, &self.params, width, height)?;
            content.draw(c, Transform::IDENTITY)
        })
    }
}

impl Element for Cell {
    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.params.inherit(parent)?;
        if let Some(content) = self.content.as_mut() {
            content.inherit(self.params.child_params())?;
        }
        self.memo.clear();
        Ok(())
    }

    fn measure(&self) -> Result<Size> {
        self.memo.get_or_measure(|| {
            let content = self.content_or_incomplete()?.measure()?;
            Ok(Size {
                width: at_least(self.params.opt_f64("width")?, content.width),
                height: at_least(self.params.opt_f64("height")?, content.height),
            })
        })
    }

    fn incomplete(&self) -> Option<Incomplete> {
        match &self.content {
            None => Some(self.empty()),
            Some(content) => content.incomplete(),
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let size = self.measure()?;
        self.draw_sized(canvas, at, size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::param_map;
    use crate::surface::{DrawCommand, DrawList, RenderOptions};
    use serde_json::json;

    #[test]
    fn test_empty_cell_is_incomplete() {
        let cell = Cell::new(ParamMap::new()).unwrap();
        assert_eq!(cell.incomplete().unwrap().kind, "cell");
        assert!(matches!(
            cell.measure(),
            Err(TrellisError::ElementIncomplete(_))
        ));
    }

    #[test]
    fn test_incomplete_content_is_reported() {
        let mut cell = Cell::new(ParamMap::new()).unwrap();
        cell.line(vec![0.0, 0.0], ParamMap::new()).unwrap();
        assert_eq!(cell.incomplete().unwrap().kind, "line");
    }

    #[test]
    fn test_size_never_below_content() {
        let mut cell = Cell::new(param_map(json!({ "height": 30 }))).unwrap();
        cell.polyline(vec![0.0, 0.0, 50.0, 10.0], param_map(json!({ "size": 0 })))
            .unwrap();
        assert_eq!(
            cell.measure().unwrap(),
            Size {
                width: 50.0,
                height: 30.0
            }
        );
    }

    #[test]
    fn test_content_inherits_cell_params() {
        let mut cell = Cell::new(param_map(json!({ "font": "Ubuntu Mono", "id": "c" }))).unwrap();
        cell.text_box("abc", param_map(json!({ "font_size": 10 }))).unwrap();
        let content = cell.content().unwrap();
        assert_eq!(content.params().str("font").unwrap(), "Ubuntu Mono");
        // specials stay with the cell
        assert!(!content.params().has_value("id"));
        assert_eq!(cell.width().unwrap(), 15.0);
    }

    #[test]
    fn test_path_raw_size_from_cell() {
        let mut cell = Cell::new(param_map(json!({ "img_width": 10, "img_height": 5 }))).unwrap();
        cell.path(vec!["M0 0 h10".to_string()], ParamMap::new()).unwrap();
        assert_eq!(cell.width().unwrap(), 10.0);
    }

    #[test]
    fn test_draws_border_then_content() {
        let mut cell = Cell::new(param_map(json!({ "border": true, "id": "c1" }))).unwrap();
        cell.circle((5.0, 5.0), 5.0, ParamMap::new()).unwrap();

        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        cell.draw_sized(&mut canvas, Transform::translate(3.0, 0.0), 40.0, 20.0)
            .unwrap();

        match &list.commands()[0].command {
            DrawCommand::BeginGroup { class, id, .. } => {
                assert_eq!(class.as_deref(), Some("cell"));
                assert_eq!(id.as_deref(), Some("c1"));
            }
            other => panic!("unexpected {:?}", other),
        }
        let lines: Vec<_> = list
            .commands()
            .iter()
            .filter_map(|p| match &p.command {
                DrawCommand::Line { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        // border sized by the column/row, not by the circle
        assert_eq!(lines[0], (40.0, 0.0));
        assert_eq!(lines[1], (40.0, 20.0));
        assert_eq!(list.groups_with_class("circle"), vec![Transform::translate(3.0, 0.0)]);
    }
}
