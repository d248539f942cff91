//! Polylines and single-segment lines.
//!
//! Points are a flat coordinate list `[x0, y0, x1, y1, ...]`. The bounding
//! box grows by half the stroke `size` so thick strokes are not clipped.

use std::sync::OnceLock;

use serde_json::json;

use crate::border;
use crate::error::{Result, TrellisError};
use crate::geometry::{Bounds, Transform};
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::{Attrs, Canvas};
use crate::svg::num;

use super::shape::{stroke_measure, Placement};
use super::{ensure_complete, Element, Incomplete, Memo, Size};

fn stroke_defaults() -> serde_json::Value {
    json!({
        "fill": "none",
        "stroke": "black",
        "linecap": "butt",
        "linejoin": "miter",
        "size": 1,
        "x_reposition": "none",
        "y_reposition": "none",
        "expand": false,
        "shrink": false,
        "dotspace": 0,
        "overflow": false,
        "scale": 1,
        "scale_size": true,
    })
}

pub(crate) fn polyline_spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| ParamSpec::new("polyline").defaults(stroke_defaults()))
}

fn line_spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| ParamSpec::new("line").defaults(stroke_defaults()))
}

/// An open path through two or more points.
#[derive(Debug, Clone)]
pub struct Polyline {
    params: Params,
    points: Vec<f64>,
    memo: Memo<Placement>,
}

impl Polyline {
    pub fn new(points: Vec<f64>, params: ParamMap) -> Result<Self> {
        Self::with_spec(polyline_spec(), points, params)
    }

    /// Build with a parent's child map already bound.
    pub(crate) fn with_inherited(
        points: Vec<f64>,
        params: ParamMap,
        inherited: &ParamMap,
    ) -> Result<Self> {
        Ok(Self {
            params: Params::with_inherited(polyline_spec(), params, inherited)?,
            points,
            memo: Memo::default(),
        })
    }

    fn with_spec(spec: &'static ParamSpec, points: Vec<f64>, params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec, params)?,
            points,
            memo: Memo::default(),
        })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    fn pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    fn has_valid_points(&self) -> bool {
        self.points.len() >= 4 && self.points.len() % 2 == 0
    }

    /// Unscaled bounding box, padded by half the stroke width.
    pub fn bounds(&self) -> Result<Bounds> {
        let pad = self.params.f64_or("size", 0.0)? / 2.0;
        Bounds::around(self.pairs(), pad).ok_or_else(|| {
            TrellisError::ElementIncomplete(Incomplete::new(&self.params, "no points"))
        })
    }

    pub fn placement(&self) -> Result<Placement> {
        self.memo.get_or_measure(|| {
            ensure_complete(self)?;
            Placement::compute(&self.params, self.bounds()?)
        })
    }

    /// Stroke attributes at the given scale. `size_override` replaces the
    /// stroke width as drawn (a multipolyline hands one down).
    fn style(&self, scale: f64, size_override: Option<f64>) -> Result<Attrs> {
        let scale_size = self.params.flag("scale_size");
        let size = match size_override {
            Some(size) => size,
            None => stroke_measure(self.params.f64_or("size", 0.0)?, scale, scale_size),
        };
        let mut dotspace = stroke_measure(self.params.f64_or("dotspace", 0.0)?, scale, scale_size);
        let mut dotsize = size;

        let linecap = self.params.str("linecap")?;
        if linecap == "round" {
            dotsize = 0.0;
            dotspace *= 2.0;
        }

        let mut style = Attrs::new()
            .with("fill", self.params.str("fill")?)
            .with("stroke", self.params.str("stroke")?)
            .with("stroke-width", num(size))
            .with("stroke-linecap", linecap)
            .with("stroke-linejoin", self.params.str("linejoin")?);
        if dotspace > 0.0 {
            style.set(
                "stroke-dasharray",
                format!("{}, {}", num(dotsize), num(dotspace)),
            );
        }
        Ok(style)
    }

    pub(crate) fn draw_with_size(
        &self,
        canvas: &mut Canvas<'_>,
        at: Transform,
        size_override: Option<f64>,
    ) -> Result<()> {
        let placement = self.placement()?;
        let style = self.style(placement.scale, size_override)?;
        let points = self.pairs();

        canvas.group(Some("polyline"), None, at, |c| -> Result<()> {
            border::draw_for(c, &self.params, placement.width, placement.height)?;
            c.surface().polyline(&points, &style, placement.transform());
            Ok(())
        })
    }
}

impl Element for Polyline {
    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.params.inherit(parent)?;
        self.memo.clear();
        Ok(())
    }

    fn measure(&self) -> Result<Size> {
        let size = self.placement()?.size();
        tracing::trace!(kind = self.params.kind(), ?size, "measured");
        Ok(size)
    }

    fn incomplete(&self) -> Option<Incomplete> {
        if self.has_valid_points() {
            None
        } else {
            Some(Incomplete::new(
                &self.params,
                format!("needs an even number of at least 4 coordinates, got {}", self.points.len()),
            ))
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        self.draw_with_size(canvas, at, None)
    }
}

/// A polyline with exactly one segment.
#[derive(Debug, Clone)]
pub struct Line(Polyline);

impl Line {
    pub fn new(points: Vec<f64>, params: ParamMap) -> Result<Self> {
        Polyline::with_spec(line_spec(), points, params).map(Line)
    }

    /// `(x1, y1) -> (x2, y2)`.
    pub fn between(from: (f64, f64), to: (f64, f64), params: ParamMap) -> Result<Self> {
        Self::new(vec![from.0, from.1, to.0, to.1], params)
    }
}

impl Element for Line {
    fn params(&self) -> &Params {
        self.0.params()
    }

    fn params_mut(&mut self) -> &mut Params {
        self.0.params_mut()
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.0.inherit(parent)
    }

    fn measure(&self) -> Result<Size> {
        ensure_complete(self)?;
        self.0.measure()
    }

    fn incomplete(&self) -> Option<Incomplete> {
        if self.0.points.len() == 4 {
            None
        } else {
            Some(Incomplete::new(
                &self.0.params,
                format!("needs exactly 4 coordinates, got {}", self.0.points.len()),
            ))
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        self.0.draw(canvas, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::param_map;
    use crate::surface::{DrawCommand, DrawList, RenderOptions};

    fn polyline(points: Vec<f64>, params: serde_json::Value) -> Polyline {
        Polyline::new(points, param_map(params)).unwrap()
    }

    fn drawn(element: &dyn Element) -> DrawList {
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        element.render(&mut canvas, Transform::IDENTITY).unwrap();
        list
    }

    fn polyline_style(list: &DrawList) -> Attrs {
        list.commands()
            .iter()
            .find_map(|p| match &p.command {
                DrawCommand::Polyline { style, .. } => Some(style.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_size_includes_half_stroke() {
        let p = polyline(vec![0.0, 0.0, 100.0, 50.0], json!({ "size": 2 }));
        assert_eq!(
            p.measure().unwrap(),
            Size {
                width: 102.0,
                height: 52.0
            }
        );
    }

    #[test]
    fn test_incomplete_point_counts() {
        assert!(polyline(vec![0.0, 0.0], json!({})).incomplete().is_some());
        assert!(polyline(vec![0.0, 0.0, 1.0], json!({})).incomplete().is_some());
        assert!(polyline(vec![0.0, 0.0, 1.0, 1.0], json!({})).incomplete().is_none());
        assert!(matches!(
            polyline(vec![], json!({})).measure(),
            Err(TrellisError::ElementIncomplete(_))
        ));
    }

    #[test]
    fn test_expand_doubles_into_target() {
        let p = polyline(
            vec![0.0, 0.0, 10.0, 10.0],
            json!({ "size": 0, "width": 20, "height": 40, "expand": true }),
        );
        let placement = p.placement().unwrap();
        assert_eq!(placement.scale, 2.0);
        assert_eq!(p.width().unwrap(), 20.0);
        assert_eq!(p.height().unwrap(), 40.0);
    }

    #[test]
    fn test_draws_inside_polyline_group_with_transform() {
        let p = polyline(
            vec![10.0, 10.0, 20.0, 20.0],
            json!({ "size": 0, "x_reposition": "left", "y_reposition": "top" }),
        );
        let list = drawn(&p);
        assert_eq!(list.groups_with_class("polyline").len(), 1);
        let transform = list
            .commands()
            .iter()
            .find_map(|p| match &p.command {
                DrawCommand::Polyline { transform, .. } => Some(*transform),
                _ => None,
            })
            .unwrap();
        assert_eq!(transform.apply((10.0, 10.0)), (0.0, 0.0));
    }

    #[test]
    fn test_style_defaults() {
        let style = polyline_style(&drawn(&polyline(vec![0.0, 0.0, 1.0, 1.0], json!({}))));
        assert_eq!(style.get("fill"), Some("none"));
        assert_eq!(style.get("stroke"), Some("black"));
        assert_eq!(style.get("stroke-width"), Some("1"));
        assert_eq!(style.get("stroke-linecap"), Some("butt"));
        assert_eq!(style.get("stroke-linejoin"), Some("miter"));
        assert_eq!(style.get("stroke-dasharray"), None);
    }

    #[test]
    fn test_dotted_round_caps() {
        let style = polyline_style(&drawn(&polyline(
            vec![0.0, 0.0, 1.0, 1.0],
            json!({ "dotspace": 3, "size": 2 }),
        )));
        assert_eq!(style.get("stroke-dasharray"), Some("2, 3"));

        let round = polyline_style(&drawn(&polyline(
            vec![0.0, 0.0, 1.0, 1.0],
            json!({ "dotspace": 3, "linecap": "round" }),
        )));
        assert_eq!(round.get("stroke-dasharray"), Some("0, 6"));
    }

    #[test]
    fn test_unscaled_stroke_keeps_visual_width() {
        let style = polyline_style(&drawn(&polyline(
            vec![0.0, 0.0, 10.0, 10.0],
            json!({ "size": 4, "scale": 2, "scale_size": false }),
        )));
        assert_eq!(style.get("stroke-width"), Some("2"));
    }

    #[test]
    fn test_inherited_stroke_reaches_polyline() {
        let mut p = polyline(vec![0.0, 0.0, 1.0, 1.0], json!({}));
        p.inherit(&param_map(json!({ "stroke": "red" }))).unwrap();
        assert_eq!(polyline_style(&drawn(&p)).get("stroke"), Some("red"));
    }

    #[test]
    fn test_line_needs_exactly_one_segment() {
        let line = Line::between((0.0, 0.0), (10.0, 0.0), ParamMap::new()).unwrap();
        assert!(line.incomplete().is_none());
        assert_eq!(line.width().unwrap(), 11.0);

        let long = Line::new(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0], ParamMap::new()).unwrap();
        let pending = long.incomplete().unwrap();
        assert_eq!(pending.kind, "line");
        assert!(long.measure().is_err());
    }
}
