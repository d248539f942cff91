//! Several polylines scaled and placed as one shape.
//!
//! The sizing parameters (`width`, `height`, `scale`, the reposition
//! enums, `overflow`, `scale_size`) stay with the multipolyline; only the
//! stroke styling reaches the individual polylines. One placement is
//! computed over the union of their bounding boxes and applied to an inner
//! group, so the polylines keep their own (identity) transforms.

use std::sync::OnceLock;

use serde_json::json;

use crate::border;
use crate::error::{Result, TrellisError};
use crate::geometry::{Bounds, Transform};
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::Canvas;

use super::polyline::Polyline;
use super::shape::Placement;
use super::{ensure_complete, first_incomplete, Element, Incomplete, Memo, Size};

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("multipolyline")
            .special(&[
                "x_reposition",
                "y_reposition",
                "resize",
                "overflow",
                "height",
                "width",
                "scale",
                "scale_size",
            ])
            .defaults(json!({
                "fill": "none",
                "stroke": "black",
                "linecap": "butt",
                "linejoin": "miter",
                "size": 1,
                "x_reposition": "none",
                "y_reposition": "none",
                "expand": false,
                "shrink": false,
                "overflow": false,
                "scale": 1,
                "scale_size": true,
            }))
    })
}

#[derive(Debug, Clone)]
pub struct Multipolyline {
    params: Params,
    polylines: Vec<Polyline>,
    memo: Memo<Placement>,
}

impl Multipolyline {
    /// One flat coordinate list per stroke.
    pub fn new(strokes: Vec<Vec<f64>>, params: ParamMap) -> Result<Self> {
        let params = Params::new(spec(), params)?;
        let polylines = strokes
            .into_iter()
            .map(|points| Polyline::with_inherited(points, ParamMap::new(), params.child_params()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            params,
            polylines,
            memo: Memo::default(),
        })
    }

    pub fn polylines(&self) -> &[Polyline] {
        &self.polylines
    }

    /// Union of the strokes' bounding boxes.
    pub fn bounds(&self) -> Result<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for polyline in &self.polylines {
            let b = polyline.bounds()?;
            bounds = Some(match bounds {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }
        bounds.ok_or_else(|| TrellisError::ElementIncomplete(self.no_strokes()))
    }

    pub fn placement(&self) -> Result<Placement> {
        self.memo.get_or_measure(|| {
            ensure_complete(self)?;
            Placement::compute(&self.params, self.bounds()?)
        })
    }

    fn no_strokes(&self) -> Incomplete {
        Incomplete::new(&self.params, "no strokes")
    }

    /// Stroke width each polyline is drawn with. `None` leaves it to the
    /// polyline; with `scale_size` off it is pre-divided by the shared
    /// scale.
    fn stroke_override(&self, scale: f64) -> Result<Option<f64>> {
        if self.params.flag("scale_size") || scale == 0.0 {
            return Ok(None);
        }
        Ok(Some(self.params.f64_or("size", 0.0)? / scale))
    }
}

impl Element for Multipolyline {
    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    fn inherit(&mut self, parent: &ParamMap) -> Result<()> {
        self.params.inherit(parent)?;
        let child = self.params.child_params().clone();
        for polyline in &mut self.polylines {
            polyline.inherit(&child)?;
        }
        self.memo.clear();
        Ok(())
    }

    fn measure(&self) -> Result<Size> {
        Ok(self.placement()?.size())
    }

    fn incomplete(&self) -> Option<Incomplete> {
        if self.polylines.is_empty() {
            return Some(self.no_strokes());
        }
        first_incomplete(&self.polylines)
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let placement = self.placement()?;
        let size_override = self.stroke_override(placement.scale)?;

        canvas.group(Some("multi_polyline"), None, at, |c| -> Result<()> {
            border::draw_for(c, &self.params, placement.width, placement.height)?;
            c.group(None, None, placement.transform(), |inner| -> Result<()> {
                for polyline in &self.polylines {
                    polyline.draw_with_size(inner, Transform::IDENTITY, size_override)?;
                }
                Ok(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::param_map;
    use crate::surface::{DrawCommand, DrawList, RenderOptions};

    fn strokes() -> Vec<Vec<f64>> {
        vec![vec![0.0, 0.0, 10.0, 0.0], vec![0.0, 10.0, 20.0, 20.0]]
    }

    #[test]
    fn test_bounds_are_union_of_strokes() {
        let m = Multipolyline::new(strokes(), param_map(json!({ "size": 0 }))).unwrap();
        let b = m.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (0.0, 20.0, 0.0, 20.0));
        assert_eq!(m.width().unwrap(), 20.0);
    }

    #[test]
    fn test_sizing_params_stay_with_the_group() {
        let m = Multipolyline::new(
            strokes(),
            param_map(json!({ "width": 100, "scale": 3, "stroke": "blue" })),
        )
        .unwrap();
        for polyline in m.polylines() {
            assert!(!polyline.params().has_value("width"));
            assert_eq!(polyline.params().f64("scale").unwrap(), 1.0);
            assert_eq!(polyline.params().str("stroke").unwrap(), "blue");
        }
    }

    #[test]
    fn test_empty_is_incomplete() {
        let m = Multipolyline::new(vec![], ParamMap::new()).unwrap();
        assert!(m.incomplete().is_some());
        assert!(matches!(m.measure(), Err(TrellisError::ElementIncomplete(_))));

        let bad = Multipolyline::new(vec![vec![0.0, 0.0]], ParamMap::new()).unwrap();
        assert_eq!(bad.incomplete().unwrap().kind, "polyline");
    }

    #[test]
    fn test_inner_group_carries_the_shared_transform() {
        let m = Multipolyline::new(
            strokes(),
            param_map(json!({
                "size": 2,
                "width": 42,
                "height": 42,
                "expand": true,
                "scale_size": false,
                "x_reposition": "left",
                "y_reposition": "top",
            })),
        )
        .unwrap();
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        m.render(&mut canvas, Transform::IDENTITY).unwrap();

        // strokes padded by 1: 22x22 box, expanded to 42
        let scale = 42.0 / 22.0;
        let polylines: Vec<_> = list
            .commands()
            .iter()
            .filter_map(|p| match &p.command {
                DrawCommand::Polyline {
                    style, transform, ..
                } => Some((p.world, style.clone(), *transform)),
                _ => None,
            })
            .collect();
        assert_eq!(polylines.len(), 2);
        for (world, style, own) in &polylines {
            assert!(own.is_identity());
            let (x, y) = world.apply((-1.0, -1.0));
            assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
            assert!((world.sx - scale).abs() < 1e-9);
            let width: f64 = style.get("stroke-width").unwrap().parse().unwrap();
            assert!((width - 2.0 / scale).abs() < 1e-5);
        }
        assert_eq!(list.groups_with_class("multi_polyline").len(), 1);
    }

    #[test]
    fn test_inheritance_reaches_strokes() {
        let mut m = Multipolyline::new(strokes(), ParamMap::new()).unwrap();
        m.inherit(&param_map(json!({ "stroke": "green" }))).unwrap();
        assert_eq!(m.polylines()[0].params().str("stroke").unwrap(), "green");
    }
}
