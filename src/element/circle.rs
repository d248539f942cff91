//! Circles. The bounding box is `center ± radius`; the stroke is not
//! counted.

use std::sync::OnceLock;

use serde_json::json;

use crate::border;
use crate::error::Result;
use crate::geometry::{Bounds, Transform};
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::{Attrs, Canvas};
use crate::svg::num;

use super::shape::{stroke_measure, Placement};
use super::{ensure_complete, Element, Incomplete, Memo, Size};

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("circle").defaults(json!({
            "fill": "none",
            "stroke": "black",
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
pub struct Circle {
    params: Params,
    center: (f64, f64),
    radius: f64,
    memo: Memo<Placement>,
}

impl Circle {
    pub fn new(center: (f64, f64), radius: f64, params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
            center,
            radius,
            memo: Memo::default(),
        })
    }

    pub fn bounds(&self) -> Bounds {
        let (cx, cy) = self.center;
        Bounds {
            min_x: cx - self.radius,
            max_x: cx + self.radius,
            min_y: cy - self.radius,
            max_y: cy + self.radius,
        }
    }

    pub fn placement(&self) -> Result<Placement> {
        self.memo.get_or_measure(|| {
            ensure_complete(self)?;
            Placement::compute(&self.params, self.bounds())
        })
    }
}

impl Element for Circle {
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
        Ok(self.placement()?.size())
    }

    fn incomplete(&self) -> Option<Incomplete> {
        if self.radius.is_finite() && self.radius >= 0.0 {
            None
        } else {
            Some(Incomplete::new(
                &self.params,
                format!("bad radius {}", self.radius),
            ))
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let placement = self.placement()?;
        let size = stroke_measure(
            self.params.f64_or("size", 0.0)?,
            placement.scale,
            self.params.flag("scale_size"),
        );
        let style = Attrs::new()
            .with("fill", self.params.str("fill")?)
            .with("stroke", self.params.str("stroke")?)
            .with("stroke-width", num(size));

        canvas.group(Some("circle"), None, at, |c| -> Result<()> {
            border::draw_for(c, &self.params, placement.width, placement.height)?;
            c.surface()
                .circle(self.center, self.radius, &style, placement.transform());
            Ok(())
        })
    }
}
