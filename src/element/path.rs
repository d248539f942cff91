//! Vector artwork given as SVG path data.
//!
//! Like [`Image`](super::Image) the artwork's native size
//! (`img_width`/`img_height`) is required and the reported size is that
//! times `scale`. The group transform scales first and translates second,
//! so the reposition offset is expressed in artwork units.

use std::sync::OnceLock;

use serde_json::json;

use crate::border;
use crate::error::Result;
use crate::geometry::Transform;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::{Attrs, Canvas};

use super::{centered_offset, Element, Incomplete, Memo, Size};

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("path")
            .requires(&["img_width", "img_height"])
            .defaults(json!({
                "fill": "black",
                "stroke": "none",
                "scale": 1,
                "overflow": true,
                "x_reposition": false,
                "y_reposition": false,
            }))
    })
}

#[derive(Debug, Clone)]
pub struct Path {
    params: Params,
    components: Vec<String>,
    memo: Memo,
}

impl Path {
    /// One `d` attribute value per component.
    pub fn new(components: Vec<String>, params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
            components,
            memo: Memo::default(),
        })
    }

    pub(crate) fn with_inherited(
        components: Vec<String>,
        params: ParamMap,
        inherited: &ParamMap,
    ) -> Result<Self> {
        Ok(Self {
            params: Params::with_inherited(spec(), params, inherited)?,
            components,
            memo: Memo::default(),
        })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    fn raw_size(&self) -> Result<(f64, f64)> {
        Ok((self.params.f64("img_width")?, self.params.f64("img_height")?))
    }
}

impl Element for Path {
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
        self.memo.get_or_measure(|| {
            let (raw_w, raw_h) = self.raw_size()?;
            let scale = self.params.f64_or("scale", 1.0)?;
            Ok(Size {
                width: raw_w * scale,
                height: raw_h * scale,
            })
        })
    }

    fn incomplete(&self) -> Option<Incomplete> {
        if self.components.is_empty() {
            Some(Incomplete::new(&self.params, "no path components"))
        } else {
            None
        }
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let size = self.measure()?;
        let (x, y) = centered_offset(&self.params, self.raw_size()?, size)?;
        let scale = self.params.f64_or("scale", 1.0)?;
        let style = Attrs::new()
            .with("fill", self.params.str("fill")?)
            .with("stroke", self.params.str("stroke")?);

        canvas.group(Some("path"), None, at, |c| -> Result<()> {
            border::draw_for(c, &self.params, size.width, size.height)?;
            c.group(None, None, Transform::scale_translate(scale, x, y), |inner| {
                for d in &self.components {
                    inner.surface().path(d, &style);
                }
            });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::param_map;
    use crate::surface::{DrawCommand, DrawList, RenderOptions};

    fn path(params: serde_json::Value) -> Path {
        Path::new(
            vec!["M0 0 L10 0 L10 10 Z".to_string(), "M2 2 h4".to_string()],
            param_map(params),
        )
        .unwrap()
    }

    #[test]
    fn test_size_and_default_style() {
        let p = path(json!({ "img_width": 10, "img_height": 20, "scale": 2 }));
        assert_eq!(p.width().unwrap(), 20.0);
        assert_eq!(p.height().unwrap(), 40.0);

        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        p.render(&mut canvas, Transform::IDENTITY).unwrap();
        let paths: Vec<_> = list
            .commands()
            .iter()
            .filter_map(|p| match &p.command {
                DrawCommand::Path { d, style } => Some((d.clone(), style.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].0, "M2 2 h4");
        assert_eq!(paths[0].1.get("fill"), Some("black"));
        assert_eq!(paths[0].1.get("stroke"), Some("none"));
    }

    #[test]
    fn test_offset_is_applied_after_scale() {
        let p = path(json!({
            "img_width": 10,
            "img_height": 10,
            "scale": 2,
            "height": 60,
            "y_reposition": true,
        }));
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        p.render(&mut canvas, Transform::IDENTITY).unwrap();

        let world = list
            .commands()
            .iter()
            .find_map(|p| match &p.command {
                DrawCommand::Path { .. } => Some(p.world),
                _ => None,
            })
            .unwrap();
        // y = (60/2 - 10*2/2) / 2 = 10 artwork units, 20px on the page
        assert_eq!(world.apply((0.0, 0.0)), (0.0, 20.0));
        assert_eq!(world.sx, 2.0);
    }

    #[test]
    fn test_no_components_is_incomplete() {
        let p = Path::new(vec![], param_map(json!({ "img_width": 1, "img_height": 1 }))).unwrap();
        assert_eq!(p.incomplete().unwrap().kind, "path");
    }
}
