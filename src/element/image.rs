//! Raster images, referenced by `href`.
//!
//! The raw pixel size (`img_width`/`img_height`) cannot be derived from the
//! tree, so it is required; [`Image::from_source`] probes it from the
//! source. The reported size is the raw size times `scale`. With
//! `x_reposition`/`y_reposition` set the image is centered inside an
//! explicit `width`/`height` viewport.

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::border;
use crate::error::Result;
use crate::geometry::Transform;
use crate::image_loader;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::{Attrs, Canvas};

use super::{centered_offset, Element, Incomplete, Memo, Size};

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("image")
            .requires(&["img_width", "img_height"])
            .defaults(json!({
                "scale": 1,
                "x_reposition": false,
                "y_reposition": false,
            }))
    })
}

#[derive(Debug, Clone)]
pub struct Image {
    params: Params,
    href: String,
    memo: Memo,
}

impl Image {
    pub fn new(href: impl Into<String>, params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
            href: href.into(),
            memo: Memo::default(),
        })
    }

    /// Build with a parent's child map already bound, so the raw size may
    /// come from the parent.
    pub(crate) fn with_inherited(
        href: impl Into<String>,
        params: ParamMap,
        inherited: &ParamMap,
    ) -> Result<Self> {
        Ok(Self {
            params: Params::with_inherited(spec(), params, inherited)?,
            href: href.into(),
            memo: Memo::default(),
        })
    }

    /// Build from a data URI, file path or raw base64 payload, probing the
    /// raw size unless `params` already carry it.
    pub fn from_source(src: &str, mut params: ParamMap) -> Result<Self> {
        let probed = image_loader::probe(src)?;
        params
            .entry("img_width")
            .or_insert(Value::from(probed.width));
        params
            .entry("img_height")
            .or_insert(Value::from(probed.height));
        Self::new(probed.href, params)
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    fn raw_size(&self) -> Result<(f64, f64)> {
        Ok((self.params.f64("img_width")?, self.params.f64("img_height")?))
    }
}

impl Element for Image {
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
        None
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let size = self.measure()?;
        let (raw_w, raw_h) = self.raw_size()?;
        let (x, y) = centered_offset(&self.params, self.raw_size()?, size)?;
        let scale = self.params.f64_or("scale", 1.0)?;
        let attrs = Attrs::new().with("preserveAspectRatio", "xMinYMin meet");

        canvas.group(Some("image"), None, at, |c| -> Result<()> {
            border::draw_for(c, &self.params, size.width, size.height)?;
            c.group(None, None, Transform::translate_scale(0.0, 0.0, scale), |inner| {
                inner.surface().image(x, y, raw_w, raw_h, &self.href, &attrs);
            });
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

    fn image(params: serde_json::Value) -> Image {
        Image::new("logo.png", param_map(params)).unwrap()
    }

    fn drawn_image(img: &Image) -> (Transform, f64, f64, Attrs) {
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        img.render(&mut canvas, Transform::IDENTITY).unwrap();
        list.commands()
            .iter()
            .find_map(|p| match &p.command {
                DrawCommand::Image { x, y, attrs, .. } => Some((p.world, *x, *y, attrs.clone())),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_requires_raw_size() {
        let err = Image::new("a.png", param_map(json!({ "img_width": 10 }))).unwrap_err();
        assert!(matches!(
            err,
            TrellisError::MissingParameter { element: "image", ref name } if name == "img_height"
        ));
    }

    #[test]
    fn test_size_is_scaled_raw_size() {
        let img = image(json!({ "img_width": 100, "img_height": 40, "scale": 0.5 }));
        assert_eq!(
            img.measure().unwrap(),
            Size {
                width: 50.0,
                height: 20.0
            }
        );
    }

    #[test]
    fn test_centered_in_viewport() {
        let img = image(json!({
            "img_width": 100,
            "img_height": 40,
            "scale": 0.5,
            "width": 80,
            "height": 20,
            "x_reposition": true,
        }));
        let (world, x, y, attrs) = drawn_image(&img);
        // (80/2 - 100*0.5/2) / 0.5
        assert_eq!(x, 30.0);
        assert_eq!(y, 0.0);
        assert_eq!(world.sx, 0.5);
        assert_eq!(attrs.get("preserveAspectRatio"), Some("xMinYMin meet"));
    }

    #[test]
    fn test_not_repositioned_by_default() {
        let img = image(json!({ "img_width": 10, "img_height": 10, "width": 100 }));
        let (_, x, y, _) = drawn_image(&img);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_scale_can_be_inherited() {
        let mut img = Image::new(
            "a.png",
            param_map(json!({ "img_width": 4, "img_height": 4 })),
        )
        .unwrap();
        img.inherit(&param_map(json!({ "scale": 3 }))).unwrap();
        assert_eq!(img.width().unwrap(), 12.0);
    }
}
