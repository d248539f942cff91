//! # Elements
//!
//! Everything that can sit in a table cell (and the table parts
//! themselves) implements [`Element`]: it can report its size, say whether
//! it is ready to be drawn, and draw itself onto a [`Canvas`].
//!
//! Sizing is two-phase. [`Element::measure`] computes a [`Size`] once and
//! caches it; drawing reads the cached record and never re-measures.
//! Rebinding an element's inherited parameters (attaching it to a parent)
//! drops the cache, so measurement always sees the final parameters.

pub mod circle;
pub mod image;
pub mod multipolyline;
pub mod path;
pub mod polyline;
pub mod shape;
pub mod text_box;

pub use circle::Circle;
pub use image::Image;
pub use multipolyline::Multipolyline;
pub use path::Path;
pub use polyline::{Line, Polyline};
pub use text_box::TextBox;

use std::cell::OnceCell;
use std::fmt;

use crate::error::{Result, TrellisError};
use crate::geometry::Transform;
use crate::params::{ParamMap, Params};
use crate::surface::Canvas;

/// Identifies the first node of a tree that is not ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Incomplete {
    pub kind: &'static str,
    pub id: Option<String>,
    pub reason: String,
}

impl Incomplete {
    pub fn new(params: &Params, reason: impl Into<String>) -> Self {
        Self {
            kind: params.kind(),
            id: params.opt_str("id").ok().flatten(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}#{}: {}", self.kind, id, self.reason),
            None => write!(f, "{}: {}", self.kind, self.reason),
        }
    }
}

/// A measured width/height pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// The capability every node of a tree provides.
pub trait Element: fmt::Debug {
    /// The node's resolved parameters.
    fn params(&self) -> &Params;

    fn params_mut(&mut self) -> &mut Params;

    /// Merge a parent's child map into the inherited tier, then pass the
    /// result on to owned children.
    fn inherit(&mut self, parent: &ParamMap) -> Result<()>;

    /// Merge `own` into the node's own parameters and re-cascade the new
    /// child map through the subtree. Cached measurements are dropped.
    fn update(&mut self, own: ParamMap) -> Result<()> {
        self.params_mut().update(own)?;
        self.inherit(&ParamMap::new())
    }

    /// Compute (once) the reported size.
    fn measure(&self) -> Result<Size>;

    /// `None` when ready to render, else the first incomplete node.
    fn incomplete(&self) -> Option<Incomplete>;

    /// Draw at `at` relative to the enclosing group. Assumes completeness.
    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()>;

    fn width(&self) -> Result<f64> {
        Ok(self.measure()?.width)
    }

    fn height(&self) -> Result<f64> {
        Ok(self.measure()?.height)
    }

    /// Check completeness, then draw.
    fn render(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        ensure_complete(self)?;
        self.draw(canvas, at)
    }
}

/// Fail with the first incomplete descendant, if any.
pub fn ensure_complete<E: Element + ?Sized>(element: &E) -> Result<()> {
    match element.incomplete() {
        Some(pending) => Err(TrellisError::ElementIncomplete(pending)),
        None => Ok(()),
    }
}

/// First incomplete node among `children`, depth-first.
pub fn first_incomplete<'a, E, I>(children: I) -> Option<Incomplete>
where
    E: Element + ?Sized + 'a,
    I: IntoIterator<Item = &'a E>,
{
    children.into_iter().find_map(|child| child.incomplete())
}

/// A measurement cache, filled by the first successful measurement.
/// Shapes keep their whole placement here, other nodes just a [`Size`].
#[derive(Debug)]
pub(crate) struct Memo<T = Size>(OnceCell<T>);

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo(OnceCell::new())
    }
}

impl<T: Clone> Memo<T> {
    pub(crate) fn get_or_measure(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(value) = self.0.get() {
            return Ok(value.clone());
        }
        let value = f()?;
        let _ = self.0.set(value.clone());
        Ok(value)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = OnceCell::new();
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        // Measurements are not shared between copies.
        Memo::default()
    }
}

/// The `class` and `id` a node's outer group is written with.
pub(crate) fn group_names(params: &Params) -> Result<(Option<String>, Option<String>)> {
    Ok((params.opt_str("class")?, params.opt_str("id")?))
}

/// `max(explicit or 0, computed)`: the box never shrinks below its content.
pub(crate) fn at_least(explicit: Option<f64>, computed: f64) -> f64 {
    explicit.unwrap_or(0.0).max(computed)
}

/// `explicit` if given, else `computed`: content may overflow the box.
pub(crate) fn explicit_or(explicit: Option<f64>, computed: f64) -> f64 {
    explicit.unwrap_or(computed)
}

/// Offset that centers content of `raw` size inside the viewport, in the
/// content's own (unscaled) coordinates. Images and paths share this:
/// `x_reposition`/`y_reposition` are plain flags for them.
pub(crate) fn centered_offset(params: &Params, raw: (f64, f64), size: Size) -> Result<(f64, f64)> {
    let (raw_w, raw_h) = raw;
    let scale = params.f64_or("scale", 1.0)?;
    if scale == 0.0 {
        return Ok((0.0, 0.0));
    }
    let viewport_w = params.f64_or("width", size.width)?;
    let viewport_h = params.f64_or("height", size.height)?;
    // preserveAspectRatio always fits the content into its box
    let autoscale = (size.width / raw_w).min(size.height / raw_h);

    let x = if params.flag("x_reposition") {
        (viewport_w / 2.0 - raw_w * autoscale / 2.0) / scale
    } else {
        0.0
    };
    let y = if params.flag("y_reposition") {
        (viewport_h / 2.0 - raw_h * autoscale / 2.0) / scale
    } else {
        0.0
    };
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{param_map, ParamSpec};
    use serde_json::json;
    use std::sync::OnceLock;

    fn spec() -> &'static ParamSpec {
        static SPEC: OnceLock<ParamSpec> = OnceLock::new();
        SPEC.get_or_init(|| {
            ParamSpec::new("shape").defaults(json!({
                "scale": 1,
                "width": null,
                "height": null,
                "x_reposition": false,
                "y_reposition": false,
            }))
        })
    }

    #[test]
    fn test_size_rules() {
        assert_eq!(at_least(Some(10.0), 30.0), 30.0);
        assert_eq!(at_least(Some(50.0), 30.0), 50.0);
        assert_eq!(at_least(None, 30.0), 30.0);
        assert_eq!(explicit_or(Some(10.0), 30.0), 10.0);
        assert_eq!(explicit_or(None, 30.0), 30.0);
    }

    #[test]
    fn test_memo_measures_once() {
        let memo: Memo = Memo::default();
        let mut calls = 0;
        for _ in 0..3 {
            let size = memo
                .get_or_measure(|| {
                    calls += 1;
                    Ok(Size {
                        width: 1.0,
                        height: 2.0,
                    })
                })
                .unwrap();
            assert_eq!(size.height, 2.0);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_memo_does_not_cache_errors() {
        let memo: Memo = Memo::default();
        assert!(memo
            .get_or_measure(|| Err(TrellisError::ParameterNotFound("x".into())))
            .is_err());
        assert!(memo
            .get_or_measure(|| Ok(Size {
                width: 1.0,
                height: 1.0
            }))
            .is_ok());
    }

    #[test]
    fn test_centered_offset_uses_unscaled_units() {
        let size = Size {
            width: 100.0,
            height: 50.0,
        };
        let params = Params::new(
            spec(),
            param_map(json!({ "scale": 2, "width": 100, "x_reposition": true })),
        )
        .unwrap();
        // autoscale min(100/10, 50/10) = 5; (100/2 - 10*5/2) / 2
        assert_eq!(
            centered_offset(&params, (10.0, 10.0), size).unwrap(),
            (12.5, 0.0)
        );

        let flat = Params::new(spec(), param_map(json!({ "scale": 0, "y_reposition": true }))).unwrap();
        assert_eq!(
            centered_offset(&flat, (10.0, 10.0), size).unwrap(),
            (0.0, 0.0)
        );
    }
}
