//! # Shape Scaling and Repositioning
//!
//! Polylines, circles and multipolylines share one placement algorithm:
//!
//! 1. Compute the unscaled bounding box from the geometry.
//! 2. Per axis, if an explicit target `width`/`height` is given and
//!    `expand` (target larger) or `shrink` (target smaller) allows it,
//!    the axis scale is `target / unscaled`, otherwise 1.
//! 3. The uniform scale is `min(scale_x, scale_y) * scale`.
//! 4. The reported size follows `overflow`: with it, the explicit size
//!    wins when given; without it, the box never shrinks below the shape.
//! 5. `x_reposition`/`y_reposition` anchor the scaled bounding box at the
//!    origin, then push it into the slack between the reported and the
//!    scaled size (nothing, half, or all of it).

use crate::error::{Result, TrellisError};
use crate::geometry::{Bounds, Transform};
use crate::params::Params;

use super::{at_least, explicit_or, Size};

/// Horizontal anchoring inside the reported box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XReposition {
    None,
    Left,
    Center,
    Right,
}

impl XReposition {
    const VALID: &'static [&'static str] = &["left", "right", "center", "none"];

    pub fn from_params(params: &Params) -> Result<Self> {
        let value = params.opt_str("x_reposition")?;
        match value.as_deref() {
            None | Some("none") => Ok(XReposition::None),
            Some("left") => Ok(XReposition::Left),
            Some("center") => Ok(XReposition::Center),
            Some("right") => Ok(XReposition::Right),
            Some(other) => Err(TrellisError::InvalidEnumValue {
                param: "x_reposition",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Vertical anchoring inside the reported box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YReposition {
    None,
    Top,
    Middle,
    Bottom,
}

impl YReposition {
    const VALID: &'static [&'static str] = &["top", "bottom", "middle", "none"];

    pub fn from_params(params: &Params) -> Result<Self> {
        let value = params.opt_str("y_reposition")?;
        match value.as_deref() {
            None | Some("none") => Ok(YReposition::None),
            Some("top") => Ok(YReposition::Top),
            Some("middle") => Ok(YReposition::Middle),
            Some("bottom") => Ok(YReposition::Bottom),
            Some(other) => Err(TrellisError::InvalidEnumValue {
                param: "y_reposition",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

/// The outcome of the placement algorithm for one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Unscaled bounding box.
    pub bounds: Bounds,
    pub scale: f64,
    /// Reported width/height.
    pub width: f64,
    pub height: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Placement {
    pub fn compute(params: &Params, bounds: Bounds) -> Result<Self> {
        let target_w = params.opt_f64("width")?;
        let target_h = params.opt_f64("height")?;
        let expand = params.flag("expand");
        let shrink = params.flag("shrink");

        let scale_x = axis_scale(target_w, bounds.width(), expand, shrink);
        let scale_y = axis_scale(target_h, bounds.height(), expand, shrink);
        let scale = scale_x.min(scale_y) * params.f64_or("scale", 1.0)?;

        let calc_w = bounds.width() * scale;
        let calc_h = bounds.height() * scale;

        let (width, height) = if params.flag("overflow") {
            (explicit_or(target_w, calc_w), explicit_or(target_h, calc_h))
        } else {
            (at_least(target_w, calc_w), at_least(target_h, calc_h))
        };

        let anchor_x = -bounds.min_x * scale;
        let translate_x = match XReposition::from_params(params)? {
            XReposition::None => 0.0,
            XReposition::Left => anchor_x,
            XReposition::Center => anchor_x + (width - calc_w) / 2.0,
            XReposition::Right => anchor_x + (width - calc_w),
        };

        let anchor_y = -bounds.min_y * scale;
        let translate_y = match YReposition::from_params(params)? {
            YReposition::None => 0.0,
            YReposition::Top => anchor_y,
            YReposition::Middle => anchor_y + (height - calc_h) / 2.0,
            YReposition::Bottom => anchor_y + (height - calc_h),
        };

        tracing::trace!(
            kind = params.kind(),
            scale,
            width,
            height,
            translate_x,
            translate_y,
            "placed shape"
        );

        Ok(Placement {
            bounds,
            scale,
            width,
            height,
            translate_x,
            translate_y,
        })
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// `translate(tx,ty) scale(s)` for the drawn geometry.
    pub fn transform(&self) -> Transform {
        Transform::translate_scale(self.translate_x, self.translate_y, self.scale)
    }
}

fn axis_scale(target: Option<f64>, unscaled: f64, expand: bool, shrink: bool) -> f64 {
    let Some(target) = target else {
        return 1.0;
    };
    if !(expand || shrink) || unscaled <= 0.0 {
        return 1.0;
    }
    let scale = target / unscaled;
    if (scale > 1.0 && !expand) || (scale < 1.0 && !shrink) {
        return 1.0;
    }
    scale
}

/// A stroke measure (width, dash spacing) as drawn. With `scale_size`
/// off it is pre-divided by the scale so it looks the same at any scale.
pub fn stroke_measure(value: f64, scale: f64, scale_size: bool) -> f64 {
    if scale_size || scale == 0.0 {
        value
    } else {
        value / scale
    }
}
