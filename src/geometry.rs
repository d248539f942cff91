//! Bounding boxes and the translate+scale transforms groups carry.

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// The box around `points`, grown by `pad` on every side.
    /// `None` for an empty point set.
    pub fn around(points: impl IntoIterator<Item = (f64, f64)>, pad: f64) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut b = Bounds {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
        };
        for (x, y) in iter {
            b.min_x = b.min_x.min(x);
            b.max_x = b.max_x.max(x);
            b.min_y = b.min_y.min(y);
            b.max_y = b.max_y.max(y);
        }
        Some(Bounds {
            min_x: b.min_x - pad,
            max_x: b.max_x + pad,
            min_y: b.min_y - pad,
            max_y: b.max_y + pad,
        })
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// `p -> scale * p + translate`, the SVG `translate(tx,ty) scale(sx,sy)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub tx: f64,
    pub ty: f64,
    pub sx: f64,
    pub sy: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        tx: 0.0,
        ty: 0.0,
        sx: 1.0,
        sy: 1.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Transform {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// `translate(tx,ty) scale(s)`.
    pub fn translate_scale(tx: f64, ty: f64, s: f64) -> Self {
        Transform {
            tx,
            ty,
            sx: s,
            sy: s,
        }
    }

    /// `scale(s) translate(tx,ty)`, i.e. the translation happens in the
    /// scaled coordinate space.
    pub fn scale_translate(s: f64, tx: f64, ty: f64) -> Self {
        Transform {
            tx: s * tx,
            ty: s * ty,
            sx: s,
            sy: s,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// The transform of a child group nested inside `self`.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            tx: self.sx * child.tx + self.tx,
            ty: self.sy * child.ty + self.ty,
            sx: self.sx * child.sx,
            sy: self.sy * child.sy,
        }
    }

    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    /// The SVG `transform` attribute value, `None` for the identity.
    pub fn to_svg(&self) -> Option<String> {
        if self.is_identity() {
            return None;
        }
        let mut parts = Vec::new();
        if self.tx != 0.0 || self.ty != 0.0 {
            parts.push(format!("translate({},{})", self.tx, self.ty));
        }
        if self.sx != 1.0 || self.sy != 1.0 {
            parts.push(format!("scale({},{})", self.sx, self.sy));
        }
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_with_padding() {
        let b = Bounds::around([(0.0, 0.0), (10.0, 4.0), (5.0, -2.0)], 1.0).unwrap();
        assert_eq!(b.width(), 12.0);
        assert_eq!(b.height(), 8.0);
        assert_eq!(b.min_y, -3.0);
        assert!(Bounds::around(std::iter::empty(), 1.0).is_none());
    }

    #[test]
    fn test_nested_transforms_compose() {
        let outer = Transform::translate(10.0, 20.0);
        let inner = Transform::translate_scale(5.0, 0.0, 2.0);
        let world = outer.then(&inner);
        assert_eq!(world.apply((1.0, 1.0)), (17.0, 22.0));
    }

    #[test]
    fn test_scale_then_translate() {
        let t = Transform::scale_translate(2.0, 3.0, 4.0);
        assert_eq!(t.apply((0.0, 0.0)), (6.0, 8.0));
    }

    #[test]
    fn test_svg_attribute() {
        assert_eq!(Transform::IDENTITY.to_svg(), None);
        assert_eq!(
            Transform::translate_scale(1.5, 0.0, 2.0).to_svg().as_deref(),
            Some("translate(1.5,0) scale(2,2)")
        );
    }
}
