//! # Borders
//!
//! A border is four independent line segments, one per side, so a cell can
//! show just its `left` and `bottom` edges. All sides share one style: a
//! system default (`stroke: black`, `size: 1`) shallow-merged with the
//! caller's `border_style`, with `size` renamed to `stroke-width`.

use serde_json::Value;

use crate::error::{Result, TrellisError};
use crate::params::{ParamMap, Params};
use crate::surface::{Attrs, Canvas};
use crate::geometry::Transform;

/// One side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Drawing order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub const NAMES: &'static [&'static str] = &["top", "right", "bottom", "left"];

    pub fn parse(name: &str) -> Result<Side> {
        match name {
            "top" => Ok(Side::Top),
            "right" => Ok(Side::Right),
            "bottom" => Ok(Side::Bottom),
            "left" => Ok(Side::Left),
            other => Err(TrellisError::InvalidEnumValue {
                param: "borders",
                value: other.to_string(),
                valid: Self::NAMES,
            }),
        }
    }

    /// Segment endpoints for a `width` x `height` box.
    fn segment(&self, width: f64, height: f64) -> ((f64, f64), (f64, f64)) {
        match self {
            Side::Top => ((0.0, 0.0), (width, 0.0)),
            Side::Right => ((width, 0.0), (width, height)),
            Side::Bottom => ((width, height), (0.0, height)),
            Side::Left => ((0.0, height), (0.0, 0.0)),
        }
    }
}

/// Which sides a node asked for: `borders` wins, else `border: true`
/// means all four.
pub fn requested_sides(params: &Params) -> Result<Vec<Side>> {
    if params.has_value("borders") {
        return params
            .str_list("borders")?
            .iter()
            .map(|name| Side::parse(name))
            .collect();
    }
    if params.flag("border") {
        return Ok(Side::ALL.to_vec());
    }
    Ok(Vec::new())
}

/// Default style merged with overrides; `size` becomes `stroke-width`.
pub fn border_style(overrides: &ParamMap) -> Attrs {
    let mut style = Attrs::new().with("stroke", "black").with("size", 1);
    for (k, v) in overrides {
        style.set(k, value_to_attr(v));
    }
    let width = style.remove("size").unwrap_or_else(|| "1".to_string());
    style.set("stroke-width", width);
    style
}

fn value_to_attr(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Draw the requested sides of a `width` x `height` rectangle.
///
/// Nothing is drawn when no side is requested, unless the canvas is in
/// debug mode: then every side is drawn and the un-requested ones get
/// `opacity: 0`.
pub fn draw(
    canvas: &mut Canvas<'_>,
    width: f64,
    height: f64,
    sides: &[Side],
    style: &Attrs,
    class: Option<&str>,
) {
    let debug = canvas.options.debug;
    if !debug && sides.is_empty() {
        return;
    }

    let class = match class {
        Some(c) => format!("{} border", c),
        None => "border".to_string(),
    };

    canvas.group(Some(&class), None, Transform::IDENTITY, |c| {
        for side in Side::ALL {
            let mut line_style = style.clone();
            if !sides.contains(&side) {
                if !debug {
                    continue;
                }
                line_style.set("opacity", 0);
            }
            let (from, to) = side.segment(width, height);
            c.surface().line(from, to, &line_style);
        }
    });
}

/// Draw a node's own border, sized `width` x `height`.
pub fn draw_for(canvas: &mut Canvas<'_>, params: &Params, width: f64, height: f64) -> Result<()> {
    let sides = requested_sides(params)?;
    let style = border_style(&params.object("border_style")?);
    let class = params.opt_str("class")?;
    draw(canvas, width, height, &sides, &style, class.as_deref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, DrawList, RenderOptions};
    use serde_json::json;

    fn lines(list: &DrawList) -> Vec<(f64, f64, f64, f64, Attrs)> {
        list.commands()
            .iter()
            .filter_map(|p| match &p.command {
                DrawCommand::Line { from, to, style } => {
                    Some((from.0, from.1, to.0, to.1, style.clone()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_draws_only_requested_sides() {
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        draw(&mut canvas, 10.0, 5.0, &[Side::Left, Side::Top], &border_style(&ParamMap::new()), None);

        let drawn = lines(&list);
        assert_eq!(drawn.len(), 2);
        // fixed order: top first, then left
        assert_eq!((drawn[0].0, drawn[0].1, drawn[0].2, drawn[0].3), (0.0, 0.0, 10.0, 0.0));
        assert_eq!((drawn[1].0, drawn[1].1, drawn[1].2, drawn[1].3), (0.0, 5.0, 0.0, 0.0));
    }

    #[test]
    fn test_nothing_drawn_without_sides() {
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions::default());
        draw(&mut canvas, 10.0, 5.0, &[], &border_style(&ParamMap::new()), Some("cell"));
        assert!(list.commands().is_empty());
    }

    #[test]
    fn test_debug_draws_hidden_sides_transparent() {
        let mut list = DrawList::new();
        let mut canvas = Canvas::new(&mut list, RenderOptions { debug: true });
        draw(&mut canvas, 10.0, 5.0, &[Side::Right], &border_style(&ParamMap::new()), Some("cell"));

        let drawn = lines(&list);
        assert_eq!(drawn.len(), 4);
        assert_eq!(drawn[0].4.get("opacity"), Some("0"));
        assert_eq!(drawn[1].4.get("opacity"), None);
        assert_eq!(list.groups_with_class("border").len(), 1);
        assert_eq!(list.groups_with_class("cell").len(), 1);
    }

    #[test]
    fn test_style_merge_renames_size() {
        let style = border_style(&crate::params::param_map(json!({ "size": 2, "stroke": "red" })));
        assert_eq!(style.get("stroke"), Some("red"));
        assert_eq!(style.get("stroke-width"), Some("2"));
        assert_eq!(style.get("size"), None);
    }

    #[test]
    fn test_bad_side_name() {
        assert!(matches!(
            Side::parse("middle"),
            Err(TrellisError::InvalidEnumValue { param: "borders", .. })
        ));
    }
}
