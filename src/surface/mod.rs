//! # Drawing Surface
//!
//! The layout engine never writes SVG itself. It calls into a [`Surface`]:
//! open a group (with class, id and a translate+scale transform), draw a
//! line, a rectangle or a text run, close the group. Shapes add their own
//! primitive (polyline, circle, path, image) inside a group.
//!
//! [`DrawList`] is the stock surface. It records every call as a
//! [`DrawCommand`] together with the accumulated transform at that point,
//! which is what [`crate::svg`] serializes and what tests inspect.

use crate::geometry::Transform;

/// An ordered attribute/style map. Later `set`s replace earlier values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
        self
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginGroup {
        class: Option<String>,
        id: Option<String>,
        transform: Transform,
    },
    EndGroup,
    Line {
        from: (f64, f64),
        to: (f64, f64),
        style: Attrs,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Attrs,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        attrs: Attrs,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        style: Attrs,
        transform: Transform,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        style: Attrs,
        transform: Transform,
    },
    Path {
        d: String,
        style: Attrs,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        href: String,
        attrs: Attrs,
    },
}

/// The primitives the layout engine draws with.
pub trait Surface {
    fn begin_group(&mut self, class: Option<&str>, id: Option<&str>, transform: Transform);
    fn end_group(&mut self);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), style: &Attrs);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Attrs);
    fn text(&mut self, x: f64, y: f64, text: &str, attrs: &Attrs);
    fn polyline(&mut self, points: &[(f64, f64)], style: &Attrs, transform: Transform);
    fn circle(&mut self, center: (f64, f64), radius: f64, style: &Attrs, transform: Transform);
    fn path(&mut self, d: &str, style: &Attrs);
    fn image(&mut self, x: f64, y: f64, width: f64, height: f64, href: &str, attrs: &Attrs);
}

/// A recorded command plus the world transform it was drawn under.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub command: DrawCommand,
    /// Accumulated transform of all enclosing groups (for `BeginGroup`,
    /// including the group's own).
    pub world: Transform,
}

/// A surface that records everything drawn on it.
#[derive(Debug, Clone)]
pub struct DrawList {
    commands: Vec<Placed>,
    stack: Vec<Transform>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            stack: vec![Transform::IDENTITY],
        }
    }

    pub fn commands(&self) -> &[Placed] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Placed> {
        self.commands
    }

    fn current(&self) -> Transform {
        self.stack.last().copied().unwrap_or(Transform::IDENTITY)
    }

    fn push(&mut self, command: DrawCommand) {
        let world = self.current();
        self.commands.push(Placed { command, world });
    }

    /// World transforms of every group with the given class, in draw order.
    pub fn groups_with_class(&self, class: &str) -> Vec<Transform> {
        self.commands
            .iter()
            .filter_map(|p| match &p.command {
                DrawCommand::BeginGroup { class: Some(c), .. }
                    if c.split_whitespace().any(|part| part == class) =>
                {
                    Some(p.world)
                }
                _ => None,
            })
            .collect()
    }
}

impl Surface for DrawList {
    fn begin_group(&mut self, class: Option<&str>, id: Option<&str>, transform: Transform) {
        let world = self.current().then(&transform);
        self.commands.push(Placed {
            command: DrawCommand::BeginGroup {
                class: class.map(str::to_string),
                id: id.map(str::to_string),
                transform,
            },
            world,
        });
        self.stack.push(world);
    }

    fn end_group(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.push(DrawCommand::EndGroup);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), style: &Attrs) {
        self.push(DrawCommand::Line {
            from,
            to,
            style: style.clone(),
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Attrs) {
        self.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            style: style.clone(),
        });
    }

    fn text(&mut self, x: f64, y: f64, text: &str, attrs: &Attrs) {
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            attrs: attrs.clone(),
        });
    }

    fn polyline(&mut self, points: &[(f64, f64)], style: &Attrs, transform: Transform) {
        self.push(DrawCommand::Polyline {
            points: points.to_vec(),
            style: style.clone(),
            transform,
        });
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, style: &Attrs, transform: Transform) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            style: style.clone(),
            transform,
        });
    }

    fn path(&mut self, d: &str, style: &Attrs) {
        self.push(DrawCommand::Path {
            d: d.to_string(),
            style: style.clone(),
        });
    }

    fn image(&mut self, x: f64, y: f64, width: f64, height: f64, href: &str, attrs: &Attrs) {
        self.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
            href: href.to_string(),
            attrs: attrs.clone(),
        });
    }
}

/// Options that apply to a whole render pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Draw un-requested border sides with zero opacity. Never use for
    /// output that gets printed: some printers ignore opacity.
    pub debug: bool,
}

/// A surface plus the render options, handed down the tree while drawing.
pub struct Canvas<'a> {
    surface: &'a mut dyn Surface,
    pub options: RenderOptions,
}

impl<'a> Canvas<'a> {
    pub fn new(surface: &'a mut dyn Surface, options: RenderOptions) -> Self {
        Self { surface, options }
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// Run `f` inside a group. The group is closed even when `f` fails.
    pub fn group<T>(
        &mut self,
        class: Option<&str>,
        id: Option<&str>,
        transform: Transform,
        f: impl FnOnce(&mut Canvas<'a>) -> T,
    ) -> T {
        self.surface.begin_group(class, id, transform);
        let out = f(self);
        self.surface.end_group();
        out
    }
}
