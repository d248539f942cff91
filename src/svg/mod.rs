//! # SVG Writer
//!
//! Serializes a recorded [`DrawList`](crate::surface::DrawList) into an SVG
//! document. Groups become `<g>` elements with their `class`, `id` and
//! `transform`; every style map is written as presentation attributes.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, TrellisError};
use crate::geometry::Transform;
use crate::surface::{Attrs, DrawCommand, Placed};

/// Write `commands` as a standalone SVG document of the given size.
pub fn write_svg(commands: &[Placed], width: f64, height: f64) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    root.push_attribute(("xmlns:xlink", "http://www.w3.org/1999/xlink"));
    root.push_attribute(("width", num(width).as_str()));
    root.push_attribute(("height", num(height).as_str()));
    root.push_attribute((
        "viewBox",
        format!("0 0 {} {}", num(width), num(height)).as_str(),
    ));
    emit(&mut writer, Event::Start(root))?;

    for placed in commands {
        write_command(&mut writer, &placed.command)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("svg")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| TrellisError::Svg(e.to_string()))
}

fn write_command(writer: &mut Writer<Vec<u8>>, command: &DrawCommand) -> Result<()> {
    match command {
        DrawCommand::BeginGroup {
            class,
            id,
            transform,
        } => {
            let mut g = BytesStart::new("g");
            if let Some(id) = id {
                g.push_attribute(("id", id.as_str()));
            }
            if let Some(class) = class {
                g.push_attribute(("class", class.as_str()));
            }
            push_transform(&mut g, transform);
            emit(writer, Event::Start(g))
        }
        DrawCommand::EndGroup => emit(writer, Event::End(BytesEnd::new("g"))),
        DrawCommand::Line { from, to, style } => {
            let mut el = BytesStart::new("line");
            el.push_attribute(("x1", num(from.0).as_str()));
            el.push_attribute(("y1", num(from.1).as_str()));
            el.push_attribute(("x2", num(to.0).as_str()));
            el.push_attribute(("y2", num(to.1).as_str()));
            push_attrs(&mut el, style);
            emit(writer, Event::Empty(el))
        }
        DrawCommand::Rect {
            x,
            y,
            width,
            height,
            style,
        } => {
            let mut el = BytesStart::new("rect");
            el.push_attribute(("x", num(*x).as_str()));
            el.push_attribute(("y", num(*y).as_str()));
            el.push_attribute(("width", num(*width).as_str()));
            el.push_attribute(("height", num(*height).as_str()));
            push_attrs(&mut el, style);
            emit(writer, Event::Empty(el))
        }
        DrawCommand::Text { x, y, text, attrs } => {
            let mut el = BytesStart::new("text");
            el.push_attribute(("x", num(*x).as_str()));
            el.push_attribute(("y", num(*y).as_str()));
            push_attrs(&mut el, attrs);
            emit(writer, Event::Start(el))?;
            emit(writer, Event::Text(BytesText::new(text)))?;
            emit(writer, Event::End(BytesEnd::new("text")))
        }
        DrawCommand::Polyline {
            points,
            style,
            transform,
        } => {
            let points = points
                .iter()
                .map(|(x, y)| format!("{},{}", num(*x), num(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            let mut el = BytesStart::new("polyline");
            el.push_attribute(("points", points.as_str()));
            push_attrs(&mut el, style);
            push_transform(&mut el, transform);
            emit(writer, Event::Empty(el))
        }
        DrawCommand::Circle {
            center,
            radius,
            style,
            transform,
        } => {
            let mut el = BytesStart::new("circle");
            el.push_attribute(("cx", num(center.0).as_str()));
            el.push_attribute(("cy", num(center.1).as_str()));
            el.push_attribute(("r", num(*radius).as_str()));
            push_attrs(&mut el, style);
            push_transform(&mut el, transform);
            emit(writer, Event::Empty(el))
        }
        DrawCommand::Path { d, style } => {
            let mut el = BytesStart::new("path");
            el.push_attribute(("d", d.as_str()));
            push_attrs(&mut el, style);
            emit(writer, Event::Empty(el))
        }
        DrawCommand::Image {
            x,
            y,
            width,
            height,
            href,
            attrs,
        } => {
            let mut el = BytesStart::new("image");
            el.push_attribute(("x", num(*x).as_str()));
            el.push_attribute(("y", num(*y).as_str()));
            el.push_attribute(("width", num(*width).as_str()));
            el.push_attribute(("height", num(*height).as_str()));
            el.push_attribute(("xlink:href", href.as_str()));
            push_attrs(&mut el, attrs);
            emit(writer, Event::Empty(el))
        }
    }
}

fn push_attrs(el: &mut BytesStart<'_>, attrs: &Attrs) {
    for (k, v) in attrs.iter() {
        el.push_attribute((k, v));
    }
}

fn push_transform(el: &mut BytesStart<'_>, transform: &Transform) {
    if let Some(t) = transform.to_svg() {
        el.push_attribute(("transform", t.as_str()));
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| TrellisError::Svg(e.to_string()))
}

/// Format a coordinate without a trailing `.0` and without float noise.
pub fn num(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}
