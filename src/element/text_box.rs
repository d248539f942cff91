//! # Text Boxes
//!
//! A block of text laid out by character budget. The text is normalized
//! (trimmed, whitespace runs collapsed) on construction. Font metrics come
//! from a [`FontTable`]; a box uses the built-in table unless one is
//! supplied with [`TextBox::with_fonts`].
//!
//! Sizing:
//! - width: explicit `width`, else `chars * glyph_width_px`
//! - lines: with `overflow` the whole text is one line; otherwise it is
//!   truncated (if `truncate`) and then word-wrapped to
//!   `(width - left/right padding) / (glyph_width_px * wrap coefficient)`
//!   characters per line
//! - height: with `overflow`, explicit `height` else the text block
//!   height; otherwise the larger of the two

use std::sync::{Arc, OnceLock};

use serde_json::json;

use crate::border;
use crate::error::{Result, TrellisError};
use crate::font::FontTable;
use crate::geometry::Transform;
use crate::params::{ParamMap, ParamSpec, Params};
use crate::surface::{Attrs, Canvas};
use crate::text::{self, WordPattern};

use super::{at_least, explicit_or, group_names, Element, Incomplete, Memo, Size};

fn spec() -> &'static ParamSpec {
    static SPEC: OnceLock<ParamSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        ParamSpec::new("text_box").defaults(json!({
            "font": "Arial Unicode MS",
            "font_style": [],
            "font_weight": 400,
            "font_size": 12,
            "font_color": null,
            "text_align": "left",
            "text_valign": "bottom",
            "line_height": 1,
            "wrap_policy": "normal",
            "word_pattern": null,
            "overflow": false,
            "truncate": false,
            "truncate_with": "...",
            "text_padding": { "top": 0, "bottom": 0, "left": 0, "right": 0 },
            "y_offset": null,
        }))
    })
}

fn builtin_fonts() -> Arc<FontTable> {
    static FONTS: OnceLock<Arc<FontTable>> = OnceLock::new();
    FONTS.get_or_init(|| Arc::new(FontTable::new())).clone()
}

/// Horizontal alignment, mapped onto `text-anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

impl TextAlign {
    const VALID: &'static [&'static str] = &["left", "right", "center"];

    fn parse(value: &str) -> Result<Self> {
        match value {
            "left" => Ok(TextAlign::Left),
            "right" => Ok(TextAlign::Right),
            "center" => Ok(TextAlign::Center),
            other => Err(TrellisError::InvalidEnumValue {
                param: "text_align",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }

    fn anchor(self) -> &'static str {
        match self {
            TextAlign::Left => "start",
            TextAlign::Right => "end",
            TextAlign::Center => "middle",
        }
    }
}

/// Vertical alignment of the text block inside the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextValign {
    Top,
    Middle,
    Bottom,
}

impl TextValign {
    const VALID: &'static [&'static str] = &["top", "bottom", "middle"];

    fn parse(value: &str) -> Result<Self> {
        match value {
            "top" => Ok(TextValign::Top),
            "middle" => Ok(TextValign::Middle),
            "bottom" => Ok(TextValign::Bottom),
            other => Err(TrellisError::InvalidEnumValue {
                param: "text_valign",
                value: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Padding {
    top: f64,
    bottom: f64,
    left: f64,
    right: f64,
}

impl Padding {
    fn from_params(params: &Params) -> Result<Self> {
        let map = params.object("text_padding")?;
        let side = |name: &str| -> Result<f64> {
            match map.get(name) {
                None => Ok(0.0),
                Some(v) if v.is_null() => Ok(0.0),
                Some(v) => v.as_f64().ok_or_else(|| TrellisError::InvalidParameter {
                    name: format!("text_padding.{}", name),
                    expected: "a number",
                    found: v.to_string(),
                }),
            }
        };
        Ok(Padding {
            top: side("top")?,
            bottom: side("bottom")?,
            left: side("left")?,
            right: side("right")?,
        })
    }
}

/// The measured layout of a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub size: Size,
    pub lines: Vec<String>,
    /// Height of the text block alone (padding plus lines).
    pub text_height: f64,
    pub line_height: f64,
    /// Distance a baseline is lifted above its line bottom.
    pub y_offset: f64,
}

#[derive(Debug, Clone)]
pub struct TextBox {
    params: Params,
    text: String,
    fonts: Arc<FontTable>,
    memo: Memo<TextLayout>,
}

impl TextBox {
    pub fn new(text: impl AsRef<str>, params: ParamMap) -> Result<Self> {
        Ok(Self {
            params: Params::new(spec(), params)?,
            text: text::normalize(text.as_ref()),
            fonts: builtin_fonts(),
            memo: Memo::default(),
        })
    }

    /// Measure against a different font table.
    pub fn with_fonts(mut self, fonts: Arc<FontTable>) -> Self {
        self.fonts = fonts;
        self.memo.clear();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> Result<Vec<String>> {
        Ok(self.layout()?.lines)
    }

    pub fn layout(&self) -> Result<TextLayout> {
        self.memo.get_or_measure(|| self.compute_layout())
    }

    fn compute_layout(&self) -> Result<TextLayout> {
        let font = self.params.str("font")?;
        let font_size = self.params.f64("font_size")?;
        let glyph_w = self.fonts.glyph_width_px(&font, font_size);
        let glyph_h = self.fonts.glyph_height_px(&font, font_size);
        let padding = Padding::from_params(&self.params)?;

        let char_count = self.text.chars().count() as f64;
        let width = explicit_or(self.params.opt_f64("width")?, char_count * glyph_w);

        let lines = if self.text.is_empty() {
            Vec::new()
        } else if self.params.flag("overflow") {
            vec![self.text.clone()]
        } else {
            let coefficient = self
                .fonts
                .wrap_coefficient(&font, &self.params.str("wrap_policy")?);
            let per_line = chars_per_line(width - padding.left - padding.right, glyph_w * coefficient);
            self.wrap(per_line)?
        };

        let line_height = glyph_h * self.params.f64_or("line_height", 1.0)?;
        let text_height = if self.text.is_empty() {
            0.0
        } else {
            padding.top + padding.bottom + lines.len() as f64 * line_height
        };

        let explicit_h = self.params.opt_f64("height")?;
        let height = if self.params.flag("overflow") {
            explicit_or(explicit_h, text_height)
        } else {
            at_least(explicit_h, text_height)
        };

        let y_ratio = match self.params.opt_f64("y_offset")? {
            Some(ratio) => ratio,
            None => self.fonts.baseline_offset(&font),
        };

        tracing::debug!(
            font = font.as_str(),
            font_size,
            width,
            height,
            lines = lines.len(),
            "laid out text box"
        );

        Ok(TextLayout {
            size: Size { width, height },
            lines,
            text_height,
            line_height,
            y_offset: glyph_h * y_ratio,
        })
    }

    fn wrap(&self, per_line: usize) -> Result<Vec<String>> {
        let pattern = match self.params.opt_str("word_pattern")? {
            Some(pattern) => WordPattern::new(&pattern)?,
            None => WordPattern::Default,
        };
        if self.params.flag("truncate") {
            let trailer = self.params.str("truncate_with")?;
            let truncated = text::truncate(&self.text, per_line, &trailer)?;
            Ok(text::word_wrap(&truncated, per_line, &pattern))
        } else {
            Ok(text::word_wrap(&self.text, per_line, &pattern))
        }
    }

    /// Baseline y of every line, relative to the box top.
    pub fn line_offsets(&self) -> Result<Vec<f64>> {
        let layout = self.layout()?;
        let padding = Padding::from_params(&self.params)?;
        let remaining = layout.size.height - layout.text_height;
        let shift = match TextValign::parse(&self.params.str("text_valign")?)? {
            TextValign::Top => padding.top,
            TextValign::Bottom => remaining,
            TextValign::Middle => remaining / 2.0,
        };
        Ok((1..=layout.lines.len())
            .map(|n| n as f64 * layout.line_height - layout.y_offset + shift)
            .collect())
    }

    fn text_attrs(&self, width: f64) -> Result<(f64, Attrs)> {
        let padding = Padding::from_params(&self.params)?;
        let align = TextAlign::parse(&self.params.str("text_align")?)?;
        let x = match align {
            TextAlign::Left => padding.left,
            TextAlign::Right => width - padding.right,
            TextAlign::Center => width / 2.0,
        };

        let styles = self.params.str_list("font_style")?;
        let weight = if styles.iter().any(|s| s == "bold") {
            "bold".to_string()
        } else {
            self.params.str("font_weight")?
        };

        let mut attrs = Attrs::new()
            .with("font-family", self.params.str("font")?)
            .with("font-size", self.params.str("font_size")?)
            .with("text-anchor", align.anchor())
            .with("font-weight", weight);
        if styles.iter().any(|s| s == "italic") {
            attrs.set("font-style", "italic");
        }
        if let Some(color) = self.params.opt_str("font_color")? {
            attrs.set("fill", color);
        }
        Ok((x, attrs))
    }
}

fn chars_per_line(available: f64, glyph: f64) -> usize {
    if glyph <= 0.0 {
        return usize::MAX;
    }
    (available / glyph).floor().max(0.0) as usize
}

impl Element for TextBox {
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
        Ok(self.layout()?.size)
    }

    fn incomplete(&self) -> Option<Incomplete> {
        None
    }

    fn draw(&self, canvas: &mut Canvas<'_>, at: Transform) -> Result<()> {
        let layout = self.layout()?;
        let offsets = self.line_offsets()?;
        let (x, attrs) = self.text_attrs(layout.size.width)?;
        let (class, id) = group_names(&self.params)?;

        canvas.group(class.as_deref(), id.as_deref(), at, |c| -> Result<()> {
            border::draw_for(c, &self.params, layout.size.width, layout.size.height)?;
            for (line, y) in layout.lines.iter().zip(offsets) {
                c.surface().text(x, y, line, &attrs);
            }
            Ok(())
        })
    }
}
