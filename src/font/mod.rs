//! # Font Metrics
//!
//! Text boxes are measured without shaping: every glyph of a font is
//! assumed to have the same advance, expressed as a ratio of the font
//! size. That is exact for monospace fonts and a decent average for
//! proportional ones.
//!
//! Wrap policies compensate for proportional fonts: a `max` policy assumes
//! every glyph is as wide as a capital "W", so text never overflows its box
//! at the cost of wrapping earlier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metrics of one font, all ratios relative to the font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    /// Average glyph advance.
    pub glyph_width: f64,
    /// Line box height.
    pub glyph_height: f64,
    /// How far the baseline sits above the bottom of the line box, as a
    /// fraction of the line box height.
    #[serde(default = "default_baseline_offset")]
    pub baseline_offset: f64,
    /// Width coefficient per named wrap policy. Unknown policies use 1.
    #[serde(default)]
    pub wrap_policies: HashMap<String, f64>,
}

fn default_baseline_offset() -> f64 {
    0.23
}

impl FontMetrics {
    pub fn new(glyph_width: f64, glyph_height: f64) -> Self {
        Self {
            glyph_width,
            glyph_height,
            baseline_offset: default_baseline_offset(),
            wrap_policies: HashMap::new(),
        }
    }

    pub fn with_wrap_policy(mut self, name: &str, coefficient: f64) -> Self {
        self.wrap_policies.insert(name.to_string(), coefficient);
        self
    }

    pub fn wrap_coefficient(&self, policy: &str) -> f64 {
        self.wrap_policies.get(policy).copied().unwrap_or(1.0)
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new(0.63, 1.2)
    }
}

/// Font name to metrics lookup with a fallback entry.
#[derive(Debug, Clone)]
pub struct FontTable {
    fonts: HashMap<String, FontMetrics>,
    fallback: FontMetrics,
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FontTable {
    /// The built-in table. Widths were measured in a browser at 100px.
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        fonts.insert("NK57 Monospace".to_string(), FontMetrics::new(0.69, 1.2));
        fonts.insert("Ubuntu Mono".to_string(), FontMetrics::new(0.50, 1.2));
        fonts.insert("Roboto Mono".to_string(), FontMetrics::new(0.5963, 1.2));
        fonts.insert("Arial".to_string(), FontMetrics::new(0.54, 1.15));
        fonts.insert(
            "Arial Unicode MS".to_string(),
            FontMetrics::default()
                .with_wrap_policy("weak", 0.9)
                .with_wrap_policy("normal", 1.0)
                .with_wrap_policy("aggressive", 1.17)
                .with_wrap_policy("max", 1.85),
        );

        Self {
            fonts,
            fallback: FontMetrics::default(),
        }
    }

    /// Add or replace an entry.
    pub fn register(&mut self, name: &str, metrics: FontMetrics) {
        self.fonts.insert(name.to_string(), metrics);
    }

    /// Merge entries from a JSON object of `{ "<font>": FontMetrics }`.
    pub fn extend_from_json(&mut self, json: &str) -> Result<()> {
        let entries: HashMap<String, FontMetrics> = serde_json::from_str(json)?;
        self.fonts.extend(entries);
        Ok(())
    }

    /// Built-in table plus the entries in `json`.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut table = Self::new();
        table.extend_from_json(json)?;
        Ok(table)
    }

    /// Metrics for `font`, or the fallback entry.
    pub fn metrics(&self, font: &str) -> &FontMetrics {
        match self.fonts.get(font) {
            Some(m) => m,
            None => {
                tracing::trace!(font, "unknown font, using fallback metrics");
                &self.fallback
            }
        }
    }

    /// Glyph advance in px.
    pub fn glyph_width_px(&self, font: &str, font_size: f64) -> f64 {
        self.metrics(font).glyph_width * font_size
    }

    /// Line box height in px.
    pub fn glyph_height_px(&self, font: &str, font_size: f64) -> f64 {
        self.metrics(font).glyph_height * font_size
    }

    pub fn wrap_coefficient(&self, font: &str, policy: &str) -> f64 {
        self.metrics(font).wrap_coefficient(policy)
    }

    pub fn baseline_offset(&self, font: &str) -> f64 {
        self.metrics(font).baseline_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_font_width() {
        let table = FontTable::new();
        assert!((table.glyph_width_px("Ubuntu Mono", 12.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_font_falls_back() {
        let table = FontTable::new();
        assert_eq!(table.metrics("Comic Sans"), &FontMetrics::default());
        assert!((table.glyph_height_px("Comic Sans", 10.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_policies() {
        let table = FontTable::new();
        assert_eq!(table.wrap_coefficient("Arial Unicode MS", "max"), 1.85);
        assert_eq!(table.wrap_coefficient("Arial Unicode MS", "bogus"), 1.0);
        assert_eq!(table.wrap_coefficient("Arial", "max"), 1.0);
    }

    #[test]
    fn test_from_json_adds_entries() {
        let table = FontTable::from_json(
            r#"{ "Fira Mono": { "glyphWidth": 0.6, "glyphHeight": 1.25, "wrapPolicies": { "max": 1.2 } } }"#,
        )
        .unwrap();
        let m = table.metrics("Fira Mono");
        assert_eq!(m.glyph_width, 0.6);
        assert_eq!(m.baseline_offset, 0.23);
        assert_eq!(m.wrap_coefficient("max"), 1.2);
        // built-ins survive
        assert_eq!(table.metrics("Arial").glyph_width, 0.54);
    }
}
