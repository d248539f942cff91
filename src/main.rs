//! # Trellis CLI
//!
//! Usage:
//!   trellis input.json -o output.svg
//!   echo '{ ... }' | trellis -o output.svg
//!   trellis --example > table.json
//!   trellis input.json --debug
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_table_json());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("✗ {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))?
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.svg".to_string());

    let mut document = trellis::Document::from_json(&input).map_err(|e| e.to_string())?;
    if args.iter().any(|a| a == "--debug") {
        document.debug = true;
    }
    let table = document.build().map_err(|e| e.to_string())?;
    let svg = trellis::render_with(&table, &document.render_options()).map_err(|e| e.to_string())?;

    fs::write(&output_path, &svg).map_err(|e| format!("Failed to write {}: {}", output_path, e))?;
    eprintln!("✓ Written {} bytes to {}", svg.len(), output_path);
    Ok(())
}

fn example_table_json() -> &'static str {
    r##"{
  "table": {
    "params": {
      "columns": 3,
      "col_widths": [240, 80, 100],
      "font": "Arial",
      "font_size": 11,
      "text_padding": { "left": 4, "right": 4, "top": 2, "bottom": 2 }
    },
    "rows": [
      {
        "type": "row",
        "params": { "font_style": ["bold"], "borders": ["bottom"], "font_size": 13 },
        "cells": [
          { "content": { "type": "text_box", "text": "INVOICE #INV-2026-001" } },
          { "content": { "type": "text_box", "text": "" } },
          {
            "params": { "x_reposition": "right" },
            "content": { "type": "circle", "center": [8, 8], "radius": 8, "params": { "fill": "#2b6cb0", "stroke": "none" } }
          }
        ]
      },
      { "type": "blank", "params": { "height": 12 } },
      {
        "type": "row",
        "params": { "font_style": ["bold"], "font_color": "#4a5568" },
        "cells": [
          { "content": { "type": "text_box", "text": "Description" } },
          { "content": { "type": "text_box", "text": "Qty", "params": { "text_align": "right" } } },
          { "content": { "type": "text_box", "text": "Amount", "params": { "text_align": "right" } } }
        ]
      },
      {
        "type": "row",
        "params": { "borders": ["top"] },
        "cells": [
          { "content": { "type": "text_box", "text": "Website redesign, including responsive layouts for every page of the marketing site" } },
          { "content": { "type": "text_box", "text": "1", "params": { "text_align": "right" } } },
          { "content": { "type": "text_box", "text": "$8,500.00", "params": { "text_align": "right" } } }
        ]
      },
      {
        "type": "row",
        "params": { "borders": ["top"] },
        "cells": [
          { "content": { "type": "text_box", "text": "Hosting (12 months)" } },
          { "content": { "type": "text_box", "text": "12", "params": { "text_align": "right" } } },
          { "content": { "type": "text_box", "text": "$3,500.00", "params": { "text_align": "right" } } }
        ]
      },
      {
        "type": "row",
        "params": { "borders": ["top"], "height": 24 },
        "cells": [
          { "content": { "type": "line", "points": [0, 12, 200, 12], "params": { "dotspace": 3, "stroke": "#a0aec0" } } },
          { "content": { "type": "text_box", "text": "Total", "params": { "font_style": ["bold"] } } },
          { "content": { "type": "text_box", "text": "$12,000.00", "params": { "text_align": "right", "font_style": ["bold"] } } }
        ]
      }
    ]
  }
}
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_table_renders() {
        let svg = trellis::render_json(example_table_json()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Hosting (12 months)"));
    }
}
