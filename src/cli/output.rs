//! Handles all user-facing output for the CLI.
//!
//! Colorized summaries go through `termcolor`; errors are rendered by
//! `miette` in [`super::run`].

use std::io::Write;
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::{SymbolLayer, SymbolSet};

// ============================================================================
// BUILD SUMMARY
// ============================================================================

/// Prints one line per compiled set followed by the files written.
pub fn print_build_summary(sets: &[SymbolSet], written: &[PathBuf]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    for set in sets {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = write!(stdout, "{:>4}", set.id);
        let _ = stdout.reset();
        let _ = writeln!(
            stdout,
            "  {:<40} {:>4} entities {:>4} m1 {:>4} m2",
            set.name,
            set.icons.len(),
            set.m1.len(),
            set.m2.len()
        );
    }

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "Compiled {} symbol sets", sets.len());
    let _ = stdout.reset();
    for path in written {
        let _ = writeln!(stdout, "  wrote {}", path.display());
    }
}

// ============================================================================
// AST OUTPUT
// ============================================================================

/// Prints each layer of a set as SVG-like markup.
pub fn print_set_markup(set: &SymbolSet) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for (category, layers) in set.categories() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = writeln!(stdout, "--- {} {} ---", set.id, category);
        let _ = stdout.reset();
        for layer in layers.values() {
            let _ = writeln!(stdout, "{}", layer_markup(layer));
        }
    }
}

fn layer_markup(layer: &SymbolLayer) -> String {
    let body = layer
        .elements
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{} ({}){}: {}",
        layer.uid,
        layer.primary_name(),
        if layer.civilian { " [civ]" } else { "" },
        body
    )
}
