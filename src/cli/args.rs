//! Command-line arguments and subcommands.
//!
//! Uses `clap` derive for a declarative argument structure.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "milsymbol-schema",
    version,
    about = "Compiles a military-symbology taxonomy and icon sets into draw-command schemas."
)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile every set file and write the generated headers.
    Build {
        /// The taxonomy document.
        #[arg(short, long, default_value = "constant.json")]
        constants: PathBuf,
        /// Directory searched recursively for set files.
        #[arg(short, long, default_value = ".")]
        sets: PathBuf,
        /// Directory receiving Constants.hpp and Schema.hpp.
        #[arg(short, long, default_value = "include")]
        out_dir: PathBuf,
        /// Render text elements as paths (library-only: needs a font engine
        /// supplied by the caller, so the CLI reports an error).
        #[arg(short = 'p', long)]
        text_paths: bool,
        /// Also write the Godot companion constants to this path.
        #[arg(short, long)]
        godot: Option<PathBuf>,
        /// Omit the `get_available_symbols` enumerator.
        #[arg(long)]
        no_enumerator: bool,
    },
    /// Load the taxonomy and print every category.
    Constants {
        /// The taxonomy document.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Compile one set file and print its AST.
    Ast {
        /// The taxonomy document.
        #[arg(short, long, default_value = "constant.json")]
        constants: PathBuf,
        /// The set file to compile.
        #[arg(required = true)]
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = AstFormat::Json)]
        format: AstFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AstFormat {
    /// Pretty-printed JSON
    Json,
    /// SVG-like markup, one line per layer
    Svg,
}
