//! The milsymbol-schema command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::process;

use clap::Parser;
use miette::Report;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::args::{AstFormat, Command, SchemaArgs};
use crate::compiler::{compile_symbol_set, compile_symbol_sets};
use crate::discovery::discover_set_files;
use crate::emit::{emit_artifacts, write_artifacts, OutputStyle};
use crate::taxonomy::load_constants;
use crate::SchemaError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_logging();
    let args = SchemaArgs::parse();

    let result = match args.command {
        Command::Build {
            constants,
            sets,
            out_dir,
            text_paths,
            godot,
            no_enumerator,
        } => {
            let style = OutputStyle {
                use_text_paths: text_paths,
                include_enumerator: !no_enumerator,
            };
            handle_build(&constants, &sets, &out_dir, &style, godot.as_deref())
        }
        Command::Constants { file } => handle_constants(&file),
        Command::Ast {
            constants,
            file,
            format,
        } => handle_ast(&constants, &file, format),
    };

    if let Err(e) = result {
        eprintln!("{:?}", Report::new(e));
        process::exit(1);
    }
}

/// `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("milsymbol_schema=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Handles the `build` subcommand.
fn handle_build(
    constants_path: &Path,
    sets_dir: &Path,
    out_dir: &Path,
    style: &OutputStyle,
    godot: Option<&Path>,
) -> Result<(), SchemaError> {
    let constants = load_constants(constants_path)?;
    let files = discover_set_files(sets_dir, &[constants_path.to_path_buf()])?;
    let sets = compile_symbol_sets(&files, &constants)?;

    // No font engine ships with the crate; text paths need one from a caller.
    let artifacts = emit_artifacts(&sets, &constants, style, None, godot.is_some())?;
    let written = write_artifacts(&artifacts, out_dir, godot)?;
    output::print_build_summary(&sets, &written);
    Ok(())
}

/// Handles the `constants` subcommand.
fn handle_constants(path: &Path) -> Result<(), SchemaError> {
    let constants = load_constants(path)?;
    println!("{}", constants);
    Ok(())
}

/// Handles the `ast` subcommand.
fn handle_ast(constants_path: &Path, file: &Path, format: AstFormat) -> Result<(), SchemaError> {
    let constants = load_constants(constants_path)?;
    let set = compile_symbol_set(file, &constants)?;
    match format {
        AstFormat::Json => {
            let json = serde_json::to_string_pretty(&set).map_err(|e| SchemaError::Serialize {
                what: format!("set {}", set.id),
                message: e.to_string(),
            })?;
            println!("{}", json);
        }
        AstFormat::Svg => output::print_set_markup(&set),
    }
    Ok(())
}
