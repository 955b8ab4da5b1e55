//! blockcanvas - inspect, edit and export block documents

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use blockcanvas::{
    Command, Document, Editor, ExportConfig, HtmlExporter, LayerOptions, layer_list_with,
    render_canvas,
};

#[derive(Parser)]
#[command(name = "blockcanvas")]
#[command(version, about = "Block document builder toolkit", long_about = None)]
#[command(after_help = "EXAMPLES:
    blockcanvas new -o block.json                  Create an empty block
    blockcanvas apply block.json edits.json        Apply a command script in place
    blockcanvas export block.json --var name=X1    Export publishable HTML
    blockcanvas layers block.json --selected el-1  Print the layer outline")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Render the editor canvas HTML
    Render {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Element to draw as selected
        #[arg(long)]
        selected: Option<String>,

        /// Print the drawn placements as JSON instead of HTML
        #[arg(long)]
        placements: bool,
    },
    /// Print the layer panel outline as JSON
    Layers {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        #[arg(long)]
        selected: Option<String>,

        /// Include hidden subtrees
        #[arg(long)]
        include_hidden: bool,
    },
    /// Export publishable HTML
    Export {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        #[arg(long)]
        minify: bool,

        /// Leave element styles out of the markup
        #[arg(long)]
        no_inline_styles: bool,

        /// Template variable value (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Apply a JSON array of commands
    Apply {
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        #[arg(value_name = "COMMANDS")]
        commands: PathBuf,

        /// Write the result here instead of overwriting DOCUMENT
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create a document holding only the default block
    New {
        /// Write here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {s:?}")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Cmd) -> blockcanvas::Result<()> {
    match command {
        Cmd::Render {
            document,
            selected,
            placements,
        } => {
            let doc = Document::open(&document)?;
            let output = render_canvas(&doc.tree, selected.as_deref());
            if placements {
                println!("{}", serde_json::to_string_pretty(&output.placements)?);
            } else {
                print!("{}", output.html);
            }
        }
        Cmd::Layers {
            document,
            selected,
            include_hidden,
        } => {
            let doc = Document::open(&document)?;
            let entries = layer_list_with(
                &doc.tree,
                selected.as_deref(),
                LayerOptions { include_hidden },
            );
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Cmd::Export {
            document,
            minify,
            no_inline_styles,
            vars,
        } => {
            let doc = Document::open(&document)?;
            let config = ExportConfig {
                inline_styles: !no_inline_styles,
                minify,
                variables: vars.into_iter().collect(),
            };
            print!("{}", HtmlExporter::with_config(config).export(&doc));
        }
        Cmd::Apply {
            document,
            commands,
            output,
        } => {
            let doc = Document::open(&document)?;
            let script = Command::parse_script(&fs::read_to_string(&commands)?)?;
            let total = script.len();
            let mut editor = Editor::new(doc);
            let changed = editor.apply_all(script)?;
            log::info!("{changed} of {total} command(s) changed the document");
            write_document(&editor.into_document(), Some(output.as_deref().unwrap_or(&document)))?;
        }
        Cmd::New { output } => {
            write_document(&Document::new(), output.as_deref())?;
        }
    }
    Ok(())
}

fn write_document(doc: &Document, path: Option<&Path>) -> blockcanvas::Result<()> {
    match path {
        Some(path) => doc.save(path),
        None => {
            println!("{}", doc.to_json()?);
            Ok(())
        }
    }
}
