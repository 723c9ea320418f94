//! Load a scene file, run one layout pass and print the resulting geometry.

use std::{
    fs,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use boxlayout::{NodeSnapshot, Scene, SceneSpec, TextDirection, dump, geom::Size};
use clap::{ArgAction, Parser, ValueEnum};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Output styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented node blocks.
    Tree,
    /// One table row per node.
    Table,
    /// Snapshot rows as JSON.
    Json,
}

/// Command line arguments.
#[derive(Parser)]
#[command(about = "Lay out a JSON or TOML scene and print node geometry")]
struct Args {
    /// Scene file. `.toml` files are read as TOML, anything else as JSON.
    path: PathBuf,

    /// Output style
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Override the viewport width
    #[arg(long)]
    width: Option<f32>,

    /// Override the viewport height
    #[arg(long)]
    height: Option<f32>,

    /// Lay out right to left
    #[arg(long)]
    rtl: bool,

    /// Force colored tree output even when stdout is not a terminal
    #[arg(long)]
    color: bool,

    /// Log pass details to stderr; repeat for trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Parse the scene file by extension.
fn load(path: &Path) -> Result<SceneSpec> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let spec = if path.extension().is_some_and(|e| e == "toml") {
        SceneSpec::from_toml(&text)
    } else {
        SceneSpec::from_json(&text)
    };
    spec.with_context(|| format!("parsing {}", path.display()))
}

/// Render snapshot rows as a table.
fn table(rows: &[NodeSnapshot]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["node", "x", "y", "w", "h", "abs x", "abs y", "baseline"]);
    for row in rows {
        let name = format!("{}{}", "  ".repeat(row.depth), row.tag);
        let name = if row.active {
            Cell::new(name).fg(Color::Green)
        } else {
            Cell::new(name).fg(Color::DarkGrey)
        };
        let f = row.frame;
        table.add_row(vec![
            name,
            Cell::new(f.offset.x),
            Cell::new(f.offset.y),
            Cell::new(f.size.width),
            Cell::new(f.size.height),
            Cell::new(row.absolute.offset.x),
            Cell::new(row.absolute.offset.y),
            Cell::new(row.baseline.map(|b| b.to_string()).unwrap_or_default()),
        ]);
    }
    table
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut spec = load(&args.path)?;
    let viewport = spec.context.viewport;
    spec.context.viewport = Size::new(
        args.width.unwrap_or(viewport.width),
        args.height.unwrap_or(viewport.height),
    );
    if args.rtl {
        spec.context.text_direction = TextDirection::Rtl;
    }

    let mut scene = Scene::new(&spec)?;
    scene.run()?;
    info!(nodes = scene.tree().len(), "layout complete");

    match args.format {
        Format::Tree => {
            let color = args.color || io::stdout().is_terminal();
            print!("{}", dump(scene.tree(), scene.root(), color)?);
        }
        Format::Table => println!("{}", table(&scene.snapshot())),
        Format::Json => println!("{}", serde_json::to_string_pretty(&scene.snapshot())?),
    }
    Ok(())
}
