// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use customer_hierarchy::{
    normalize, render, to_svg, Category, DisplayNode, RenderConfig, ScenarioStore, Session,
    DEFAULT_SCENARIOS_PATH,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Browse sample customer hierarchies as tree diagrams
#[derive(Parser, Debug)]
#[command(name = "customer-hierarchy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario file (JSON array of { scenarioName, customer })
    #[arg(short, long, global = true, env = "HIERARCHY_SCENARIOS", default_value = DEFAULT_SCENARIOS_PATH)]
    scenarios: PathBuf,

    /// Render config overrides (JSON)
    #[arg(short, long, global = true, env = "HIERARCHY_CONFIG")]
    config: Option<PathBuf>,

    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive terminal viewer (default)
    Tui,

    /// List loaded scenarios
    List,

    /// Print the raw record of a scenario
    Raw { index: usize },

    /// Print the normalized tree of a scenario
    Tree {
        index: usize,

        /// Emit JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },

    /// Write a scenario diagram as SVG
    Render {
        index: usize,

        /// Canvas width in pixels
        #[arg(long, default_value_t = 1200.0)]
        width: f64,

        /// Canvas height in pixels
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal; only log there when explicitly asked
    if !matches!(command, Commands::Tui) || cli.debug > 0 {
        setup_logging(cli.debug);
    }

    let config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    match command {
        Commands::Tui => run_ui_mode(&cli.scenarios, config),
        Commands::List => run_list(&cli.scenarios),
        Commands::Raw { index } => run_raw(&cli.scenarios, index),
        Commands::Tree { index, json } => run_tree(&cli.scenarios, index, json),
        Commands::Render {
            index,
            width,
            height,
            output,
        } => run_render(&cli.scenarios, &config, index, width, height, output.as_deref()),
    }
}

fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> Result<ScenarioStore> {
    ScenarioStore::load(path).with_context(|| format!("Could not load scenarios from {}", path.display()))
}

fn run_list(path: &Path) -> Result<()> {
    let store = load(path)?;

    println!("📂 {} scenario(s) in {}", store.len(), path.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for option in store.options() {
        println!("  [{}] {}", option.value, option.label);
    }

    Ok(())
}

fn run_raw(path: &Path, index: usize) -> Result<()> {
    let store = load(path)?;
    let scenario = store
        .get(index)
        .with_context(|| format!("No scenario at index {} ({} loaded)", index, store.len()))?;

    println!("{}", scenario.to_pretty_json());
    Ok(())
}

fn run_tree(path: &Path, index: usize, as_json: bool) -> Result<()> {
    let store = load(path)?;
    let scenario = store
        .get(index)
        .with_context(|| format!("No scenario at index {} ({} loaded)", index, store.len()))?;

    let root = normalize(&scenario.customer, Category::Global);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&root)?);
    } else {
        println!("🌳 {}", scenario.scenario_name);
        print_outline(&root, 0);
        println!("\n✓ {} nodes, depth {}", root.count(), root.depth());
    }

    Ok(())
}

fn print_outline(node: &DisplayNode<'_>, indent: usize) {
    println!("{}{} [{}]", "  ".repeat(indent), node.name, node.category);
    for child in &node.children {
        print_outline(child, indent + 1);
    }
}

fn run_render(
    path: &Path,
    config: &RenderConfig,
    index: usize,
    width: f64,
    height: f64,
    output: Option<&Path>,
) -> Result<()> {
    let store = load(path)?;
    let scenario = store
        .get(index)
        .with_context(|| format!("No scenario at index {} ({} loaded)", index, store.len()))?;

    let diagram = render(scenario, config, width)?;
    let svg = to_svg(&diagram, &diagram.initial_view, width, height, config)?;

    match output {
        Some(out) => {
            std::fs::write(out, &svg).with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "✓ Rendered '{}' ({} nodes) to {}",
                diagram.scenario_name,
                diagram.node_count,
                out.display()
            );
        }
        None => println!("{}", svg),
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(path: &Path, config: RenderConfig) -> Result<()> {
    println!("🖥️  Loading Customer Hierarchy Viewer...\n");

    // A failed load is not fatal: the selector just stays empty
    let (store, load_error) = match ScenarioStore::load(path) {
        Ok(store) => (store, None),
        Err(e) => {
            tracing::error!(error = %e, "could not load scenarios");
            (ScenarioStore::default(), Some(e.to_string()))
        }
    };

    println!("✓ Loaded {} scenario(s)\n", store.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let session = Session::new(store, config, ui::startup_canvas_width());
    let mut app = ui::App::new(session, load_error);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_path: &Path, _config: RenderConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin hierarchy-server --features server");
    std::process::exit(1);
}
