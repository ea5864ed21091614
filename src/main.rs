use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Result, WrapErr};
use std::io::{self, Write};
use std::path::PathBuf;
use tasklist::render::{self, Renderer};
use tasklist::{Change, Config, Filter, TaskListStore, intent};
use tracing::warn;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "TaskList CLI - dispatch to-do intents into an in-memory list and print it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to a YAML config file (default: $TASKLIST_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch intents from a JSON-lines script (stdin when omitted) and print the list
    Run {
        /// Script file, one intent per line
        script: Option<PathBuf>,

        /// Print the list after every change, not just at the end
        #[arg(long)]
        each: bool,

        /// Only print tasks matching field<op>value (repeatable), e.g. completed=false
        #[arg(long = "filter", value_name = "EXPR")]
        filters: Vec<String>,
    },

    /// Print the effective configuration as YAML
    Config,
}

fn main() -> Result<()> {
    // Setup tracing; stdout is reserved for the rendered list
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_color {
        config.color = false;
    }
    colored::control::set_override(config.color);

    match cli.command {
        Commands::Run { script, each, filters } => run(&config, cli.format, script, each, &filters)?,
        Commands::Config => write!(io::stdout().lock(), "{}", config.to_yaml()?)?,
    }

    Ok(())
}

fn run(config: &Config, format: Format, script: Option<PathBuf>, each: bool, filters: &[String]) -> Result<()> {
    let filters = filters
        .iter()
        .map(|f| Filter::parse(f))
        .collect::<Result<Vec<_>>>()?;

    let intents = match &script {
        Some(path) => intent::read_script_file(path)?,
        None => intent::read_script(io::stdin().lock())?,
    };

    let mut store = TaskListStore::with_defaults(config.task_defaults());
    let renderer = Renderer::new(config);

    if each && format == Format::Text {
        let renderer = renderer.clone();
        store.subscribe(move |change, store| {
            let rows = render::rows(store, Utc::now());
            let mut out = io::stdout().lock();
            // Write errors are surfaced by the final listing
            let _ = writeln!(out, "-- {}", describe(change));
            let _ = write!(out, "{}", renderer.text(&rows));
        });
    }

    for (n, intent) in intents.into_iter().enumerate() {
        if let Err(e) = store.dispatch(intent).wrap_err_with(|| format!("Intent {} rejected", n + 1)) {
            warn!("Skipping intent: {:#}", e);
        }
    }

    let now = Utc::now();
    let selected = store.list(&filters)?;
    let rows = render::rows_for(&store, selected, now);
    let mut out = io::stdout().lock();
    match format {
        Format::Text => renderer.write_text(&mut out, &rows)?,
        Format::Json => render::write_json(&mut out, &rows)?,
    }

    Ok(())
}

fn describe(change: &Change) -> String {
    match change {
        Change::Added(id) => format!("added {}", id),
        Change::Updated(id) => format!("updated {}", id),
        Change::Deleted(id) => format!("deleted {}", id),
        Change::ViewToggled(id) => format!("view toggled {}", id),
    }
}
