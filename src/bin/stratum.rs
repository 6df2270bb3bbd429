use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stratum::common::config::{Config, DEFAULT_CONFIG, config_file};
use stratum::common::log;
use stratum::host::HostWindow;
use stratum::model::MemoryStore;
use stratum::sim::{Script, Sim, Step};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "stratum")]
#[command(about = "Tiling layout engine, driven by scripted host sessions")]
struct Cli {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a RON script against a simulated host and print the arrangements
    Replay {
        script: PathBuf,
        /// Also draw the current layout tree on every print
        #[arg(long)]
        tree: bool,
    },
    /// Parse and validate a config file
    CheckConfig { path: PathBuf },
    /// Print the default config
    DefaultConfig,
}

fn main() -> ExitCode {
    log::init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Replay { script, tree } => {
            load_config(cli.config.as_deref()).and_then(|config| replay(config, &script, tree))
        }
        Commands::CheckConfig { path } => check_config(&path),
        Commands::DefaultConfig => {
            print!("{DEFAULT_CONFIG}");
            Ok(())
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = path.map(Path::to_path_buf).or_else(|| config_file().filter(|p| p.exists()));
    let mut config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Config::read(&path).with_context(|| format!("reading {}", path.display()))?
        }
        None => Config::default(),
    };
    for issue in config.validate() {
        warn!(issue, "config issue");
    }
    let fixed = config.auto_fix_values();
    if fixed > 0 {
        warn!(fixed, "adjusted invalid config values");
    }
    Ok(config)
}

fn check_config(path: &Path) -> anyhow::Result<()> {
    let config = Config::read(path).with_context(|| format!("reading {}", path.display()))?;
    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: ok", path.display());
        return Ok(());
    }
    for issue in &issues {
        println!("{}: {issue}", path.display());
    }
    anyhow::bail!("{} issue(s) found", issues.len())
}

fn replay(config: Config, path: &Path, tree: bool) -> anyhow::Result<()> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let script: Script =
        ron::from_str(&source).with_context(|| format!("parsing {}", path.display()))?;

    let sim = Sim::with_screens(config, MemoryStore::new(), script.screens);
    sim.controller.register_shortcuts(&mut Shortcuts);
    for (n, step) in script.steps.iter().enumerate() {
        sim.run(step);
        if matches!(step, Step::Print) {
            print_arrangement(&sim, n, tree);
        }
    }
    println!("dropped re-entrant events: {}", sim.controller.dropped_events());
    sim.controller.shutdown();
    Ok(())
}

fn print_arrangement(sim: &Sim, step: usize, tree: bool) {
    println!("-- step {step}");
    for id in sim.order() {
        let geometry = sim.host.window(id).map(|w| w.geometry()).unwrap_or_default();
        println!("{id:>6} {:<10?} {geometry:?}", sim.state(id.get()));
    }
    if tree {
        if let Some(tree) = sim.controller.draw_tree() {
            print!("{tree}");
        }
    }
}

/// Shortcuts in a replay are triggered by name from the script.
struct Shortcuts;

impl stratum::host::ShortcutRegistry for Shortcuts {
    fn register(&mut self, _name: &str, _action: stratum::layout_engine::Action) {}
}
