use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use modgraph::config::ToolConfig;
use modgraph::export::{self, ExportData, ExportFormat};
use modgraph::logging::init_logging;
use modgraph::registry::ModuleRegistry;

#[derive(Parser)]
#[command(name = "modgraph")]
#[command(version)]
#[command(about = "Dependency resolver and load planner for extension modules", long_about = None)]
struct Cli {
    /// Path to a JSON config file (defaults to ./modgraph.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Modules directory to scan
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the load order for the given modules
    Order {
        /// Module ids (defaults to every enabled module)
        modules: Vec<String>,

        /// Include disabled modules
        #[arg(short, long)]
        all: bool,
    },
    /// Check that every dependency is present and version-compatible
    Validate {
        /// Module ids (defaults to every enabled module)
        modules: Vec<String>,
    },
    /// Print the dependency graph as JSON
    Graph,
    /// List circular dependencies
    Cycles,
    /// Write a load plan report
    Report {
        /// Output format: json, csv, markdown
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ToolConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.dir {
        config.modules_dir = dir;
    }
    init_logging(cli.log_level.as_deref().or(config.log_level.as_deref()));

    let (registry, discovery) = ModuleRegistry::scan(&config.modules_dir, &config.manifest_name)
        .with_context(|| format!("Failed to scan {}", config.modules_dir.display()))?;
    debug!(
        "Discovered {} modules ({} manifests skipped)",
        registry.len(),
        discovery.failures.len()
    );

    let targets = |requested: Vec<String>, all: bool| {
        if !requested.is_empty() {
            requested
        } else if all {
            registry.ids()
        } else {
            registry.enabled_ids()
        }
    };

    match cli.command {
        Commands::Order { modules, all } => {
            let order = registry
                .load_order(targets(modules, all))
                .context("Failed to resolve load order")?;
            for (i, id) in order.iter().enumerate() {
                println!("{:>3}. {}", i + 1, id);
            }
        }
        Commands::Validate { modules } => {
            let report = registry.validate(targets(modules, false));
            for error in &report.errors {
                println!("error: {}", error);
            }
            for warning in &report.warnings {
                println!("warning: {}", warning);
            }
            if !report.valid {
                bail!("{} validation errors", report.errors.len());
            }
            if config.strict && !report.warnings.is_empty() {
                bail!("{} validation warnings (strict mode)", report.warnings.len());
            }
            println!("All dependencies satisfied");
        }
        Commands::Graph => {
            let json = serde_json::to_string_pretty(&registry.graph().export_graph())
                .context("Failed to serialize graph")?;
            println!("{}", json);
        }
        Commands::Cycles => {
            let cycles = registry.graph().cycles();
            if cycles.is_empty() {
                println!("No circular dependencies");
            } else {
                for cycle in &cycles {
                    println!("{}", cycle.cycle_path());
                }
                bail!("{} circular dependencies found", cycles.len());
            }
        }
        Commands::Report { format, output } => {
            let source = config.modules_dir.display().to_string();
            let data = ExportData::collect(source, &registry, &targets(Vec::new(), false), &config);
            let rendered =
                export::export_to_string(format, &data).context("Failed to render report")?;
            match output {
                Some(path) => fs::write(&path, rendered)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", rendered),
            }
        }
    }

    Ok(())
}
