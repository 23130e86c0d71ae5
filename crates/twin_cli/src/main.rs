//! Command-line probe for `twin_core`.
//!
//! # Responsibility
//! - Verify core wiring and remote API reachability.
//! - Print a twin's layer tree and its normalization plan.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::process::ExitCode;
use std::time::Duration;
use twin_core::config::{BASE_URL_ENV, TIMEOUT_SECS_ENV};
use twin_core::tree::layer_tree::{GroupNode, LayerEntry};
use twin_core::{get_drop_zone, ApiConfig, Bounds, DigitalTwinId, HttpTwinApi, TwinEditor};

#[derive(Debug, Parser)]
#[command(name = "twin", about = "Digital twin association editor probe", version)]
struct Cli {
    /// Base URL of the digital twin API.
    #[arg(long, env = BASE_URL_ENV, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = TIMEOUT_SECS_ENV, default_value_t = 30, global = true)]
    timeout: u64,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level used with `--log-dir`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print core health and version.
    Ping,

    /// Print the layer/group tree of one twin.
    Tree { twin_id: DigitalTwinId },

    /// Print the operations a save would submit right after loading.
    Pending { twin_id: DigitalTwinId },

    /// Classify a pointer position into a drop zone.
    Zone {
        #[arg(allow_hyphen_values = true)]
        pointer_y: f64,
        #[arg(allow_hyphen_values = true)]
        top: f64,
        height: f64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| twin_core::default_log_level());
        twin_core::init_logging(level, log_dir)?;
    }

    match cli.command {
        Commands::Ping => {
            println!("twin_core ping={}", twin_core::ping());
            println!("twin_core version={}", twin_core::core_version());
        }
        Commands::Tree { twin_id } => {
            let editor = TwinEditor::load(connect(&cli.base_url, cli.timeout)?, twin_id)?;
            print_tree(editor.draft().layers().ungrouped(), editor.draft().layers().groups());
            for tool in editor.draft().tools().entries() {
                println!("tool {} sort_order={}", tool.key, tool.sort_order);
            }
        }
        Commands::Pending { twin_id } => {
            let editor = TwinEditor::load(connect(&cli.base_url, cli.timeout)?, twin_id)?;
            println!("{}", serde_json::to_string_pretty(&editor.pending())?);
        }
        Commands::Zone {
            pointer_y,
            top,
            height,
        } => {
            println!("{}", get_drop_zone(pointer_y, &Bounds::new(top, height)));
        }
    }
    Ok(())
}

fn connect(base_url: &Option<String>, timeout: u64) -> Result<HttpTwinApi, Box<dyn Error>> {
    let base_url = base_url
        .clone()
        .ok_or_else(|| format!("--base-url or {BASE_URL_ENV} is required"))?;
    let config = ApiConfig::with_timeout(base_url, Duration::from_secs(timeout))?;
    Ok(HttpTwinApi::new(config)?)
}

fn print_tree(ungrouped: &[LayerEntry], groups: &[GroupNode]) {
    for layer in ungrouped {
        print_layer(layer, 0);
    }
    let mut stack: Vec<&GroupNode> = groups.iter().rev().collect();
    while let Some(node) = stack.pop() {
        let indent = "  ".repeat(node.depth);
        println!(
            "{indent}group {} \"{}\" sort_order={} layers={}",
            node.group.id,
            node.group.title,
            node.group.sort_order,
            node.total_layers()
        );
        for layer in &node.layers {
            print_layer(layer, node.depth + 1);
        }
        stack.extend(node.subgroups.iter().rev());
    }
}

fn print_layer(layer: &LayerEntry, depth: usize) {
    let marker = if layer.is_default { " default" } else { "" };
    println!(
        "{}layer {} \"{}\" sort_order={}{marker}",
        "  ".repeat(depth),
        layer.layer_id,
        layer.title,
        layer.sort_order
    );
}
