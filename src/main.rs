//! Fetch-Decode-Execute Walkthrough - CLI Entry Point
//!
//! Commands:
//! - `fde-walkthrough play` - Interactive terminal walkthrough (default)
//! - `fde-walkthrough trace` - Print the script step by step
//! - `fde-walkthrough export <file>` - Write the built-in script as JSON
//! - `fde-walkthrough check <file>` - Validate a script file

use clap::{Parser, Subcommand};
use fde::logging::{self, LogTarget};
use fde::{PlaybackController, ScriptStore};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fde-walkthrough")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An animated walkthrough of the fetch-decode-execute cycle")]
struct Cli {
    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Step through the walkthrough interactively
    Play {
        /// JSON script to play instead of the built-in one
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Start in autoplay mode
        #[arg(short, long)]
        autoplay: bool,
    },
    /// Print each step of the script
    Trace {
        /// JSON script to trace instead of the built-in one
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Stop after this step (default: the last step)
        #[arg(short, long)]
        to: Option<usize>,
    },
    /// Write the built-in script as JSON
    Export {
        /// Output file
        output: PathBuf,
    },
    /// Validate a JSON script
    Check {
        /// Path to the script file
        script: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Play { .. }));
    let target = match (&cli.log_file, interactive) {
        (Some(path), _) => LogTarget::File(path.as_path()),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(&cli.log_level, target) {
        eprintln!("❌ Failed to open log file: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Some(Commands::Play { script, config, autoplay }) => {
            play(script.as_deref(), config.as_deref(), autoplay);
        }
        Some(Commands::Trace { script, to }) => {
            trace(script.as_deref(), to);
        }
        Some(Commands::Export { output }) => {
            export(&output);
        }
        Some(Commands::Check { script }) => {
            check(&script);
        }
        None => {
            play(None, None, false);
        }
    }
}

fn load_or_builtin(path: Option<&Path>) -> ScriptStore {
    let result = match path {
        Some(path) => fde::load_script(path).map_err(|e| e.to_string()),
        None => ScriptStore::builtin().map_err(|e| e.to_string()),
    };

    match result {
        Ok(script) => script,
        Err(e) => {
            eprintln!("❌ Failed to load script: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn play(script: Option<&Path>, config: Option<&Path>, autoplay: bool) {
    let script = load_or_builtin(script);

    let mut config = match config {
        Some(path) => match fde::Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => fde::Config::default(),
    };
    config.autoplay |= autoplay;

    if let Err(e) = fde::run_walkthrough(script, config) {
        eprintln!("❌ Terminal error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn play(_script: Option<&Path>, _config: Option<&Path>, _autoplay: bool) {
    eprintln!("❌ Built without the `tui` feature; use `trace` instead.");
    std::process::exit(1);
}

fn trace(script: Option<&Path>, to: Option<usize>) {
    let script = load_or_builtin(script);
    let last = script.len() - 1;
    let stop = to.unwrap_or(last);

    if stop > last {
        eprintln!("❌ Step {} out of range (script has {} steps)", stop, script.len());
        std::process::exit(1);
    }

    let mut controller = PlaybackController::new(script);

    loop {
        print_step(&controller);
        if controller.position() >= stop || !controller.advance().moved() {
            break;
        }
    }

    println!();
    println!("━━━ Memory ━━━");
    for cell in controller.memory_snapshot() {
        if !cell.content.is_empty() {
            println!("{:02}: {}", cell.address, cell.content);
        }
    }
}

fn print_step(controller: &PlaybackController) {
    let step = controller.current_step();
    let regs = &step.registers;

    println!("━━━ {:02} {:<7} {} ━━━", step.index, step.phase.as_str(), step.title);
    println!("  {}", step.narration);
    println!(
        "  PC={}  IR={}  ACC={}",
        regs.pc.map_or_else(|| "-".into(), |v| v.to_string()),
        regs.ir.as_deref().filter(|s| !s.is_empty()).unwrap_or("-"),
        regs.acc.map_or_else(|| "-".into(), |v| v.to_string()),
    );

    let active: Vec<_> = controller.active_set().iter().map(|c| c.id()).collect();
    println!("  active: {}", active.join(", "));

    if let Some(transfer) = &step.bus_transfer {
        println!("  bus: {}", transfer);
    }
    if let Some(op) = &step.alu_operation {
        println!("  alu: {}", op);
    }
    for update in &step.memory_updates {
        println!("  write: [{}] := {}", update.address, update.value);
    }
}

fn export(output: &Path) {
    let script = load_or_builtin(None);

    if let Err(e) = fde::save_script(output, &script) {
        eprintln!("❌ Failed to save script: {}", e);
        std::process::exit(1);
    }

    println!("✓ Wrote {} steps to {}", script.len(), output.display());
}

fn check(path: &Path) {
    println!("🔍 Checking: {}", path.display());

    match fde::load_script(path) {
        Ok(script) => {
            println!(
                "✓ Valid script: {} steps, {} memory cells",
                script.len(),
                script.seed().len()
            );
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
