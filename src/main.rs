//! ferrite-train CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use ferrite_train::{session, Config, RunStatus};

#[derive(Parser)]
#[command(name = "ferrite-train")]
#[command(about = "Train a classifier and report its learning curves", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run a training session
    Train {
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Stop after this many seconds and keep the completed epochs
        #[arg(long)]
        time_limit: Option<u64>,
    },
    /// Print the effective config
    ShowConfig,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let code = match cli.command {
        Commands::Init { force } => init(&cli.config, force),
        Commands::Train { epochs, time_limit } => train(&cli.config, epochs, time_limit),
        Commands::ShowConfig => show_config(&cli.config),
    };
    std::process::exit(code);
}

/// Loads `path` if it exists, otherwise falls back to the defaults.
fn load_config(path: &Path) -> Option<Config> {
    if !path.exists() {
        log::info!("{} not found, using default config", path.display());
        return Some(Config::default());
    }
    match Config::load(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

fn init(path: &Path, force: bool) -> i32 {
    if path.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return 1;
    }
    match Config::default().save(path) {
        Ok(()) => {
            println!("Wrote default config to {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Error writing config: {}", e);
            1
        }
    }
}

fn train(path: &Path, epochs: Option<usize>, time_limit: Option<u64>) -> i32 {
    let Some(mut config) = load_config(path) else {
        return 1;
    };
    if let Some(epochs) = epochs {
        config.training.epochs = epochs;
        if let Err(e) = config.validate() {
            eprintln!("Error: {}", e);
            return 1;
        }
    }

    let stop_flag = time_limit.map(|secs| session::stop_after(Duration::from_secs(secs)));
    match session::run(&config, stop_flag) {
        Ok(outcome) => exit_code(outcome.status),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Completed => 0,
        RunStatus::PartialRun { .. } => 2,
    }
}

fn show_config(path: &Path) -> i32 {
    let Some(config) = load_config(path) else {
        return 1;
    };
    match config.to_toml() {
        Ok(text) => {
            print!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(RunStatus::Completed), 0);
        assert_eq!(exit_code(RunStatus::PartialRun { completed_epochs: 3 }), 2);
    }

    #[test]
    fn test_train_accepts_time_limit() {
        let cli = Cli::parse_from(["ferrite-train", "train", "--epochs", "3", "--time-limit", "60"]);
        assert!(matches!(
            cli.command,
            Commands::Train { epochs: Some(3), time_limit: Some(60) }
        ));
    }
}
