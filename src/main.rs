use clap::{ArgAction, Parser, Subcommand};
use nft_manager::config::{self, DEFAULT_CONFIG_FILE, PipelineConfig};
use nft_manager::manager::Manager;
use nft_manager::operation::OperationKind;
use nft_manager::output;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nft-manager")]
#[command(about = "Batch editor for NFT collections")]
#[command(long_about = "\
Batch editor for NFT collections

Each record is an image plus a JSON metadata file. A pipeline of steps
(renumber, shuffle, obfuscate, format-metadata, update-metadata) runs over
the whole collection, each step reading the previous step's output.

Project structure:

  <project_root>/
  ├── nft-manager.toml          # Pipeline config
  ├── input/
  │   ├── images/0.png …        # <tokenId>.<ext>, exactly one dot
  │   └── metadata/0.json …     # paired with images by sorted position
  └── output/                   # recreated on every run
      ├── images/<tokenId>.png
      └── metadata/<tokenId>

Run 'nft-manager gen-config' to generate a documented nft-manager.toml.")]
#[command(version)]
struct Cli {
    /// Pipeline config file
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every configured step in order
    Run,
    /// Validate the config and every step's options without touching files
    Check,
    /// List the operations and the options they accept
    Operations,
    /// Print a stock nft-manager.toml with all options documented
    GenConfig,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    TermLogger::init(
        log_level(cli.verbose),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    match cli.command {
        Command::Run => {
            let pipeline = config::load_config(&cli.config)?;
            run_pipeline(&pipeline)?;
        }
        Command::Check => {
            let pipeline = config::load_config(&cli.config)?;
            output::print_steps(&pipeline.steps);
            pipeline.check_steps()?;
            println!("Config OK");
        }
        Command::Operations => {
            output::print_operation_catalog(&OperationKind::ALL);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build the manager and run each step; a failed step is reported and the next one runs.
///
/// An empty pipeline returns before the manager is built, so `output/` is left alone.
fn run_pipeline(pipeline: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    if pipeline.steps.is_empty() {
        log::warn!("no steps configured, nothing to do");
        return Ok(());
    }

    let mut manager = Manager::new(pipeline.project())?;
    if let Some(hook) = pipeline.preprocessor() {
        manager = manager.with_metadata_preprocessor(hook);
    }
    log::info!("project root: {}", manager.project_root().display());

    let succeeded = manager.run_steps(&pipeline.steps);
    output::print_run_total(succeeded, pipeline.steps.len());
    Ok(())
}
