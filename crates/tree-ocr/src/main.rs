//! tree-ocr: batch OCR over a directory tree of images.

mod cli;
mod logging;
mod output;
mod progress;

use clap::Parser;
use tracing::{debug, error, warn};

use cli::Cli;
use output::Output;
use progress::ProgressReporter;
use tree_ocr_core::{run_batch_with_progress, ConfigError, Recognizer};
use tree_ocr_types::BatchReport;

fn main() {
    // Load the env file before clap reads `env` defaults
    let env_file = cli::env_file_arg(std::env::args_os());
    let env_loaded = match &env_file {
        Some(path) => dotenvy::from_path(path).map(|_| path.clone()),
        None => dotenvy::dotenv(),
    };

    let cli = Cli::parse();
    logging::init(&cli.log_file);

    match env_loaded {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) if env_file.is_some() => {
            error!("Failed to load env file {:?}: {}", env_file, e);
            std::process::exit(1);
        }
        Err(_) => debug!("No .env file loaded"),
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = Output::new(cli.json);

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(ConfigError::MissingInputDir) => {
            warn!("{}, nothing to do", ConfigError::MissingInputDir);
            let report = BatchReport {
                input_missing: true,
                ..Default::default()
            };
            return output.print_report(&report);
        }
        Err(e) => return Err(e.into()),
    };

    let mut progress = ProgressReporter::new(!cli.json);
    let report = run_batch_with_progress(
        &settings,
        || Recognizer::from_settings(&settings),
        &mut progress,
    )?;
    output.print_report(&report)
}
