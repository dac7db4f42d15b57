//! Command-line entry point.

use inkboard_app::{App, AppConfig, AppError, AppResult, ShortcutRegistry};
use inkboard_core::storage::read_document;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Margin around content when exporting a document.
const EXPORT_PADDING: f64 = 20.0;

const USAGE: &str = "\
Usage:
  inkboard run <script.json> [--config <config.json>]
  inkboard export <document.json> <out.png> [--config <config.json>]
  inkboard list [--config <config.json>]
  inkboard shortcuts";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(CliError::App(e)) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

enum CliError {
    Usage,
    App(AppError),
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let (positional, config_path) = split_config_flag(args)?;
    let config = match config_path {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };

    match positional.as_slice() {
        ["run", script] => Ok(run_script(config, Path::new(script))?),
        ["export", document, out] => Ok(export(config, Path::new(document), Path::new(out))?),
        ["list"] => {
            for name in App::new(config).stored_documents()? {
                println!("{name}");
            }
            Ok(())
        }
        ["shortcuts"] => {
            ShortcutRegistry::print_all();
            Ok(())
        }
        _ => Err(CliError::Usage),
    }
}

/// Pull `--config <path>` out of the argument list.
fn split_config_flag(args: &[String]) -> Result<(Vec<&str>, Option<PathBuf>), CliError> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or(CliError::Usage)?;
            config = Some(PathBuf::from(path));
        } else {
            positional.push(arg.as_str());
        }
    }
    Ok((positional, config))
}

fn run_script(config: AppConfig, script: &Path) -> AppResult<()> {
    let json = std::fs::read_to_string(script)?;
    let mut app = App::new(config);
    let outcomes = app.run_script(&json)?;
    log::info!(
        "Script finished: {} actions, {} elements, {} frames",
        outcomes.len(),
        app.canvas().document().len(),
        app.scheduler().frame_count()
    );
    Ok(())
}

fn export(config: AppConfig, document: &Path, out: &Path) -> AppResult<()> {
    let document = read_document(document)?;
    let mut app = App::new(config);
    app.canvas_mut().load_document(document);
    if !app.fit_to_content(EXPORT_PADDING) {
        log::warn!("Document is empty, exporting a blank viewport");
    }
    app.export_png_to(out)
}
