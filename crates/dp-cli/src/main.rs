//! DrawPy script runner
//!
//! Replays a RON draw script against the recording backend and prints the
//! resulting entities and operation history.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dp_core::{Lineage, Plane};
use dp_modeler::{DrawScript, Modeler, RecordingBackend};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "drawpy")]
#[command(about = "Replay a DrawPy draw script against the recording backend")]
struct Args {
    /// Draw script (RON)
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Print the operation history as RON
    #[arg(long)]
    history: bool,
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dp_modeler=debug,dp_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let script = match DrawScript::load(&args.script) {
        Ok(script) => script,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", args.script.display(), e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Replaying '{}' ({} commands)", script.name, script.commands.len());

    let mut modeler = script.modeler(RecordingBackend::new());
    let result = script.replay(&mut modeler);
    // Whatever was drawn before a failure is still worth showing
    print_entities(&modeler);
    if args.history {
        print_history(&modeler);
    }

    match result {
        Ok(report) => {
            tracing::info!(
                "Done: {} commands, {} skipped, {} repeated deletions, {} backend features",
                report.executed,
                report.skipped,
                report.already_deleted,
                modeler.backend().features().len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_entities(modeler: &Modeler<RecordingBackend>) {
    for lineage in modeler.lineages().iter() {
        let plane = modeler.plane_of(&lineage.base).unwrap_or_default();
        println!("{}", describe(lineage, plane));
    }
}

fn describe(lineage: &Lineage, plane: Plane) -> String {
    let status = if lineage.deleted { "deleted" } else { "active" };
    format!(
        "{:<24} {:<24} {:<10} {}",
        lineage.base.to_string(),
        lineage.current_name().to_string(),
        plane.workplane(),
        status
    )
}

fn print_history(modeler: &Modeler<RecordingBackend>) {
    match ron::ser::to_string_pretty(modeler.history(), ron::ser::PrettyConfig::default()) {
        Ok(history) => println!("{}", history),
        Err(e) => tracing::error!("Failed to serialize history: {}", e),
    }
}
