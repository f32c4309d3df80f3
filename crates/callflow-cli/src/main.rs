//! Callflow CLI - Turn call traces into sequence diagrams

mod cli;

use clap::Parser;

fn main() {
    // Logging is initialized inside run() once flags are known
    let cli_args = cli::Cli::parse();

    let app = cli::CallflowApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
