use bale_rust::BaleError;
use bale_rust::cli::{Cli, Commands, commands};
use bale_rust::logging::init_logging;
use clap::Parser;
use serde_json::json;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
        // Continue without logging rather than aborting.
    }

    let result = match &cli.command {
        Commands::Config { command } => commands::config::execute(command, cli.json),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

fn handle_error(error: &BaleError, json_mode: bool) -> ! {
    if json_mode {
        let payload = json!({
            "error": error.to_string(),
            "suggestion": error.suggestion(),
        });
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {error}");
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{suggestion}");
        }
    }
    std::process::exit(error.exit_code());
}
