//! fanlog CLI entry point.

use clap::Parser;

use fanlog::cli::{commands, handle_error, load_config, Cli, Commands};
use fanlog::infrastructure::logging::{init_diagnostics, DiagnosticsFormat};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format = if cli.json {
        DiagnosticsFormat::Json
    } else {
        DiagnosticsFormat::Pretty
    };
    if let Err(err) = init_diagnostics("info", format) {
        eprintln!("Warning: diagnostics disabled: {err:#}");
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Emit(args) => commands::emit::execute(args, config, cli.json).await,
        Commands::Rotate(args) => commands::rotate::execute(args, config, cli.json).await,
        Commands::Config(args) => commands::config::execute(args, config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
