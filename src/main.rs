// Copyright 2026 Prospect Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use prospect_runtime::cli;

#[derive(Parser)]
#[command(
    name = "prospect",
    about = "Prospect — authenticated profile scraping pipeline",
    version,
    after_help = "Run 'prospect <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API
    Serve {
        /// Port to listen on (default from PROSPECT_HTTP_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Scrape a single target profile and persist it
    Scrape {
        /// Target profile URL
        url: String,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Mirror global flags into the environment so all modules can check them
    if args.json {
        std::env::set_var("PROSPECT_JSON", "1");
    }
    if args.quiet {
        std::env::set_var("PROSPECT_QUIET", "1");
    }
    if args.verbose {
        std::env::set_var("PROSPECT_VERBOSE", "1");
    }
    if args.no_color {
        std::env::set_var("PROSPECT_NO_COLOR", "1");
    }

    let result = match args.command {
        Commands::Serve { port } => cli::serve::run(port).await,
        Commands::Scrape { url } => cli::scrape_cmd::run(&url).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "prospect", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
