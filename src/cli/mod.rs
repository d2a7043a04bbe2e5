//! CLI subcommand implementations for the prospect binary.

pub mod doctor;
pub mod output;
pub mod scrape_cmd;
pub mod serve;

/// Initialize tracing for a command. `--verbose` raises the default level.
pub(crate) fn init_tracing() {
    let directive = if std::env::var("PROSPECT_VERBOSE").is_ok() {
        "prospect_runtime=debug"
    } else {
        "prospect_runtime=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("static directive parses")),
        )
        .init();
}
