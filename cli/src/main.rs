//! collect-debug: gather a diagnostic bundle from a Juju model

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use collect_debug::cli::Cli;
use collect_debug::output::OutputContext;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = OutputContext::new(cli.no_color, cli.quiet);
    if let Err(e) = cli.run().await {
        output.error(&e);
        std::process::exit(1);
    }
}

/// Diagnostic logs go to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "collect_debug=debug",
        _ => "collect_debug=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}
