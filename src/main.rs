use clap::Parser;
use emacross::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    // Optional .env for TCBS_API_KEY and RUST_LOG.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
