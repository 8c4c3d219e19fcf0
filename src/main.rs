use contrib_replay::cli::Cli;
use contrib_replay::error::ContribError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.common.verbose {
        "contrib_replay=debug"
    } else {
        "contrib_replay=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.execute() {
        match e.downcast_ref::<ContribError>() {
            Some(ContribError::Cancelled) => eprintln!("\nOperation cancelled"),
            _ => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}
