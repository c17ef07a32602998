use clap::Parser;
use release_flow::cli::{self, Args};
use release_flow::ui;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() -> ExitCode {
    let args = Args::parse();

    if args.version {
        println!("release-flow {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            ui::display_error(&format!("Cannot determine the working directory: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            ui::display_error(&format!("Cannot start the async runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(cli::run(&cwd, &args));
    ExitCode::from(cli::report(&result))
}

/// Console logging filtered by RUST_LOG (default: warn, debug with -V)
fn init_tracing(verbose: bool) {
    let default = if verbose { "release_flow=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}
