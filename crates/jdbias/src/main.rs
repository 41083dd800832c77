//! The `jdbias` terminal client.

#[macro_use]
extern crate tracing;

use std::env;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal as _};
use std::process::ExitCode;
use std::sync::Mutex;

use jdbias::frontend::{plain, tui};
use jdbias::{AppConfig, SessionBuilder};
use jdbias_http_service::HttpAnalysisService;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if env::args().skip(1).any(|arg| arg == "--plain") {
        config.plain = true;
    }
    if !config.plain && !io::stdout().is_terminal() {
        config.plain = true;
    }

    if let Err(err) = init_logging(&config) {
        eprintln!("failed to open the log file: {err}");
        return ExitCode::FAILURE;
    }

    let service = match HttpAnalysisService::new(config.http_config()) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("failed to create the HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(api_url = %config.api_url, plain = config.plain, "starting");

    let health_fut = service.check_health();
    tokio::spawn(async move {
        match health_fut.await {
            Ok(()) => info!("analysis service is healthy"),
            Err(err) => warn!(%err, "analysis service is not reachable"),
        }
    });

    let builder = SessionBuilder::with_service(service);
    let result = if config.plain {
        plain::run(builder).await
    } else {
        tui::run(builder).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "front end failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Sends logs to the configured file. Without one, only the plain front end
/// logs to stderr, since the full-screen one owns the terminal.
fn init_logging(config: &AppConfig) -> io::Result<()> {
    let filter = EnvFilter::from_default_env();
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if config.plain {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}
