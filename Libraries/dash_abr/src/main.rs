use std::process::ExitCode;
use std::sync::Arc;

use dash_abr::args::{get_log_level_filter, parse_args};
use dash_abr::replay::{replay, Session};
use dash_abr::{DashAbrController, EventLogger, EwmaBandwidthMeter, SharedBufferLevel};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[tokio::main]
async fn main() -> ExitCode {
    let args = parse_args();

    // Build the FmtSubscriber layer
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(get_log_level_filter(&args));
    let subscriber = tracing_subscriber::registry().with(fmt_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {e}");
        return ExitCode::FAILURE;
    }

    info!("{:?}", args);

    let config = match args.abr_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let session = match Session::from_json_file(&args.session) {
        Ok(session) => session,
        Err(e) => {
            error!("Could not load session: {e}");
            return ExitCode::FAILURE;
        }
    };

    let meter = Arc::new(EwmaBandwidthMeter::new(args.ewma_alpha, args.initial_bandwidth));
    let buffer = Arc::new(SharedBufferLevel::default());
    let mut controller = match DashAbrController::new(config, meter.clone(), buffer.clone()) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Using {} ABR on {} adaptation sets",
        controller.strategy(),
        session.adaptation_sets.len()
    );

    let logger = EventLogger::new();
    match replay(&session, &mut controller, &meter, &buffer, &logger).await {
        Ok(decisions) => match serde_json::to_string_pretty(&decisions) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize selections: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("Replay aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
