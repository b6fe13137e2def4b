use std::process;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tail_pubsub::cli::Cli;
use tail_pubsub::pubsub::client::{HttpPubsubClient, PubsubClient};
use tail_pubsub::shutdown::{wait_for_signal, ShutdownSignal};
use tail_pubsub::tailer::Tailer;

/// Exit code for fatal setup failures (authentication, configuration,
/// subscription setup).
const EXIT_SETUP_FAILURE: i32 = 2;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let config = cli.into_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(EXIT_SETUP_FAILURE);
    }

    // Emulator endpoints skip credential loading entirely.
    let client: Arc<dyn PubsubClient> = match &config.endpoint {
        Some(endpoint) => Arc::new(HttpPubsubClient::with_endpoint(endpoint.clone())),
        None => match HttpPubsubClient::new() {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("Unable to authenticate to GCP! ({})", e);
                process::exit(EXIT_SETUP_FAILURE);
            }
        },
    };

    let tailer = Tailer::new(config, client);
    if let Err(e) = tailer.ensure_subscription().await {
        error!("{}", e);
        process::exit(EXIT_SETUP_FAILURE);
    }

    let signal = ShutdownSignal::new();
    let trigger = signal.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.shutdown();
    });

    if let Err(e) = tailer.run(signal.subscribe()).await {
        error!("Tail loop failed: {}", e);
        process::exit(1);
    }
    info!("Shutdown complete");
}
