//! Zero Session - Main entry point.

use anyhow::Result;
use zero_common::config::Config;
use zero_common::logging::init_logging_with_exclusions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Zero Session v{}", env!("CARGO_PKG_VERSION"));

    zero_session::start_server(&config).await
}
