//! Structured logging setup

use camfeed_core::CamfeedError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter applied when `RUST_LOG` is not set
pub const DEFAULT_LOG_DIRECTIVE: &str = "camfeed=info,camfeed_core=info,camfeed_media=info";

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_directive`. Fails if a subscriber
/// is already installed.
pub fn init_logging(default_directive: &str) -> Result<(), CamfeedError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| {
            CamfeedError::Initialization {
                reason: format!("invalid log directive '{}': {}", default_directive, e),
            }
        })?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|e| CamfeedError::Initialization {
            reason: format!("failed to install log subscriber: {}", e),
        })
}
