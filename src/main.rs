//! # RC Link
//!
//! Generates RC channels frames at a fixed rate and records their packed
//! channels region.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use rc_link::config::{Config, LoggingConfig};
use rc_link::link::ChannelFrameSource;
use rc_link::recorder::FrameRecorder;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Diagnostic log file name prefix (daily rotation appends the date)
const LOG_FILE_NAME: &str = "rc-link.log";

/// Main entry point for RC Link
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the frame recorder if enabled
///
/// 2. **Main Loop**
///    - Emit one channels frame per tick at the configured packet rate
///    - Log status every `status_interval_packets` frames
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration cannot be loaded or the recorder
/// directory cannot be created
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("RC Link v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    let mut recorder = if config.recorder.enabled {
        Some(FrameRecorder::from_config(&config.recorder).context("Failed to open frame recorder")?)
    } else {
        info!("Frame recorder disabled");
        None
    };

    let mut source = ChannelFrameSource::from_config(&config.channels);

    let mut packet_interval = interval(packet_period(config.link.packet_rate_hz));
    packet_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Starting channel frame loop at {}Hz", config.link.packet_rate_hz);
    info!("Press Ctrl+C to exit");

    let mut packet_count: u64 = 0;
    let mut error_count: u64 = 0;

    loop {
        tokio::select! {
            _ = packet_interval.tick() => {
                let result = match recorder.as_mut() {
                    Some(recorder) => source.emit(recorder),
                    None => source.next_frame().map(|(packet, _)| packet),
                };

                if let Err(e) = result {
                    error_count += 1;
                    warn!("Failed to emit frame: {}", e);
                    continue;
                }

                packet_count += 1;

                if packet_count % config.link.status_interval_packets == 0 {
                    info!("Emitted {} frames ({} errors, next id {})",
                        packet_count, error_count, source.next_id());
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames emitted: {} ({} errors)", packet_count, error_count);
                break;
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. When `log_dir` is set, logs are
/// also written to a daily rolling file; the returned guard must stay alive
/// for those writes to be flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Tick period for a packet rate
fn packet_period(rate_hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_period_calculation() {
        assert_eq!(packet_period(250), Duration::from_millis(4));
        assert_eq!(packet_period(500), Duration::from_millis(2));
        assert_eq!(packet_period(150), Duration::from_micros(6666));
        assert_eq!(packet_period(50), Duration::from_millis(20));
    }

    #[test]
    fn test_packet_period_zero_rate() {
        assert_eq!(packet_period(0), Duration::from_secs(1));
    }

    #[test]
    fn test_default_config_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/", "config/default.toml");
        let config = tokio_test::assert_ok!(Config::load(path));

        assert_eq!(config.link.packet_rate_hz, 250);
        assert_eq!(config.channels.values.len(), 16);
    }
}
