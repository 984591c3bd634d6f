//! # Smoker Bridge
//!
//! Forward wireless BBQ thermometer readings to an MQTT broker.
//!
//! This application reads the thermometer's radio payloads from a USB serial
//! bridge and publishes at most one temperature message per gate interval.

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smoker_bridge::clock::SystemClock;
use smoker_bridge::config::{Config, LoggingConfig};
use smoker_bridge::control::fan::FanOutput;
use smoker_bridge::control::monitor::TopicMonitor;
use smoker_bridge::control::pwm::SysfsPwm;
use smoker_bridge::control::MessageRouter;
use smoker_bridge::pipeline::{DrainReport, Pipeline};
use smoker_bridge::publisher::{run_event_loop, MqttPublisher};
use smoker_bridge::receiver::packet_queue;
use smoker_bridge::receiver::serial::RadioSerial;
use smoker_bridge::sample::gate::SampleGate;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Log level used when `RUST_LOG` is unset or unparsable
const DEFAULT_LOG_LEVEL: &str = "info";

/// Number of published messages between status log messages
const LOG_INTERVAL_MESSAGES: u64 = 100;

/// Main entry point for Smoker Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the radio bridge and start the frame reader task
///    - Start the fan PWM output and topic monitor when enabled
///    - Start the MQTT event loop task
///
/// 2. **Main Loop**
///    - Wait for the "packets available" notification
///    - Drain the packet queue through the pipeline
///    - Log totals every 100 published messages
///
/// 3. **Shutdown**
///    - Ctrl+C: log totals and exit cleanly
///    - Radio bridge closed: drain what is left and exit with an error
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO smoker_bridge: Smoker Bridge v0.1.0 starting...
/// INFO smoker_bridge: Opened radio bridge at /dev/ttyACM0 (115200 baud)
/// INFO smoker_bridge::pipeline: Sample 1720094400,225.5,160
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    let _log_guard = init_logging(&config.logging);

    info!("Smoker Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from {}", config_path);

    let radio = RadioSerial::open(&config.receiver.port, config.receiver.baud_rate)?;
    info!(
        "Opened radio bridge at {} ({} baud)",
        radio.device_path(),
        config.receiver.baud_rate
    );
    let (sender, mut receiver) = packet_queue(config.receiver.queue_capacity);
    let packets_available = receiver.notifier();
    let mut reader = tokio::spawn(radio.run(sender));

    let router = build_router(&config)?;
    let (publisher, eventloop) = MqttPublisher::new(&config.mqtt);
    tokio::spawn(run_event_loop(eventloop, publisher.clone(), router));

    let gate = SampleGate::from_millis(config.gate.min_interval_ms);
    let min_interval_ms = gate.min_interval().num_milliseconds();
    let pipeline = Pipeline::new(publisher, SystemClock, config.mqtt.topic.clone(), gate);

    info!(
        "Publishing to '{}' at most once every {} ms",
        pipeline.topic(),
        min_interval_ms
    );
    info!("Press Ctrl+C to exit");

    let mut totals = DrainReport::default();
    let mut last_log_published: u64 = 0;

    loop {
        tokio::select! {
            _ = packets_available.notified() => {
                totals += pipeline.on_packets_available(&mut receiver);

                if totals.published - last_log_published >= LOG_INTERVAL_MESSAGES {
                    log_totals(&totals);
                    last_log_published = totals.published;
                }
            }

            result = &mut reader => {
                totals += pipeline.on_packets_available(&mut receiver);
                log_totals(&totals);

                return match result {
                    Ok(Ok(())) => Err(anyhow!("radio bridge closed the connection")),
                    Ok(Err(e)) => {
                        error!("Radio reader failed: {}", e);
                        Err(e.into())
                    }
                    Err(e) => Err(anyhow!("radio reader task panicked: {}", e)),
                };
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                log_totals(&totals);
                break;
            }
        }
    }

    Ok(())
}

/// Build the handlers for messages received from the broker
///
/// # Errors
///
/// Returns error if the fan PWM channel cannot be set up
fn build_router(config: &Config) -> Result<MessageRouter> {
    let mut router = MessageRouter::new();

    if config.fan.enabled {
        let mut pwm = SysfsPwm::open(&config.fan.pwm_chip, config.fan.pwm_channel, config.fan.frequency_hz)?;
        pwm.set_duty(config.fan.initial_duty)?;
        info!(
            "Fan at {}%, listening for commands on {}",
            config.fan.initial_duty, config.fan.command_topic
        );
        router = router.with_fan(pwm, config.fan.command_topic.clone());
    }

    if config.monitor.enabled {
        info!("Monitoring {}", config.monitor.filter);
        router = router.with_monitor(TopicMonitor::new(config.monitor.filter.clone(), SystemClock));
    }

    Ok(router)
}

/// Build the log filter from `RUST_LOG` directives
///
/// Falls back to [`DEFAULT_LOG_LEVEL`] when `directives` is unset, blank or
/// does not parse.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install stdout logging plus an optional daily rolling file
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(directives.as_deref());

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
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

fn log_totals(totals: &DrainReport) {
    info!(
        "Totals: {} packets, {} published, {} rejected by gate, {} malformed",
        totals.packets, totals.published, totals.rejected, totals.decode_errors
    );
    if totals.publish_failures > 0 {
        warn!("{} publish hand-offs failed", totals.publish_failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_MESSAGES, 100);

        // At one message per 10s gate interval, 100 messages ≈ 17 minutes
        let minutes = LOG_INTERVAL_MESSAGES as f64 * 10.0 / 60.0;
        assert!(minutes > 16.0 && minutes < 17.0);
    }

    #[test]
    fn test_default_config_file_is_valid() {
        let contents = include_str!("../config/default.toml");
        assert!(Config::from_toml(contents).is_ok());
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_can_lower_level() {
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_log_filter_can_raise_level() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            log_filter(Some("warn,smoker_bridge=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_router_with_nothing_enabled() {
        let router = build_router(&Config::default()).unwrap();
        assert!(router.fan_stats().is_none());
    }

    #[test]
    fn test_router_with_monitor_enabled() {
        use smoker_bridge::control::IncomingHandler;

        let mut config = Config::default();
        config.monitor.enabled = true;

        let router = build_router(&config).unwrap();
        assert_eq!(router.subscriptions(), vec!["smoker/#"]);
    }

    #[test]
    fn test_router_fails_without_pwm_chip() {
        let mut config = Config::default();
        config.fan.enabled = true;
        config.fan.pwm_chip = "/nonexistent/pwmchip0".to_string();

        assert!(build_router(&config).is_err());
    }
}
