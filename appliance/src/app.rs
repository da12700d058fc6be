use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use thermostat_core::PanelConfig;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::console::{ConsoleIndicators, ConsoleSegment, ConsoleText, SimulatedSensor};
use crate::drivers::{StatusReporter, TextDisplay};
use crate::input;
use crate::panel::{Panel, PanelDevices, Shutdown};
use crate::serial::{LogReporter, SerialReporter};

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = load_config()?;
    config.sanitize();

    let tick_interval_ms = config.tick_interval_ms;
    let devices = build_devices()?;
    let panel = Arc::new(Mutex::new(Panel::new(config, devices)));
    let shutdown = Shutdown::default();

    let mut tick_task = tokio::spawn(tick_loop(
        panel.clone(),
        shutdown.clone(),
        tick_interval_ms,
    ));
    let input_task = tokio::spawn(input::dispatch_loop(panel.clone(), shutdown.clone()));

    info!("thermostat panel running");
    info!("  cycle      advance Off/Heat/Cool");
    info!("  up / down  adjust the setpoint by one degree");
    info!("  unit       toggle Fahrenheit/Celsius");
    info!("  quit       stop (or ctrl-c)");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for shutdown signal")?;
            info!("shutdown requested");
            shutdown.request_stop();
            let _ = (&mut tick_task).await;
        }
        _ = &mut tick_task => {
            info!("tick loop stopped");
        }
    }
    input_task.abort();

    panel.lock().await.safe_off();
    info!("outputs driven to their safe state");
    Ok(())
}

/// The panel's background refresh: one iteration per tick period, exiting
/// when a stop has been requested. The stop check sits at the top of the
/// iteration, so an in-flight tick (including its status send) always
/// completes and the request is honored within one period.
pub(crate) async fn tick_loop(panel: Arc<Mutex<Panel>>, shutdown: Shutdown, tick_ms: u64) {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
    // A unit-toggle blink can hold the panel lock across several tick
    // boundaries; catch up with one delayed tick rather than a burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if shutdown.is_requested() {
            break;
        }

        let now_ms = monotonic_ms();
        let wall = Local::now().naive_local();
        let mut panel = panel.lock().await;
        panel.run_tick(now_ms, wall).await;
    }
}

fn load_config() -> anyhow::Result<PanelConfig> {
    match std::env::var("THERMOSTAT_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            let config = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse config file {path}"))?;
            info!("configuration loaded from {path}");
            Ok(config)
        }
        Err(_) => Ok(PanelConfig::default()),
    }
}

fn build_devices() -> anyhow::Result<PanelDevices> {
    let reporter: Box<dyn StatusReporter> = match std::env::var("SERIAL_PORT") {
        Ok(path) => {
            let baud = std::env::var("SERIAL_BAUD")
                .ok()
                .and_then(|value| value.parse::<u32>().ok())
                .unwrap_or(115_200);
            let reporter = SerialReporter::open(&path, baud)
                .with_context(|| format!("failed to open serial port {path}"))?;
            info!("status reports over {path} at {baud} baud");
            Box::new(reporter)
        }
        Err(_) => {
            warn!("SERIAL_PORT not set; status reports go to the log");
            Box::new(LogReporter)
        }
    };

    let text: Option<Box<dyn TextDisplay>> = match std::env::var("PANEL_TEXT").as_deref() {
        Ok("off") => None,
        _ => Some(Box::new(ConsoleText)),
    };

    let sensor_base_c = std::env::var("SENSOR_BASE_C")
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(21.5);
    let sensor_fail_every = std::env::var("SENSOR_FAIL_EVERY")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());

    Ok(PanelDevices {
        segment: Box::new(ConsoleSegment),
        indicators: Box::new(ConsoleIndicators),
        text,
        sensor: Box::new(SimulatedSensor::new(sensor_base_c, sensor_fail_every)),
        reporter,
    })
}

pub(crate) fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
