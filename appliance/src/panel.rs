use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use chrono::NaiveDateTime;
use thermostat_core::{IndicatorState, PanelAction, PanelConfig, PanelEngine};
use tracing::{debug, warn};

use crate::drivers::{
    IndicatorLights, SegmentDisplay, StatusReporter, TemperatureSensor, TextDisplay,
};

/// One already-debounced user gesture, as delivered by the input front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    Cycle,
    Increment,
    Decrement,
    ToggleUnit,
}

/// Cooperative stop flag. The tick loop checks it at the top of every
/// iteration, so a request is honored within one tick period and the
/// in-flight iteration always completes.
#[derive(Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The injected hardware capabilities. Drivers hold no panel state; they
/// are told what to render on every call.
pub struct PanelDevices {
    pub segment: Box<dyn SegmentDisplay>,
    pub indicators: Box<dyn IndicatorLights>,
    pub text: Option<Box<dyn TextDisplay>>,
    pub sensor: Box<dyn TemperatureSensor>,
    pub reporter: Box<dyn StatusReporter>,
}

/// Engine plus devices behind one lock. Event handling and the periodic
/// tick each take the panel mutably for their whole
/// read-modify-write-render sequence; the unit-toggle blink keeps it for
/// the blink's bounded duration, which is the accepted long critical
/// section (events arriving meanwhile queue on the mutex).
pub struct Panel {
    engine: PanelEngine,
    devices: PanelDevices,
}

impl Panel {
    pub fn new(config: PanelConfig, devices: PanelDevices) -> Self {
        Self {
            engine: PanelEngine::new(config),
            devices,
        }
    }

    pub fn engine(&self) -> &PanelEngine {
        &self.engine
    }

    pub async fn handle_event(&mut self, event: PanelEvent, now_ms: u64) {
        self.refresh_sensor().await;
        let actions = match event {
            PanelEvent::Cycle => self.engine.on_cycle(now_ms),
            PanelEvent::Increment => self.engine.on_increment(now_ms),
            PanelEvent::Decrement => self.engine.on_decrement(now_ms),
            PanelEvent::ToggleUnit => self.engine.on_toggle_unit(now_ms),
        };
        self.apply(actions).await;
    }

    pub async fn run_tick(&mut self, now_ms: u64, wall: NaiveDateTime) {
        self.refresh_sensor().await;
        let actions = self.engine.tick(now_ms, wall);
        self.apply(actions).await;
    }

    /// Drive every output to its quiescent state. Called once, after the
    /// tick loop has exited.
    pub fn safe_off(&mut self) {
        self.devices.indicators.set_heat(IndicatorState::Off);
        self.devices.indicators.set_cool(IndicatorState::Off);
        self.devices.segment.blank();
        if let Some(text) = self.devices.text.as_mut() {
            text.render("", "");
        }
    }

    async fn refresh_sensor(&mut self) {
        match self.devices.sensor.read_celsius().await {
            Ok(temp_c) => self.engine.set_sensor_reading(Some(temp_c)),
            Err(err) => {
                warn!("sensor read failed: {err}");
                self.engine.set_sensor_reading(None);
            }
        }
    }

    async fn apply(&mut self, actions: Vec<PanelAction>) {
        for action in actions {
            match action {
                PanelAction::ShowGlyph(glyph) => self.devices.segment.show(glyph),
                PanelAction::BlankDigit => self.devices.segment.blank(),
                PanelAction::Blink {
                    glyph,
                    repeats,
                    on_ms,
                    off_ms,
                } => {
                    self.devices
                        .segment
                        .blink(
                            glyph,
                            repeats,
                            Duration::from_millis(on_ms),
                            Duration::from_millis(off_ms),
                        )
                        .await
                }
                PanelAction::BusyAnimation { cycles, step_ms } => {
                    self.devices
                        .segment
                        .busy_animation(cycles, Duration::from_millis(step_ms))
                        .await
                }
                PanelAction::SetHeat(state) => self.devices.indicators.set_heat(state),
                PanelAction::SetCool(state) => self.devices.indicators.set_cool(state),
                PanelAction::RenderText { line1, line2 } => {
                    if let Some(text) = self.devices.text.as_mut() {
                        text.render(&line1, &line2);
                    }
                }
                PanelAction::SendReport(record) => {
                    let payload = record.to_string();
                    match self.devices.reporter.send(payload.as_bytes()).await {
                        Ok(()) => debug!("status report sent: {payload}"),
                        Err(err) => warn!("status report failed: {err}"),
                    }
                }
            }
        }
    }
}
