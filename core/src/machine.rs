use chrono::NaiveDateTime;

use crate::{
    config::PanelConfig,
    convert::{celsius_to_fahrenheit, setpoint_to_celsius, setpoint_to_fahrenheit},
    report::StatusRecord,
    types::{Glyph, IndicatorState, Mode, Unit},
};

/// One device-facing output. The engine mutates its own state and returns an
/// ordered list of these; the runtime applies them to the injected drivers
/// in sequence. Ordering is load-bearing: a mode change emits the old
/// mode's indicator-off before anything for the new mode.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    ShowGlyph(Glyph),
    BlankDigit,
    Blink {
        glyph: Glyph,
        repeats: u32,
        on_ms: u64,
        off_ms: u64,
    },
    BusyAnimation {
        cycles: u32,
        step_ms: u64,
    },
    SetHeat(IndicatorState),
    SetCool(IndicatorState),
    RenderText {
        line1: String,
        line2: String,
    },
    SendReport(StatusRecord),
}

/// The panel's single source of truth: mode, setpoint, display unit, the
/// digit-display activity stamp and the tick counter. Callers hand in
/// monotonic milliseconds; the engine performs no I/O and never fails.
#[derive(Debug, Clone)]
pub struct PanelEngine {
    pub config: PanelConfig,
    mode: Mode,
    setpoint: i32,
    unit: Unit,
    current_temp_c: Option<f32>,
    last_segment_update_ms: Option<u64>,
    tick_counter: u32,
}

impl PanelEngine {
    pub fn new(config: PanelConfig) -> Self {
        let setpoint = config.default_setpoint_f;
        Self {
            config,
            mode: Mode::Off,
            setpoint,
            unit: Unit::Fahrenheit,
            current_temp_c: None,
            last_segment_update_ms: None,
            tick_counter: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn setpoint(&self) -> i32 {
        self.setpoint
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Latest ambient reading in canonical Celsius, `None` after a failed
    /// read. Pushed by the runtime before each tick or event so that
    /// temperature-dependent output always reflects a fresh sample.
    pub fn set_sensor_reading(&mut self, temp_c: Option<f32>) {
        self.current_temp_c = temp_c;
    }

    /// Advance the mode cycle one step: Off -> Heat -> Cool -> Off. The
    /// departing mode's indicator is extinguished before the new mode's
    /// entry output so the two can never overlap.
    pub fn on_cycle(&mut self, now_ms: u64) -> Vec<PanelAction> {
        let mut actions = Vec::new();

        match self.mode {
            Mode::Heat => actions.push(PanelAction::SetHeat(IndicatorState::Off)),
            Mode::Cool => actions.push(PanelAction::SetCool(IndicatorState::Off)),
            Mode::Off => {}
        }

        self.mode = self.mode.next();

        match self.mode {
            Mode::Off => {
                actions.push(PanelAction::SetHeat(IndicatorState::Off));
                actions.push(PanelAction::SetCool(IndicatorState::Off));
            }
            Mode::Heat | Mode::Cool => self.push_indicator_refresh(&mut actions),
        }
        actions.push(PanelAction::ShowGlyph(self.mode.glyph()));
        self.last_segment_update_ms = Some(now_ms);

        actions
    }

    /// Raise the setpoint one degree in the active unit.
    pub fn on_increment(&mut self, now_ms: u64) -> Vec<PanelAction> {
        self.setpoint += 1;
        self.adjust_feedback(Glyph::Up, now_ms)
    }

    /// Lower the setpoint one degree in the active unit.
    pub fn on_decrement(&mut self, now_ms: u64) -> Vec<PanelAction> {
        self.setpoint -= 1;
        self.adjust_feedback(Glyph::Down, now_ms)
    }

    fn adjust_feedback(&mut self, glyph: Glyph, now_ms: u64) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        self.push_indicator_refresh(&mut actions);
        actions.push(PanelAction::ShowGlyph(glyph));
        self.last_segment_update_ms = Some(now_ms);
        actions
    }

    /// Flip the display unit, converting the setpoint with truncating
    /// integer arithmetic (the round trip loses up to a degree; accepted).
    /// The new unit's glyph blinks for the configured duration, then the
    /// display returns to whatever it would show absent the interruption:
    /// the glyph of the mode as of this call, or blank if the quiet-period
    /// timeout had already elapsed.
    pub fn on_toggle_unit(&mut self, now_ms: u64) -> Vec<PanelAction> {
        let restore_glyph = self.mode.glyph();

        self.unit = self.unit.toggled();
        let (blink_glyph, setpoint) = match self.unit {
            Unit::Celsius => (Glyph::UnitCelsius, setpoint_to_celsius(self.setpoint)),
            Unit::Fahrenheit => (Glyph::UnitFahrenheit, setpoint_to_fahrenheit(self.setpoint)),
        };
        self.setpoint = setpoint;

        let mut actions = vec![PanelAction::Blink {
            glyph: blink_glyph,
            repeats: self.config.blink_repeats,
            on_ms: self.config.blink_on_ms,
            off_ms: self.config.blink_off_ms,
        }];

        let expired = match self.last_segment_update_ms {
            Some(stamp) => now_ms.saturating_sub(stamp) >= self.config.segment_timeout_ms,
            None => true,
        };
        if expired {
            actions.push(PanelAction::BlankDigit);
            self.last_segment_update_ms = None;
        } else {
            actions.push(PanelAction::ShowGlyph(restore_glyph));
            // Activity restarts when the blink finishes, not when it starts;
            // the restored glyph holds for a full quiet period afterwards.
            self.last_segment_update_ms = Some(now_ms + self.config.blink_total_ms());
        }

        actions
    }

    /// One iteration of the periodic refresh: text-display content (clock
    /// line plus alternating temperature / mode+setpoint line), the
    /// every-ten-ticks indicator safety refresh, the every-thirty-ticks
    /// status report, and the digit-display quiet-period check.
    pub fn tick(&mut self, now_ms: u64, wall: NaiveDateTime) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        self.tick_counter += 1;

        let line1 = wall.format("%b %d  %H:%M:%S").to_string();
        let phase = (self.tick_counter - 1) % 10 + 1;
        if phase <= 5 {
            if let Some(temp) = self.display_temperature() {
                actions.push(PanelAction::RenderText {
                    line1,
                    line2: format!("Temp: {:.1} {}", temp, self.unit.letter()),
                });
            }
        } else {
            if phase == 10 {
                self.push_indicator_refresh(&mut actions);
            }
            actions.push(PanelAction::RenderText {
                line1,
                line2: format!(
                    "{} SP: {} {}",
                    self.mode.as_str().to_ascii_uppercase(),
                    self.setpoint,
                    self.unit.letter()
                ),
            });
        }

        if self.tick_counter >= self.config.report_every_ticks {
            if let Some(record) = self.status_record() {
                actions.push(PanelAction::BusyAnimation {
                    cycles: self.config.busy_cycles,
                    step_ms: self.config.busy_step_ms,
                });
                actions.push(PanelAction::ShowGlyph(self.mode.glyph()));
                self.last_segment_update_ms = Some(now_ms + self.config.busy_total_ms());
                actions.push(PanelAction::SendReport(record));
            }
            // Counter resets even when the sensor was unreadable: the next
            // attempt is a full period away, never a per-tick retry.
            self.tick_counter = 0;
        }

        self.check_segment_timeout(now_ms, &mut actions);
        actions
    }

    /// Indicator truth table over (mode, setpoint, floored ambient in the
    /// active unit). `None` when no reading is available, in which case the
    /// previous indicator output stands until the next refresh.
    fn indicator_states(&self) -> Option<(IndicatorState, IndicatorState)> {
        let temp = self.display_temperature()?.floor() as i32;
        Some(match self.mode {
            Mode::Off => (IndicatorState::Off, IndicatorState::Off),
            Mode::Heat => {
                let heat = if temp < self.setpoint {
                    IndicatorState::Pulsing
                } else {
                    IndicatorState::On
                };
                (heat, IndicatorState::Off)
            }
            Mode::Cool => {
                let cool = if temp > self.setpoint {
                    IndicatorState::Pulsing
                } else {
                    IndicatorState::On
                };
                (IndicatorState::Off, cool)
            }
        })
    }

    fn push_indicator_refresh(&self, actions: &mut Vec<PanelAction>) {
        if let Some((heat, cool)) = self.indicator_states() {
            actions.push(PanelAction::SetHeat(heat));
            actions.push(PanelAction::SetCool(cool));
        }
    }

    /// Ambient temperature in the active display unit.
    fn display_temperature(&self) -> Option<f32> {
        let temp_c = self.current_temp_c?;
        Some(match self.unit {
            Unit::Fahrenheit => celsius_to_fahrenheit(temp_c),
            Unit::Celsius => temp_c,
        })
    }

    fn status_record(&self) -> Option<StatusRecord> {
        let temp_c = self.current_temp_c?;
        let setpoint_f = match self.unit {
            Unit::Fahrenheit => self.setpoint,
            Unit::Celsius => setpoint_to_fahrenheit(self.setpoint),
        };
        Some(StatusRecord {
            mode: self.mode,
            temp_f: celsius_to_fahrenheit(temp_c),
            setpoint_f,
        })
    }

    fn check_segment_timeout(&mut self, now_ms: u64, actions: &mut Vec<PanelAction>) {
        if let Some(stamp) = self.last_segment_update_ms {
            if now_ms.saturating_sub(stamp) >= self.config.segment_timeout_ms {
                actions.push(PanelAction::BlankDigit);
                self.last_segment_update_ms = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn engine() -> PanelEngine {
        PanelEngine::new(PanelConfig::default())
    }

    fn wall() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 19)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    // About 70 F; floors to 70 in Fahrenheit.
    const COOL_ROOM_C: f32 = 21.2;
    // About 74 F; floors to 74 in Fahrenheit.
    const WARM_ROOM_C: f32 = 23.4;

    fn indicator_timeline(actions: &[PanelAction]) -> Vec<(IndicatorState, IndicatorState)> {
        let mut heat = IndicatorState::Off;
        let mut cool = IndicatorState::Off;
        let mut states = Vec::new();
        for action in actions {
            match action {
                PanelAction::SetHeat(state) => heat = *state,
                PanelAction::SetCool(state) => cool = *state,
                _ => continue,
            }
            states.push((heat, cool));
        }
        states
    }

    #[test]
    fn starts_off_at_72_fahrenheit() {
        let engine = engine();
        assert_eq!(engine.mode(), Mode::Off);
        assert_eq!(engine.setpoint(), 72);
        assert_eq!(engine.unit(), Unit::Fahrenheit);
    }

    #[test]
    fn cycle_visits_modes_round_robin() {
        let mut engine = engine();
        let mut seen = Vec::new();
        for _ in 0..6 {
            engine.on_cycle(0);
            seen.push(engine.mode());
        }
        assert_eq!(
            seen,
            vec![
                Mode::Heat,
                Mode::Cool,
                Mode::Off,
                Mode::Heat,
                Mode::Cool,
                Mode::Off
            ]
        );
    }

    #[test]
    fn exit_action_precedes_entry_actions() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(COOL_ROOM_C));
        engine.on_cycle(0); // Off -> Heat

        let actions = engine.on_cycle(0); // Heat -> Cool
        assert_eq!(actions.first(), Some(&PanelAction::SetHeat(IndicatorState::Off)));
    }

    #[test]
    fn indicators_are_never_both_active() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(WARM_ROOM_C));
        for _ in 0..9 {
            let actions = engine.on_cycle(0);
            for (heat, cool) in indicator_timeline(&actions) {
                assert!(
                    heat == IndicatorState::Off || cool == IndicatorState::Off,
                    "heat {heat:?} and cool {cool:?} active together"
                );
            }
        }
    }

    #[test]
    fn entering_a_mode_shows_its_glyph() {
        let mut engine = engine();
        let actions = engine.on_cycle(0);
        assert!(actions.contains(&PanelAction::ShowGlyph(Glyph::Heat)));

        let actions = engine.on_cycle(0);
        assert!(actions.contains(&PanelAction::ShowGlyph(Glyph::Cool)));

        let actions = engine.on_cycle(0);
        assert!(actions.contains(&PanelAction::ShowGlyph(Glyph::Off)));
    }

    #[test]
    fn increment_then_decrement_is_an_exact_inverse() {
        let mut engine = engine();
        for start in [-5, 0, 72, 200] {
            while engine.setpoint() != start {
                if engine.setpoint() < start {
                    engine.on_increment(0);
                } else {
                    engine.on_decrement(0);
                }
            }
            engine.on_increment(0);
            engine.on_decrement(0);
            assert_eq!(engine.setpoint(), start);
        }
    }

    #[test]
    fn adjust_events_show_direction_glyphs() {
        let mut engine = engine();
        let actions = engine.on_increment(0);
        assert!(actions.contains(&PanelAction::ShowGlyph(Glyph::Up)));
        let actions = engine.on_decrement(0);
        assert!(actions.contains(&PanelAction::ShowGlyph(Glyph::Down)));
    }

    #[test]
    fn unit_toggle_converts_and_round_trip_drifts_one_degree() {
        let mut engine = engine();
        engine.on_toggle_unit(0);
        assert_eq!(engine.unit(), Unit::Celsius);
        assert_eq!(engine.setpoint(), 22);

        engine.on_toggle_unit(0);
        assert_eq!(engine.unit(), Unit::Fahrenheit);
        assert_eq!(engine.setpoint(), 71);
    }

    #[test]
    fn unit_toggle_blinks_then_restores_mode_glyph() {
        let mut engine = engine();
        engine.on_cycle(1_000); // Heat, display active

        let actions = engine.on_toggle_unit(2_000);
        assert_eq!(
            actions,
            vec![
                PanelAction::Blink {
                    glyph: Glyph::UnitCelsius,
                    repeats: 5,
                    on_ms: 300,
                    off_ms: 300,
                },
                PanelAction::ShowGlyph(Glyph::Heat),
            ]
        );
    }

    #[test]
    fn unit_toggle_restores_blank_when_timeout_had_elapsed() {
        let mut engine = engine();
        engine.on_cycle(0); // Heat glyph at t=0
        let _ = engine.tick(10_000, wall()); // long quiet, display blanked

        let actions = engine.on_toggle_unit(11_000);
        assert_eq!(actions.last(), Some(&PanelAction::BlankDigit));
    }

    #[test]
    fn heat_indicator_pulses_below_setpoint_and_holds_solid_at_or_above() {
        {
            let mut engine = engine();
            engine.set_sensor_reading(Some(COOL_ROOM_C)); // 70 F < 72
            let actions = engine.on_cycle(0);
            assert!(actions.contains(&PanelAction::SetHeat(IndicatorState::Pulsing)));
            assert!(actions.contains(&PanelAction::SetCool(IndicatorState::Off)));
        }

        let mut engine = engine();
        engine.set_sensor_reading(Some(WARM_ROOM_C)); // 74 F >= 72
        let actions = engine.on_cycle(0);
        assert!(actions.contains(&PanelAction::SetHeat(IndicatorState::On)));
        assert!(actions.contains(&PanelAction::SetCool(IndicatorState::Off)));
    }

    #[test]
    fn cool_indicator_pulses_above_setpoint() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(WARM_ROOM_C)); // 74 F > 72
        engine.on_cycle(0);
        let actions = engine.on_cycle(0); // Cool
        assert!(actions.contains(&PanelAction::SetCool(IndicatorState::Pulsing)));
        assert!(actions.contains(&PanelAction::SetHeat(IndicatorState::Off)));
    }

    #[test]
    fn digit_display_blanks_at_three_seconds_not_before() {
        let mut engine = engine();
        engine.on_increment(1_000);

        let actions = engine.tick(3_900, wall()); // 2.9 s elapsed
        assert!(!actions.contains(&PanelAction::BlankDigit));

        let actions = engine.tick(4_000, wall()); // 3.0 s elapsed
        assert!(actions.contains(&PanelAction::BlankDigit));

        // already blank: the check is a no-op from here on
        let actions = engine.tick(60_000, wall());
        assert!(!actions.contains(&PanelAction::BlankDigit));
    }

    #[test]
    fn blink_suppresses_the_timeout_until_it_finishes() {
        let mut engine = engine();
        engine.on_cycle(0); // Heat
        engine.on_toggle_unit(1_000); // blink runs until 4_000

        // mid-blink and for 3 s after the restore: no blanking
        let actions = engine.tick(2_000, wall());
        assert!(!actions.contains(&PanelAction::BlankDigit));
        let actions = engine.tick(6_900, wall());
        assert!(!actions.contains(&PanelAction::BlankDigit));

        // 3 s after the blink finished
        let actions = engine.tick(7_000, wall());
        assert!(actions.contains(&PanelAction::BlankDigit));
    }

    #[test]
    fn text_alternates_temperature_then_mode_windows() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(COOL_ROOM_C));

        let mut second_lines = Vec::new();
        for tick in 0..10u64 {
            let actions = engine.tick(tick * 1_000, wall());
            for action in actions {
                if let PanelAction::RenderText { line2, .. } = action {
                    second_lines.push(line2);
                }
            }
        }

        assert_eq!(second_lines.len(), 10);
        for line in &second_lines[..5] {
            assert!(line.starts_with("Temp: 70."), "{line}");
        }
        for line in &second_lines[5..] {
            assert_eq!(line, "OFF SP: 72 F");
        }
    }

    #[test]
    fn clock_line_formats_date_and_time() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(COOL_ROOM_C));
        let actions = engine.tick(0, wall());
        let Some(PanelAction::RenderText { line1, .. }) = actions.first() else {
            panic!("expected a text render, got {actions:?}");
        };
        assert_eq!(line1, "Feb 19  09:30:00");
    }

    #[test]
    fn tenth_tick_refreshes_indicators() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(COOL_ROOM_C));
        engine.on_cycle(0); // Heat

        for tick in 1..=9u64 {
            let actions = engine.tick(tick * 1_000, wall());
            assert!(
                !actions.iter().any(|a| matches!(a, PanelAction::SetHeat(_))),
                "tick {tick} refreshed indicators early"
            );
        }
        let actions = engine.tick(10_000, wall());
        assert!(actions.contains(&PanelAction::SetHeat(IndicatorState::Pulsing)));
        assert!(actions.contains(&PanelAction::SetCool(IndicatorState::Off)));
    }

    #[test]
    fn thirtieth_tick_reports_in_fahrenheit_whatever_the_unit() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(21.0));
        engine.on_cycle(0);
        engine.on_cycle(0); // Cool
        engine.on_toggle_unit(0); // Celsius, setpoint 22

        let mut reports = Vec::new();
        for tick in 1..=30u64 {
            let actions = engine.tick(tick * 1_000, wall());
            for action in actions {
                if let PanelAction::SendReport(record) = action {
                    reports.push((tick, record));
                }
            }
        }

        assert_eq!(reports.len(), 1);
        let (tick, record) = &reports[0];
        assert_eq!(*tick, 30);
        assert_eq!(record.to_string(), "cool,69.8,71");
    }

    #[test]
    fn report_tick_plays_busy_animation_then_restores_before_sending() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(COOL_ROOM_C));

        let mut actions = Vec::new();
        for tick in 1..=30u64 {
            actions = engine.tick(tick * 1_000, wall());
        }

        let positions: Vec<usize> = actions
            .iter()
            .enumerate()
            .filter_map(|(i, a)| {
                matches!(
                    a,
                    PanelAction::BusyAnimation { .. }
                        | PanelAction::ShowGlyph(Glyph::Off)
                        | PanelAction::SendReport(_)
                )
                .then_some(i)
            })
            .collect();
        assert_eq!(positions.len(), 3, "{actions:?}");
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn reports_recur_every_thirty_ticks() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(COOL_ROOM_C));

        let mut report_ticks = Vec::new();
        for tick in 1..=90u64 {
            let actions = engine.tick(tick * 1_000, wall());
            if actions
                .iter()
                .any(|a| matches!(a, PanelAction::SendReport(_)))
            {
                report_ticks.push(tick);
            }
        }
        assert_eq!(report_ticks, vec![30, 60, 90]);
    }

    #[test]
    fn failed_sensor_read_skips_temperature_output_for_that_cycle() {
        let mut engine = engine();
        engine.set_sensor_reading(None);

        // temperature window: nothing to render
        let actions = engine.tick(1_000, wall());
        assert!(
            !actions
                .iter()
                .any(|a| matches!(a, PanelAction::RenderText { .. })),
            "{actions:?}"
        );

        // recovery on the next good read
        engine.set_sensor_reading(Some(COOL_ROOM_C));
        let actions = engine.tick(2_000, wall());
        assert!(actions
            .iter()
            .any(|a| matches!(a, PanelAction::RenderText { .. })));
    }

    #[test]
    fn unreadable_sensor_skips_the_report_without_tightening_the_cadence() {
        let mut engine = engine();
        engine.set_sensor_reading(None);
        for tick in 1..=30u64 {
            let actions = engine.tick(tick * 1_000, wall());
            assert!(!actions
                .iter()
                .any(|a| matches!(a, PanelAction::SendReport(_))));
        }

        // next report lands a full period later, not on the next tick
        engine.set_sensor_reading(Some(COOL_ROOM_C));
        let actions = engine.tick(31_000, wall());
        assert!(!actions
            .iter()
            .any(|a| matches!(a, PanelAction::SendReport(_))));
        let mut sent = 0;
        for tick in 32..=60u64 {
            let actions = engine.tick(tick * 1_000, wall());
            sent += actions
                .iter()
                .filter(|a| matches!(a, PanelAction::SendReport(_)))
                .count();
        }
        assert_eq!(sent, 1);
    }

    #[test]
    fn mode_window_still_renders_without_a_reading() {
        let mut engine = engine();
        engine.set_sensor_reading(None);
        for tick in 1..=5u64 {
            let _ = engine.tick(tick * 1_000, wall());
        }
        let actions = engine.tick(6_000, wall());
        assert!(actions
            .iter()
            .any(|a| matches!(a, PanelAction::RenderText { .. })));
    }

    #[test]
    fn celsius_window_renders_celsius_temperature() {
        let mut engine = engine();
        engine.set_sensor_reading(Some(21.0));
        engine.on_toggle_unit(0);

        let actions = engine.tick(1_000_000, wall());
        let rendered = actions.iter().find_map(|a| match a {
            PanelAction::RenderText { line2, .. } => Some(line2.clone()),
            _ => None,
        });
        assert_eq!(rendered.as_deref(), Some("Temp: 21.0 C"));
    }
}
