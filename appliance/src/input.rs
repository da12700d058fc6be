//! Console stand-in for the physical button front end. Debounce and
//! gesture resolution (short press vs. hold) belong to that front end; each
//! accepted line here is one already-resolved gesture, mapped onto exactly
//! one panel entry point.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;

use crate::app::monotonic_ms;
use crate::panel::{Panel, PanelEvent, Shutdown};

pub(crate) async fn dispatch_loop(panel: Arc<Mutex<Panel>>, shutdown: Shutdown) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if matches!(command, "quit" | "q") {
            shutdown.request_stop();
            break;
        }

        let Some(event) = parse_command(command) else {
            info!("commands: cycle | up | down | unit | quit");
            continue;
        };

        // Taken for the whole event, including a unit-toggle blink; later
        // commands queue here and run in arrival order.
        let mut panel = panel.lock().await;
        panel.handle_event(event, monotonic_ms()).await;

        let engine = panel.engine();
        info!(
            "mode {} setpoint {} {}",
            engine.mode().as_str(),
            engine.setpoint(),
            engine.unit().letter()
        );
    }
}

fn parse_command(command: &str) -> Option<PanelEvent> {
    match command {
        "cycle" | "c" => Some(PanelEvent::Cycle),
        "up" | "u" | "+" => Some(PanelEvent::Increment),
        "down" | "d" | "-" => Some(PanelEvent::Decrement),
        "unit" | "scale" | "f" => Some(PanelEvent::ToggleUnit),
        _ => None,
    }
}
