pub mod config;
pub mod convert;
pub mod machine;
pub mod report;
pub mod types;

pub use config::PanelConfig;
pub use machine::{PanelAction, PanelEngine};
pub use report::StatusRecord;
pub use types::{Glyph, IndicatorState, Mode, Unit, BUSY_ANIMATION_FRAMES};
