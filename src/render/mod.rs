mod app;
mod palette;
mod schema;
mod views;

pub use app::{run, App};
pub use palette::{hex, palette_entry, ColorCache, NUMBER_OF_COLORS};
pub use schema::{Bar, FlowRow, Schema, GANTT_BAR_HEIGHT, GANTT_LANE, TIMELINE_LANE};

use clap::ValueEnum;
use serde::Deserialize;

/// The three timing diagrams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Packet times against the client port.
    Scatter,
    /// One bar per flow spanning its lifetime.
    Gantt,
    /// One lane per flow with a dot per packet.
    #[default]
    Flows,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Scatter, ViewKind::Gantt, ViewKind::Flows];

    pub fn index(self) -> usize {
        match self {
            ViewKind::Scatter => 0,
            ViewKind::Gantt => 1,
            ViewKind::Flows => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Scatter => "Scatter",
            ViewKind::Gantt => "Gantt",
            ViewKind::Flows => "Flows",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}
