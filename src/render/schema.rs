use std::net::IpAddr;

use ratatui::style::Color;

use super::palette::ColorCache;
use crate::error::FlowError;
use crate::processor::{Endpoint, Flow, FlowTable, Transport};

/// Vertical distance between two flows in the Gantt view.
pub const GANTT_LANE: f64 = 5.0;
pub const GANTT_BAR_HEIGHT: f64 = 4.0;
/// Vertical distance between two flows in the timeline view.
pub const TIMELINE_LANE: f64 = 3.0;

// Keeps the time axis open for captures where every packet shares a stamp.
const MIN_SPAN: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct FlowRow {
    pub client: Endpoint,
    pub server: Endpoint,
    pub color: Color,
    pub transport: Transport,
    /// Seconds since the first packet of the capture.
    pub start: f64,
    pub end: f64,
    pub offsets: Vec<f64>,
    pub bytes: u64,
}

impl FlowRow {
    fn new(flow: &Flow, origin: f64, color: Color) -> Self {
        Self {
            client: flow.client,
            server: flow.server,
            color,
            transport: flow.packets[0].transport,
            start: flow.start_time - origin,
            end: flow.end_time - origin,
            offsets: flow.timestamps().map(|ts| ts - origin).collect(),
            bytes: flow.bytes(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} -> {}", self.client, self.server)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn packets(&self) -> usize {
        self.offsets.len()
    }
}

/// A horizontal bar in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
    pub color: Color,
}

/// Everything the views need, relative to the first packet of the capture.
#[derive(Debug, Clone)]
pub struct Schema {
    pub title: String,
    /// The Gantt view is titled with the client address alone.
    pub client_ip: IpAddr,
    pub origin: f64,
    pub span: f64,
    pub rows: Vec<FlowRow>,
}

impl Schema {
    pub fn build(
        table: &FlowTable,
        colors: &mut ColorCache,
        title: impl Into<String>,
    ) -> Result<Self, FlowError> {
        let origin = table.get_minimal_timestamp()?;
        let rows: Vec<FlowRow> = table
            .flows()
            .map(|flow| FlowRow::new(flow, origin, colors.color_for(flow.client.port)))
            .collect();
        let span = rows.iter().map(|r| r.end).fold(MIN_SPAN, f64::max);

        Ok(Self {
            title: title.into(),
            client_ip: table.client_ip(),
            origin,
            span,
            rows,
        })
    }

    /// One series per flow: (label, colour, [(client port, seconds)]).
    pub fn scatter_series(&self) -> Vec<(String, Color, Vec<(f64, f64)>)> {
        self.rows
            .iter()
            .map(|row| {
                let x = f64::from(row.client.port);
                let points = row.offsets.iter().map(|&y| (x, y)).collect();
                (row.label(), row.color, points)
            })
            .collect()
    }

    /// Client port range padded by one on each side.
    pub fn port_bounds(&self) -> [f64; 2] {
        let ports = self.rows.iter().map(|r| f64::from(r.client.port));
        let lo = ports.clone().fold(f64::INFINITY, f64::min);
        let hi = ports.fold(f64::NEG_INFINITY, f64::max);
        [lo - 1.0, hi + 1.0]
    }

    pub fn gantt_bars(&self) -> Vec<Bar> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| Bar {
                x: row.start,
                width: row.duration(),
                y: i as f64 * GANTT_LANE,
                height: GANTT_BAR_HEIGHT,
                color: row.color,
            })
            .collect()
    }

    /// Tick position and server label of every Gantt lane.
    pub fn gantt_ticks(&self) -> Vec<(f64, String)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i as f64 * GANTT_LANE + GANTT_LANE / 2.0, row.server.to_string()))
            .collect()
    }

    pub fn gantt_height(&self) -> f64 {
        self.rows.len() as f64 * GANTT_LANE
    }

    pub fn timeline_lane(&self, index: usize) -> f64 {
        index as f64 * TIMELINE_LANE
    }

    pub fn timeline_height(&self) -> f64 {
        self.rows.len().max(1) as f64 * TIMELINE_LANE
    }
}
