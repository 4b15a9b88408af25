use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, List, ListItem, Paragraph,
    },
    Frame,
};

use super::palette::ColorCache;
use super::schema::{FlowRow, Schema, GANTT_LANE};

const SELECTED: Color = Color::White;
const LIFETIME: Color = Color::DarkGray;
// Horizontal strokes used to fill a Gantt bar.
const BAR_STROKES: usize = 8;

fn time_labels(span: f64) -> Vec<Span<'static>> {
    vec![
        Span::raw("0"),
        Span::raw(format!("{:.2}", span / 2.0)),
        Span::raw(format!("{span:.2}")),
    ]
}

pub fn draw_scatter(frame: &mut Frame, area: Rect, schema: &Schema, selected: usize) {
    let series = schema.scatter_series();
    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, (label, color, points))| {
            let color = if i == selected { SELECTED } else { *color };
            Dataset::default()
                .name(label.clone())
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(color))
                .data(points)
        })
        .collect();

    let [lo, hi] = schema.port_bounds();
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" {} ", schema.title))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Internal Port")
                .bounds([lo, hi])
                .labels(vec![
                    Span::raw(format!("{lo:.0}")),
                    Span::raw(format!("{hi:.0}")),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Seconds")
                .bounds([0.0, schema.span])
                .labels(time_labels(schema.span)),
        )
        .legend_position(Some(LegendPosition::TopRight));

    frame.render_widget(chart, area);
}

pub fn draw_gantt(frame: &mut Frame, area: Rect, schema: &Schema, selected: usize) {
    let bars = schema.gantt_bars();
    let ticks = schema.gantt_ticks();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" {} ", schema.client_ip))
                .title_bottom(Line::from(" Seconds ").centered())
                .borders(Borders::ALL),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, schema.span])
        .y_bounds([0.0, schema.gantt_height().max(GANTT_LANE)])
        .paint(move |ctx| {
            for (i, bar) in bars.iter().enumerate() {
                let color = if i == selected { SELECTED } else { bar.color };
                for k in 0..=BAR_STROKES {
                    let y = bar.y + bar.height * k as f64 / BAR_STROKES as f64;
                    ctx.draw(&CanvasLine {
                        x1: bar.x,
                        y1: y,
                        x2: bar.x + bar.width,
                        y2: y,
                        color,
                    });
                }
            }
            ctx.layer();
            for (y, label) in &ticks {
                ctx.print(0.0, *y, label.clone());
            }
        });

    frame.render_widget(canvas, area);
}

pub fn draw_flows(frame: &mut Frame, area: Rect, schema: &Schema, selected: usize) {
    let lanes: Vec<(f64, &FlowRow)> = schema
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (schema.timeline_lane(i), row))
        .collect();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" {} ", schema.title))
                .title_bottom(Line::from(" Seconds since beginning of capture ").centered())
                .borders(Borders::ALL),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, schema.span])
        .y_bounds([-1.0, schema.timeline_height()])
        .paint(move |ctx| {
            for (i, (y, row)) in lanes.iter().enumerate() {
                ctx.draw(&CanvasLine {
                    x1: row.start,
                    y1: *y,
                    x2: row.end,
                    y2: *y,
                    color: LIFETIME,
                });
                let coords: Vec<(f64, f64)> = row.offsets.iter().map(|&x| (x, *y)).collect();
                let color = if i == selected { SELECTED } else { row.color };
                ctx.draw(&Points {
                    coords: &coords,
                    color,
                });
            }
            ctx.layer();
            for (y, row) in &lanes {
                ctx.print(0.0, y + 1.0, row.server.to_string());
            }
        });

    frame.render_widget(canvas, area);
}

pub fn draw_legend(frame: &mut Frame, area: Rect, colors: &ColorCache) {
    let items: Vec<ListItem> = colors
        .legend()
        .map(|(port, color)| {
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::raw(port.to_string()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Internal Port ")
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

pub fn draw_details(frame: &mut Frame, area: Rect, row: Option<&FlowRow>) {
    let lines = match row {
        Some(row) => vec![
            Line::from(Span::styled(
                row.label(),
                Style::default().fg(row.color).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("transport: {:?}", row.transport)),
            Line::from(format!("packets:   {}", row.packets())),
            Line::from(format!("bytes:     {}", row.bytes)),
            Line::from(format!("start:     {:.6}s", row.start)),
            Line::from(format!("end:       {:.6}s", row.end)),
            Line::from(format!("duration:  {:.6}s", row.duration())),
        ],
        None => vec![Line::from("no flow selected")],
    };

    let details = Paragraph::new(lines).block(Block::default().title(" Flow ").borders(Borders::ALL));
    frame.render_widget(details, area);
}
