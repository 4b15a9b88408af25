use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};

use super::palette::ColorCache;
use super::schema::{FlowRow, Schema};
use super::views;
use super::ViewKind;
use crate::types::IngestStats;

/// Interactive session over an already built schema.
pub struct App {
    schema: Schema,
    colors: ColorCache,
    stats: IngestStats,
    view: ViewKind,
    selected: usize,
    should_quit: bool,
}

impl App {
    pub fn new(schema: Schema, colors: ColorCache, view: ViewKind, stats: IngestStats) -> Self {
        Self {
            schema,
            colors,
            stats,
            view,
            selected: 0,
            should_quit: false,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected_row(&self) -> Option<&FlowRow> {
        self.schema.rows.get(self.selected)
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let rows = self.schema.rows.len();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.view = ViewKind::Scatter,
            KeyCode::Char('2') => self.view = ViewKind::Gantt,
            KeyCode::Char('3') => self.view = ViewKind::Flows,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Down => {
                self.selected = if self.selected + 1 >= rows { 0 } else { self.selected + 1 };
            }
            KeyCode::Up => {
                self.selected = if self.selected == 0 {
                    rows.saturating_sub(1)
                } else {
                    self.selected - 1
                };
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let tabs = Tabs::new(ViewKind::ALL.iter().map(|v| v.title()).collect::<Vec<_>>())
            .block(Block::default().title(" View ").borders(Borders::ALL))
            .select(self.view.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, outer[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(outer[1]);

        match self.view {
            ViewKind::Scatter => views::draw_scatter(frame, body[0], &self.schema, self.selected),
            ViewKind::Gantt => views::draw_gantt(frame, body[0], &self.schema, self.selected),
            ViewKind::Flows => views::draw_flows(frame, body[0], &self.schema, self.selected),
        }

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);
        views::draw_legend(frame, side[0], &self.colors);
        views::draw_details(frame, side[1], self.selected_row());

        let status = Paragraph::new(Line::from(format!(
            " {} packets, {} flows, {} skipped | 1-3/Tab view  Up/Down select  q quit",
            self.stats.packets_ingested, self.stats.flow_count, self.stats.packets_skipped
        )))
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(status, outer[2]);
    }
}

/// Runs the session on the real terminal until the user quits.
pub fn run(mut app: App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while !app.should_quit() {
        terminal.draw(|f| app.draw(f))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }
    Ok(())
}
