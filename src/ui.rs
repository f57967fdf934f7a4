use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use customer_hierarchy::render::{link_points, Anchor, Shape};
use customer_hierarchy::{Rgb, Session, ViewTransition};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Line as CanvasLine, Rectangle},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Terminal cells are mapped onto this many diagram pixels
const PX_PER_COL: f64 = 8.0;
const PX_PER_ROW: f64 = 16.0;
const PAN_STEP: f64 = 60.0;
const ZOOM_STEP: f64 = 1.25;
const LINK_SEGMENTS: usize = 12;
/// Below these scales text would only be noise
const MIN_HEADER_SCALE: f64 = 0.3;
const MIN_DETAIL_SCALE: f64 = 0.6;

pub struct App {
    pub session: Session,
    pub state: TableState,
    pub show_raw: bool,
    pub raw_scroll: u16,
    pub load_error: Option<String>,
    transition: Option<(ViewTransition, Instant)>,
    canvas_height: f64,
}

impl App {
    pub fn new(session: Session, load_error: Option<String>) -> Self {
        let mut app = Self {
            session,
            state: TableState::default(),
            show_raw: true,
            raw_scroll: 0,
            load_error,
            transition: None,
            canvas_height: 0.0,
        };
        if !app.session.store().is_empty() {
            app.select(0);
        }
        app
    }

    pub fn select(&mut self, index: usize) {
        match self.session.select(index) {
            Ok(_) => {
                self.state.select(Some(index));
                self.raw_scroll = 0;
                self.transition = None;
            }
            Err(e) => tracing::debug!(error = %e, "selection ignored"),
        }
    }

    pub fn next(&mut self) {
        let len = self.session.store().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.select(i);
    }

    pub fn previous(&mut self) {
        let len = self.session.store().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.select(i);
    }

    pub fn toggle_raw(&mut self) {
        self.show_raw = !self.show_raw;
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transition = None;
        self.session.pan(dx, dy);
    }

    /// Zoom around the middle of the canvas
    pub fn zoom(&mut self, factor: f64) {
        self.transition = None;
        let focus = (self.session.canvas_width() / 2.0, self.canvas_height / 2.0);
        self.session.zoom(factor, focus);
    }

    pub fn reset_view(&mut self) {
        let transition = self.session.reset_view();
        // Start from where we are; `tick` walks towards the target
        self.session.set_view(transition.from);
        self.transition = Some((transition, Instant::now()));
    }

    /// Follow a change of diagram width. A running reset keeps its progress
    /// but heads for the new initial framing.
    pub fn resize(&mut self, width: f64) {
        if !self.session.resize(width) {
            return;
        }
        if let Some((transition, started)) = self.transition {
            let retargeted = ViewTransition::new(
                transition.from,
                self.session.initial_view(),
                transition.duration,
            );
            self.transition = Some((retargeted, started));
        }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Advance the reset animation
    pub fn tick(&mut self, now: Instant) {
        if let Some((transition, started)) = self.transition {
            let elapsed = now.saturating_duration_since(started);
            self.session.set_view(transition.at(elapsed));
            if transition.is_finished(elapsed) {
                self.transition = None;
            }
        }
    }

    pub fn scroll_raw(&mut self, delta: i32) {
        self.raw_scroll = (self.raw_scroll as i32 + delta).max(0) as u16;
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        let timeout = if app.is_animating() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(250)
        };
        if !event::poll(timeout)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.toggle_raw(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.select(0),
                KeyCode::Left | KeyCode::Char('a') => app.pan(PAN_STEP, 0.0),
                KeyCode::Right | KeyCode::Char('d') => app.pan(-PAN_STEP, 0.0),
                KeyCode::Char('w') => app.pan(0.0, PAN_STEP),
                KeyCode::Char('s') => app.pan(0.0, -PAN_STEP),
                KeyCode::Char('+') | KeyCode::Char('=') => app.zoom(ZOOM_STEP),
                KeyCode::Char('-') => app.zoom(1.0 / ZOOM_STEP),
                KeyCode::Char('r') => app.reset_view(),
                KeyCode::PageDown => app.scroll_raw(10),
                KeyCode::PageUp => app.scroll_raw(-10),
                _ => {}
            }
        }
    }
}

/// Header, content and status bar rows
fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(area)
}

fn content_layout(area: Rect, show_raw: bool) -> Rc<[Rect]> {
    if show_raw {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(28),     // Scenario selector
                Constraint::Percentage(55), // Diagram
                Constraint::Min(0),         // Raw JSON
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(area)
    }
}

/// Diagram canvas size in pixels for a diagram pane
fn canvas_size(area: Rect) -> (f64, f64) {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    (
        inner.width.max(1) as f64 * PX_PER_COL,
        inner.height.max(1) as f64 * PX_PER_ROW,
    )
}

/// Width the first frame will give the diagram, from the current terminal size
pub fn startup_canvas_width() -> f64 {
    let (cols, rows) = terminal::size().unwrap_or((120, 40));
    let screen = screen_layout(Rect::new(0, 0, cols, rows));
    canvas_size(content_layout(screen[1], true)[1]).0
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = screen_layout(f.size());

    render_header(f, chunks[0], app);

    let content_chunks = content_layout(chunks[1], app.show_raw);

    render_selector(f, content_chunks[0], app);
    render_diagram(f, content_chunks[1], app);
    if app.show_raw {
        render_raw(f, content_chunks[2], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " Customer Hierarchy ",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];

    spans.push(Span::raw("  |  "));
    match app.session.selected() {
        Some(scenario) => spans.push(Span::styled(
            scenario.scenario_name.clone(),
            Style::default().fg(Color::White),
        )),
        None => spans.push(Span::styled(
            "no scenario selected",
            Style::default().fg(Color::DarkGray),
        )),
    }

    if let Some(diagram) = app.session.diagram() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("{} nodes", diagram.node_count),
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_selector(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(vec![Cell::from("Scenario").style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app
        .session
        .options()
        .into_iter()
        .map(|option| Row::new(vec![Cell::from(option.label)]).height(1));

    let title = match &app.load_error {
        Some(_) => " Scenarios (load failed) ",
        None => " Scenarios ",
    };

    let table = Table::new(rows, [Constraint::Min(10)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_diagram(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Diagram ");
    let (width, height) = canvas_size(area);
    app.canvas_height = height;
    app.resize(width);

    let view = app.session.view();
    let diagram = app.session.diagram();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            let Some(diagram) = diagram else {
                return;
            };
            // Canvas y grows upwards, diagram y grows downwards
            let to_canvas = |p: (f64, f64)| {
                let (x, y) = view.apply(p);
                (x, height - y)
            };

            for shape in &diagram.shapes {
                match shape {
                    Shape::Link { from, to } => {
                        let points: Vec<(f64, f64)> = link_points(*from, *to, LINK_SEGMENTS)
                            .into_iter()
                            .map(to_canvas)
                            .collect();
                        for pair in points.windows(2) {
                            ctx.draw(&CanvasLine {
                                x1: pair[0].0,
                                y1: pair[0].1,
                                x2: pair[1].0,
                                y2: pair[1].1,
                                color: color(Rgb::LINK),
                            });
                        }
                    }
                    Shape::Rect {
                        x,
                        y,
                        width: w,
                        height: h,
                        fill,
                        stroke,
                        ..
                    } => {
                        let (left, top) = to_canvas((*x, *y));
                        ctx.draw(&Rectangle {
                            x: left,
                            y: top - h * view.k,
                            width: w * view.k,
                            height: h * view.k,
                            color: color(stroke.unwrap_or(*fill)),
                        });
                    }
                    Shape::Text {
                        x,
                        y,
                        text,
                        fill,
                        anchor,
                        bold,
                        ..
                    } => {
                        let min_scale = if *bold { MIN_HEADER_SCALE } else { MIN_DETAIL_SCALE };
                        if view.k < min_scale {
                            continue;
                        }
                        let (mut cx, cy) = to_canvas((*x, *y));
                        if *anchor == Anchor::Middle {
                            cx -= text.chars().count() as f64 * PX_PER_COL / 2.0;
                        }
                        // Header text sits on coloured fills; the terminal has none
                        let fg = if *bold { Color::White } else { color(*fill) };
                        let mut style = Style::default().fg(fg);
                        if *bold {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        ctx.print(cx, cy, Span::styled(text.clone(), style));
                    }
                }
            }
        });

    f.render_widget(canvas, area);
}

fn render_raw(f: &mut Frame, area: Rect, app: &App) {
    let text = match (&app.load_error, app.session.raw_json()) {
        (_, Some(raw)) => raw,
        (Some(err), None) => format!("Could not load scenarios:\n{}", err),
        (None, None) => "No scenario selected".to_string(),
    };

    let raw = Paragraph::new(text).scroll((app.raw_scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Raw JSON "),
    );

    f.render_widget(raw, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.session.store().len();
    let view = app.session.view();

    let status_spans = vec![
        Span::styled(
            format!(" Scenario: {}/{} ", selected, total),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Zoom: {:.0}% ", view.k * 100.0),
            Style::default().fg(Color::Green),
        ),
        Span::raw("| "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Scenario | "),
        Span::styled("←/→ w/s", Style::default().fg(Color::Yellow)),
        Span::raw(" Pan | "),
        Span::styled("+/-", Style::default().fg(Color::Yellow)),
        Span::raw(" Zoom | "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Reset | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Raw | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit  "),
        Span::styled(
            format!("loaded {}", app.session.loaded_at().format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use customer_hierarchy::{RenderConfig, ScenarioRecord, ScenarioStore};
    use serde_json::json;

    fn app() -> App {
        let store = ScenarioStore::new(vec![
            ScenarioRecord::new("One", json!({ "tradingName": "One Corp" })),
            ScenarioRecord::new("Two", json!({ "tradingName": "Two Corp" })),
            ScenarioRecord::new("Three", json!({ "tradingName": "Three Corp" })),
        ]);
        App::new(Session::new(store, RenderConfig::default(), 800.0), None)
    }

    #[test]
    fn test_canvas_size_matches_diagram_pane() {
        let screen = screen_layout(Rect::new(0, 0, 160, 50));
        let pane = content_layout(screen[1], true)[1];
        let (width, height) = canvas_size(pane);
        assert_eq!(width, (pane.width - 2) as f64 * PX_PER_COL);
        assert_eq!(height, (pane.height - 2) as f64 * PX_PER_ROW);
        assert!(startup_canvas_width() > 0.0);
    }

    #[test]
    fn test_resize_keeps_pan() {
        let mut app = app();
        app.pan(100.0, 100.0);
        let panned = app.session.view();
        app.resize(600.0);
        let view = app.session.view();
        assert_eq!(view.x, panned.x - 100.0);
        assert_eq!(view.y, panned.y);
    }

    #[test]
    fn test_resize_retargets_running_reset() {
        let mut app = app();
        app.pan(100.0, 0.0);
        app.reset_view();
        app.resize(600.0);
        assert!(app.is_animating());
        app.tick(Instant::now() + Duration::from_secs(5));
        assert!(!app.is_animating());
        assert_eq!(
            app.session.view(),
            customer_hierarchy::ViewTransform::initial(600.0, app.session.config())
        );
    }

    #[test]
    fn test_first_scenario_selected_on_start() {
        let app = app();
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.session.diagram().unwrap().node_names(), vec!["One Corp"]);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        assert_eq!(app.session.selected().unwrap().scenario_name, "Three");
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_empty_store_starts_blank() {
        let session = Session::new(ScenarioStore::default(), RenderConfig::default(), 800.0);
        let mut app = App::new(session, Some("missing file".to_string()));
        app.next();
        assert_eq!(app.state.selected(), None);
        assert!(app.session.diagram().is_none());
    }

    #[test]
    fn test_reset_animates_back_to_initial() {
        let mut app = app();
        app.pan(100.0, 50.0);
        app.zoom(2.0);
        let moved = app.session.view();

        app.reset_view();
        assert!(app.is_animating());
        assert_eq!(app.session.view(), moved);

        app.tick(Instant::now() + Duration::from_secs(2));
        assert!(!app.is_animating());
        assert_eq!(app.session.view(), app.session.initial_view());
    }

    #[test]
    fn test_raw_scroll_never_negative() {
        let mut app = app();
        app.scroll_raw(-10);
        assert_eq!(app.raw_scroll, 0);
        app.scroll_raw(10);
        assert_eq!(app.raw_scroll, 10);
    }
}
